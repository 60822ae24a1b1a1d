use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Evado".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Convert web URLs into reader-mode Markdown\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: std::time::Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    if ms < 500.0 {
        eprintln!("  {} {:>8.2}ms ({})", format!("{}:", label).dimmed(), ms, "fast".dimmed());
    } else if ms < 3000.0 {
        eprintln!(
            "  {} {:>8.2}ms ({})",
            format!("{}:", label).dimmed(),
            ms,
            "moderate".bright_yellow()
        );
    } else {
        eprintln!(
            "  {} {:>8.2}ms ({})",
            format!("{}:", label).dimmed(),
            ms,
            "slow".bright_red()
        );
    }
}

/// Print conversion result summary
pub fn print_result_details(result: &evado_core::ConversionResult) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Conversion Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!(
        "  {} {}",
        "Strategy:".dimmed(),
        result.strategy.bright_white()
    );
    if let Some(title) = &result.title {
        eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
    }
    eprintln!(
        "  {} {}",
        "Size:".dimmed(),
        format_size(result.content.len()).bright_white()
    );
    eprintln!(
        "  {} {}",
        "Cache:".dimmed(),
        if result.from_cache { "hit" } else { "miss" }.bright_white()
    );
    eprintln!();
}

/// Format content size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
