mod echo;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use evado_core::{ConversionOptions, Converter, HttpConfig, StrategyId};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Strategy argument: a concrete strategy or "auto" for the tiered races.
#[derive(Debug, Clone, Copy)]
enum StrategyArg {
    Auto,
    Fixed(StrategyId),
}

impl FromStr for StrategyArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            StrategyId::from_str(s).map(Self::Fixed)
        }
    }
}

/// Convert a web URL into clean reader-mode Markdown
#[derive(Parser, Debug)]
#[command(name = "evado")]
#[command(author = "Evado Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Fetch a URL past paywalls and anti-bot screens, output Markdown", long_about = None)]
struct Args {
    /// URL to convert
    #[arg(value_name = "URL")]
    url: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Race the full strategy tiers instead of a single direct fetch
    #[arg(short, long)]
    bypass: bool,

    /// Force one strategy (direct, googlebot, facebookbot, bingbot, archive,
    /// twelveft, jina, exa, googlenews) or "auto"
    #[arg(short, long, default_value = "auto", value_name = "STRATEGY")]
    strategy: StrategyArg,

    /// Wrap the output in a JSON envelope
    #[arg(long)]
    json: bool,

    /// Drop images and figures from the Markdown
    #[arg(long)]
    no_images: bool,

    /// Skip the URL result cache
    #[arg(long)]
    no_cache: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value = "20", value_name = "SECS")]
    timeout: u64,

    /// Enable debug logging and progress output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evado=debug")),
            )
            .with_writer(std::io::stderr)
            .init();

        echo::print_banner();
        echo::print_step(1, 3, &format!("Converting {}", args.url.bright_white().underline()));
    }

    let options = {
        let mut builder = ConversionOptions::builder()
            .bypass(args.bypass)
            .preserve_images(!args.no_images)
            .json_format(args.json)
            .use_cache(!args.no_cache);
        if let StrategyArg::Fixed(id) = args.strategy {
            builder = builder.strategy(id);
        }
        builder.build()
    };

    let config = HttpConfig { timeout: args.timeout };
    let converter = Converter::new(&config).context("Failed to build HTTP client")?;

    let started = Instant::now();
    let result = converter
        .convert(&args.url, &options)
        .await
        .with_context(|| format!("Failed to convert {}", args.url))?;

    if args.verbose {
        echo::print_step(2, 3, "Conversion finished");
        echo::print_result_details(&result);
        echo::print_timing("Total", started.elapsed());
        echo::print_step(3, 3, "Writing output");
    }

    match args.output {
        Some(path) => {
            fs::write(&path, &result.content)
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            if args.verbose {
                echo::print_success(&format!("Output written to {}", path.display()));
            }
        }
        None => {
            println!("{}", result.content);
        }
    }

    Ok(())
}
