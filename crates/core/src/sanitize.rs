//! Pre-extraction HTML cleanup.
//!
//! Strips the machinery that confuses candidate scoring: scripts, styles,
//! embedded SVG/canvas, comments, and elements hidden inline. Runs before
//! the document is parsed for extraction; the Markdown walker sees only the
//! cleaned tree.

use std::sync::LazyLock;

use regex::Regex;

/// Configuration for HTML sanitization
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Remove script and noscript tags
    pub remove_scripts: bool,
    /// Remove style tags
    pub remove_styles: bool,
    /// Remove svg and canvas tags
    pub remove_graphics: bool,
    /// Remove HTML comments
    pub remove_comments: bool,
    /// Remove elements hidden via inline style or the hidden attribute
    pub remove_hidden: bool,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_graphics: true,
            remove_comments: true,
            remove_hidden: true,
        }
    }
}

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static HIDDEN_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(\w+)[^>]*(?:style\s*=\s*["'][^"']*(?:display\s*:\s*none|visibility\s*:\s*hidden)[^"']*["']|\bhidden(?:\s|>|=))[^>]*>.*?</\1>"#)
        .expect("valid regex")
});

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Sanitize HTML per the config. Falls back to the input on rewriter errors;
/// a dirty tree still extracts better than no tree.
pub fn sanitize_html(html: &str, config: &SanitizeConfig) -> String {
    let mut processed = html.to_string();

    if config.remove_scripts || config.remove_styles || config.remove_graphics {
        processed = remove_unwanted_tags(&processed, config);
    }

    if config.remove_comments {
        processed = COMMENT_RE.replace_all(&processed, "").to_string();
    }

    if config.remove_hidden {
        processed = HIDDEN_STYLE_RE.replace_all(&processed, "").to_string();
    }

    BLANK_LINES_RE.replace_all(&processed, "\n\n").to_string()
}

/// Streaming removal of unwanted element subtrees.
fn remove_unwanted_tags(html: &str, config: &SanitizeConfig) -> String {
    let mut output = String::new();

    let mut handlers = Vec::new();
    if config.remove_scripts {
        handlers.push(lol_html::element!("script", |el| {
            el.remove();
            Ok(())
        }));
        handlers.push(lol_html::element!("noscript", |el| {
            el.remove();
            Ok(())
        }));
    }
    if config.remove_styles {
        handlers.push(lol_html::element!("style", |el| {
            el.remove();
            Ok(())
        }));
        handlers.push(lol_html::element!("link[rel=\"stylesheet\"]", |el| {
            el.remove();
            Ok(())
        }));
    }
    if config.remove_graphics {
        handlers.push(lol_html::element!("svg", |el| {
            el.remove();
            Ok(())
        }));
        handlers.push(lol_html::element!("canvas", |el| {
            el.remove();
            Ok(())
        }));
    }

    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: handlers,
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }
    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_scripts_and_styles() {
        let html = r#"<html><head><script>alert(1)</script><style>p{}</style></head><body><p>Keep</p></body></html>"#;
        let cleaned = sanitize_html(html, &SanitizeConfig::default());

        assert!(!cleaned.contains("alert"));
        assert!(!cleaned.contains("p{}"));
        assert!(cleaned.contains("<p>Keep</p>"));
    }

    #[test]
    fn test_removes_noscript() {
        let html = "<body><noscript>Enable JS</noscript><p>Text</p></body>";
        let cleaned = sanitize_html(html, &SanitizeConfig::default());
        assert!(!cleaned.contains("Enable JS"));
    }

    #[test]
    fn test_removes_comments() {
        let html = "<body><!-- tracking pixel --><p>Text</p><!-- [if IE]>legacy<![endif] --></body>";
        let cleaned = sanitize_html(html, &SanitizeConfig::default());
        assert!(!cleaned.contains("tracking"));
        assert!(!cleaned.contains("legacy"));
        assert!(cleaned.contains("<p>Text</p>"));
    }

    #[test]
    fn test_removes_hidden_elements() {
        let html = r#"<body><div style="display:none">ghost</div><p>Visible</p></body>"#;
        let cleaned = sanitize_html(html, &SanitizeConfig::default());
        assert!(!cleaned.contains("ghost"));
        assert!(cleaned.contains("Visible"));
    }

    #[test]
    fn test_removes_svg() {
        let html = "<body><svg><path d=\"M0 0\"/></svg><p>Text</p></body>";
        let cleaned = sanitize_html(html, &SanitizeConfig::default());
        assert!(!cleaned.contains("path"));
    }

    #[test]
    fn test_disabled_config_preserves_input() {
        let config = SanitizeConfig {
            remove_scripts: false,
            remove_styles: false,
            remove_graphics: false,
            remove_comments: false,
            remove_hidden: false,
        };
        let html = "<body><script>x</script><!-- c --><p>Text</p></body>";
        let cleaned = sanitize_html(html, &config);
        assert!(cleaned.contains("<script>"));
        assert!(cleaned.contains("<!-- c -->"));
    }

    #[test]
    fn test_collapses_blank_runs() {
        let html = "<p>a</p>\n\n\n\n\n<p>b</p>";
        let cleaned = sanitize_html(html, &SanitizeConfig::default());
        assert!(!cleaned.contains("\n\n\n"));
    }
}
