//! The `jina` strategy: fetch through the Jina Reader, which renders the
//! page server-side and returns Markdown.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use url::Url;

use crate::strategy::client::get;
use crate::strategy::{Content, StrategyId, StrategyResult};

const READER_PREFIX: &str = "https://r.jina.ai/";

/// Minimum plausible body length; shorter responses are reader error stubs.
const MIN_BODY_LEN: usize = 50;

/// First ATX H1 in the returned Markdown.
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").expect("valid regex"));

/// Reader preamble: `Title: …` / `URL Source: …` / `Markdown Content:` lines
/// before the actual body.
static PREAMBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\ATitle: .*?Markdown Content:\n+").expect("valid regex")
});

/// Fetch `https://r.jina.ai/<url>` with `Accept: text/plain`.
pub async fn fetch(client: &Client, url: &Url) -> StrategyResult {
    let id = StrategyId::Jina;

    let reader_url = match Url::parse(&format!("{}{}", READER_PREFIX, url)) {
        Ok(u) => u,
        Err(e) => return StrategyResult::failure(id, e.to_string()),
    };

    let headers = [("Accept", "text/plain")];
    let body = match get(client, &reader_url, &headers).await {
        Ok(body) => body,
        Err(e) => return StrategyResult::failure(id, e),
    };

    if !(200..300).contains(&body.status) {
        return StrategyResult::failure(id, format!("HTTP {} from reader", body.status));
    }

    let text = body.text();
    if text.len() < MIN_BODY_LEN {
        return StrategyResult::failure(id, format!("reader body too short ({} bytes)", text.len()));
    }

    let markdown = strip_preamble(&text);
    let title = extract_title(markdown);

    StrategyResult::success(
        id,
        Content::Markdown { markdown: markdown.to_string(), title },
    )
}

/// Drop the `Title: … Markdown Content:` preamble when present at the start.
fn strip_preamble(text: &str) -> &str {
    match PREAMBLE_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Title from the first `# ` heading, if any.
fn extract_title(markdown: &str) -> Option<String> {
    H1_RE
        .captures(markdown)
        .map(|c| c[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_preamble() {
        let text = "Title: Some Article\nURL Source: https://example.com/a\nMarkdown Content:\n\n# Some Article\n\nBody text.";
        let stripped = strip_preamble(text);
        assert!(stripped.starts_with("# Some Article"));
        assert!(!stripped.contains("URL Source"));
    }

    #[test]
    fn test_strip_preamble_absent() {
        let text = "# Plain Markdown\n\nNo preamble here.";
        assert_eq!(strip_preamble(text), text);
    }

    #[test]
    fn test_preamble_must_anchor_at_start() {
        let text = "# Heading\n\nDiscussion of the Title: field and Markdown Content:\n\nmore";
        assert_eq!(strip_preamble(text), text);
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("# The Headline\n\nBody"),
            Some("The Headline".to_string())
        );
        assert_eq!(extract_title("No heading at all"), None);
    }

    #[test]
    fn test_extract_title_skips_deeper_headings() {
        assert_eq!(
            extract_title("## Sub\n\n# Real Title\n\nBody"),
            Some("Real Title".to_string())
        );
    }

    #[test]
    fn test_reader_url_keeps_raw_target() {
        let url = Url::parse("https://example.com/a?b=c").unwrap();
        let reader_url = Url::parse(&format!("{}{}", READER_PREFIX, url)).unwrap();
        assert_eq!(
            reader_url.as_str(),
            "https://r.jina.ai/https://example.com/a?b=c"
        );
    }
}
