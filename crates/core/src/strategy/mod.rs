//! Fetch strategies: one adapter per bypass technique.
//!
//! Every adapter takes a URL and produces a [`StrategyResult`]. Adapters
//! never return `Err` and never panic: transport failures, bad status codes,
//! and validator rejections are all folded into the result's error string so
//! the orchestrator can race adapters and aggregate their failures.

pub mod archive;
pub mod bots;
pub mod client;
pub mod direct;
pub mod exa;
pub mod googlenews;
pub mod jina;
pub mod tables;
pub mod twelveft;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Closed enumeration of fetch strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyId {
    /// Plain GET with a desktop browser User-Agent.
    Direct,
    /// Googlebot impersonation with a spoofed Google crawl IP.
    Googlebot,
    /// Facebook external-hit impersonation.
    Facebookbot,
    /// Bingbot impersonation with a spoofed Bing crawl IP.
    Bingbot,
    /// Wayback Machine snapshot retrieval.
    Archive,
    /// 12ft.io proxy.
    Twelveft,
    /// Jina Reader (returns Markdown).
    Jina,
    /// Exa crawling via its MCP endpoint (returns Markdown).
    Exa,
    /// Google News article-URL decoding plus a recursive fetch.
    GoogleNews,
}

impl StrategyId {
    /// Strategies raced in the primary tier: cheap HTTP-level impersonation.
    pub const PRIMARY: &'static [StrategyId] = &[
        StrategyId::Direct,
        StrategyId::Googlebot,
        StrategyId::Facebookbot,
        StrategyId::Bingbot,
    ];

    /// Strategies raced in the fallback tier: slower third-party services.
    pub const FALLBACK: &'static [StrategyId] = &[
        StrategyId::Twelveft,
        StrategyId::Archive,
        StrategyId::Jina,
        StrategyId::Exa,
    ];

    /// The lowercase wire/CLI name of this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Direct => "direct",
            StrategyId::Googlebot => "googlebot",
            StrategyId::Facebookbot => "facebookbot",
            StrategyId::Bingbot => "bingbot",
            StrategyId::Archive => "archive",
            StrategyId::Twelveft => "twelveft",
            StrategyId::Jina => "jina",
            StrategyId::Exa => "exa",
            StrategyId::GoogleNews => "googlenews",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(StrategyId::Direct),
            "googlebot" => Ok(StrategyId::Googlebot),
            "facebookbot" => Ok(StrategyId::Facebookbot),
            "bingbot" => Ok(StrategyId::Bingbot),
            "archive" => Ok(StrategyId::Archive),
            "12ft" | "twelveft" => Ok(StrategyId::Twelveft),
            "jina" => Ok(StrategyId::Jina),
            "exa" => Ok(StrategyId::Exa),
            "googlenews" => Ok(StrategyId::GoogleNews),
            _ => Err(format!(
                "Unknown strategy: {}. Valid options: direct, googlebot, facebookbot, bingbot, archive, twelveft, jina, exa, googlenews",
                s
            )),
        }
    }
}

/// What a successful strategy produced: raw page HTML or ready Markdown.
///
/// Adapters that talk to reader services (`jina`, `exa`, and the recursive
/// `googlenews` when its inner winner did) return Markdown; everything else
/// returns HTML that still needs extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Html {
        html: String,
        title: Option<String>,
    },
    Markdown {
        markdown: String,
        title: Option<String>,
    },
}

impl Content {
    /// Byte length of the payload, whichever variant it is.
    pub fn len(&self) -> usize {
        match self {
            Content::Html { html, .. } => html.len(),
            Content::Markdown { markdown, .. } => markdown.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Content::Html { title, .. } | Content::Markdown { title, .. } => title.as_deref(),
        }
    }
}

/// The uniform product of every strategy adapter.
#[derive(Debug, Clone)]
pub struct StrategyResult {
    pub strategy: StrategyId,
    /// `Ok` carries the payload; `Err` carries a diagnostic string.
    pub outcome: std::result::Result<Content, String>,
}

impl StrategyResult {
    pub fn success(strategy: StrategyId, content: Content) -> Self {
        Self { strategy, outcome: Ok(content) }
    }

    pub fn failure(strategy: StrategyId, error: impl Into<String>) -> Self {
        Self { strategy, outcome: Err(error.into()) }
    }
}

/// One completed attempt, recorded by the orchestrator in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub strategy: StrategyId,
    /// `None` for the winning attempt.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_id_round_trip() {
        for id in StrategyId::PRIMARY.iter().chain(StrategyId::FALLBACK) {
            let parsed: StrategyId = id.as_str().parse().unwrap();
            assert_eq!(parsed, *id);
        }
    }

    #[test]
    fn test_strategy_id_from_str_aliases() {
        assert_eq!("12ft".parse::<StrategyId>().unwrap(), StrategyId::Twelveft);
        assert_eq!("GoogleBot".parse::<StrategyId>().unwrap(), StrategyId::Googlebot);
    }

    #[test]
    fn test_strategy_id_from_str_unknown() {
        assert!("headless".parse::<StrategyId>().is_err());
    }

    #[test]
    fn test_content_len() {
        let html = Content::Html { html: "<p>hi</p>".to_string(), title: None };
        assert_eq!(html.len(), 9);
        assert!(!html.is_empty());

        let md = Content::Markdown { markdown: String::new(), title: None };
        assert!(md.is_empty());
    }

    #[test]
    fn test_result_constructors() {
        let ok = StrategyResult::success(
            StrategyId::Direct,
            Content::Html { html: "<html></html>".to_string(), title: None },
        );
        assert!(ok.outcome.is_ok());

        let err = StrategyResult::failure(StrategyId::Jina, "body too short");
        assert_eq!(err.outcome.unwrap_err(), "body too short");
    }
}
