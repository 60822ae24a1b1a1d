//! Evado: convert an arbitrary web URL into clean reader-mode Markdown.
//!
//! A family of fetch strategies is raced against the origin — direct
//! fetching, search-engine and social-crawler impersonation, proxies,
//! archives, and reader services — and the first response that survives the
//! block/paywall/shell heuristics wins. The winner's HTML is reduced to an
//! article via JSON-LD or readability scoring and rendered as GFM Markdown.

pub mod article;
pub mod cache;
pub mod charset;
pub mod convert;
pub mod dom;
pub mod error;
pub mod extract;
pub mod jsonld;
pub mod markdown;
pub mod metadata;
pub mod options;
pub mod orchestrate;
pub mod sanitize;
pub mod scoring;
pub mod strategy;
pub mod validate;

pub use article::Article;
pub use cache::{CACHE_CAPACITY, CACHE_TTL, CacheEntry, UrlCache};
pub use charset::decode_body;
pub use convert::{ConversionResult, Converter};
pub use dom::{Document, Element};
pub use error::{EvadoError, Result};
pub use extract::{ExtractConfig, ExtractedContent, extract_content};
pub use jsonld::{JsonLdArticle, extract_json_ld};
pub use markdown::{MarkdownOptions, html_to_markdown};
pub use metadata::Metadata;
pub use options::{ConversionOptions, ConversionOptionsBuilder};
pub use orchestrate::{FetchPlan, HttpRunner, Orchestrator, Outcome, StrategyRunner};
pub use strategy::client::HttpConfig;
pub use strategy::{Attempt, Content, StrategyId, StrategyResult};
pub use validate::{PATTERNS_VERSION, is_blocked, is_google_error_page, is_paywalled};
