//! The conversion façade: URL in, reader-mode Markdown out.
//!
//! Wraps the orchestrator with caching and content extraction. HTML winners
//! go through JSON-LD first (structured data beats DOM scoring when a site
//! provides it), then the readability extractor plus the Markdown walker;
//! Markdown winners pass straight through. Either path can be wrapped in a
//! JSON envelope for API-style consumers.

use chrono::Utc;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::article::Article;
use crate::cache::{CacheEntry, UrlCache};
use crate::dom::Document;
use crate::extract::ExtractConfig;
use crate::jsonld;
use crate::markdown::{MarkdownOptions, html_to_markdown};
use crate::options::ConversionOptions;
use crate::orchestrate::{FetchPlan, Orchestrator};
use crate::strategy::Content;
use crate::strategy::client::HttpConfig;
use crate::{EvadoError, Result};

/// JSON-LD bodies shorter than this fall through to readability.
const MIN_JSONLD_BODY: usize = 500;

const CONTENT_TYPE_MARKDOWN: &str = "text/plain; charset=utf-8";
const CONTENT_TYPE_JSON: &str = "application/json";

/// What [`Converter::convert`] hands back.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub content: String,
    pub strategy: String,
    pub content_type: String,
    pub elapsed_ms: u64,
    pub from_cache: bool,
    pub title: Option<String>,
}

/// URL-to-Markdown converter with a process-wide result cache.
pub struct Converter {
    orchestrator: Orchestrator,
    cache: UrlCache,
}

impl Converter {
    /// Production converter over real HTTP adapters.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            orchestrator: Orchestrator::new(config)?,
            cache: UrlCache::default(),
        })
    }

    /// Converter over custom parts (used by tests).
    pub fn with_parts(orchestrator: Orchestrator, cache: UrlCache) -> Self {
        Self { orchestrator, cache }
    }

    /// Convert a URL to reader-mode Markdown (or a JSON envelope).
    pub async fn convert(&self, url: &str, options: &ConversionOptions) -> Result<ConversionResult> {
        let url = parse_url(url)?;
        let key = url.as_str().to_string();

        if options.use_cache
            && let Some(entry) = self.cache.get(&key)
        {
            debug!(target: "evado::convert", url = %key, "cache hit");
            return Ok(ConversionResult {
                content: entry.content,
                strategy: entry.strategy,
                content_type: entry.content_type,
                elapsed_ms: 0,
                from_cache: true,
                title: entry.title,
            });
        }

        let plan = FetchPlan { bypass: options.bypass, strategy: options.strategy };
        let outcome = self.orchestrator.orchestrate(&url, &plan).await?;

        let rendered = match outcome.content {
            Content::Markdown { markdown, title } => {
                render_markdown_payload(&url, markdown, title, &outcome.strategy, outcome.elapsed_ms, options)
            }
            Content::Html { html, .. } => {
                render_html_payload(&url, &html, &outcome.strategy, outcome.elapsed_ms, options)?
            }
        };

        if options.use_cache {
            self.cache.insert(
                &key,
                CacheEntry {
                    content: rendered.content.clone(),
                    strategy: rendered.strategy.clone(),
                    content_type: rendered.content_type.clone(),
                    title: rendered.title.clone(),
                },
            );
        }

        Ok(rendered)
    }
}

/// Validate and parse the caller's URL.
fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| EvadoError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(EvadoError::InvalidUrl(format!(
            "unsupported scheme: {}",
            other
        ))),
    }
}

/// A Markdown winner passes through as-is, or gets the JSON envelope.
fn render_markdown_payload(
    url: &Url,
    markdown: String,
    title: Option<String>,
    strategy: &str,
    elapsed_ms: u64,
    options: &ConversionOptions,
) -> ConversionResult {
    if options.json_format {
        let envelope = json!({
            "url": url.as_str(),
            "title": "Extracted Content",
            "date": Utc::now().to_rfc3339(),
            "content": markdown,
            "strategy": strategy,
            "elapsed": elapsed_ms,
        });

        return ConversionResult {
            content: envelope.to_string(),
            strategy: strategy.to_string(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            elapsed_ms,
            from_cache: false,
            title,
        };
    }

    ConversionResult {
        content: markdown,
        strategy: strategy.to_string(),
        content_type: CONTENT_TYPE_MARKDOWN.to_string(),
        elapsed_ms,
        from_cache: false,
        title,
    }
}

/// An HTML winner: JSON-LD first, readability plus the walker otherwise.
fn render_html_payload(
    url: &Url,
    html: &str,
    strategy: &str,
    elapsed_ms: u64,
    options: &ConversionOptions,
) -> Result<ConversionResult> {
    // JSON-LD lives in <script> tags, so look before sanitization.
    let raw_doc = Document::parse(html)?;
    if let Some(ld) = jsonld::extract_json_ld(&raw_doc)
        && ld.body.trim().len() > MIN_JSONLD_BODY
    {
        debug!(target: "evado::convert", "json-ld article accepted");
        let markdown = compose_markdown(ld.title.as_deref(), ld.author.as_deref(), &ld.body);
        return Ok(finish_html_payload(
            url,
            markdown,
            ld.title,
            ld.author,
            ld.date,
            strategy,
            elapsed_ms,
            options,
        ));
    }

    let doc = Document::parse_sanitized(html, Some(url.clone()))?;
    let article = Article::from_document(&doc, &ExtractConfig::default())
        .or_else(|_| Article::fallback_from_document(&doc))?;

    let markdown_options = MarkdownOptions::new(options.preserve_images, Some(url.clone()));
    let body = html_to_markdown(&article.content, &markdown_options);
    let markdown = compose_markdown(article.title.as_deref(), article.byline.as_deref(), &body);

    Ok(finish_html_payload(
        url,
        markdown,
        article.title,
        article.byline,
        article.date,
        strategy,
        elapsed_ms,
        options,
    ))
}

/// `# title`, `*By author*`, body.
fn compose_markdown(title: Option<&str>, author: Option<&str>, body: &str) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        out.push_str(&format!("# {}\n\n", title));
    }
    if let Some(author) = author {
        out.push_str(&format!("*By {}*\n\n", author));
    }
    out.push_str(body);
    out
}

#[allow(clippy::too_many_arguments)]
fn finish_html_payload(
    url: &Url,
    markdown: String,
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
    strategy: &str,
    elapsed_ms: u64,
    options: &ConversionOptions,
) -> ConversionResult {
    if options.json_format {
        let mut envelope = json!({
            "url": url.as_str(),
            "title": title.as_deref().unwrap_or("Extracted Content"),
            "date": date.unwrap_or_else(|| Utc::now().to_rfc3339()),
            "content": markdown,
            "strategy": strategy,
            "elapsed": elapsed_ms,
        });
        if let Some(author) = &author {
            envelope["author"] = json!(author);
        }

        return ConversionResult {
            content: envelope.to_string(),
            strategy: strategy.to_string(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            elapsed_ms,
            from_cache: false,
            title,
        };
    }

    ConversionResult {
        content: markdown,
        strategy: strategy.to_string(),
        content_type: CONTENT_TYPE_MARKDOWN.to_string(),
        elapsed_ms,
        from_cache: false,
        title,
    }
}
