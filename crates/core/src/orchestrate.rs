//! The multi-strategy fetch orchestrator.
//!
//! One request walks a small state machine: an explicit-strategy shortcut, a
//! Google News detour, a no-bypass fast path, then up to two tiers of
//! speculative racing. Within a race every adapter runs concurrently and the
//! first result that survives validation wins; the losing futures are
//! dropped on the spot, which aborts their in-flight requests. The fallback
//! tier never starts until the primary tier has fully concluded.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::strategy::client::{HttpConfig, build_client};
use crate::strategy::exa::ExaSession;
use crate::strategy::{
    Attempt, Content, StrategyId, StrategyResult, archive, bots, direct, exa, googlenews, jina,
    twelveft,
};
use crate::validate;
use crate::{EvadoError, Result};

/// What the caller wants from the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct FetchPlan {
    /// Enable the tiered races; when false only `direct` runs.
    pub bypass: bool,
    /// Force a single strategy, skipping the tiered logic entirely.
    pub strategy: Option<StrategyId>,
}

/// The orchestrator's final product.
#[derive(Debug)]
pub struct Outcome {
    /// Winning strategy name; `googlenews-<inner>` for the recursive path.
    pub strategy: String,
    pub content: Content,
    pub elapsed_ms: u64,
    /// Every concluded attempt, in completion order. The winner carries no
    /// error.
    pub attempts: Vec<Attempt>,
}

/// Validation floors per race tier.
///
/// The primary floor of 10 000 bytes defeats SPA shells whose static HTML is
/// a mere bootstrap; archival/proxy sources serve leaner but legitimate
/// bodies, hence the lower fallback floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Primary,
    Fallback,
}

impl Tier {
    fn min_html(self) -> usize {
        match self {
            Tier::Primary => 10_000,
            Tier::Fallback => 1_000,
        }
    }
}

const MIN_MARKDOWN: usize = 100;

/// Google News archive shortcut: accept only substantial snapshots.
const MIN_NEWS_ARCHIVE_HTML: usize = 10_000;

/// Executes a single strategy. The seam between the orchestrator's control
/// flow and real network adapters; tests substitute their own runner.
#[async_trait]
pub trait StrategyRunner: Send + Sync {
    async fn run(&self, strategy: StrategyId, url: &Url) -> StrategyResult;
}

/// The production runner: dispatches each strategy to its HTTP adapter over
/// one pooled client. Holds the process-wide Exa session.
pub struct HttpRunner {
    client: Client,
    exa_session: ExaSession,
}

impl HttpRunner {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            exa_session: ExaSession::new(),
        })
    }
}

#[async_trait]
impl StrategyRunner for HttpRunner {
    async fn run(&self, strategy: StrategyId, url: &Url) -> StrategyResult {
        match strategy {
            StrategyId::Direct => direct::fetch(&self.client, url).await,
            StrategyId::Googlebot => bots::fetch_googlebot(&self.client, url).await,
            StrategyId::Facebookbot => bots::fetch_facebookbot(&self.client, url).await,
            StrategyId::Bingbot => bots::fetch_bingbot(&self.client, url).await,
            StrategyId::Archive => archive::fetch(&self.client, url).await,
            StrategyId::Twelveft => twelveft::fetch(&self.client, url).await,
            StrategyId::Jina => jina::fetch(&self.client, url).await,
            StrategyId::Exa => exa::fetch(&self.client, &self.exa_session, url).await,
            // Decoding and recursion live in the orchestrator itself.
            StrategyId::GoogleNews => {
                StrategyResult::failure(strategy, "googlenews runs through the orchestrator")
            }
        }
    }
}

/// Races strategies against an origin and selects the first valid result.
pub struct Orchestrator {
    runner: Arc<dyn StrategyRunner>,
}

impl Orchestrator {
    /// Production orchestrator over an [`HttpRunner`].
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self::with_runner(Arc::new(HttpRunner::new(config)?)))
    }

    /// Orchestrator over a custom runner (used by tests).
    pub fn with_runner(runner: Arc<dyn StrategyRunner>) -> Self {
        Self { runner }
    }

    /// Fetch `url` per `plan`, returning the winning strategy's content.
    ///
    /// Fails only with [`EvadoError::AllStrategiesFailed`], which lists every
    /// attempt and its error.
    pub async fn orchestrate(&self, url: &Url, plan: &FetchPlan) -> Result<Outcome> {
        self.orchestrate_at(url.clone(), plan.clone(), 0).await
    }

    /// Boxed recursion point: the Google News path re-enters with the
    /// decoded publisher URL at `depth + 1`.
    fn orchestrate_at(
        &self,
        url: Url,
        plan: FetchPlan,
        depth: u8,
    ) -> BoxFuture<'_, Result<Outcome>> {
        Box::pin(async move {
            let start = Instant::now();
            let mut attempts: Vec<Attempt> = Vec::new();

            // Explicit-strategy branch: run exactly that adapter, no gating.
            if let Some(id) = plan.strategy {
                if id == StrategyId::GoogleNews {
                    return self.google_news_only(&url, depth, start).await;
                }

                let result = self.runner.run(id, &url).await;
                return match result.outcome {
                    Ok(content) => {
                        attempts.push(Attempt { strategy: id, error: None });
                        Ok(finish(id.to_string(), content, start, attempts))
                    }
                    Err(error) => {
                        attempts.push(Attempt { strategy: id, error: Some(error) });
                        Err(exhausted(&url, attempts))
                    }
                };
            }

            let mut bypass = plan.bypass;
            let mut skip_primary = false;

            // Google-News branch: archive first, then the decoder, then a
            // forced-bypass fallthrough that skips the bot race (the bots
            // cannot follow the client-side redirect).
            if depth == 0 && googlenews::is_google_news(&url) {
                debug!(target: "evado::orchestrate", url = %url, "google news routing");

                let result = self.runner.run(StrategyId::Archive, &url).await;
                match result.outcome {
                    Ok(content) => {
                        if matches!(&content, Content::Html { html, .. } if html.len() > MIN_NEWS_ARCHIVE_HTML)
                        {
                            attempts.push(Attempt { strategy: StrategyId::Archive, error: None });
                            return Ok(finish("archive".to_string(), content, start, attempts));
                        }
                        attempts.push(Attempt {
                            strategy: StrategyId::Archive,
                            error: Some(format!("snapshot too small ({} bytes)", content.len())),
                        });
                    }
                    Err(error) => {
                        attempts.push(Attempt { strategy: StrategyId::Archive, error: Some(error) })
                    }
                }

                match googlenews::decode_publisher_url(&url) {
                    Ok(decoded) => {
                        info!(target: "evado::orchestrate", decoded = %decoded, "decoded google news link");
                        let inner_plan = FetchPlan { bypass: true, strategy: None };
                        match self.orchestrate_at(decoded, inner_plan, depth + 1).await {
                            Ok(inner) => {
                                attempts.extend(inner.attempts);
                                return Ok(finish(
                                    format!("googlenews-{}", inner.strategy),
                                    inner.content,
                                    start,
                                    attempts,
                                ));
                            }
                            Err(error) => attempts.push(Attempt {
                                strategy: StrategyId::GoogleNews,
                                error: Some(error.to_string()),
                            }),
                        }
                    }
                    Err(error) => attempts.push(Attempt {
                        strategy: StrategyId::GoogleNews,
                        error: Some(error),
                    }),
                }

                bypass = true;
                skip_primary = true;
            }

            // No-bypass branch: direct only.
            if !bypass {
                let result = self.runner.run(StrategyId::Direct, &url).await;
                return match result.outcome {
                    Ok(content) => {
                        attempts.push(Attempt { strategy: StrategyId::Direct, error: None });
                        Ok(finish("direct".to_string(), content, start, attempts))
                    }
                    Err(error) => {
                        attempts.push(Attempt { strategy: StrategyId::Direct, error: Some(error) });
                        Err(exhausted(&url, attempts))
                    }
                };
            }

            // Primary race: cheap HTTP-level impersonation.
            if !skip_primary
                && let Some((id, content)) =
                    self.race(&url, StrategyId::PRIMARY, Tier::Primary, &mut attempts).await
            {
                return Ok(finish(id.to_string(), content, start, attempts));
            }

            // Fallback race: third-party-backed retrieval. Must not start
            // until the primary tier has fully concluded, which the await
            // above guarantees.
            if let Some((id, content)) =
                self.race(&url, StrategyId::FALLBACK, Tier::Fallback, &mut attempts).await
            {
                return Ok(finish(id.to_string(), content, start, attempts));
            }

            Err(exhausted(&url, attempts))
        })
    }

    /// Run one tier concurrently; first valid completion wins and the rest
    /// are cancelled by dropping the race stream.
    async fn race(
        &self,
        url: &Url,
        tier: &[StrategyId],
        floors: Tier,
        attempts: &mut Vec<Attempt>,
    ) -> Option<(StrategyId, Content)> {
        let mut running: FuturesUnordered<_> =
            tier.iter().map(|id| self.runner.run(*id, url)).collect();

        while let Some(result) = running.next().await {
            let strategy = result.strategy;
            match result.outcome {
                Ok(content) => match validate_content(&content, floors) {
                    Ok(()) => {
                        info!(target: "evado::orchestrate", %strategy, "race winner");
                        attempts.push(Attempt { strategy, error: None });
                        return Some((strategy, content));
                    }
                    Err(reason) => {
                        debug!(target: "evado::orchestrate", %strategy, %reason, "rejected");
                        attempts.push(Attempt { strategy, error: Some(reason) });
                    }
                },
                Err(error) => {
                    warn!(target: "evado::orchestrate", %strategy, %error, "attempt failed");
                    attempts.push(Attempt { strategy, error: Some(error) });
                }
            }
        }

        None
    }

    /// The explicit `strategy=googlenews` path: decode and recurse, nothing
    /// else.
    async fn google_news_only(&self, url: &Url, depth: u8, start: Instant) -> Result<Outcome> {
        let mut attempts = Vec::new();

        if depth > 0 {
            attempts.push(Attempt {
                strategy: StrategyId::GoogleNews,
                error: Some("refusing nested google news recursion".to_string()),
            });
            return Err(exhausted(url, attempts));
        }

        match googlenews::decode_publisher_url(url) {
            Ok(decoded) => {
                let plan = FetchPlan { bypass: true, strategy: None };
                match self.orchestrate_at(decoded, plan, depth + 1).await {
                    Ok(inner) => {
                        let mut attempts = inner.attempts;
                        attempts.push(Attempt { strategy: StrategyId::GoogleNews, error: None });
                        Ok(finish(
                            format!("googlenews-{}", inner.strategy),
                            inner.content,
                            start,
                            attempts,
                        ))
                    }
                    Err(error) => {
                        attempts.push(Attempt {
                            strategy: StrategyId::GoogleNews,
                            error: Some(error.to_string()),
                        });
                        Err(exhausted(url, attempts))
                    }
                }
            }
            Err(error) => {
                attempts.push(Attempt { strategy: StrategyId::GoogleNews, error: Some(error) });
                Err(exhausted(url, attempts))
            }
        }
    }
}

/// A race result passes when it carries enough Markdown, or enough HTML that
/// none of the validators flag.
fn validate_content(content: &Content, tier: Tier) -> std::result::Result<(), String> {
    match content {
        Content::Markdown { markdown, .. } => {
            if markdown.len() > MIN_MARKDOWN {
                Ok(())
            } else {
                Err(format!("markdown too short ({} bytes)", markdown.len()))
            }
        }
        Content::Html { html, .. } => {
            let floor = tier.min_html();
            let large_enough = match tier {
                Tier::Primary => html.len() >= floor,
                Tier::Fallback => html.len() > floor,
            };
            if !large_enough {
                return Err(format!("html too small ({} bytes)", html.len()));
            }
            if validate::is_blocked(html) {
                return Err("blocked page detected".to_string());
            }
            if validate::is_paywalled(html) {
                return Err("paywall detected".to_string());
            }
            if validate::is_google_error_page(html) {
                return Err("google error page".to_string());
            }
            Ok(())
        }
    }
}

fn finish(strategy: String, content: Content, start: Instant, attempts: Vec<Attempt>) -> Outcome {
    Outcome {
        strategy,
        content,
        elapsed_ms: start.elapsed().as_millis() as u64,
        attempts,
    }
}

fn exhausted(url: &Url, attempts: Vec<Attempt>) -> EvadoError {
    EvadoError::AllStrategiesFailed {
        url: url.to_string(),
        attempts: attempts
            .into_iter()
            .map(|a| {
                (
                    a.strategy.to_string(),
                    a.error.unwrap_or_else(|| "unknown".to_string()),
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_content(len: usize) -> Content {
        let mut html = String::from("<html><body><article>");
        while html.len() < len {
            html.push_str("<p>Filler paragraph about perfectly ordinary things.</p>");
        }
        html.push_str("</article></body></html>");
        Content::Html { html, title: None }
    }

    #[test]
    fn test_validate_markdown_floor() {
        let short = Content::Markdown { markdown: "tiny".to_string(), title: None };
        assert!(validate_content(&short, Tier::Primary).is_err());

        let long = Content::Markdown { markdown: "x".repeat(200), title: None };
        assert!(validate_content(&long, Tier::Primary).is_ok());
        assert!(validate_content(&long, Tier::Fallback).is_ok());
    }

    #[test]
    fn test_validate_html_floors_differ_by_tier() {
        let spa_shell = html_content(4_000);
        assert!(validate_content(&spa_shell, Tier::Primary).is_err());
        assert!(validate_content(&spa_shell, Tier::Fallback).is_ok());

        let article = html_content(12_000);
        assert!(validate_content(&article, Tier::Primary).is_ok());
    }

    #[test]
    fn test_validate_html_rejects_blocked() {
        let mut html = String::from("<html><body>Checking your browser before accessing");
        while html.len() < 12_000 {
            html.push_str("<p>padding padding padding</p>");
        }
        let content = Content::Html { html, title: None };
        let err = validate_content(&content, Tier::Primary).unwrap_err();
        assert!(err.contains("blocked"));
    }

    #[test]
    fn test_validate_html_rejects_paywalled() {
        let mut html = String::from("<html><body><div class=\"paywall-overlay\">Subscribe to continue</div>");
        while html.len() < 12_000 {
            html.push_str("<p>padding padding padding</p>");
        }
        let content = Content::Html { html, title: None };
        let err = validate_content(&content, Tier::Primary).unwrap_err();
        assert!(err.contains("paywall"));
    }

    #[test]
    fn test_exhausted_error_message() {
        let url = Url::parse("https://dead.test/").unwrap();
        let attempts = vec![
            Attempt { strategy: StrategyId::Direct, error: Some("HTTP 500".to_string()) },
            Attempt { strategy: StrategyId::Jina, error: Some("timeout".to_string()) },
        ];

        let err = exhausted(&url, attempts);
        let message = err.to_string();
        assert!(message.contains("direct"));
        assert!(message.contains("jina"));
        assert!(message.contains("timeout"));
    }
}
