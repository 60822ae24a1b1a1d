//! Shared test support: a scriptable strategy runner and HTML fixtures.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use evado_core::{Content, StrategyId, StrategyResult, StrategyRunner};
use url::Url;

/// Scripted behavior for one strategy.
#[derive(Clone)]
pub enum Behavior {
    Html { delay_ms: u64, body: String },
    Markdown { delay_ms: u64, body: String },
    Fail { delay_ms: u64, error: String },
    /// Never completes; used to observe cancellation.
    Hang,
}

/// Observability handles for one strategy's mock.
#[derive(Default)]
pub struct Probe {
    /// Set when the mock future ran to completion.
    pub completed: AtomicBool,
    /// Set when the mock future was dropped before completing.
    pub cancelled: AtomicBool,
}

/// A strategy runner that plays back scripted behaviors and records the
/// order strategies were started in.
pub struct MockRunner {
    behaviors: HashMap<StrategyId, Behavior>,
    probes: HashMap<StrategyId, Arc<Probe>>,
    pub started: Mutex<Vec<StrategyId>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            probes: HashMap::new(),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, strategy: StrategyId, behavior: Behavior) -> Self {
        self.behaviors.insert(strategy, behavior);
        self
    }

    /// Attach a probe to a strategy; returns the handle for assertions.
    pub fn probe(&mut self, strategy: StrategyId) -> Arc<Probe> {
        let probe = Arc::new(Probe::default());
        self.probes.insert(strategy, probe.clone());
        probe
    }

    pub fn started_strategies(&self) -> Vec<StrategyId> {
        self.started.lock().unwrap().clone()
    }
}

/// Flags `cancelled` on drop unless the future completed first.
struct CancelGuard {
    probe: Arc<Probe>,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if !self.probe.completed.load(Ordering::SeqCst) {
            self.probe.cancelled.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl StrategyRunner for MockRunner {
    async fn run(&self, strategy: StrategyId, _url: &Url) -> StrategyResult {
        self.started.lock().unwrap().push(strategy);

        let probe = self.probes.get(&strategy).cloned();
        let _guard = probe.clone().map(|probe| CancelGuard { probe });

        let behavior = self
            .behaviors
            .get(&strategy)
            .cloned()
            .unwrap_or(Behavior::Fail { delay_ms: 0, error: "unscripted".to_string() });

        let result = match behavior {
            Behavior::Html { delay_ms, body } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                StrategyResult::success(strategy, Content::Html { html: body, title: None })
            }
            Behavior::Markdown { delay_ms, body } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                StrategyResult::success(strategy, Content::Markdown { markdown: body, title: None })
            }
            Behavior::Fail { delay_ms, error } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                StrategyResult::failure(strategy, error)
            }
            Behavior::Hang => {
                futures::future::pending::<()>().await;
                unreachable!("pending future completed")
            }
        };

        if let Some(probe) = probe {
            probe.completed.store(true, Ordering::SeqCst);
        }
        result
    }
}

/// A clean article page of at least `len` bytes.
pub fn article_html(len: usize) -> String {
    let mut html = String::from(
        "<html><head><title>A Proper Article</title></head><body><article class=\"post-content\">\
         <h1>A Proper Article</h1>",
    );
    while html.len() < len {
        html.push_str(
            "<p>Paragraph after paragraph of perfectly ordinary prose, with commas, \
             clauses, and enough length to satisfy any scorer that looks at it.</p>",
        );
    }
    html.push_str("</article></body></html>");
    html
}

/// A Cloudflare-style block page of at least `len` bytes.
pub fn blocked_html(len: usize) -> String {
    let mut html = String::from(
        "<html><head><title>Just a moment...</title></head><body>\
         <p>Checking your browser before accessing the site.</p>",
    );
    while html.len() < len {
        html.push_str("<p>Please wait while we verify your request.</p>");
    }
    html.push_str("</body></html>");
    html
}

/// A paywalled article page of at least `len` bytes.
pub fn paywalled_html(len: usize) -> String {
    let mut html = String::from(
        "<html><head><title>Premium Story</title></head><body>\
         <div class=\"paywall-overlay\">Subscribe to continue reading.</div>",
    );
    while html.len() < len {
        html.push_str("<p>Teaser sentence that trails off before the good part.</p>");
    }
    html.push_str("</body></html>");
    html
}

/// A thin SPA bootstrap shell (deliberately small).
pub fn spa_shell_html() -> String {
    let mut html = String::from(
        "<html><head><title>App</title></head><body><div id=\"root\"></div>",
    );
    while html.len() < 3_500 {
        html.push_str("<link rel=\"preload\" href=\"/static/chunk.js\" as=\"script\">");
    }
    html.push_str("</body></html>");
    html
}
