//! The `twelveft` strategy: fetch through the 12ft.io paywall proxy.

use reqwest::Client;
use url::Url;

use crate::strategy::client::{ACCEPT_HTML, get};
use crate::strategy::tables::{DESKTOP_USER_AGENTS, pick};
use crate::strategy::{Content, StrategyId, StrategyResult};

const PROXY_ENDPOINT: &str = "https://12ft.io/proxy";

/// Fetch `https://12ft.io/proxy?q=<url>` with a desktop UA and 12ft referer.
///
/// The proxy reports its own failures in-band as a 200 page, so the adapter
/// checks for its literal "rate limit exceeded" / "blocked" strings rather
/// than the full block-pattern table.
pub async fn fetch(client: &Client, url: &Url) -> StrategyResult {
    let id = StrategyId::Twelveft;

    let mut proxy_url = match Url::parse(PROXY_ENDPOINT) {
        Ok(u) => u,
        Err(e) => return StrategyResult::failure(id, e.to_string()),
    };
    proxy_url.query_pairs_mut().append_pair("q", url.as_str());

    let headers = [
        ("User-Agent", pick(DESKTOP_USER_AGENTS)),
        ("Referer", "https://12ft.io/"),
        ("Accept", ACCEPT_HTML),
    ];

    let body = match get(client, &proxy_url, &headers).await {
        Ok(body) => body,
        Err(e) => return StrategyResult::failure(id, e),
    };

    if !(200..300).contains(&body.status) {
        return StrategyResult::failure(id, format!("HTTP {}", body.status));
    }

    let html = body.text();
    let head = html.to_lowercase();
    if head.contains("rate limit exceeded") {
        return StrategyResult::failure(id, "12ft rate limit exceeded");
    }
    if head.contains("blocked") {
        return StrategyResult::failure(id, "12ft reports target blocked");
    }

    StrategyResult::success(id, Content::Html { html, title: None })
}
