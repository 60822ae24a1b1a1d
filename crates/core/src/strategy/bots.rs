//! Search-engine and social-crawler impersonation strategies.
//!
//! Paywalled publishers commonly whitelist indexer user agents so their
//! articles stay searchable; these adapters borrow that privilege. Googlebot
//! and Bingbot additionally spoof `X-Forwarded-For` with an address from the
//! engine's real crawl ranges, which defeats origin-side reverse-DNS checks
//! that only inspect that header. The Facebook crawler is not IP-gated, so
//! `facebookbot` sends the referer alone.
//!
//! Block/paywall gating for these adapters happens at race validation.

use reqwest::Client;
use url::Url;

use crate::strategy::client::{ACCEPT_HTML, ACCEPT_LANGUAGE, get};
use crate::strategy::tables::{
    BING_CRAWL_IPS, BINGBOT_USER_AGENTS, FACEBOOK_USER_AGENTS, GOOGLE_CRAWL_IPS,
    GOOGLEBOT_USER_AGENTS, pick,
};
use crate::strategy::{Content, StrategyId, StrategyResult};

/// Fetch as Googlebot with a spoofed Google crawl IP.
pub async fn fetch_googlebot(client: &Client, url: &Url) -> StrategyResult {
    let headers = [
        ("User-Agent", pick(GOOGLEBOT_USER_AGENTS)),
        ("X-Forwarded-For", pick(GOOGLE_CRAWL_IPS)),
        ("Accept", ACCEPT_HTML),
        ("Accept-Language", ACCEPT_LANGUAGE),
    ];
    fetch_as(client, url, StrategyId::Googlebot, &headers).await
}

/// Fetch as Bingbot with a spoofed Bing crawl IP and Bing referer.
pub async fn fetch_bingbot(client: &Client, url: &Url) -> StrategyResult {
    let headers = [
        ("User-Agent", pick(BINGBOT_USER_AGENTS)),
        ("X-Forwarded-For", pick(BING_CRAWL_IPS)),
        ("Referer", "https://www.bing.com/"),
        ("Accept", ACCEPT_HTML),
        ("Accept-Language", ACCEPT_LANGUAGE),
    ];
    fetch_as(client, url, StrategyId::Bingbot, &headers).await
}

/// Fetch as the Facebook link-preview crawler.
pub async fn fetch_facebookbot(client: &Client, url: &Url) -> StrategyResult {
    let headers = [
        ("User-Agent", pick(FACEBOOK_USER_AGENTS)),
        ("Referer", "https://www.facebook.com/"),
        ("Accept", ACCEPT_HTML),
        ("Accept-Language", ACCEPT_LANGUAGE),
    ];
    fetch_as(client, url, StrategyId::Facebookbot, &headers).await
}

/// Shared impersonation fetch: status and content-type checks, charset
/// decode, HTML payload out.
async fn fetch_as(
    client: &Client,
    url: &Url,
    id: StrategyId,
    headers: &[(&str, &str)],
) -> StrategyResult {
    let body = match get(client, url, headers).await {
        Ok(body) => body,
        Err(e) => return StrategyResult::failure(id, e),
    };

    if !(200..300).contains(&body.status) {
        return StrategyResult::failure(id, format!("HTTP {}", body.status));
    }
    if !body.is_html() {
        return StrategyResult::failure(
            id,
            format!(
                "unexpected content type: {}",
                body.content_type.as_deref().unwrap_or("none")
            ),
        );
    }

    StrategyResult::success(id, Content::Html { html: body.text(), title: None })
}
