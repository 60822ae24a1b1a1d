//! The `direct` strategy: a plain GET pretending to be a desktop browser.

use reqwest::Client;
use url::Url;

use crate::strategy::client::{ACCEPT_HTML, ACCEPT_LANGUAGE, get};
use crate::strategy::tables::{DESKTOP_USER_AGENTS, pick};
use crate::strategy::{Content, StrategyId, StrategyResult};
use crate::validate;

/// Fetch the URL directly with a realistic desktop User-Agent.
///
/// Rejects non-2xx statuses, non-HTML content types, and bodies the
/// validators flag as blocked or paywalled. The other HTML strategies leave
/// block/paywall gating to the orchestrator; `direct` checks in-adapter
/// because a blocked direct fetch is the common case the race exists for.
pub async fn fetch(client: &Client, url: &Url) -> StrategyResult {
    let id = StrategyId::Direct;

    let headers = [
        ("User-Agent", pick(DESKTOP_USER_AGENTS)),
        ("Accept", ACCEPT_HTML),
        ("Accept-Language", ACCEPT_LANGUAGE),
    ];

    let body = match get(client, url, &headers).await {
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

    let html = body.text();
    if validate::is_blocked(&html) {
        return StrategyResult::failure(id, "blocked page detected");
    }
    if validate::is_paywalled(&html) {
        return StrategyResult::failure(id, "paywall detected");
    }

    StrategyResult::success(id, Content::Html { html, title: None })
}
