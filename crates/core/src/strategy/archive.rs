//! The `archive` strategy: retrieve a Wayback Machine snapshot.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::strategy::client::{ACCEPT_HTML, get};
use crate::strategy::tables::{DESKTOP_USER_AGENTS, pick};
use crate::strategy::{Content, StrategyId, StrategyResult};

const AVAILABILITY_ENDPOINT: &str = "https://archive.org/wayback/available";
const WEB_ARCHIVE_PREFIX: &str = "https://web.archive.org/web/";

/// Response shape of the Wayback availability API.
#[derive(Debug, Deserialize)]
struct Availability {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    url: String,
    status: String,
}

/// Fetch the closest archived snapshot of the URL.
///
/// Asks the availability API first; when it knows a snapshot that was
/// captured with status 200, fetches that. Otherwise falls back to the
/// `web.archive.org/web/<url>` redirect form, which resolves to the latest
/// capture when one exists. The snapshot HTML is returned verbatim.
pub async fn fetch(client: &Client, url: &Url) -> StrategyResult {
    let id = StrategyId::Archive;

    let snapshot_url = lookup_snapshot(client, url).await.unwrap_or_else(|| {
        format!("{}{}", WEB_ARCHIVE_PREFIX, url)
    });

    let snapshot_url = match Url::parse(&snapshot_url) {
        Ok(u) => u,
        Err(e) => return StrategyResult::failure(id, format!("bad snapshot URL: {}", e)),
    };

    let headers = [("User-Agent", pick(DESKTOP_USER_AGENTS)), ("Accept", ACCEPT_HTML)];
    let body = match get(client, &snapshot_url, &headers).await {
        Ok(body) => body,
        Err(e) => return StrategyResult::failure(id, e),
    };

    if !(200..300).contains(&body.status) {
        return StrategyResult::failure(id, format!("HTTP {} from archive", body.status));
    }

    let html = body.text();
    if html.is_empty() {
        return StrategyResult::failure(id, "empty snapshot body");
    }

    StrategyResult::success(id, Content::Html { html, title: None })
}

/// Query the availability API for a status-200 snapshot URL.
async fn lookup_snapshot(client: &Client, url: &Url) -> Option<String> {
    let mut api_url = Url::parse(AVAILABILITY_ENDPOINT).ok()?;
    api_url.query_pairs_mut().append_pair("url", url.as_str());

    let response = client.get(api_url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }

    let availability: Availability = response.json().await.ok()?;
    let closest = availability.archived_snapshots.closest?;
    if closest.status == "200" {
        Some(closest.url)
    } else {
        None
    }
}
