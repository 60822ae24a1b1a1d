//! The `exa` strategy: crawl through Exa's MCP endpoint.
//!
//! Speaks JSON-RPC 2.0 over HTTPS POST. The endpoint issues a session id in
//! the `mcp-session-id` response header of `initialize`; subsequent
//! `tools/call` requests echo it back. One session id is shared
//! process-wide; concurrent calls may race to initialize, which is harmless
//! because each call simply adopts the latest id the server returned. On any
//! failure the id is cleared so the next call re-initializes.

use std::sync::Mutex;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::strategy::client::describe_transport_error;
use crate::strategy::{Content, StrategyId, StrategyResult};

const MCP_ENDPOINT: &str = "https://mcp.exa.ai/mcp?tools=crawling_exa";
const PROTOCOL_VERSION: &str = "2024-11-05";
const MAX_CHARACTERS: u64 = 50_000;

/// Substrings in tool output that signal a failed crawl despite HTTP 200.
const FAILURE_SIGNALS: &[&str] = &[
    "CRAWL_LIVECRAWL_TIMEOUT",
    "CRAWL_NOT_FOUND",
    "CRAWL_UNKNOWN_ERROR",
];

/// Process-wide MCP session state.
#[derive(Debug, Default)]
pub struct ExaSession {
    id: Mutex<Option<String>>,
}

impl ExaSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Option<String> {
        self.id.lock().expect("exa session lock").clone()
    }

    fn store(&self, id: String) {
        *self.id.lock().expect("exa session lock") = Some(id);
    }

    fn clear(&self) {
        *self.id.lock().expect("exa session lock") = None;
    }
}

/// Crawl the URL via Exa's `crawling_exa` tool. Returns Markdown.
pub async fn fetch(client: &Client, session: &ExaSession, url: &Url) -> StrategyResult {
    let id = StrategyId::Exa;

    match fetch_inner(client, session, url).await {
        Ok(content) => StrategyResult::success(id, content),
        Err(e) => {
            // Force a fresh initialize on the next call.
            session.clear();
            StrategyResult::failure(id, e)
        }
    }
}

async fn fetch_inner(
    client: &Client,
    session: &ExaSession,
    url: &Url,
) -> std::result::Result<Content, String> {
    let session_id = match session.current() {
        Some(id) => id,
        None => {
            let id = initialize(client).await?;
            debug!(target: "evado::exa", "initialized MCP session");
            session.store(id.clone());
            id
        }
    };

    let request = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {
            "name": "crawling_exa",
            "arguments": { "url": url.as_str(), "maxCharacters": MAX_CHARACTERS }
        }
    });

    let response = client
        .post(MCP_ENDPOINT)
        .header("Accept", "application/json, text/event-stream")
        .header("mcp-session-id", &session_id)
        .json(&request)
        .send()
        .await
        .map_err(describe_transport_error)?;

    if !response.status().is_success() {
        return Err(format!("HTTP {} from MCP endpoint", response.status().as_u16()));
    }

    let body = response.text().await.map_err(describe_transport_error)?;
    let payload = parse_sse_data(&body).ok_or("no data frame in MCP response")?;

    let text = tool_text(&payload).ok_or("missing content[0].text in tool result")?;
    for signal in FAILURE_SIGNALS {
        if text.contains(signal) {
            return Err(format!("crawl failed: {}", signal));
        }
    }

    let (markdown, title) = unwrap_results(&text);
    if markdown.trim().is_empty() {
        return Err("empty crawl result".to_string());
    }

    Ok(Content::Markdown { markdown, title })
}

/// Perform the JSON-RPC `initialize` handshake; returns the session id from
/// the `mcp-session-id` response header.
async fn initialize(client: &Client) -> std::result::Result<String, String> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": { "name": "evado", "version": env!("CARGO_PKG_VERSION") }
        }
    });

    let response = client
        .post(MCP_ENDPOINT)
        .header("Accept", "application/json, text/event-stream")
        .json(&request)
        .send()
        .await
        .map_err(describe_transport_error)?;

    if !response.status().is_success() {
        return Err(format!("initialize failed: HTTP {}", response.status().as_u16()));
    }

    response
        .headers()
        .get("mcp-session-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| "initialize response carried no mcp-session-id".to_string())
}

/// Extract the JSON payload from an SSE frame (`data: <json>` line).
///
/// Falls back to parsing the whole body when the endpoint answered with
/// plain JSON instead of an event stream.
fn parse_sse_data(body: &str) -> Option<Value> {
    for line in body.lines() {
        if let Some(data) = line.strip_prefix("data: ")
            && let Ok(value) = serde_json::from_str(data)
        {
            return Some(value);
        }
    }
    serde_json::from_str(body).ok()
}

/// Pull `result.content[0].text` out of the tools/call response.
fn tool_text(payload: &Value) -> Option<String> {
    payload
        .get("result")?
        .get("content")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// The tool's text is either a JSON document `{results: [{text|content,
/// title, ...}]}` or already the raw crawl text.
fn unwrap_results(text: &str) -> (String, Option<String>) {
    if let Ok(value) = serde_json::from_str::<Value>(text)
        && let Some(first) = value.get("results").and_then(|r| r.get(0))
    {
        let body = first
            .get("text")
            .or_else(|| first.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let title = first
            .get("title")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        return (body, title);
    }
    (text.to_string(), None)
}
