//! Shared HTTP client configuration and response plumbing.
//!
//! Every adapter goes through one pooled [`reqwest::Client`]; per-request
//! headers carry the impersonation details. Responses come back as raw bytes
//! plus the `Content-Type` header so the charset decoder can do its work.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::charset::decode_body;
use crate::{EvadoError, Result};

/// HTTP client configuration shared by all strategies.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout: 20 }
    }
}

/// Builds the pooled client used by every adapter.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(EvadoError::HttpError)
}

/// A fetched response, decoded lazily by the caller.
#[derive(Debug)]
pub struct FetchedBody {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Whether the response declared an HTML content type.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }

    /// Decode the body to text via the charset decoder.
    pub fn text(&self) -> String {
        decode_body(&self.bytes, self.content_type.as_deref())
    }
}

/// Issue a GET with the given headers and collect the body.
///
/// Transport failures surface as a flat diagnostic string; adapters fold it
/// into their `StrategyResult` rather than propagating.
pub async fn get(
    client: &Client,
    url: &Url,
    headers: &[(&str, &str)],
) -> std::result::Result<FetchedBody, String> {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| e.to_string())?;
        let value = HeaderValue::from_str(value).map_err(|e| e.to_string())?;
        header_map.insert(name, value);
    }

    let response = client
        .get(url.clone())
        .headers(header_map)
        .send()
        .await
        .map_err(describe_transport_error)?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(describe_transport_error)?
        .to_vec();

    Ok(FetchedBody { status, content_type, bytes })
}

/// Map reqwest errors to the short diagnostic strings recorded per attempt.
pub fn describe_transport_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else if err.is_connect() {
        format!("connect error: {}", err)
    } else {
        err.to_string()
    }
}

/// Standard browser-ish accept headers used by the HTML strategies.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_default_timeout() {
        assert_eq!(HttpConfig::default().timeout, 20);
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_fetched_body_is_html() {
        let body = FetchedBody {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            bytes: vec![],
        };
        assert!(body.is_html());

        let body = FetchedBody {
            status: 200,
            content_type: Some("application/json".to_string()),
            bytes: vec![],
        };
        assert!(!body.is_html());

        let body = FetchedBody { status: 200, content_type: None, bytes: vec![] };
        assert!(!body.is_html());
    }

    #[test]
    fn test_fetched_body_text_decodes_charset() {
        let body = FetchedBody {
            status: 200,
            content_type: Some("text/html; charset=gb2312".to_string()),
            bytes: vec![0xc4, 0xe3, 0xba, 0xc3],
        };
        assert_eq!(body.text(), "你好");
    }
}
