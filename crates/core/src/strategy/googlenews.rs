//! Google News URL decoding.
//!
//! `news.google.com/rss/articles/<id>` links carry the publisher URL inside
//! the URL-safe-base64 article id instead of redirecting server-side; the
//! interstitial page performs the hop in JavaScript, which none of the HTML
//! strategies can follow. This module decodes the id back to the publisher
//! URL; the orchestrator then re-enters itself on the decoded URL with
//! bypass enabled and reports the composite `googlenews-<inner>` strategy.

use url::Url;

/// Hosts treated as Google News for routing and the recursion guard.
pub fn is_google_news(url: &Url) -> bool {
    let host_matches = url
        .host_str()
        .map(|h| h == "news.google.com")
        .unwrap_or(false);
    host_matches || url.path().contains("/rss/articles/")
}

/// Decode a Google News article URL to the publisher URL it wraps.
pub fn decode_publisher_url(url: &Url) -> std::result::Result<Url, String> {
    let article_id = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or("no article id in URL path")?;

    let bytes = base64_url_decode(article_id)
        .ok_or_else(|| format!("article id is not base64: {}", article_id))?;

    let candidate = find_embedded_url(&bytes)
        .ok_or("no publisher URL embedded in article id")?;

    let decoded = Url::parse(&candidate).map_err(|e| format!("embedded URL invalid: {}", e))?;
    if is_google_news(&decoded) {
        return Err("decoded URL is itself a Google News link".to_string());
    }

    Ok(decoded)
}

/// Minimal URL-safe base64 decoder (RFC 4648 §5, padding optional).
///
/// No example in this workspace pulls in a base64 crate; a table decode is
/// all the article-id format needs.
fn base64_url_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for ch in input.bytes() {
        let value = match ch {
            b'A'..=b'Z' => ch - b'A',
            b'a'..=b'z' => ch - b'a' + 26,
            b'0'..=b'9' => ch - b'0' + 52,
            b'-' | b'+' => 62,
            b'_' | b'/' => 63,
            b'=' => break,
            _ => return None,
        };

        buffer = (buffer << 6) | u32::from(value);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    Some(out)
}

/// Scan decoded protobuf-ish bytes for an embedded `http(s)://…` string.
///
/// The id may embed both an AMP and a canonical URL; the first candidate
/// that parses and is not another Google News link wins, matching the
/// decoder's use above.
fn find_embedded_url(bytes: &[u8]) -> Option<String> {
    let mut i = 0;
    while i + 4 <= bytes.len() {
        if &bytes[i..i + 4] == b"http" {
            let end = bytes[i..]
                .iter()
                .position(|&b| !is_url_byte(b))
                .map(|offset| i + offset)
                .unwrap_or(bytes.len());
            let candidate = String::from_utf8_lossy(&bytes[i..end]).to_string();
            if candidate.starts_with("http://") || candidate.starts_with("https://") {
                return Some(candidate);
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}

/// Printable ASCII bytes that may appear in a URL.
fn is_url_byte(b: u8) -> bool {
    b.is_ascii_graphic() && b != b'"' && b != b'<' && b != b'>' && b != b'\\'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base64_url_encode(bytes: &[u8]) -> String {
        const TABLE: &[u8; 64] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        let mut out = String::new();
        for chunk in bytes.chunks(3) {
            let mut buf = [0u8; 3];
            buf[..chunk.len()].copy_from_slice(chunk);
            let n = (u32::from(buf[0]) << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]);
            let chars = [
                TABLE[(n >> 18) as usize & 63],
                TABLE[(n >> 12) as usize & 63],
                TABLE[(n >> 6) as usize & 63],
                TABLE[n as usize & 63],
            ];
            let keep = match chunk.len() {
                1 => 2,
                2 => 3,
                _ => 4,
            };
            for &c in &chars[..keep] {
                out.push(c as char);
            }
        }
        out
    }

    fn article_url(embedded: &str) -> Url {
        // Protobuf-style framing: tag bytes, then the length-prefixed URL.
        let mut payload = vec![0x08, 0x13, 0x22, embedded.len() as u8];
        payload.extend_from_slice(embedded.as_bytes());
        payload.extend_from_slice(&[0xd2, 0x01, 0x00]);

        let id = base64_url_encode(&payload);
        Url::parse(&format!("https://news.google.com/rss/articles/{}?oc=5", id)).unwrap()
    }

    #[test]
    fn test_is_google_news() {
        let news = Url::parse("https://news.google.com/rss/articles/ABC").unwrap();
        assert!(is_google_news(&news));

        let rss_path = Url::parse("https://example.com/rss/articles/xyz").unwrap();
        assert!(is_google_news(&rss_path));

        let plain = Url::parse("https://example.com/story").unwrap();
        assert!(!is_google_news(&plain));
    }

    #[test]
    fn test_decode_publisher_url() {
        let url = article_url("https://publisher.example/story-1");
        let decoded = decode_publisher_url(&url).unwrap();
        assert_eq!(decoded.as_str(), "https://publisher.example/story-1");
    }

    #[test]
    fn test_decode_rejects_nested_google_news() {
        let url = article_url("https://news.google.com/rss/articles/again");
        assert!(decode_publisher_url(&url).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage_id() {
        let url = Url::parse("https://news.google.com/rss/articles/!!!not-base64!!!").unwrap();
        assert!(decode_publisher_url(&url).is_err());
    }

    #[test]
    fn test_decode_rejects_id_without_url() {
        let id = base64_url_encode(b"\x08\x13\x22\x04none");
        let url = Url::parse(&format!("https://news.google.com/rss/articles/{}", id)).unwrap();
        assert!(decode_publisher_url(&url).is_err());
    }

    #[test]
    fn test_base64_round_trip() {
        let bytes = b"\x00\x01hello world\xff";
        let encoded = base64_url_encode(bytes);
        assert_eq!(base64_url_decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn test_base64_tolerates_padding() {
        assert_eq!(base64_url_decode("aGk=").unwrap(), b"hi");
    }
}
