//! Character set detection and decoding for fetched response bodies.
//!
//! Many CJK sites still serve GBK/GB2312 while declaring it loosely (or not
//! at all). Decoding follows the `Content-Type` charset label first, then a
//! meta-charset sniff over the decoded head, then a strict-UTF-8 fallback.

use std::sync::LazyLock;

use encoding_rs::GBK;
use regex::Regex;

/// Match a `charset=gb…` declaration inside a meta tag, quoted or not.
static META_GB_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?gb"#).expect("valid regex")
});

/// Decode a raw response body to a UTF-8 string.
///
/// Algorithm:
/// 1. If the `Content-Type` charset label starts with `gb`, decode as GBK.
/// 2. Otherwise attempt strict UTF-8. If that succeeds but the first 1 KiB of
///    the decoded text carries a meta `charset=gb…` declaration, re-decode
///    the bytes as GBK (the document told us its real encoding).
/// 3. If strict UTF-8 fails, decode as GBK.
///
/// Step 2 only looks inside meta tags, so UTF-8 pages that merely mention a
/// legacy charset in prose are left alone.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(label) = content_type.and_then(charset_label)
        && label.to_ascii_lowercase().starts_with("gb")
    {
        return decode_gbk(bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => {
            let head = &text[..floor_char_boundary(text, 1024)];
            if META_GB_CHARSET_RE.is_match(head) {
                decode_gbk(bytes)
            } else {
                text.to_string()
            }
        }
        Err(_) => decode_gbk(bytes),
    }
}

/// Extract the charset label from a `Content-Type` header value.
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Decode as GBK, replacing invalid sequences rather than failing.
fn decode_gbk(bytes: &[u8]) -> String {
    let (decoded, _, _) = GBK.decode(bytes);
    decoded.into_owned()
}

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    // "你好" in GBK
    const NI_HAO_GBK: &[u8] = &[0xc4, 0xe3, 0xba, 0xc3];

    #[test]
    fn test_ascii_utf8_passthrough() {
        let bytes = b"<html><body>Hello, World!</body></html>";
        let decoded = decode_body(bytes, Some("text/html; charset=utf-8"));
        assert_eq!(decoded, "<html><body>Hello, World!</body></html>");
    }

    #[test]
    fn test_gb2312_header_label() {
        let mut bytes = b"<html><body>".to_vec();
        bytes.extend_from_slice(NI_HAO_GBK);
        bytes.extend_from_slice(b"</body></html>");

        let decoded = decode_body(&bytes, Some("text/html; charset=gb2312"));
        assert!(decoded.contains("你好"));
    }

    #[test]
    fn test_gbk_header_label() {
        let decoded = decode_body(NI_HAO_GBK, Some("text/html;charset=GBK"));
        assert_eq!(decoded, "你好");
    }

    #[test]
    fn test_meta_charset_redecode() {
        // Valid ASCII (hence valid UTF-8) head declaring GBK; the body bytes
        // would be mojibake if we trusted the UTF-8 success alone.
        let bytes = br#"<html><head><meta charset="gb2312"></head><body>ok</body></html>"#;
        let decoded = decode_body(bytes, Some("text/html"));
        assert!(decoded.contains("ok"));
    }

    #[test]
    fn test_meta_mention_outside_meta_tag_ignored() {
        let bytes = b"<html><body><p>Set charset=gb2312 in your server config.</p></body></html>";
        let decoded = decode_body(bytes, Some("text/html; charset=utf-8"));
        assert!(decoded.contains("charset=gb2312"));
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_gbk() {
        let mut bytes = b"<html><body>".to_vec();
        bytes.extend_from_slice(NI_HAO_GBK);
        bytes.extend_from_slice(b"</body></html>");

        // No charset label at all; the GBK bytes are not valid UTF-8.
        let decoded = decode_body(&bytes, Some("text/html"));
        assert!(decoded.contains("你好"));
    }

    #[test]
    fn test_missing_content_type() {
        let decoded = decode_body(b"plain ascii", None);
        assert_eq!(decoded, "plain ascii");
    }

    #[test]
    fn test_charset_label_parsing() {
        assert_eq!(charset_label("text/html; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_label("text/html;charset=\"gbk\""), Some("gbk"));
        assert_eq!(charset_label("text/html"), None);
    }
}
