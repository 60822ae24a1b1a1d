//! Heuristic validators for fetched HTML.
//!
//! Three advisory predicates over a response body: anti-bot block pages,
//! paywall interstitials, and Google Search's generic error page. All three
//! are substring heuristics over a bounded prefix of the body; a false
//! positive only costs one failed strategy in a race, so the patterns err on
//! the side of matching.
//!
//! The pattern lists drift as vendors change their interstitials. They live
//! in one table below and carry a version so call sites can report which
//! table produced a verdict.

/// Version of the pattern table below. Bump when patterns change.
pub const PATTERNS_VERSION: u32 = 3;

/// Prefix of the body examined for block patterns.
const BLOCK_SCAN_LIMIT: usize = 5 * 1024;

/// Prefix of the body examined for paywall patterns.
const PAYWALL_SCAN_LIMIT: usize = 10 * 1024;

/// Anti-bot and denial interstitials, matched case-insensitively.
const BLOCK_PATTERNS: &[&str] = &[
    // Cloudflare
    "checking your browser",
    "just a moment",
    "cloudflare ray id",
    "one more step",
    "attention required",
    "cf-browser-verification",
    // CAPTCHA walls
    "captcha",
    "recaptcha",
    "hcaptcha",
    "robot check",
    "are you a robot",
    "verify you are human",
    "unusual traffic from your computer",
    // Explicit denials
    "access denied",
    "access to this page has been denied",
    "403 forbidden",
    "request blocked",
    "you have been blocked",
    "ip address has been banned",
    // Google News interstitial served instead of a redirect
    "opening this page",
    "<title>google news</title>",
];

/// Paywall and registration-wall markers, matched case-insensitively.
const PAYWALL_PATTERNS: &[&str] = &[
    "class=\"paywall",
    "id=\"paywall",
    "data-paywall",
    "paywall-container",
    "subscribe to continue",
    "subscribe to read",
    "subscription required",
    "sign up to read",
    "register to continue",
    "members only",
    "login to view",
    "start your free trial",
];

/// Google Search generic error/redirect page markers.
const GOOGLE_ERROR_PATTERNS: &[&str] = &[
    "if you're having trouble accessing google search",
    "emsg=sg_rel",
];

/// Whether the HTML looks like an anti-bot block page.
///
/// Scans the first 5 KiB only; interstitials put their message up top.
pub fn is_blocked(html: &str) -> bool {
    let head = lowercase_prefix(html, BLOCK_SCAN_LIMIT);
    BLOCK_PATTERNS.iter().any(|p| head.contains(p))
}

/// Whether the HTML looks like a paywall or registration wall.
///
/// Scans the first 10 KiB; paywall markup tends to sit below the header.
pub fn is_paywalled(html: &str) -> bool {
    let head = lowercase_prefix(html, PAYWALL_SCAN_LIMIT);
    PAYWALL_PATTERNS.iter().any(|p| head.contains(p))
}

/// Whether the HTML is Google Search's generic error page.
pub fn is_google_error_page(html: &str) -> bool {
    let head = lowercase_prefix(html, BLOCK_SCAN_LIMIT);
    GOOGLE_ERROR_PATTERNS.iter().any(|p| head.contains(p))
}

/// Whether the HTML passes all three validators.
pub fn passes_all(html: &str) -> bool {
    !is_blocked(html) && !is_paywalled(html) && !is_google_error_page(html)
}

/// Lowercased prefix of `s`, clipped to a char boundary at or below `limit`.
fn lowercase_prefix(s: &str, limit: usize) -> String {
    let mut end = limit.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_lowercase()
}
