//! Immutable impersonation tables: user agents and spoofed crawler IPs.
//!
//! Read concurrently without synchronization; never mutated at runtime.

use rand::seq::SliceRandom;

/// Realistic desktop browser user agents for the `direct` strategy.
pub const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
];

/// Googlebot user agents.
pub const GOOGLEBOT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
    "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Googlebot/2.1; +http://www.google.com/bot.html) Chrome/126.0.0.0 Safari/537.36",
    "Googlebot/2.1 (+http://www.google.com/bot.html)",
];

/// IPv4 literals inside Google-owned crawl ranges, sent as `X-Forwarded-For`.
pub const GOOGLE_CRAWL_IPS: &[&str] = &[
    "66.249.66.1",
    "66.249.66.83",
    "66.249.64.15",
    "66.249.65.100",
    "66.249.79.192",
    "66.249.70.44",
];

/// Bingbot user agents.
pub const BINGBOT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)",
    "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm) Chrome/116.0.1938.76 Safari/537.36",
];

/// IPv4 literals inside Microsoft-owned crawl ranges.
pub const BING_CRAWL_IPS: &[&str] = &[
    "157.55.39.1",
    "157.55.39.200",
    "207.46.13.50",
    "40.77.167.10",
    "40.77.167.129",
];

/// Facebook external-hit user agents (link preview crawler).
pub const FACEBOOK_USER_AGENTS: &[&str] = &[
    "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)",
    "facebookexternalhit/1.1",
    "Facebot/1.0",
];

/// Pick a random entry from a table.
pub fn pick(table: &'static [&'static str]) -> &'static str {
    table
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(table[0])
}
