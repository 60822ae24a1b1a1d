//! Node scoring for readability extraction.
//!
//! Each candidate element gets a score combining its tag, class/id hints,
//! prose density, and link density. High scores mark the main article body;
//! navigation, sidebars, and comment sections score low or negative.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::Element;

/// Configuration for the scoring pass
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum score contribution from character count
    pub max_char_density_score: f64,
    /// Maximum score contribution from comma count
    pub max_comma_density_score: f64,
    /// Characters per density point
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
        }
    }
}

/// Class/id fragments that suggest main content.
static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|tweet)")
        .expect("valid regex")
});

/// Class/id fragments that suggest chrome, navigation, or ads.
static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|share|social)")
        .expect("valid regex")
});

/// Base score from the tag alone.
///
/// `article` and `section` are strong content signals; headers, navs, and
/// list scaffolding are penalized.
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name().as_str() {
        "article" => 10.0,
        "section" => 8.0,
        "main" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "pre" => 0.0,
        "form" => -3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Class/id weight: positive hints win over negative ones.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    if let Some(id) = element.attr("id") {
        if POSITIVE_RE.is_match(id) {
            return config.positive_weight;
        }
        if NEGATIVE_RE.is_match(id) {
            return config.negative_weight;
        }
    }

    if let Some(class) = element.attr("class") {
        for class_name in class.split_whitespace() {
            if POSITIVE_RE.is_match(class_name) {
                return config.positive_weight;
            }
            if NEGATIVE_RE.is_match(class_name) {
                return config.negative_weight;
            }
        }
    }

    0.0
}

/// Prose density: text length plus comma count, both capped.
pub fn content_density_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let text = element.text();
    let char_score =
        ((text.chars().count() / config.chars_per_point) as f64).min(config.max_char_density_score);
    let comma_score = (text.matches(',').count() as f64).min(config.max_comma_density_score);

    char_score + comma_score
}

/// Ratio of link-text characters to all text characters, 0.0..=1.0.
pub fn link_density(element: &Element<'_>) -> f64 {
    let text = element.text();
    let text_length = text.chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length: usize = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().chars().count())
        .sum();

    link_text_length as f64 / text_length as f64
}

/// Final score for an element.
///
/// The link-density penalty is halved for elements that already look like
/// content (positive class hint or long prose) so link-rich but legitimate
/// articles survive. `<pre>` blocks that look like code take a flat penalty.
pub fn calculate_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let base = base_tag_score(element);
    let weight = class_id_weight(element, config);
    let density = content_density_score(element, config);
    let ld = link_density(element);

    let text = element.text();
    let is_code = element.tag_name() == "pre" && looks_like_code(&text);

    let content_like = weight > 0.0 || text.chars().count() > 500;
    let link_penalty = if content_like { 1.0 - (ld * 0.5) } else { 1.0 - ld };
    let code_penalty = if is_code { -10.0 } else { 0.0 };

    (base + weight + density + code_penalty) * link_penalty
}

/// Heuristic: dense punctuation, few commas, few spaces.
fn looks_like_code(text: &str) -> bool {
    if text.len() <= 50 {
        return false;
    }
    let len = text.len() as f64;
    let comma_ratio = text.matches(',').count() as f64 / len;
    let space_ratio = text.matches(' ').count() as f64 / len;
    let special_ratio = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count() as f64
        / len;

    special_ratio > 0.15 && comma_ratio < 0.01 && space_ratio < 0.15
}
