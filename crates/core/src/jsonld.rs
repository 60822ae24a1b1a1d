//! JSON-LD article extraction.
//!
//! News sites that wrap their articles in `<script
//! type="application/ld+json">` hand us clean text without any DOM scoring.
//! This extractor walks every such script, skips unparseable ones, and
//! returns the first article-typed object with a substantial body.

use serde_json::Value;

use crate::dom::Document;

/// Minimum trimmed body length for a JSON-LD object to qualify.
const MIN_BODY_LEN: usize = 200;

/// `@type` values accepted as articles.
const ARTICLE_TYPES: &[&str] = &[
    "Article",
    "NewsArticle",
    "BlogPosting",
    "WebPage",
    "ReportageNewsArticle",
];

/// An article lifted out of structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonLdArticle {
    pub title: Option<String>,
    /// Plain text body (not HTML).
    pub body: String,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// Scan the document's JSON-LD scripts for the first qualifying article.
pub fn extract_json_ld(doc: &Document) -> Option<JsonLdArticle> {
    let scripts = doc.select(r#"script[type="application/ld+json"]"#).ok()?;

    for script in scripts {
        let Ok(value) = serde_json::from_str::<Value>(&script.text()) else {
            continue;
        };

        // A script may hold one object or an array of them.
        let items: Vec<&Value> = match &value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for item in items {
            if let Some(article) = qualify(item) {
                return Some(article);
            }
        }
    }

    None
}

/// Check one JSON-LD object against the article rules.
fn qualify(item: &Value) -> Option<JsonLdArticle> {
    if !is_article_type(item.get("@type")?) {
        return None;
    }

    let body = extract_body(item)?;
    if body.trim().len() < MIN_BODY_LEN {
        return None;
    }

    Some(JsonLdArticle {
        title: extract_title(item),
        body,
        author: extract_author(item.get("author")),
        date: extract_date(item),
    })
}

/// `@type` may be a string or an array; the first element decides.
fn is_article_type(type_value: &Value) -> bool {
    let type_name = match type_value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.first().and_then(|v| v.as_str()),
        _ => None,
    };

    type_name.map(|t| ARTICLE_TYPES.contains(&t)).unwrap_or(false)
}

/// `articleBody` (joined with spaces when an array) or `text`.
fn extract_body(item: &Value) -> Option<String> {
    match item.get("articleBody") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Array(parts)) => {
            let joined = parts
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
        _ => {}
    }

    item.get("text").and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// `headline` or `name`; first element when an array.
fn extract_title(item: &Value) -> Option<String> {
    for key in ["headline", "name"] {
        match item.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) => {
                if let Some(first) = items.first().and_then(|v| v.as_str()) {
                    return Some(first.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Author may be an object with `name`, an array of those, a plain string,
/// or anything else (stringified as a last resort).
fn extract_author(author: Option<&Value>) -> Option<String> {
    let author = author?;
    match author {
        Value::Object(map) => map.get("name").and_then(|v| v.as_str()).map(|s| s.to_string()),
        Value::Array(items) => {
            let first = items.first()?;
            match first {
                Value::Object(map) => {
                    map.get("name").and_then(|v| v.as_str()).map(|s| s.to_string())
                }
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        }
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn extract_date(item: &Value) -> Option<String> {
    for key in ["datePublished", "dateModified"] {
        if let Some(date) = item.get(key).and_then(|v| v.as_str()) {
            return Some(date.to_string());
        }
    }
    None
}
