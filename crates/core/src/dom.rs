//! HTML parsing and DOM navigation.
//!
//! Thin wrappers over `scraper` used by the extractors. [`Document`] parses
//! a page (optionally sanitized first) and answers CSS-selector queries;
//! [`Element`] adds attribute, text, and upward-traversal helpers on top of
//! `scraper::ElementRef`.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::sanitize::{SanitizeConfig, sanitize_html};
use crate::{EvadoError, Result};

/// A parsed HTML document.
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string without sanitization.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML after sanitization (scripts, styles, comments, hidden
    /// elements removed). Extraction accuracy improves on the cleaned tree.
    pub fn parse_sanitized(html: &str, base_url: Option<Url>) -> Result<Self> {
        let config = SanitizeConfig::default();
        let cleaned = sanitize_html(html, &config);
        let html = Html::parse_document(&cleaned);
        Ok(Self { html, base_url })
    }

    /// The base URL this document was parsed against, if known.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// The full document serialized back to HTML.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Selects elements by CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`EvadoError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| EvadoError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Content of the `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Trimmed text of the first `<h1>`, if present and non-empty.
    pub fn first_h1(&self) -> Option<String> {
        let selector = Selector::parse("h1").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Inner HTML of `<body>`; empty when the document has no body.
    pub fn body_html(&self) -> String {
        let Ok(selector) = Selector::parse("body") else {
            return String::new();
        };
        self.html
            .select(&selector)
            .next()
            .map(|el| el.inner_html())
            .unwrap_or_default()
    }

    /// Concatenated text content of the whole document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// `content` attribute of a `<meta>` tag selected by `name` or
    /// `property`.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        for attr in ["name", "property"] {
            let selector = format!("meta[{}=\"{}\"]", attr, name);
            if let Ok(elements) = self.select(&selector)
                && let Some(first) = elements.first()
                && let Some(content) = first.attr("content")
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        None
    }
}

/// A single element in the parsed tree.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// The underlying `scraper` element.
    pub fn as_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Stable node id within this document; usable as a map key.
    pub fn node_id(&self) -> ego_tree::NodeId {
        self.element.id()
    }

    /// The nearest ancestor that is itself an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        let mut node = self.element.parent();
        while let Some(n) = node {
            if let Some(el) = ElementRef::wrap(n) {
                return Some(Element::new(el));
            }
            node = n.parent();
        }
        None
    }

    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Concatenated text of every text node beneath this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements by CSS selector.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| EvadoError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.element.select(&sel).map(Element::new).collect())
    }
}
