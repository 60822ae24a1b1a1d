//! The article record produced by extraction.

use serde::Serialize;

use crate::dom::Document;
use crate::extract::{ExtractConfig, extract_content};
use crate::metadata::Metadata;
use crate::{EvadoError, Result};

/// A readable article: title, an HTML content fragment, and whatever
/// metadata the page gave up.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: Option<String>,
    /// The extracted content as an HTML fragment.
    pub content: String,
    pub byline: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
    /// Publication date as found in the page metadata.
    pub date: Option<String>,
}

impl Article {
    /// Run the scoring extractor over a parsed document.
    pub fn from_document(doc: &Document, config: &ExtractConfig) -> Result<Article> {
        let extracted = extract_content(doc, config)?;
        let metadata = doc.extract_metadata();

        Ok(Self::assemble(extracted.content, metadata))
    }

    /// Compose an article from the raw `<body>` when scoring found nothing.
    ///
    /// Title comes from `<title>` or the first `<h1>`. Returns
    /// [`EvadoError::NoContent`] when even the body is empty.
    pub fn fallback_from_document(doc: &Document) -> Result<Article> {
        let body = doc.body_html();
        if body.trim().is_empty() {
            return Err(EvadoError::NoContent);
        }

        let mut metadata = doc.extract_metadata();
        if metadata.title.is_none() {
            metadata.title = doc.title().or_else(|| doc.first_h1());
        }

        Ok(Self::assemble(body, metadata))
    }

    fn assemble(content: String, metadata: Metadata) -> Article {
        Article {
            title: metadata.title,
            content,
            byline: metadata.byline,
            site_name: metadata.site_name,
            excerpt: metadata.excerpt,
            date: metadata.date,
        }
    }
}
