//! Document metadata extraction.
//!
//! Title, byline, date, excerpt, and site name, each with a priority
//! fallback chain: structured data first, then meta tags, then the page
//! itself.

use crate::dom::Document;
use crate::jsonld;

/// Metadata gathered from a document
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
}

impl Document {
    /// Extract all metadata in one pass.
    pub fn extract_metadata(&self) -> Metadata {
        let json_ld = jsonld::extract_json_ld(self);

        Metadata {
            title: self.extract_title(json_ld.as_ref()),
            byline: self.extract_byline(json_ld.as_ref()),
            date: json_ld.as_ref().and_then(|a| a.date.clone()),
            excerpt: self.extract_excerpt(),
            site_name: self.extract_site_name(),
        }
    }

    /// Title priority: JSON-LD headline, `og:title`, `twitter:title`,
    /// `<title>`, first `<h1>`.
    fn extract_title(&self, json_ld: Option<&jsonld::JsonLdArticle>) -> Option<String> {
        if let Some(title) = json_ld.and_then(|a| a.title.clone()) {
            return Some(title);
        }
        if let Some(title) = self.meta_content("og:title") {
            return Some(title);
        }
        if let Some(title) = self.meta_content("twitter:title") {
            return Some(title);
        }
        if let Some(title) = self.title() {
            return Some(title);
        }
        self.first_h1()
    }

    /// Byline priority: JSON-LD author, `author` meta, `rel=author` link
    /// text, `itemprop=author`, then class-based guesses.
    fn extract_byline(&self, json_ld: Option<&jsonld::JsonLdArticle>) -> Option<String> {
        if let Some(author) = json_ld.and_then(|a| a.author.clone()) {
            return Some(author);
        }
        if let Some(author) = self.meta_content("author") {
            return Some(author);
        }
        if let Some(author) = self.meta_content("article:author") {
            return Some(author);
        }

        for selector in [r#"[rel="author"]"#, r#"[itemprop="author"]"#] {
            if let Ok(elements) = self.select(selector)
                && let Some(first) = elements.first()
            {
                let text = first.text();
                let text = text.trim();
                if !text.is_empty() && text.len() < 100 {
                    return Some(text.to_string());
                }
            }
        }

        for pattern in ["byline", "author"] {
            let selector = format!(r#"[class*="{}"]"#, pattern);
            if let Ok(elements) = self.select(&selector) {
                for el in elements.iter().take(3) {
                    let text = el.text();
                    let text = text.trim();
                    if !text.is_empty() && text.len() < 100 {
                        return Some(text.to_string());
                    }
                }
            }
        }

        None
    }

    /// Excerpt from `og:description`, `twitter:description`, or
    /// `description`.
    fn extract_excerpt(&self) -> Option<String> {
        for name in ["og:description", "twitter:description", "description"] {
            if let Some(excerpt) = self.meta_content(name) {
                return Some(excerpt);
            }
        }
        None
    }

    /// Site name from `og:site_name` or the host part of a canonical link.
    fn extract_site_name(&self) -> Option<String> {
        if let Some(name) = self.meta_content("og:site_name") {
            return Some(name);
        }

        if let Ok(links) = self.select(r#"link[rel="canonical"]"#)
            && let Some(link) = links.first()
            && let Some(href) = link.attr("href")
            && let Ok(url) = url::Url::parse(href)
        {
            return url.host_str().map(|h| h.to_string());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_priority_og_over_title_tag() {
        let html = r#"
            <html><head>
                <title>Tag Title</title>
                <meta property="og:title" content="OG Title">
            </head><body></body></html>
        "#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_metadata().title, Some("OG Title".to_string()));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<html><body><h1>Only Heading</h1></body></html>";
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_metadata().title, Some("Only Heading".to_string()));
    }

    #[test]
    fn test_byline_from_meta() {
        let html = r#"
            <html><head><meta name="author" content="A. Writer"></head><body></body></html>
        "#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_metadata().byline, Some("A. Writer".to_string()));
    }

    #[test]
    fn test_byline_from_class() {
        let html = r#"<html><body><span class="article-byline">By B. Scribe</span></body></html>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.extract_metadata().byline, Some("By B. Scribe".to_string()));
    }

    #[test]
    fn test_json_ld_wins_title_and_byline() {
        let body = "Body text for the structured data block. ".repeat(10);
        let html = format!(
            r#"<html><head>
                <title>Tag Title</title>
                <script type="application/ld+json">
                {{"@type": "Article", "headline": "LD Title", "articleBody": "{}",
                  "author": {{"name": "LD Author"}}, "datePublished": "2024-01-02"}}
                </script>
            </head><body></body></html>"#,
            body
        );
        let doc = Document::parse(&html).unwrap();
        let metadata = doc.extract_metadata();

        assert_eq!(metadata.title, Some("LD Title".to_string()));
        assert_eq!(metadata.byline, Some("LD Author".to_string()));
        assert_eq!(metadata.date, Some("2024-01-02".to_string()));
    }

    #[test]
    fn test_excerpt_and_site_name() {
        let html = r#"
            <html><head>
                <meta property="og:description" content="A short summary.">
                <meta property="og:site_name" content="The Example Times">
            </head><body></body></html>
        "#;
        let doc = Document::parse(html).unwrap();
        let metadata = doc.extract_metadata();

        assert_eq!(metadata.excerpt, Some("A short summary.".to_string()));
        assert_eq!(metadata.site_name, Some("The Example Times".to_string()));
    }

    #[test]
    fn test_site_name_from_canonical_host() {
        let html = r#"
            <html><head>
                <link rel="canonical" href="https://journal.example.org/a/b">
            </head><body></body></html>
        "#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(
            doc.extract_metadata().site_name,
            Some("journal.example.org".to_string())
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("<html><body></body></html>").unwrap();
        let metadata = doc.extract_metadata();
        assert!(metadata.title.is_none());
        assert!(metadata.byline.is_none());
        assert!(metadata.excerpt.is_none());
    }
}
