//! Rule-based HTML to Markdown conversion.
//!
//! A recursive walker over the parsed DOM producing GFM: ATX headings, `-`
//! bullets, fenced code blocks that keep `<pre>` whitespace, `---` rules,
//! `*`/`**` emphasis, reference-style links, and pipe tables. Image sources
//! are resolved against the conversion base URL so lazy-loaded and relative
//! paths survive the trip out of their page.

use scraper::node::Node;
use scraper::{ElementRef, Html};
use url::Url;

/// Options for Markdown conversion
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Drop `<img>`, `<figure>`, and `<iframe>` entirely when false.
    pub preserve_images: bool,
    /// Base URL for resolving relative image sources.
    pub base_url: Option<Url>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self { preserve_images: true, base_url: None }
    }
}

impl MarkdownOptions {
    pub fn new(preserve_images: bool, base_url: Option<Url>) -> Self {
        Self { preserve_images, base_url }
    }
}

/// Convert an HTML fragment to Markdown.
pub fn html_to_markdown(html: &str, options: &MarkdownOptions) -> String {
    let fragment = Html::parse_fragment(html);
    let mut ctx = Ctx { options, refs: Vec::new() };

    let body = render_children(fragment.root_element(), &mut ctx);
    let mut output = tidy(&body);

    if !ctx.refs.is_empty() {
        output.push_str("\n\n");
        for (i, url) in ctx.refs.iter().enumerate() {
            output.push_str(&format!("[{}]: {}\n", i + 1, url));
        }
    }

    output.trim_end().to_string()
}

struct Ctx<'a> {
    options: &'a MarkdownOptions,
    /// Reference-link targets in first-use order.
    refs: Vec<String>,
}

impl Ctx<'_> {
    /// Index (1-based) of a link target, registering it on first use.
    fn reference(&mut self, url: &str) -> usize {
        if let Some(pos) = self.refs.iter().position(|u| u == url) {
            pos + 1
        } else {
            self.refs.push(url.to_string());
            self.refs.len()
        }
    }
}

/// Render all children of an element, separating block productions with
/// blank lines.
fn render_children(el: ElementRef<'_>, ctx: &mut Ctx<'_>) -> String {
    let mut out = String::new();

    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = collapse_whitespace(text);
                if !collapsed.trim().is_empty() || ends_inline(&out) {
                    out.push_str(&escape_text(&collapsed));
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    let (rendered, block) = render_element(child_el, ctx);
                    if rendered.is_empty() {
                        continue;
                    }
                    if block {
                        if !out.is_empty() {
                            out.push_str("\n\n");
                        }
                        out.push_str(rendered.trim_end_matches('\n'));
                        out.push_str("\n\n");
                    } else {
                        out.push_str(&rendered);
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// Render one element. The bool is true for block-level productions.
fn render_element(el: ElementRef<'_>, ctx: &mut Ctx<'_>) -> (String, bool) {
    let tag = el.value().name();

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            let text = inline_text(el, ctx);
            if text.is_empty() {
                (String::new(), true)
            } else {
                (format!("{} {}", "#".repeat(level), text), true)
            }
        }
        "p" => (render_children(el, ctx).trim().to_string(), true),
        "br" => ("\n".to_string(), false),
        "hr" => ("---".to_string(), true),
        "strong" | "b" => wrap_inline(el, ctx, "**"),
        "em" | "i" => wrap_inline(el, ctx, "*"),
        "del" | "s" => wrap_inline(el, ctx, "~~"),
        "a" => (render_link(el, ctx), false),
        "img" => (render_image(el, ctx, None), true),
        "figure" => (render_figure(el, ctx), true),
        "iframe" => (String::new(), true),
        "ul" => (render_list(el, ctx, None), true),
        "ol" => (render_list(el, ctx, Some(1)), true),
        "pre" => (render_code_block(el), true),
        "code" => {
            let text = el.text().collect::<String>();
            if text.is_empty() {
                (String::new(), false)
            } else {
                (format!("`{}`", text), false)
            }
        }
        "blockquote" => {
            let inner = tidy(&render_children(el, ctx));
            let quoted = inner
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {}", line)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            (quoted, true)
        }
        "table" => (render_table(el, ctx), true),
        "script" | "style" | "noscript" | "template" | "head" => (String::new(), true),
        // Containers and unknown tags: transparent.
        "div" | "section" | "article" | "main" | "aside" | "header" | "footer" | "figcaption" => {
            (tidy(&render_children(el, ctx)), true)
        }
        _ => (render_children(el, ctx), false),
    }
}

fn wrap_inline(el: ElementRef<'_>, ctx: &mut Ctx<'_>, marker: &str) -> (String, bool) {
    let inner = inline_text(el, ctx);
    if inner.is_empty() {
        (String::new(), false)
    } else {
        (format!("{}{}{}", marker, inner, marker), false)
    }
}

/// Reference-style link: `[text][n]` with the definition collected for the
/// end of the document.
fn render_link(el: ElementRef<'_>, ctx: &mut Ctx<'_>) -> String {
    let text = inline_text(el, ctx);
    let href = el.value().attr("href").unwrap_or("").trim();

    if text.is_empty() {
        return String::new();
    }
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return text;
    }

    let index = ctx.reference(href);
    format!("[{}][{}]", text, index)
}

/// The image rule.
///
/// Source comes from `data-src`, `data-lazy-src`, then `src`, skipping empty
/// values and `data:` placeholders. Alt text falls back from `alt` to
/// `title` to `"image"`. A `title` distinct from the alt text is kept.
fn render_image(el: ElementRef<'_>, ctx: &Ctx<'_>, alt_override: Option<&str>) -> String {
    if !ctx.options.preserve_images {
        return String::new();
    }

    let src = ["data-src", "data-lazy-src", "src"]
        .iter()
        .filter_map(|name| el.value().attr(name))
        .map(str::trim)
        .find(|v| !v.is_empty() && !v.starts_with("data:"));

    let Some(src) = src else {
        return String::new();
    };

    let src = resolve_image_src(src, ctx.options.base_url.as_ref());

    let title = el.value().attr("title").map(str::trim).filter(|t| !t.is_empty());
    let alt = alt_override
        .map(|a| a.to_string())
        .or_else(|| {
            el.value()
                .attr("alt")
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(|a| a.to_string())
        })
        .or_else(|| title.map(|t| t.to_string()))
        .unwrap_or_else(|| "image".to_string());

    match title {
        Some(t) if t != alt => format!("![{}]({} \"{}\")", alt, src, t),
        _ => format!("![{}]({})", alt, src),
    }
}

/// The figure rule: a standalone image whose alt text prefers the
/// `<figcaption>`.
fn render_figure(el: ElementRef<'_>, ctx: &mut Ctx<'_>) -> String {
    if !ctx.options.preserve_images {
        return String::new();
    }

    let caption = el
        .select(&selector("figcaption"))
        .next()
        .map(|c| collapse_whitespace(&c.text().collect::<String>()).trim().to_string())
        .filter(|c| !c.is_empty());

    if let Some(img) = el.select(&selector("img")).next() {
        render_image(img, ctx, caption.as_deref())
    } else {
        // No image inside; keep whatever text the figure holds.
        tidy(&render_children(el, ctx))
    }
}

/// Resolve an image source against the conversion base URL.
///
/// Protocol-relative sources take the base scheme; absolute paths take the
/// base origin; bare relative paths resolve against the parent directory of
/// the base path. Sources that already carry a scheme pass through.
fn resolve_image_src(src: &str, base: Option<&Url>) -> String {
    if src.contains("://") || src.starts_with("data:") || src.starts_with("mailto:") {
        return src.to_string();
    }

    let Some(base) = base else {
        return src.to_string();
    };

    if let Some(rest) = src.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), rest);
    }

    let origin = {
        let host = base.host_str().unwrap_or_default();
        match base.port() {
            Some(port) => format!("{}://{}:{}", base.scheme(), host, port),
            None => format!("{}://{}", base.scheme(), host),
        }
    };

    if src.starts_with('/') {
        return format!("{}{}", origin, src);
    }

    let parent = match base.path().rfind('/') {
        Some(idx) => &base.path()[..=idx],
        None => "/",
    };
    format!("{}{}{}", origin, parent, src)
}

/// List rendering: `-` bullets or `1.`-style ordinals, nested lists
/// indented two spaces.
fn render_list(el: ElementRef<'_>, ctx: &mut Ctx<'_>, start: Option<usize>) -> String {
    let mut out = Vec::new();
    let mut ordinal = start;

    for item in el
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "li")
    {
        let marker = match &mut ordinal {
            Some(n) => {
                let m = format!("{}. ", n);
                *n += 1;
                m
            }
            None => "- ".to_string(),
        };

        let body = tidy(&render_children(item, ctx));
        let mut lines = body.lines();
        let first = lines.next().unwrap_or("").to_string();
        let mut rendered = format!("{}{}", marker, first);
        for line in lines {
            rendered.push('\n');
            if line.is_empty() {
                continue;
            }
            rendered.push_str("  ");
            rendered.push_str(line);
        }
        out.push(rendered);
    }

    out.join("\n")
}

/// Fenced code block preserving the `<pre>` whitespace exactly.
fn render_code_block(el: ElementRef<'_>) -> String {
    let language = el
        .select(&selector("code"))
        .next()
        .and_then(|code| code.value().attr("class"))
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
        })
        .unwrap_or("");

    let text = el.text().collect::<String>();
    let text = text.strip_suffix('\n').unwrap_or(&text);

    format!("```{}\n{}\n```", language, text)
}

/// GFM pipe table. Header cells come from `thead` (or the first row); the
/// separator follows the header.
fn render_table(el: ElementRef<'_>, ctx: &mut Ctx<'_>) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for tr in el.select(&selector("tr")) {
        let mut row = Vec::new();
        for cell in tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "td" | "th"))
        {
            row.push(inline_text(cell, ctx).replace('|', "\\|"));
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return String::new();
    }

    let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut out = String::new();

    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for c in 0..columns {
            out.push(' ');
            out.push_str(row.get(c).map(String::as_str).unwrap_or(""));
            out.push_str(" |");
        }
        out.push('\n');

        if i == 0 {
            out.push('|');
            for _ in 0..columns {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }

    out.trim_end().to_string()
}

/// Inline rendering of an element's children with trimmed edges.
fn inline_text(el: ElementRef<'_>, ctx: &mut Ctx<'_>) -> String {
    collapse_whitespace(&render_children(el, ctx)).trim().to_string()
}

/// Collapse runs of whitespace to single spaces, preserving newlines'
/// absence; used outside `<pre>` only.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out
}

/// Escape characters that would otherwise read as Markdown syntax.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Collapse excess blank lines and trim the edges of a block production.
fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            if blank_run > 0 && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            blank_run = 0;
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

fn ends_inline(out: &str) -> bool {
    out.chars().last().map(|c| !c.is_whitespace()).unwrap_or(false)
}

fn selector(css: &str) -> scraper::Selector {
    scraper::Selector::parse(css).expect("valid selector")
}
