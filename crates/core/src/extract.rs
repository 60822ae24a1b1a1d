//! Main-content extraction.
//!
//! Scores candidate elements, boosts their ancestors, picks the best
//! candidate, pulls in qualifying siblings, then prunes the assembled HTML
//! fragment (conditional comments, link-dense nodes, empty nodes) before
//! returning it. The caller decides what to do when extraction fails; see
//! [`crate::article::Article::fallback_from_document`].

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, Element};
use crate::scoring::{ScoreConfig, calculate_score, link_density};
use crate::{EvadoError, Result};

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum score the top candidate must reach
    pub min_score_threshold: f64,
    /// Maximum number of top candidates to keep after the first pass
    pub max_top_candidates: usize,
    /// Minimum character count for a candidate to be considered
    pub char_threshold: usize,
    /// Sibling score threshold as a fraction of the top score
    pub sibling_threshold: f64,
    /// Maximum link density tolerated in extracted child nodes (0.0 to 1.0)
    pub max_link_density: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_score_threshold: 10.0,
            max_top_candidates: 5,
            char_threshold: 500,
            sibling_threshold: 0.2,
            max_link_density: 0.5,
        }
    }
}

/// The result of content extraction
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// The assembled content HTML fragment
    pub content: String,
    /// Score of the winning candidate
    pub top_score: f64,
    /// Number of elements merged into the fragment
    pub element_count: usize,
}

/// A scored candidate element
struct Candidate<'a> {
    element: Element<'a>,
    score: f64,
}

/// Tags considered potential content containers
const CANDIDATE_TAGS: &[&str] = &[
    "div",
    "article",
    "section",
    "main",
    "p",
    "td",
    "pre",
    "blockquote",
];

/// Extract the main content from a document.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Result<ExtractedContent> {
    let score_config = ScoreConfig::default();

    let mut candidates = identify_candidates(doc, config, &score_config);
    sort_by_score(&mut candidates);
    candidates.truncate(config.max_top_candidates);

    propagate_scores(&mut candidates, &score_config);
    sort_by_score(&mut candidates);

    let top = select_top_candidate(&candidates, config)?;
    let siblings = select_siblings(top, &candidates, config);

    let mut content = top.element.outer_html();
    for sibling in &siblings {
        content.push('\n');
        content.push_str(&sibling.outer_html());
    }

    let content = cleanup_fragment(&content, config.max_link_density);

    Ok(ExtractedContent {
        content,
        top_score: top.score,
        element_count: 1 + siblings.len(),
    })
}

/// Tags pruned from the assembled fragment when empty.
const PRUNE_TAGS: &[&str] = &["div", "p", "span", "section", "aside"];

/// Tags whose link density is re-checked inside the winning fragment. The
/// top candidate's own wrapper (usually `article`) is exempt so a link-heavy
/// but legitimate winner is never pruned wholesale.
const LINK_DENSITY_TAGS: &[&str] = &["div", "p", "section", "aside", "nav", "li"];

static CONDITIONAL_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\[if[^\]]*\]>.*?<!\[endif\]-->").expect("valid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static LINK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a[^>]*>(.*?)</a>").expect("valid regex"));

/// Post-extraction cleanup of the winning fragment.
///
/// Candidate scoring judges whole containers; navigation blocks and layout
/// scaffolding riding inside the winner survive it. This pass strips IE
/// conditional comments, drops child nodes whose text is mostly link text,
/// then removes the empty shells left behind.
fn cleanup_fragment(html: &str, max_link_density: f64) -> String {
    let cleaned = CONDITIONAL_COMMENT_RE.replace_all(html, "").to_string();
    let cleaned = remove_link_dense_nodes(&cleaned, max_link_density);
    remove_empty_nodes(&cleaned)
}

/// Remove nodes whose link-text share exceeds `max_density`.
fn remove_link_dense_nodes(html: &str, max_density: f64) -> String {
    let mut result = html.to_string();

    for tag in LINK_DENSITY_TAGS {
        let re = Regex::new(&format!(r"(?s)<{t}(?:\s[^>]*)?>(.*?)</{t}\s*>", t = tag))
            .expect("valid regex");

        result = re
            .replace_all(&result, |caps: &regex::Captures| {
                let node = caps.get(0).map(|m| m.as_str()).unwrap_or("");
                let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");

                let text = TAG_RE.replace_all(inner, "");
                let text_length = text.trim().chars().count();
                if text_length == 0 {
                    return node.to_string();
                }

                let link_text_length: usize = LINK_TEXT_RE
                    .captures_iter(inner)
                    .map(|c| TAG_RE.replace_all(&c[1], "").trim().chars().count())
                    .sum();

                if link_text_length as f64 / text_length as f64 > max_density {
                    String::new()
                } else {
                    node.to_string()
                }
            })
            .to_string();
    }

    result
}

/// Iteratively remove empty nodes until a pass changes nothing; pruning one
/// shell often empties its parent.
fn remove_empty_nodes(html: &str) -> String {
    let mut result = html.to_string();

    loop {
        let before = result.len();

        for tag in PRUNE_TAGS {
            let re = Regex::new(&format!(
                r"<{t}(?:\s[^>]*)?>\s*(?:<br\s*/?>\s*)*</{t}>",
                t = tag
            ))
            .expect("valid regex");
            result = re.replace_all(&result, "").to_string();
        }

        if result.len() == before {
            break;
        }
    }

    result
}

/// Collect every candidate element that clears the character floor.
fn identify_candidates<'a>(
    doc: &'a Document,
    config: &ExtractConfig,
    score_config: &ScoreConfig,
) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    for tag in CANDIDATE_TAGS {
        if let Ok(elements) = doc.select(tag) {
            for element in elements {
                if element.text().chars().count() < config.char_threshold / 10 {
                    continue;
                }
                if !seen.insert(element.node_id()) {
                    continue;
                }

                let score = calculate_score(&element, score_config);
                candidates.push(Candidate { element, score });
            }
        }
    }

    candidates
}

/// Boost the parents and grandparents of strong candidates.
///
/// A container whose children score well is usually the article body even
/// when its own direct text is thin. Parents receive half the child's score,
/// grandparents a third, added to their own.
fn propagate_scores<'a>(candidates: &mut Vec<Candidate<'a>>, score_config: &ScoreConfig) {
    let known: HashMap<_, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (c.element.node_id(), i))
        .collect();
    let mut boosted_by_id: HashMap<_, usize> = HashMap::new();
    let mut boosted: Vec<Candidate<'a>> = Vec::new();

    for i in 0..candidates.len() {
        let child_score = candidates[i].score;
        let mut ancestor = candidates[i].element.parent();
        let mut share = 2.0;

        while let Some(element) = ancestor {
            if share > 3.0 {
                break;
            }
            let id = element.node_id();
            let boost = child_score / share;

            if let Some(&idx) = known.get(&id) {
                candidates[idx].score += boost;
            } else if let Some(&idx) = boosted_by_id.get(&id) {
                boosted[idx].score += boost;
            } else {
                let own = calculate_score(&element, score_config);
                boosted_by_id.insert(id, boosted.len());
                boosted.push(Candidate { element: element.clone(), score: own + boost });
            }

            ancestor = element.parent();
            share += 1.0;
        }
    }

    candidates.extend(boosted);
}

fn sort_by_score(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// The highest-scoring candidate, if it clears the threshold.
fn select_top_candidate<'a, 'b>(
    candidates: &'b [Candidate<'a>],
    config: &ExtractConfig,
) -> Result<&'b Candidate<'a>> {
    let top = candidates.first().ok_or(EvadoError::NoContent)?;

    if top.score < config.min_score_threshold {
        return Err(EvadoError::NotReaderable {
            score: top.score,
            threshold: config.min_score_threshold,
        });
    }

    Ok(top)
}

/// Siblings worth merging with the top candidate.
///
/// A candidate qualifies when it scores at least `sibling_threshold` of the
/// top score, is not contained in the top candidate, and (for `<p>` tags)
/// reads like prose rather than navigation.
fn select_siblings<'a>(
    top: &Candidate<'a>,
    candidates: &[Candidate<'a>],
    config: &ExtractConfig,
) -> Vec<Element<'a>> {
    let top_id = top.element.node_id();
    let mut siblings = Vec::new();

    for candidate in candidates {
        if candidate.element.node_id() == top_id {
            continue;
        }
        if candidate.score < top.score * config.sibling_threshold {
            continue;
        }
        if is_within(&candidate.element, top_id) || is_within(&top.element, candidate.element.node_id())
        {
            continue;
        }

        if candidate.element.tag_name() == "p" {
            let text = candidate.element.text();
            if text.chars().count() > 80 && link_density(&candidate.element) < 0.25 {
                siblings.push(candidate.element.clone());
            }
        } else {
            siblings.push(candidate.element.clone());
        }
    }

    siblings
}

/// Whether `element` sits inside the node identified by `ancestor_id`.
fn is_within(element: &Element<'_>, ancestor_id: ego_tree::NodeId) -> bool {
    let mut current = element.parent();
    while let Some(el) = current {
        if el.node_id() == ancestor_id {
            return true;
        }
        current = el.parent();
    }
    false
}
