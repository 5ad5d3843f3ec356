//! Selectable-Element Index
//!
//! Scans the page's main content region once per session and produces the
//! anti-chain of capturable block elements: headings, paragraphs, quotes,
//! code blocks, lists, figures, images, tables and media. No accepted element
//! contains another.

use std::collections::HashMap;

use dom_query::{NodeId, NodeRef, Selection};

use crate::dom;
use crate::options::IndexOptions;
use crate::page::Page;

mod category;
mod landmark;

pub use category::TagCategory;
use landmark::LandmarkCache;

/// An element eligible for inclusion in a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The live element.
    pub node: NodeId,
    /// Its tag category.
    pub category: TagCategory,
}

/// Static snapshot of the page's candidates, in document order at scan time.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    root: Option<NodeId>,
    candidates: Vec<Candidate>,
    positions: HashMap<NodeId, usize>,
}

impl CandidateIndex {
    /// An index with no candidates (text-only sessions).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_accepted(root: NodeId, candidates: Vec<Candidate>) -> Self {
        let positions = candidates.iter().enumerate().map(|(i, c)| (c.node, i)).collect();
        Self {
            root: Some(root),
            candidates,
            positions,
        }
    }

    /// The content region that was scanned.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// All candidates.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidate at a position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Candidate> {
        self.candidates.get(position)
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Position of a node in the index, if it is a candidate.
    #[must_use]
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.positions.get(&node).copied()
    }

    /// Position of the nearest candidate at or above `node`.
    #[must_use]
    pub fn nearest(&self, page: &Page, node: NodeId) -> Option<usize> {
        let start = page.node(node);
        dom::closest(&start, |n| self.positions.contains_key(&n.id)).and_then(|n| self.position_of(n.id))
    }
}

/// Locate the main content region.
///
/// Returns the first element matched by `content_root_selectors` whose text is
/// longer than `min_root_text_len` characters, else `<body>`, else the
/// document root.
#[must_use]
pub fn find_content_root(page: &Page, options: &IndexOptions) -> NodeId {
    for selector in &options.content_root_selectors {
        let Some(id) = page.select_first(selector) else {
            continue;
        };
        let len = dom::text_len(&page.node(id));
        if len > options.min_root_text_len {
            tracing::trace!(selector = selector.as_str(), len, "content root found");
            return id;
        }
    }
    page.body().unwrap_or_else(|| page.document().root().id)
}

/// Build the candidate index for a page.
///
/// Candidates are processed in document order. A candidate inside an already
/// accepted one is discarded; a candidate containing accepted ones evicts
/// them. Landmark content and near-empty blocks are rejected up front.
#[must_use]
pub fn scan(page: &Page, options: &IndexOptions) -> CandidateIndex {
    let root_id = find_content_root(page, options);
    let root = page.node(root_id);
    let landmarks = LandmarkCache::new(&root);

    let mut accepted: Vec<(NodeRef, TagCategory)> = Vec::new();
    let descendants = Selection::from(root).select("*");
    let subtree = std::iter::once(root).chain(descendants.nodes().iter().copied());

    for node in subtree {
        let Some(category) = dom::tag_name(&node).and_then(|t| TagCategory::from_tag(&t)) else {
            continue;
        };
        if landmarks.is_inside_landmark(&node) {
            continue;
        }
        if category.requires_text() && dom::text_len(&node) < options.min_text_len {
            continue;
        }
        if accepted.iter().any(|(a, _)| dom::is_ancestor(a, &node)) {
            continue;
        }
        accepted.retain(|(a, _)| !dom::is_ancestor(&node, a));
        accepted.push((node, category));
    }

    tracing::debug!(count = accepted.len(), "candidate index built");

    let candidates = accepted
        .into_iter()
        .map(|(node, category)| Candidate { node: node.id, category })
        .collect();
    CandidateIndex::from_accepted(root_id, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(n: usize) -> String {
        "lorem ipsum ".repeat(n)
    }

    #[test]
    fn short_article_falls_back_to_body() {
        let page = Page::parse("<body><article><p>tiny article text</p></article></body>", "about:blank");
        let root = find_content_root(&page, &IndexOptions::default());
        assert_eq!(Some(root), page.body());
    }

    #[test]
    fn long_article_is_the_root() {
        let html = format!("<body><div>side</div><article><p>{}</p></article></body>", long_text(50));
        let page = Page::parse(&html, "about:blank");
        let root = find_content_root(&page, &IndexOptions::default());
        assert_eq!(Some(root), page.select_first("article"));
    }

    #[test]
    fn later_selector_used_when_earlier_is_short() {
        let html = format!(
            "<body><article><p>short</p></article><div class=\"entry-content\"><p>{}</p></div></body>",
            long_text(50)
        );
        let page = Page::parse(&html, "about:blank");
        let root = find_content_root(&page, &IndexOptions::default());
        assert_eq!(Some(root), page.select_first(".entry-content"));
    }

    #[test]
    fn nested_candidates_collapse_to_outermost() {
        let page = Page::parse(
            "<body><blockquote id=\"q\"><p>quoted paragraph text</p><p>second quoted paragraph</p></blockquote></body>",
            "about:blank",
        );
        let index = scan(&page, &IndexOptions::default());
        assert_eq!(index.len(), 1);
        assert_eq!(index.candidates()[0].node, page.select_first("#q").expect("blockquote"));
        assert_eq!(index.candidates()[0].category, TagCategory::Blockquote);
    }

    #[test]
    fn short_blocks_are_rejected_but_images_kept() {
        let page = Page::parse(
            "<body><p>tiny</p><div><img src=\"a.png\"></div><p>long enough paragraph</p></body>",
            "about:blank",
        );
        let index = scan(&page, &IndexOptions::default());
        let categories: Vec<_> = index.candidates().iter().map(|c| c.category).collect();
        assert_eq!(categories, vec![TagCategory::Image, TagCategory::Paragraph]);
    }

    #[test]
    fn nearest_walks_up_to_candidate() {
        let page = Page::parse(
            "<body><p id=\"p\">some <b id=\"b\">bold</b> paragraph text</p></body>",
            "about:blank",
        );
        let index = scan(&page, &IndexOptions::default());
        let b = page.select_first("#b").expect("b");
        assert_eq!(index.nearest(&page, b), Some(0));
        assert_eq!(index.nearest(&page, page.body().expect("body")), None);
    }

    #[test]
    fn empty_index() {
        let index = CandidateIndex::empty();
        assert!(index.is_empty());
        assert!(index.root().is_none());
        assert!(index.get(0).is_none());
    }
}
