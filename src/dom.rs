//! DOM Operations Adapter
//!
//! Thin helpers over `dom_query` used by the index, the picker and the
//! serializers. Element references are carried around as [`NodeId`]s so that
//! session state never borrows the page; these helpers turn them back into
//! [`NodeRef`]s and perform the handful of tree edits the picker needs.

use std::cmp::Ordering;

// Re-export core types for external use
pub use dom_query::{Document, NodeId, NodeRef, Selection};
pub use tendril::StrTendril;

use crate::patterns::WHITESPACE_NORMALIZE;

// === Node Lookup ===

/// Resolve a node id against a document.
#[inline]
#[must_use]
pub fn node(doc: &Document, id: NodeId) -> NodeRef<'_> {
    NodeRef::new(id, &doc.tree)
}

/// First element matching a CSS selector, if any.
#[must_use]
pub fn select_first(doc: &Document, selector: &str) -> Option<NodeId> {
    doc.select(selector).nodes().first().map(|n| n.id)
}

// === Tag/Attribute Information ===

/// Lowercase tag name of an element node.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Whether the node is an element with one of the given (lowercase) tags.
#[must_use]
pub fn is_tag(node: &NodeRef, tags: &[&str]) -> bool {
    tag_name(node).is_some_and(|t| tags.contains(&t.as_str()))
}

/// Attribute value of an element.
#[inline]
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    Selection::from(*node).attr(name).map(|s| s.to_string())
}

/// Set an attribute on an element.
#[inline]
pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    Selection::from(*node).set_attr(name, value);
}

/// Remove an attribute from an element.
#[inline]
pub fn remove_attr(node: &NodeRef, name: &str) {
    Selection::from(*node).remove_attr(name);
}

// === Text Content ===

/// Text content with runs of whitespace collapsed and the ends trimmed.
#[must_use]
pub fn collapsed_text(node: &NodeRef) -> String {
    let raw = node.text();
    WHITESPACE_NORMALIZE.replace_all(raw.trim(), " ").into_owned()
}

/// Length in characters of [`collapsed_text`].
#[must_use]
pub fn text_len(node: &NodeRef) -> usize {
    collapsed_text(node).chars().count()
}

/// Outer HTML of a node.
#[inline]
#[must_use]
pub fn outer_html(node: &NodeRef) -> StrTendril {
    Selection::from(*node).html()
}

// === Tree Relationships ===

/// Whether `ancestor` strictly contains `node`.
#[must_use]
pub fn is_ancestor(ancestor: &NodeRef, node: &NodeRef) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.id == ancestor.id {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Whether `container` is `node` or one of its ancestors.
#[must_use]
pub fn contains(container: &NodeRef, node: &NodeRef) -> bool {
    container.id == node.id || is_ancestor(container, node)
}

/// Nearest ancestor-or-self satisfying `pred`.
pub fn closest<'a, F>(node: &NodeRef<'a>, mut pred: F) -> Option<NodeRef<'a>>
where
    F: FnMut(&NodeRef<'a>) -> bool,
{
    let mut current = Some(*node);
    while let Some(n) = current {
        if pred(&n) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Child indices from the document root down to `node`.
fn tree_path(node: &NodeRef) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = *node;
    while let Some(parent) = current.parent() {
        let index = parent
            .children()
            .iter()
            .position(|c| c.id == current.id)
            .unwrap_or(0);
        path.push(index);
        current = parent;
    }
    path.reverse();
    path
}

/// Compare two nodes by document position.
///
/// A node that follows another sorts after it; an ancestor sorts before its
/// descendants. The same node compares equal.
#[must_use]
pub fn compare_document_position(a: &NodeRef, b: &NodeRef) -> Ordering {
    if a.id == b.id {
        return Ordering::Equal;
    }
    tree_path(a).cmp(&tree_path(b))
}

// === Tree Manipulation ===

/// Create a detached element.
#[inline]
#[must_use]
pub fn new_element<'a>(doc: &'a Document, tag: &str) -> NodeRef<'a> {
    doc.tree.new_element(tag)
}

/// Create a detached text node.
#[inline]
#[must_use]
pub fn new_text<'a>(doc: &'a Document, text: &str) -> NodeRef<'a> {
    doc.tree.new_text(text)
}

/// Move `node` so that it sits immediately before `anchor`.
pub fn move_before(anchor: &NodeRef, node: &NodeRef) {
    node.remove_from_parent();
    anchor.insert_before(node);
}

/// Move `node` to the end of `parent`'s children.
pub fn move_into(parent: &NodeRef, node: &NodeRef) {
    node.remove_from_parent();
    parent.append_child(node);
}

/// Merge runs of adjacent text children into single text nodes.
///
/// Splitting text for highlight markers leaves adjacent text nodes behind
/// once the markers are removed; merging them restores the parsed shape.
pub fn normalize_text_children(doc: &Document, parent: &NodeRef) {
    let children = parent.children();
    let mut run: Vec<NodeRef> = Vec::new();
    for child in children.iter().chain(std::iter::once(parent)) {
        // `parent` acts as a sentinel that flushes the final run
        if child.id != parent.id && child.is_text() {
            run.push(*child);
            continue;
        }
        if run.len() > 1 {
            let merged: String = run.iter().map(|n| n.text().to_string()).collect();
            let replacement = new_text(doc, &merged);
            run[0].insert_before(&replacement);
            for n in &run {
                n.remove_from_parent();
            }
        }
        run.clear();
    }
}

// === Escaping ===

/// Escape text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}
