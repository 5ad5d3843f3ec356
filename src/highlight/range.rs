//! Text ranges over the live page and highlight marker wrapping.
//!
//! A [`TextRange`] is the crate's stand-in for a browser selection range: two
//! boundary points, each a text node plus a character offset into it. Ranges
//! are expanded to whole words before wrapping, and wrapping follows
//! `surroundContents` rules: it only succeeds when both boundaries share a
//! parent, so no element is partially selected.

use crate::dom::{self, NodeId, NodeRef};
use crate::error::{Error, Result};
use crate::highlight::palette::Color;
use crate::page::Page;
use crate::patterns::{BLOCK_TAGS, HIDDEN_TAGS};

/// Class carried by every highlight marker.
pub const HIGHLIGHT_CLASS: &str = "lc-highlight";

/// Attribute naming a marker's colour; the markdown converter reads it back.
pub const COLOR_ATTR: &str = "data-lc-color";

/// One boundary of a range: a text node and a character offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl TextPoint {
    #[must_use]
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A span of text between two boundary points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: TextPoint,
    pub end: TextPoint,
}

impl TextRange {
    #[must_use]
    pub fn new(start: TextPoint, end: TextPoint) -> Self {
        Self { start, end }
    }

    /// A range inside a single text node.
    #[must_use]
    pub fn within(node: NodeId, start: usize, end: usize) -> Self {
        Self::new(TextPoint::new(node, start), TextPoint::new(node, end))
    }

    /// Whether both boundaries coincide.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Characters that belong to a word: ASCII letters and digits, Latin letters
/// with diacritics, `_` and `-`.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || ('\u{00C0}'..='\u{024F}').contains(&c)
}

fn text_node(page: &Page, id: NodeId) -> Result<NodeRef<'_>> {
    let node = page.node(id);
    if node.is_text() {
        Ok(node)
    } else {
        Err(Error::InvalidRange(format!("{id:?} is not a text node")))
    }
}

fn chars_of(node: &NodeRef) -> Vec<char> {
    node.text().chars().collect()
}

/// Validate a range and order its boundaries so that `start` precedes `end`.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] when a boundary is not a text node or its
/// offset lies past the end of the node's text.
pub fn normalize(page: &Page, range: &TextRange) -> Result<TextRange> {
    for point in [range.start, range.end] {
        let len = text_node(page, point.node)?.text().chars().count();
        if point.offset > len {
            return Err(Error::InvalidRange(format!("offset {} past length {len}", point.offset)));
        }
    }

    let backwards = if range.start.node == range.end.node {
        range.start.offset > range.end.offset
    } else {
        dom::compare_document_position(&page.node(range.start.node), &page.node(range.end.node)).is_gt()
    };

    Ok(if backwards {
        TextRange::new(range.end, range.start)
    } else {
        *range
    })
}

/// Text nodes from `first` to `last` inclusive, in document order, skipping
/// text that never renders.
fn text_nodes_between<'a>(page: &'a Page, first: NodeId, last: NodeId) -> Vec<NodeRef<'a>> {
    let mut out = Vec::new();
    let mut inside = false;
    for node in page.document().root().descendants() {
        if node.id == first {
            inside = true;
        }
        if inside && node.is_text() && !is_hidden_text(&node) {
            out.push(node);
        }
        if node.id == last {
            break;
        }
    }
    out
}

fn is_hidden_text(node: &NodeRef) -> bool {
    node.parent().is_some_and(|p| dom::is_tag(&p, HIDDEN_TAGS))
}

/// Per text node slice covered by a normalized range.
fn covered_slices(page: &Page, range: &TextRange) -> Vec<(NodeId, String)> {
    let nodes = text_nodes_between(page, range.start.node, range.end.node);
    nodes
        .iter()
        .map(|node| {
            let chars = chars_of(node);
            let from = if node.id == range.start.node { range.start.offset } else { 0 };
            let to = if node.id == range.end.node { range.end.offset } else { chars.len() };
            (node.id, chars[from.min(to)..to].iter().collect())
        })
        .collect()
}

/// The text a range covers.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] for a malformed range.
pub fn range_text(page: &Page, range: &TextRange) -> Result<String> {
    let range = normalize(page, range)?;
    Ok(covered_slices(page, &range).into_iter().map(|(_, s)| s).collect())
}

/// Grow a range outwards so neither boundary falls inside a word.
///
/// A boundary only moves when the selected text at that edge is itself a word
/// character, so a selection that starts on a space is left alone.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] for a malformed range.
pub fn expand_to_words(page: &Page, range: &TextRange) -> Result<TextRange> {
    let mut range = normalize(page, range)?;
    if range.is_collapsed() {
        return Ok(range);
    }

    let start_chars = chars_of(&page.node(range.start.node));
    let word_at = |chars: &[char], i: usize| chars.get(i).copied().is_some_and(is_word_char);

    while range.start.offset > 0
        && word_at(&start_chars, range.start.offset)
        && word_at(&start_chars, range.start.offset - 1)
    {
        range.start.offset -= 1;
    }

    let end_chars = if range.end.node == range.start.node {
        start_chars
    } else {
        chars_of(&page.node(range.end.node))
    };
    while range.end.offset > 0
        && word_at(&end_chars, range.end.offset - 1)
        && word_at(&end_chars, range.end.offset)
    {
        range.end.offset += 1;
    }

    Ok(range)
}

/// Wrap a range in a coloured `<mark>` and return the marker.
///
/// # Errors
///
/// Returns [`Error::RangeWrap`] when the range is empty or its boundaries sit
/// under different parents, and [`Error::InvalidRange`] for a malformed range.
pub fn wrap_range(page: &Page, range: &TextRange, color: &Color) -> Result<NodeId> {
    let range = normalize(page, range)?;
    if range.is_collapsed() {
        return Err(Error::RangeWrap("empty range".to_string()));
    }

    let doc = page.document();
    let start = page.node(range.start.node);
    let end = page.node(range.end.node);
    let parent = start
        .parent()
        .ok_or_else(|| Error::RangeWrap("detached text node".to_string()))?;
    if end.parent().map(|p| p.id) != Some(parent.id) {
        return Err(Error::RangeWrap("range partially selects an element".to_string()));
    }

    let mark = dom::new_element(doc, "mark");
    dom::set_attr(&mark, "class", HIGHLIGHT_CLASS);
    dom::set_attr(&mark, COLOR_ATTR, color.name);
    dom::set_attr(
        &mark,
        "style",
        &format!("background-color:{};color:{}", color.background, color.foreground),
    );

    let start_chars = chars_of(&start);
    let text = |chars: &[char]| chars.iter().collect::<String>();
    let insert_text_before = |anchor: &NodeRef, chars: &[char]| {
        if !chars.is_empty() {
            anchor.insert_before(&dom::new_text(doc, &text(chars)));
        }
    };

    if start.id == end.id {
        let (s, e) = (range.start.offset, range.end.offset);
        insert_text_before(&start, &start_chars[..s]);
        start.insert_before(&mark);
        mark.append_child(&dom::new_text(doc, &text(&start_chars[s..e])));
        insert_text_before(&start, &start_chars[e..]);
        start.remove_from_parent();
        return Ok(mark.id);
    }

    let mut middle = Vec::new();
    let mut cursor = start.next_sibling();
    while let Some(sibling) = cursor {
        if sibling.id == end.id {
            break;
        }
        cursor = sibling.next_sibling();
        middle.push(sibling);
    }

    let end_chars = chars_of(&end);
    let (s, e) = (range.start.offset, range.end.offset);

    insert_text_before(&start, &start_chars[..s]);
    start.insert_before(&mark);
    if s < start_chars.len() {
        mark.append_child(&dom::new_text(doc, &text(&start_chars[s..])));
    }
    for node in &middle {
        dom::move_into(&mark, node);
    }
    if e > 0 {
        mark.append_child(&dom::new_text(doc, &text(&end_chars[..e])));
    }
    insert_text_before(&end, &end_chars[e..]);
    start.remove_from_parent();
    end.remove_from_parent();

    Ok(mark.id)
}

/// Replace a marker with its children and merge the text it had split.
pub fn unwrap(page: &Page, wrapper: NodeId) {
    let mark = page.node(wrapper);
    let Some(parent) = mark.parent() else {
        return;
    };
    for child in mark.children() {
        dom::move_before(&mark, &child);
    }
    mark.remove_from_parent();
    dom::normalize_text_children(page.document(), &parent);
}

/// Every live highlight marker in the page.
#[must_use]
pub fn markers(page: &Page) -> Vec<NodeId> {
    page.document()
        .select(&format!("mark.{HIGHLIGHT_CLASS}"))
        .nodes()
        .iter()
        .map(|n| n.id)
        .collect()
}

/// Range over the first occurrence of `needle` inside a single text node.
#[must_use]
pub fn find_text(page: &Page, needle: &str) -> Option<TextRange> {
    if needle.is_empty() {
        return None;
    }
    page.document().root().descendants().into_iter().find_map(|node| {
        if !node.is_text() || is_hidden_text(&node) {
            return None;
        }
        let haystack = node.text();
        let byte = haystack.find(needle)?;
        let start = haystack[..byte].chars().count();
        Some(TextRange::within(node.id, start, start + needle.chars().count()))
    })
}

/// HTML for the content a range covers.
///
/// Within one parent the fragment keeps inline markup; across elements each
/// block's covered text becomes its own paragraph.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] for a malformed range.
pub fn range_html(page: &Page, range: &TextRange) -> Result<String> {
    let range = normalize(page, range)?;
    let start = page.node(range.start.node);
    let end = page.node(range.end.node);
    let start_chars = chars_of(&start);

    if start.id == end.id {
        let slice: String = start_chars[range.start.offset..range.end.offset].iter().collect();
        return Ok(dom::escape_html(&slice));
    }

    if start.parent().map(|p| p.id) == end.parent().map(|p| p.id) {
        let mut html = dom::escape_html(&start_chars[range.start.offset..].iter().collect::<String>());
        let mut cursor = start.next_sibling();
        while let Some(sibling) = cursor {
            if sibling.id == end.id {
                break;
            }
            if sibling.is_text() {
                html.push_str(&dom::escape_html(&sibling.text()));
            } else {
                html.push_str(&dom::outer_html(&sibling));
            }
            cursor = sibling.next_sibling();
        }
        let end_chars = chars_of(&end);
        html.push_str(&dom::escape_html(&end_chars[..range.end.offset].iter().collect::<String>()));
        return Ok(html);
    }

    let mut paragraphs: Vec<(Option<NodeId>, String)> = Vec::new();
    for (id, slice) in covered_slices(page, &range) {
        let block = dom::closest(&page.node(id), |n| dom::is_tag(n, BLOCK_TAGS)).map(|n| n.id);
        match paragraphs.last_mut() {
            Some((last, text)) if *last == block => text.push_str(&slice),
            _ => paragraphs.push((block, slice)),
        }
    }
    Ok(paragraphs
        .into_iter()
        .map(|(_, text)| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .map(|text| format!("<p>{}</p>", dom::escape_html(&text)))
        .collect())
}
