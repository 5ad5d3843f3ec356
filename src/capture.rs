//! Capture payload: the ordered, serialized result of a picker session.
//!
//! The payload is built once at commit time and handed to a [`CaptureSink`];
//! nothing downstream mutates it.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::dom::{self, NodeId, NodeRef};
use crate::error::{Error, Result};
use crate::highlight::range::{self, TextRange};
use crate::highlight::Annotation;
use crate::page::Page;
use crate::patterns::{BLOCK_TAGS, HIDDEN_TAGS, MULTIPLE_NEWLINES, WHITESPACE_NORMALIZE};

/// Separator between serialized elements.
const ELEMENT_SEPARATOR: &str = "\n\n";

/// A highlight as it leaves the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRecord {
    pub text: String,
    /// Background hex value.
    pub color: String,
    pub color_name: String,
}

impl From<&Annotation> for HighlightRecord {
    fn from(annotation: &Annotation) -> Self {
        Self {
            text: annotation.text.clone(),
            color: annotation.color.background.to_string(),
            color_name: annotation.color.name.to_string(),
        }
    }
}

/// Everything a session hands to the surrounding extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePayload {
    /// Included elements' outer HTML, blank-line separated, in document order.
    pub html: String,
    /// Included elements' rendered text, blank-line separated, one slot per
    /// element (empty for an image).
    pub text: String,
    pub title: String,
    pub url: String,
    pub element_count: usize,
    pub highlights: Vec<HighlightRecord>,
}

impl CapturePayload {
    /// Serialize elements in document order, whatever order they are given in.
    #[must_use]
    pub fn from_elements(page: &Page, elements: &[NodeId], highlights: Vec<HighlightRecord>) -> Self {
        let mut ordered = elements.to_vec();
        sort_document_order(page, &mut ordered);

        let nodes: Vec<NodeRef> = ordered.iter().map(|id| page.node(*id)).collect();
        let html = nodes
            .iter()
            .map(|n| dom::outer_html(n).to_string())
            .collect::<Vec<_>>()
            .join(ELEMENT_SEPARATOR);
        let text = nodes
            .iter()
            .map(inner_text)
            .collect::<Vec<_>>()
            .join(ELEMENT_SEPARATOR);

        Self {
            html,
            text,
            title: page.title(),
            url: page.url().to_string(),
            element_count: ordered.len(),
            highlights,
        }
    }

    /// Payload for a plain text selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoContent`] when the selection holds no visible text,
    /// or [`Error::InvalidRange`] when it no longer points into the page.
    pub fn from_selection(page: &Page, selection: &TextRange, highlights: Vec<HighlightRecord>) -> Result<Self> {
        let (html, text) = selection_fragment(page, selection)?;
        if text.is_empty() {
            return Err(Error::NoContent);
        }
        Ok(Self {
            html,
            text,
            title: page.title(),
            url: page.url().to_string(),
            element_count: 0,
            highlights,
        })
    }
}

/// Sort nodes so that a node preceding another in the document comes first.
pub fn sort_document_order(page: &Page, nodes: &mut [NodeId]) {
    nodes.sort_by(|a, b| dom::compare_document_position(&page.node(*a), &page.node(*b)));
}

/// HTML and trimmed text of a selection.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] for a stale or malformed range.
pub fn selection_fragment(page: &Page, selection: &TextRange) -> Result<(String, String)> {
    let html = range::range_html(page, selection)?;
    let text = range::range_text(page, selection)?.trim().to_string();
    Ok((html, text))
}

/// Rendered text of an element, approximating the browser's `innerText`.
///
/// Block elements start on their own line, paragraphs and headings are
/// followed by a blank line, `<br>` breaks the line, and whitespace outside
/// `<pre>` collapses to single spaces.
#[must_use]
pub fn inner_text(node: &NodeRef) -> String {
    let mut out = String::new();
    collect_text(node, &mut out, false);
    MULTIPLE_NEWLINES.replace_all(&out, "\n\n").trim().to_string()
}

fn collect_text(node: &NodeRef, out: &mut String, in_pre: bool) {
    if node.is_text() {
        let raw = node.text();
        if in_pre {
            out.push_str(&raw);
            return;
        }
        let collapsed = WHITESPACE_NORMALIZE.replace_all(&raw, " ");
        if out.is_empty() || out.ends_with([' ', '\n']) {
            out.push_str(collapsed.trim_start());
        } else {
            out.push_str(&collapsed);
        }
        return;
    }

    let Some(tag) = dom::tag_name(node) else {
        return;
    };
    let tag = tag.as_str();
    if HIDDEN_TAGS.contains(&tag) {
        return;
    }
    if tag == "br" {
        end_line(out);
        out.push('\n');
        return;
    }

    let block = BLOCK_TAGS.contains(&tag);
    if block {
        start_line(out);
    }
    let pre = in_pre || tag == "pre";
    for child in node.children() {
        collect_text(&child, out, pre);
    }
    if matches!(tag, "td" | "th") {
        end_line(out);
        out.push('\t');
        return;
    }
    if block {
        start_line(out);
        if matches!(tag, "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre") {
            out.push('\n');
        }
    }
}

fn end_line(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t']).len();
    out.truncate(trimmed);
}

fn start_line(out: &mut String) {
    end_line(out);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Receiver of finished payloads; the stand-in for the extension message bus.
pub trait CaptureSink {
    /// Hand off a payload. Delivery is fire-and-forget.
    fn deliver(&mut self, payload: CapturePayload);
}

/// Collects payloads in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    payloads: Vec<CapturePayload>,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn payloads(&self) -> &[CapturePayload] {
        &self.payloads
    }

    /// The most recent payload.
    #[must_use]
    pub fn last(&self) -> Option<&CapturePayload> {
        self.payloads.last()
    }
}

impl CaptureSink for VecSink {
    fn deliver(&mut self, payload: CapturePayload) {
        self.payloads.push(payload);
    }
}

/// Forwards payloads over a channel to another thread.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<CapturePayload>,
}

impl ChannelSink {
    /// A sink and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<CapturePayload>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl CaptureSink for ChannelSink {
    fn deliver(&mut self, payload: CapturePayload) {
        if self.tx.send(payload).is_err() {
            tracing::warn!("capture receiver dropped, payload discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(html: &str, css: &str) -> String {
        let page = Page::parse(html, "about:blank");
        let id = page.select_first(css).expect("element");
        inner_text(&page.node(id))
    }

    #[test]
    fn inner_text_collapses_inline_whitespace() {
        assert_eq!(text_of("<p>  Hello\n   <b>bold</b>   world </p>", "p"), "Hello bold world");
    }

    #[test]
    fn inner_text_breaks_blocks() {
        assert_eq!(text_of("<ul>\n<li>one</li>\n<li>two</li>\n</ul>", "ul"), "one\ntwo");
        assert_eq!(text_of("<p>a<br>b</p>", "p"), "a\nb");
        assert_eq!(text_of("<div><p>first</p><p>second</p></div>", "div"), "first\n\nsecond");
    }

    #[test]
    fn inner_text_keeps_preformatted_whitespace() {
        assert_eq!(text_of("<pre>fn main() {\n    go();\n}</pre>", "pre"), "fn main() {\n    go();\n}");
    }

    #[test]
    fn inner_text_skips_hidden_content() {
        assert_eq!(text_of("<div>shown<script>var x;</script><style>p{}</style></div>", "div"), "shown");
    }

    #[test]
    fn payload_is_in_document_order() {
        let page = Page::parse(
            "<title>T</title><p id=\"a\">first para</p><p id=\"b\">second para</p>",
            "https://example.com/post",
        );
        let a = page.select_first("#a").expect("a");
        let b = page.select_first("#b").expect("b");
        let payload = CapturePayload::from_elements(&page, &[b, a], Vec::new());

        assert_eq!(payload.element_count, 2);
        assert_eq!(payload.text, "first para\n\nsecond para");
        assert!(payload.html.starts_with("<p id=\"a\">"));
        assert_eq!(payload.title, "T");
        assert_eq!(payload.url, "https://example.com/post");
    }

    #[test]
    fn textless_elements_keep_their_text_slot() {
        let page = Page::parse(
            "<p id=\"a\">caption above</p><img id=\"i\" src=\"x.png\"><p id=\"b\">caption below</p>",
            "about:blank",
        );
        let ids: Vec<NodeId> = ["#a", "#i", "#b"]
            .iter()
            .map(|css| page.select_first(css).expect("element"))
            .collect();
        let payload = CapturePayload::from_elements(&page, &ids, Vec::new());

        assert_eq!(payload.element_count, 3);
        assert_eq!(payload.text, "caption above\n\n\n\ncaption below");
        assert_eq!(payload.text.split(ELEMENT_SEPARATOR).count(), payload.element_count);
    }

    #[test]
    fn payload_serializes_camel_case() {
        let payload = CapturePayload {
            html: "<p>x</p>".to_string(),
            text: "x".to_string(),
            title: String::new(),
            url: String::new(),
            element_count: 1,
            highlights: vec![HighlightRecord {
                text: "x".to_string(),
                color: "#a5d6a7".to_string(),
                color_name: "Green".to_string(),
            }],
        };
        let json = serde_json::to_value(&payload).expect("json");
        assert_eq!(json["elementCount"], 1);
        assert_eq!(json["highlights"][0]["colorName"], "Green");
    }

    #[test]
    fn empty_selection_is_no_content() {
        let page = Page::parse("<p>a   b</p>", "about:blank");
        let range = range::find_text(&page, "   ").expect("spaces");
        assert!(matches!(
            CapturePayload::from_selection(&page, &range, Vec::new()),
            Err(Error::NoContent)
        ));
    }

    #[test]
    fn channel_sink_forwards() {
        let (mut sink, rx) = ChannelSink::new();
        let page = Page::parse("<p id=\"a\">paragraph</p>", "about:blank");
        let a = page.select_first("#a").expect("a");
        sink.deliver(CapturePayload::from_elements(&page, &[a], Vec::new()));
        let received = rx.recv().expect("payload");
        assert_eq!(received.text, "paragraph");
    }
}
