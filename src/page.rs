//! The loaded page the picker works on.
//!
//! A [`Page`] owns the parsed document, the page URL and the registry of
//! listeners currently attached to it. Everything else (candidate index,
//! session state, highlights) refers into it by [`NodeId`].

use std::rc::Rc;

use url::Url;

use crate::dom::{self, Document, NodeId, NodeRef};
use crate::encoding;
use crate::picker::listeners::ListenerRegistry;

/// A single loaded web page.
pub struct Page {
    document: Document,
    url: String,
    listeners: Rc<ListenerRegistry>,
}

impl Page {
    /// Parse a page from HTML text.
    ///
    /// The URL is normalized when it parses as an absolute URL and kept
    /// verbatim otherwise.
    #[must_use]
    pub fn parse(html: &str, url: &str) -> Self {
        let url = Url::parse(url).map_or_else(|_| url.to_string(), String::from);
        Self {
            document: dom::parse(html),
            url,
            listeners: Rc::new(ListenerRegistry::default()),
        }
    }

    /// Parse a page from raw bytes, detecting the character encoding.
    #[must_use]
    pub fn from_bytes(html: &[u8], url: &str) -> Self {
        Self::parse(&encoding::decode_html(html), url)
    }

    /// The underlying document.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Resolve a node id.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        dom::node(&self.document, id)
    }

    /// First element matching a CSS selector.
    #[must_use]
    pub fn select_first(&self, selector: &str) -> Option<NodeId> {
        dom::select_first(&self.document, selector)
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.select_first("body")
    }

    /// Page URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Document title, whitespace-collapsed; empty when the page has none.
    #[must_use]
    pub fn title(&self) -> String {
        self.select_first("title")
            .map(|id| dom::collapsed_text(&self.node(id)))
            .unwrap_or_default()
    }

    /// Serialized HTML of the whole document.
    #[must_use]
    pub fn html(&self) -> String {
        self.document.html().to_string()
    }

    /// Listeners currently attached to this page.
    #[inline]
    #[must_use]
    pub fn listeners(&self) -> &Rc<ListenerRegistry> {
        &self.listeners
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
