//! Highlight subsystem: colour palettes, word-aligned ranges and the undo
//! stack of live markers.

pub mod palette;
pub mod range;

pub use palette::{Color, PaletteKind, PALETTE_LEN};
pub use range::{TextPoint, TextRange};

use crate::dom::NodeId;
use crate::page::Page;

/// One user-drawn highlight that is still present in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The injected `<mark>` element.
    pub wrapper: NodeId,
    /// Text covered at creation time.
    pub text: String,
    /// Colour it was drawn with.
    pub color: Color,
}

/// Highlights in creation order; undo pops the most recent.
#[derive(Debug, Default)]
pub struct HighlightStack {
    annotations: Vec<Annotation>,
}

impl HighlightStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Remove the newest highlight and unwrap its marker.
    pub fn undo(&mut self, page: &Page) -> Option<Annotation> {
        let annotation = self.annotations.pop()?;
        range::unwrap(page, annotation.wrapper);
        Some(annotation)
    }

    /// Unwrap every marker, newest first, leaving the stack empty.
    pub fn unwrap_all(&mut self, page: &Page) {
        while self.undo(page).is_some() {}
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Highlights oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }
}
