//! Tag categories of capturable elements.

use serde::Serialize;

/// What kind of block a candidate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TagCategory {
    /// `h1`..`h6`, with the level.
    Heading(u8),
    Paragraph,
    Blockquote,
    Preformatted,
    /// `ul` or `ol`.
    List,
    Figure,
    Image,
    Table,
    Video,
    Audio,
}

impl TagCategory {
    /// Categorize a lowercase tag name; `None` for non-candidate tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let category = match tag {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "blockquote" => Self::Blockquote,
            "pre" => Self::Preformatted,
            "ul" | "ol" => Self::List,
            "figure" => Self::Figure,
            "img" => Self::Image,
            "table" => Self::Table,
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => return None,
        };
        Some(category)
    }

    /// Images carry no text, so the minimum-text rule does not apply to them.
    #[must_use]
    pub fn requires_text(self) -> bool {
        !matches!(self, Self::Image)
    }
}
