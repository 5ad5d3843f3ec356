//! Configuration options for the candidate index and the picker.
//!
//! Both structs expose public fields and a documented `Default`, so callers
//! override only what they need with struct update syntax.

use crate::highlight::palette::PaletteKind;
use crate::patterns::CONTENT_ROOT_SELECTORS;

/// Options controlling how the selectable-element index is built.
///
/// # Example
///
/// ```rust
/// use logseq_clipper::IndexOptions;
///
/// let options = IndexOptions {
///     min_text_len: 20,
///     ..IndexOptions::default()
/// };
/// assert_eq!(options.min_root_text_len, 500);
/// ```
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Selectors tried in order when looking for the main content region.
    ///
    /// Default: `article`, `[role='main']`, `main`, `.post-content`,
    /// `.article-content`, `.entry-content`, `.post-body`, `.article-body`,
    /// `#content`, `.content`
    pub content_root_selectors: Vec<String>,

    /// A content region must hold more than this many characters of text,
    /// otherwise the whole body is scanned.
    ///
    /// Default: `500`
    pub min_root_text_len: usize,

    /// Minimum characters of text for a non-image candidate.
    ///
    /// Default: `10`
    pub min_text_len: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            content_root_selectors: CONTENT_ROOT_SELECTORS.iter().map(|s| (*s).to_string()).collect(),
            min_root_text_len: 500,
            min_text_len: 10,
        }
    }
}

/// Platform convention for the undo chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `Cmd+Z`.
    Mac,
    /// `Ctrl+Z`.
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else {
            Self::Other
        }
    }
}

/// Options for a picker session.
#[derive(Debug, Clone)]
pub struct PickerOptions {
    /// Candidate index configuration.
    pub index: IndexOptions,

    /// Which modifier makes `Z` an undo.
    ///
    /// Default: [`Platform::current`]
    pub platform: Platform,

    /// Force a palette instead of detecting the page background.
    ///
    /// Default: `None`
    pub palette: Option<PaletteKind>,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            index: IndexOptions::default(),
            platform: Platform::current(),
            palette: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_thresholds() {
        let opts = IndexOptions::default();
        assert_eq!(opts.min_root_text_len, 500);
        assert_eq!(opts.min_text_len, 10);
        assert_eq!(opts.content_root_selectors.first().map(String::as_str), Some("article"));
        assert_eq!(opts.content_root_selectors.len(), CONTENT_ROOT_SELECTORS.len());
    }

    #[test]
    fn test_default_picker_options() {
        let opts = PickerOptions::default();
        assert!(opts.palette.is_none());
        assert_eq!(opts.platform, Platform::current());
    }

    #[test]
    fn test_custom_thresholds() {
        let opts = PickerOptions {
            index: IndexOptions {
                min_text_len: 3,
                ..IndexOptions::default()
            },
            palette: Some(PaletteKind::Dark),
            ..PickerOptions::default()
        };
        assert_eq!(opts.index.min_text_len, 3);
        assert_eq!(opts.palette, Some(PaletteKind::Dark));
    }
}
