//! Compiled regex patterns shared across the picker and formatters.
//!
//! All patterns are compiled once at first use with `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Landmark / Boilerplate Detection
// =============================================================================

/// Matches class/id values marking navigation or boilerplate regions whose
/// contents are never offered as capture candidates.
///
/// `ad`/`ads` use word boundaries so that `header`, `loader` or `read-more`
/// are not mistaken for advertisement slots.
pub static LANDMARK_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(sidebar|comment|\bads?\b|\badvert|sponsor|social|\bshare\b|sharing|related|breadcrumb|^nav$|navbar|navigation|\bmenu\b)",
    )
    .expect("LANDMARK_CLASS regex")
});

/// Matches class names or `data-theme` values announcing a dark page theme.
pub static DARK_THEME_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[-_\s])(dark|night)([-_\s]|$)").expect("DARK_THEME_CLASS regex")
});

// =============================================================================
// CSS Colour Parsing
// =============================================================================

/// Matches a `background` or `background-color` declaration in an inline style.
pub static BACKGROUND_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*background(?:-color)?\s*:\s*([^;]+)").expect("BACKGROUND_DECL regex")
});

/// Matches `rgb()` / `rgba()` functional notation (comma or space separated).
pub static RGB_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^rgba?\(\s*([\d.]+)\s*[,\s]\s*([\d.]+)\s*[,\s]\s*([\d.]+)\s*(?:[,/]\s*([\d.]+)(%?)\s*)?\)$",
    )
    .expect("RGB_FUNCTION regex")
});

// =============================================================================
// Text Cleaning
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

/// Matches three or more consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("MULTIPLE_NEWLINES regex")
});

/// Matches a fenced-code language hint in a `class` attribute.
pub static CODE_LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:language|lang)-([\w+#.-]+)").expect("CODE_LANGUAGE_CLASS regex")
});

// =============================================================================
// Markdown Line Shapes (Logseq block conversion)
// =============================================================================

/// ATX heading line.
pub static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})\s+(.+)").expect("HEADING_LINE regex")
});

/// Unordered list item with its leading indentation.
pub static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)[-*+]\s+(.+)").expect("BULLET_LINE regex")
});

/// Ordered list item with its leading indentation.
pub static ORDERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)\d+\.\s+(.+)").expect("ORDERED_LINE regex")
});

/// Horizontal rule.
pub static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*_]{3,}\s*$").expect("RULE_LINE regex")
});

/// Blockquote marker at the start of a line.
pub static QUOTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^>\s*").expect("QUOTE_PREFIX regex")
});

// =============================================================================
// Templates and Paths
// =============================================================================

/// `{{variable}}` placeholder in a clip template.
pub static TEMPLATE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\w+)\}\}").expect("TEMPLATE_VAR regex")
});

/// `$VAR` or `${VAR}` environment reference in a configured path.
pub static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("ENV_VAR regex")
});

/// Characters Logseq cannot keep in a page filename.
pub static PAGE_FILENAME_RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[/\\:*?"<>|]"#).expect("PAGE_FILENAME_RESERVED regex")
});

// =============================================================================
// CSS Selectors
// =============================================================================

/// Containers tried in order when looking for the page's main content region.
pub const CONTENT_ROOT_SELECTORS: &[&str] = &[
    "article",
    "[role='main']",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".post-body",
    ".article-body",
    "#content",
    ".content",
];

/// Structural landmark tags whose descendants are never candidates.
pub const LANDMARK_TAGS: &str = "nav, header, footer, aside";

/// Elements rendered as blocks: text on either side ends up on its own line.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul",
];

/// Elements whose text never renders.
pub const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];
