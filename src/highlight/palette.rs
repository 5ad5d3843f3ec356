//! Highlight colours and page-background detection.
//!
//! Two fixed palettes of six named colours exist, one tuned for light pages
//! and one for dark pages. Which one a session starts with depends on whether
//! the page looks dark; the user may switch mid-session, in which case the
//! armed colour is remapped by index.

use serde::Serialize;

use crate::dom::{self, NodeRef};
use crate::page::Page;
use crate::patterns::{BACKGROUND_DECL, DARK_THEME_CLASS, RGB_FUNCTION};

/// A highlight colour: display name plus text and background hex values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub name: &'static str,
    pub foreground: &'static str,
    pub background: &'static str,
}

/// Number of colours in each palette.
pub const PALETTE_LEN: usize = 6;

const LIGHT: [Color; PALETTE_LEN] = [
    Color { name: "Yellow", foreground: "#1f2328", background: "#fff176" },
    Color { name: "Green", foreground: "#1f2328", background: "#a5d6a7" },
    Color { name: "Blue", foreground: "#1f2328", background: "#90caf9" },
    Color { name: "Pink", foreground: "#1f2328", background: "#f48fb1" },
    Color { name: "Orange", foreground: "#1f2328", background: "#ffcc80" },
    Color { name: "Purple", foreground: "#1f2328", background: "#ce93d8" },
];

const DARK: [Color; PALETTE_LEN] = [
    Color { name: "Yellow", foreground: "#f5f5f5", background: "#7a6a00" },
    Color { name: "Green", foreground: "#f5f5f5", background: "#1e6b34" },
    Color { name: "Blue", foreground: "#f5f5f5", background: "#1d4f91" },
    Color { name: "Pink", foreground: "#f5f5f5", background: "#8c2a5b" },
    Color { name: "Orange", foreground: "#f5f5f5", background: "#8a4b00" },
    Color { name: "Purple", foreground: "#f5f5f5", background: "#5b2a86" },
];

/// Which palette is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    Light,
    Dark,
}

impl PaletteKind {
    /// The palette's colours, in swatch order.
    #[must_use]
    pub fn colors(self) -> &'static [Color; PALETTE_LEN] {
        match self {
            Self::Light => &LIGHT,
            Self::Dark => &DARK,
        }
    }

    /// Colour at a swatch index.
    #[must_use]
    pub fn color(self, index: usize) -> Option<Color> {
        self.colors().get(index).copied()
    }

    /// The other palette.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Palette matching a page's background.
    #[must_use]
    pub fn for_page(page: &Page) -> Self {
        if detect_dark_page(page) {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

/// Below this relative luminance a background counts as dark.
const DARK_LUMINANCE: f64 = 0.5;

/// Containers whose background is sampled, in order.
const SAMPLED_CONTAINERS: &[&str] = &["html", "body", "main", "article", "[role='main']", "#app", "#root"];

/// Decide whether the page is rendered on a dark background.
///
/// The first sampled container with an opaque background decides by
/// luminance. Without one, a `color-scheme` meta of `dark`, a dark
/// `theme-color`, or a dark-theme class/`data-theme` on `html`/`body` marks
/// the page dark. Otherwise it is light.
#[must_use]
pub fn detect_dark_page(page: &Page) -> bool {
    for selector in SAMPLED_CONTAINERS {
        let Some(id) = page.select_first(selector) else {
            continue;
        };
        if let Some(rgb) = element_background(&page.node(id)) {
            return luminance(rgb) < DARK_LUMINANCE;
        }
    }

    if let Some(id) = page.select_first("meta[name='color-scheme']") {
        let scheme = dom::attr(&page.node(id), "content").unwrap_or_default();
        if scheme.trim().eq_ignore_ascii_case("dark") || scheme.trim().eq_ignore_ascii_case("only dark") {
            return true;
        }
    }

    if let Some(id) = page.select_first("meta[name='theme-color']") {
        let theme = dom::attr(&page.node(id), "content").unwrap_or_default();
        if let Some(rgb) = parse_css_color(&theme) {
            if luminance(rgb) < DARK_LUMINANCE {
                return true;
            }
        }
    }

    ["html", "body"].iter().filter_map(|s| page.select_first(s)).any(|id| {
        let node = page.node(id);
        ["class", "data-theme", "data-color-mode"]
            .iter()
            .filter_map(|a| dom::attr(&node, a))
            .any(|v| DARK_THEME_CLASS.is_match(&v))
    })
}

/// Opaque background colour declared on an element.
fn element_background(node: &NodeRef) -> Option<[u8; 3]> {
    if let Some(style) = dom::attr(node, "style") {
        for caps in BACKGROUND_DECL.captures_iter(&style) {
            // `background` shorthands may list an image or position first
            let value = caps[1].trim();
            let found = parse_css_color(value).or_else(|| value.split_whitespace().find_map(parse_css_color));
            if found.is_some() {
                return found;
            }
        }
    }
    dom::attr(node, "bgcolor").as_deref().and_then(parse_css_color)
}

/// Relative luminance in `0.0..=1.0`.
#[must_use]
pub fn luminance([r, g, b]: [u8; 3]) -> f64 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}

/// Parse an opaque CSS colour: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
/// `rgba()`, or one of a few keywords. Fully transparent colours yield `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_css_color(value: &str) -> Option<[u8; 3]> {
    let value = value.trim().trim_end_matches("!important").trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(caps) = RGB_FUNCTION.captures(&value) {
        let channel = |i: usize| -> Option<u8> {
            let v: f64 = caps.get(i)?.as_str().parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        };
        if let Some(alpha) = caps.get(4) {
            let a: f64 = alpha.as_str().parse().ok()?;
            let is_percent = caps.get(5).is_some_and(|m| !m.as_str().is_empty());
            if a <= 0.0 || (!is_percent && a < 0.01) {
                return None;
            }
        }
        return Some([channel(1)?, channel(2)?, channel(3)?]);
    }

    match value.as_str() {
        "black" => Some([0, 0, 0]),
        "white" => Some([255, 255, 255]),
        "gray" | "grey" => Some([128, 128, 128]),
        "navy" => Some([0, 0, 128]),
        "silver" => Some([192, 192, 192]),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let digit = |c: char| c.to_digit(16).and_then(|d| u8::try_from(d).ok());
    let chars: Vec<char> = hex.chars().collect();
    match chars.len() {
        3 | 4 => {
            if chars.len() == 4 && digit(chars[3])? == 0 {
                return None;
            }
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(&chars) {
                let d = digit(*c)?;
                *slot = d * 16 + d;
            }
            Some(out)
        }
        6 | 8 => {
            let byte = |i: usize| Some(digit(chars[i])? * 16 + digit(chars[i + 1])?);
            if chars.len() == 8 && byte(6)? == 0 {
                return None;
            }
            Some([byte(0)?, byte(2)?, byte(4)?])
        }
        _ => None,
    }
}
