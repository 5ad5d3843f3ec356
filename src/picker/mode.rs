//! Session modes and their mode-specific behaviour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a session starts and what clicking a candidate means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Everything starts included; clicks remove.
    Remove,
    /// Nothing starts included; clicks add.
    Add,
    /// No element picking; the capture is the text selection.
    TextOnly,
}

/// What clicking a hovered candidate would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEffect {
    Include,
    Exclude,
}

impl HoverEffect {
    /// Class marking the hovered candidate.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Include => "lc-hover-include",
            Self::Exclude => "lc-hover-exclude",
        }
    }
}

impl Mode {
    /// Whether candidates start out included.
    #[must_use]
    pub fn initial_inclusion(self) -> bool {
        matches!(self, Self::Remove)
    }

    /// Whether this mode picks elements at all.
    #[must_use]
    pub fn picks_elements(self) -> bool {
        !matches!(self, Self::TextOnly)
    }

    /// Hover feedback for a candidate in the given state. A candidate still in
    /// its seeded state shows the mode's default action.
    #[must_use]
    pub fn hover_effect(self, included: bool) -> Option<HoverEffect> {
        match self {
            Self::Remove | Self::Add if included => Some(HoverEffect::Exclude),
            Self::Remove | Self::Add => Some(HoverEffect::Include),
            Self::TextOnly => None,
        }
    }

    /// Toolbar status line while no colour is armed.
    #[must_use]
    pub fn status(self) -> &'static str {
        match self {
            Self::Remove => "Click elements to remove them from the capture",
            Self::Add => "Click elements to add them to the capture",
            Self::TextOnly => "Select the text to capture",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remove => "remove",
            Self::Add => "add",
            Self::TextOnly => "text",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "add" => Ok(Self::Add),
            "text" | "textonly" | "text-only" => Ok(Self::TextOnly),
            other => Err(format!("unknown picker mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_differ_by_mode() {
        assert!(Mode::Remove.initial_inclusion());
        assert!(!Mode::Add.initial_inclusion());
        assert!(!Mode::TextOnly.initial_inclusion());
    }

    #[test]
    fn default_hover_differs_between_remove_and_add() {
        let remove = Mode::Remove.hover_effect(Mode::Remove.initial_inclusion());
        let add = Mode::Add.hover_effect(Mode::Add.initial_inclusion());
        assert_eq!(remove, Some(HoverEffect::Exclude));
        assert_eq!(add, Some(HoverEffect::Include));
        assert_eq!(Mode::TextOnly.hover_effect(false), None);
    }

    #[test]
    fn parse_mode_names() {
        assert_eq!("remove".parse::<Mode>(), Ok(Mode::Remove));
        assert_eq!("ADD".parse::<Mode>(), Ok(Mode::Add));
        assert_eq!("text".parse::<Mode>(), Ok(Mode::TextOnly));
        assert!("pick".parse::<Mode>().is_err());
        assert_eq!(Mode::TextOnly.to_string(), "text");
    }
}
