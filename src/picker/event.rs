//! Input events delivered by the host page and the picker's response to them.

use crate::dom::NodeId;
use crate::highlight::range::TextRange;
use crate::highlight::PaletteKind;
use crate::options::Platform;

/// Keys the picker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
    Other,
}

/// Modifier state of a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Self = Self { ctrl: true, ..Self::NONE };

    pub const META: Self = Self { meta: true, ..Self::NONE };
}

/// A DOM event as seen by the picker. Targets are the event's target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerEvent {
    PointerMove { target: NodeId },
    Click { target: NodeId },
    MouseDown { target: NodeId },
    PointerDown { target: NodeId },
    AuxClick { target: NodeId },
    MouseUp { target: NodeId },
    KeyDown { key: Key, modifiers: Modifiers },
    /// The document selection changed; `None` when it was cleared.
    SelectionChange { range: Option<TextRange> },
}

impl PickerEvent {
    /// Whether this is the undo chord on `platform`: `Cmd+Z` on macOS and
    /// `Ctrl+Z` elsewhere, without shift.
    #[must_use]
    pub fn is_undo(&self, platform: Platform) -> bool {
        let Self::KeyDown { key: Key::Char(c), modifiers } = self else {
            return false;
        };
        if !c.eq_ignore_ascii_case(&'z') || modifiers.shift || modifiers.alt {
            return false;
        }
        match platform {
            Platform::Mac => modifiers.meta && !modifiers.ctrl,
            Platform::Other => modifiers.ctrl && !modifiers.meta,
        }
    }
}

/// What a handled event changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    /// Hover feedback moved to a candidate (or was cleared).
    Hover(Option<usize>),
    Toggled { position: usize, included: bool },
    /// Armed swatch index after a swatch click.
    Armed(Option<usize>),
    PaletteSwitched(PaletteKind),
    /// A highlight marker was injected; the host should clear its selection.
    Highlighted(NodeId),
    /// The selection could not be wrapped and was left alone.
    HighlightDropped,
    Undone,
    Reset,
    /// A user-facing notice is shown and the session stays active.
    Notice(String),
    /// Link navigation was swallowed.
    Blocked,
    Cancelled,
    Captured { element_count: usize },
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub effect: Effect,
}

impl EventOutcome {
    /// Event passed through untouched.
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Event consumed by the picker.
    #[must_use]
    pub fn consumed(effect: Effect) -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
            effect,
        }
    }

    /// Event observed without interfering with the page.
    #[must_use]
    pub fn observed(effect: Effect) -> Self {
        Self {
            effect,
            ..Self::default()
        }
    }
}
