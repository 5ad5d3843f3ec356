//! Picker State Machine
//!
//! A [`Picker`] is the single controller for one page. It is idle until
//! [`Picker::start`] creates a [`Session`]; the session lives until it is
//! cancelled or captured, and both paths restore the page exactly. A
//! `start` while any session is active on the same page is rejected.
//!
//! Browser input arrives through [`Picker::dispatch`]; every operation is
//! also callable directly.

pub mod event;
pub mod inclusion;
pub mod ledger;
pub mod listeners;
pub mod mode;
mod session;
pub mod toolbar;

pub use event::{Effect, EventOutcome, Key, Modifiers, PickerEvent};
pub use inclusion::Inclusion;
pub use ledger::ClassLedger;
pub use listeners::{LinkEvent, Listener, ListenerRegistry, Subscription};
pub use mode::{HoverEffect, Mode};
pub use session::Session;
pub use toolbar::{Toolbar, ToolbarAction};

use crate::capture::CaptureSink;
use crate::dom::NodeId;
use crate::error::{Error, Result};
use crate::highlight::range::TextRange;
use crate::highlight::PaletteKind;
use crate::options::PickerOptions;
use crate::page::Page;

use session::Handled;

/// Result of [`Picker::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already running; nothing changed.
    AlreadyActive,
}

/// Controller owning at most one picker session on a page.
pub struct Picker<'p, S: CaptureSink> {
    page: &'p Page,
    options: PickerOptions,
    session: Option<Session>,
    sink: S,
}

impl<'p, S: CaptureSink> Picker<'p, S> {
    /// An idle picker with default options.
    pub fn new(page: &'p Page, sink: S) -> Self {
        Self::with_options(page, PickerOptions::default(), sink)
    }

    pub fn with_options(page: &'p Page, options: PickerOptions, sink: S) -> Self {
        Self {
            page,
            options,
            session: None,
            sink,
        }
    }

    /// Begin a session unless one is already active on the page, whether
    /// owned by this picker or another one.
    pub fn start(&mut self, mode: Mode) -> StartOutcome {
        // only a live session subscribes element clicks
        if self.session.is_some() || self.page.listeners().is_listening(Listener::Click) {
            tracing::debug!(%mode, "start ignored, session already active");
            return StartOutcome::AlreadyActive;
        }
        self.session = Some(Session::start(self.page, mode, &self.options));
        StartOutcome::Started
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn page(&self) -> &'p Page {
        self.page
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Route one input event.
    ///
    /// Events the session has no listener for pass through untouched, as do
    /// all events while idle.
    pub fn dispatch(&mut self, event: &PickerEvent) -> EventOutcome {
        let listener = match event {
            PickerEvent::PointerMove { .. } => Listener::PointerMove,
            PickerEvent::Click { .. } => Listener::Click,
            PickerEvent::MouseDown { .. } => Listener::LinkBlock(LinkEvent::MouseDown),
            PickerEvent::PointerDown { .. } => Listener::LinkBlock(LinkEvent::PointerDown),
            PickerEvent::AuxClick { .. } => Listener::LinkBlock(LinkEvent::AuxClick),
            PickerEvent::MouseUp { .. } => Listener::MouseUp,
            PickerEvent::KeyDown { .. } => Listener::KeyDown,
            PickerEvent::SelectionChange { .. } => Listener::SelectionChange,
        };
        if !self.page.listeners().is_listening(listener) {
            return EventOutcome::ignored();
        }
        let Some(session) = self.session.as_mut() else {
            return EventOutcome::ignored();
        };

        match session.handle(self.page, event) {
            Handled::Done(outcome) => outcome,
            Handled::Cancel => {
                self.cancel();
                EventOutcome::consumed(Effect::Cancelled)
            }
            Handled::Capture => match self.capture() {
                Ok(element_count) => EventOutcome::consumed(Effect::Captured { element_count }),
                Err(_) => {
                    let notice = self.session().and_then(Session::notice).unwrap_or_default();
                    EventOutcome::consumed(Effect::Notice(notice.to_string()))
                }
            },
        }
    }

    /// Flip the candidate nearest to `target`; returns its new state.
    pub fn toggle(&mut self, target: NodeId) -> Option<bool> {
        let session = self.session.as_mut()?;
        if !session.mode().picks_elements() {
            return None;
        }
        session.toggle_node(self.page, target).map(|(_, included)| included)
    }

    /// Click swatch `index`; returns the armed index afterwards.
    pub fn arm_color(&mut self, index: usize) -> Option<usize> {
        self.session.as_mut()?.arm_color(self.page, index)
    }

    /// Switch palettes, keeping the armed index.
    pub fn toggle_palette(&mut self) -> Option<PaletteKind> {
        Some(self.session.as_mut()?.toggle_palette(self.page))
    }

    /// Record the document selection.
    pub fn set_selection(&mut self, range: Option<TextRange>) {
        if let Some(session) = self.session.as_mut() {
            session.set_selection(range);
        }
    }

    /// Highlight the current selection with the armed colour.
    pub fn highlight_selection(&mut self) -> Option<NodeId> {
        self.session.as_mut()?.highlight_selection(self.page)
    }

    /// Remove the most recent highlight.
    pub fn undo(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.undo(self.page))
    }

    /// Restore the mode's initial inclusion; highlights are kept.
    pub fn reset(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.reset(self.page);
        true
    }

    /// End the session without producing a payload.
    pub fn cancel(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        session.teardown(self.page);
        true
    }

    /// Build the payload, hand it to the sink and end the session.
    ///
    /// # Errors
    ///
    /// [`Error::NoSession`] while idle; [`Error::NoContent`] when nothing is
    /// included (or no text is selected in text mode). In that case a notice
    /// is shown and the session stays active.
    pub fn capture(&mut self) -> Result<usize> {
        let session = self.session.as_mut().ok_or(Error::NoSession)?;
        let payload = session.take_payload(self.page)?;
        let element_count = payload.element_count;
        tracing::debug!(element_count, highlights = payload.highlights.len(), "capture delivered");
        self.sink.deliver(payload);
        if let Some(session) = self.session.take() {
            session.teardown(self.page);
        }
        Ok(element_count)
    }
}

impl<S: CaptureSink> Drop for Picker<'_, S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown(self.page);
        }
    }
}

impl<S: CaptureSink + std::fmt::Debug> std::fmt::Debug for Picker<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picker")
            .field("page", &self.page.url())
            .field("session", &self.session)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}
