//! State of one active picker session.

use crate::capture::{CapturePayload, HighlightRecord};
use crate::dom::{self, NodeId};
use crate::error::{Error, Result};
use crate::highlight::range::{self, TextRange};
use crate::highlight::{Annotation, Color, HighlightStack, PaletteKind, PALETTE_LEN};
use crate::index::{self, CandidateIndex};
use crate::options::{PickerOptions, Platform};
use crate::page::Page;

use super::event::{Effect, EventOutcome, Key, PickerEvent};
use super::inclusion::Inclusion;
use super::ledger::ClassLedger;
use super::listeners::{LinkEvent, Listener, Subscription};
use super::mode::{HoverEffect, Mode};
use super::toolbar::{Toolbar, ToolbarAction, ToolbarView};

const SELECTED_CLASS: &str = "lc-selected";
const UNSELECTED_CLASS: &str = "lc-unselected";

const ARMED_STATUS: &str = "Select text to highlight";
const NOTHING_INCLUDED: &str = "Select at least one element to capture";
const NOTHING_SELECTED: &str = "Select some text to capture";

/// What the controller must do after the session handled an event.
pub(crate) enum Handled {
    Done(EventOutcome),
    Cancel,
    Capture,
}

impl From<EventOutcome> for Handled {
    fn from(outcome: EventOutcome) -> Self {
        Self::Done(outcome)
    }
}

/// One activation of the picker, from start to teardown.
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    platform: Platform,
    index: CandidateIndex,
    inclusion: Inclusion,
    highlights: HighlightStack,
    palette: PaletteKind,
    armed: Option<usize>,
    selection: Option<TextRange>,
    hovered: Option<(usize, HoverEffect)>,
    notice: Option<&'static str>,
    ledger: ClassLedger,
    toolbar: Toolbar,
    _subscription: Subscription,
}

impl Session {
    pub(crate) fn start(page: &Page, mode: Mode, options: &PickerOptions) -> Self {
        let index = if mode.picks_elements() {
            index::scan(page, &options.index)
        } else {
            CandidateIndex::empty()
        };
        let inclusion = Inclusion::seeded(mode, index.len());
        let palette = options.palette.unwrap_or_else(|| PaletteKind::for_page(page));

        let mut ledger = ClassLedger::new();
        for (position, candidate) in index.candidates().iter().enumerate() {
            let class = if inclusion.is_included(position) {
                SELECTED_CLASS
            } else {
                UNSELECTED_CLASS
            };
            ledger.add_class(page, candidate.node, class);
        }

        let view = ToolbarView {
            status: mode.status(),
            selected: mode.picks_elements().then_some(inclusion.count()),
            capture_enabled: !mode.picks_elements() || inclusion.count() > 0,
            notice: None,
            palette,
            armed: None,
        };
        let toolbar = Toolbar::mount(page, &view);
        let subscription = page.listeners().subscribe(&Listener::session_set());

        tracing::debug!(%mode, candidates = index.len(), ?palette, "picker session started");

        Self {
            mode,
            platform: options.platform,
            index,
            inclusion,
            highlights: HighlightStack::new(),
            palette,
            armed: None,
            selection: None,
            hovered: None,
            notice: None,
            ledger,
            toolbar,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn index(&self) -> &CandidateIndex {
        &self.index
    }

    #[must_use]
    pub fn inclusion(&self) -> &Inclusion {
        &self.inclusion
    }

    /// Included elements in candidate order.
    #[must_use]
    pub fn included_nodes(&self) -> Vec<NodeId> {
        self.inclusion
            .included()
            .filter_map(|p| self.index.get(p))
            .map(|c| c.node)
            .collect()
    }

    #[must_use]
    pub fn highlights(&self) -> &HighlightStack {
        &self.highlights
    }

    #[must_use]
    pub fn palette(&self) -> PaletteKind {
        self.palette
    }

    /// Armed swatch index.
    #[must_use]
    pub fn armed(&self) -> Option<usize> {
        self.armed
    }

    /// Colour the next highlight will use, derived from the armed index and
    /// the current palette.
    #[must_use]
    pub fn armed_color(&self) -> Option<Color> {
        self.armed.and_then(|i| self.palette.color(i))
    }

    #[must_use]
    pub fn selection(&self) -> Option<&TextRange> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice
    }

    #[must_use]
    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    fn has_selection(&self) -> bool {
        self.selection.is_some_and(|r| !r.is_collapsed())
    }

    fn render(&self, page: &Page) {
        let picks = self.mode.picks_elements();
        let view = ToolbarView {
            status: if self.armed.is_some() {
                ARMED_STATUS
            } else {
                self.mode.status()
            },
            selected: picks.then_some(self.inclusion.count()),
            capture_enabled: !picks || self.inclusion.count() > 0,
            notice: self.notice,
            palette: self.palette,
            armed: self.armed,
        };
        self.toolbar.render(page, &view);
    }

    fn paint(&mut self, page: &Page, position: usize) {
        let Some(candidate) = self.index.get(position) else {
            return;
        };
        let (add, remove) = if self.inclusion.is_included(position) {
            (SELECTED_CLASS, UNSELECTED_CLASS)
        } else {
            (UNSELECTED_CLASS, SELECTED_CLASS)
        };
        self.ledger.remove_class(page, candidate.node, remove);
        self.ledger.add_class(page, candidate.node, add);
    }

    // === Hover ===

    pub(crate) fn clear_hover(&mut self, page: &Page) {
        if let Some((position, effect)) = self.hovered.take() {
            if let Some(candidate) = self.index.get(position) {
                self.ledger.remove_class(page, candidate.node, effect.class());
            }
        }
    }

    /// Show hover feedback for the candidate under `target`.
    pub(crate) fn hover(&mut self, page: &Page, target: NodeId) -> Option<usize> {
        if self.armed.is_some() || self.toolbar.contains(page, target) {
            self.clear_hover(page);
            return None;
        }
        let position = self.index.nearest(page, target);
        let effect = position.and_then(|p| self.mode.hover_effect(self.inclusion.is_included(p)));
        let next = position.zip(effect);
        if next == self.hovered {
            return position;
        }
        self.clear_hover(page);
        if let Some((position, effect)) = next {
            if let Some(candidate) = self.index.get(position) {
                self.ledger.add_class(page, candidate.node, effect.class());
            }
            self.hovered = Some((position, effect));
        }
        next.map(|(p, _)| p)
    }

    // === Inclusion ===

    /// Flip the candidate at `position`.
    pub(crate) fn toggle_position(&mut self, page: &Page, position: usize) -> Option<bool> {
        let included = self.inclusion.toggle(position)?;
        self.paint(page, position);
        if self.hovered.is_some_and(|(p, _)| p == position) {
            self.clear_hover(page);
            if let Some(effect) = self.mode.hover_effect(included) {
                if let Some(candidate) = self.index.get(position) {
                    self.ledger.add_class(page, candidate.node, effect.class());
                }
                self.hovered = Some((position, effect));
            }
        }
        self.notice = None;
        self.render(page);
        tracing::trace!(position, included, count = self.inclusion.count(), "candidate toggled");
        Some(included)
    }

    /// Flip the candidate nearest to `target`.
    pub(crate) fn toggle_node(&mut self, page: &Page, target: NodeId) -> Option<(usize, bool)> {
        let position = self.index.nearest(page, target)?;
        self.toggle_position(page, position).map(|included| (position, included))
    }

    pub(crate) fn reset(&mut self, page: &Page) {
        self.inclusion.reset(self.mode);
        for position in 0..self.index.len() {
            self.paint(page, position);
        }
        self.clear_hover(page);
        self.notice = None;
        self.render(page);
    }

    // === Colours and highlights ===

    /// Arm swatch `index`, or disarm it when it is already armed.
    pub(crate) fn arm_color(&mut self, page: &Page, index: usize) -> Option<usize> {
        if index >= PALETTE_LEN {
            return self.armed;
        }
        self.armed = if self.armed == Some(index) { None } else { Some(index) };
        if self.armed.is_some() {
            self.clear_hover(page);
        }
        self.render(page);
        self.armed
    }

    pub(crate) fn toggle_palette(&mut self, page: &Page) -> PaletteKind {
        self.palette = self.palette.toggled();
        self.render(page);
        self.palette
    }

    pub(crate) fn set_selection(&mut self, range: Option<TextRange>) {
        self.selection = range;
    }

    /// Wrap the current selection, expanded to whole words, in the armed
    /// colour. Failures leave the page untouched and return `None`.
    pub(crate) fn highlight_selection(&mut self, page: &Page) -> Option<NodeId> {
        let color = self.armed_color()?;
        let selection = self.selection.filter(|r| !r.is_collapsed())?;
        if self.toolbar.contains(page, selection.start.node) || self.toolbar.contains(page, selection.end.node) {
            return None;
        }

        let attempt = range::expand_to_words(page, &selection).and_then(|expanded| {
            let text = range::range_text(page, &expanded)?;
            if text.trim().is_empty() {
                return Err(Error::RangeWrap("selection holds no text".to_string()));
            }
            let wrapper = range::wrap_range(page, &expanded, &color)?;
            Ok(Annotation { wrapper, text, color })
        });

        match attempt {
            Ok(annotation) => {
                let wrapper = annotation.wrapper;
                tracing::debug!(text = annotation.text.as_str(), color = color.name, "highlight created");
                self.highlights.push(annotation);
                self.selection = None;
                Some(wrapper)
            }
            Err(err) => {
                tracing::debug!(error = %err, "highlight dropped");
                None
            }
        }
    }

    pub(crate) fn undo(&mut self, page: &Page) -> bool {
        let undone = self.highlights.undo(page).is_some();
        if undone {
            self.selection = None;
        }
        undone
    }

    // === Events ===

    fn is_link(page: &Page, target: NodeId) -> bool {
        dom::closest(&page.node(target), |n| {
            dom::is_tag(n, &["a", "area"]) && dom::attr(n, "href").is_some()
        })
        .is_some()
    }

    fn block_link(&self, page: &Page, target: NodeId, event: LinkEvent) -> bool {
        page.listeners().is_listening(Listener::LinkBlock(event))
            && !self.toolbar.contains(page, target)
            && Self::is_link(page, target)
    }

    pub(crate) fn handle(&mut self, page: &Page, event: &PickerEvent) -> Handled {
        match *event {
            PickerEvent::PointerMove { target } => EventOutcome::observed(Effect::Hover(self.hover(page, target))).into(),
            PickerEvent::MouseDown { target } => self.swallow_link(page, target, LinkEvent::MouseDown),
            PickerEvent::PointerDown { target } => self.swallow_link(page, target, LinkEvent::PointerDown),
            PickerEvent::AuxClick { target } => self.swallow_link(page, target, LinkEvent::AuxClick),
            PickerEvent::Click { target } => self.click(page, target),
            PickerEvent::MouseUp { target } => self.mouse_up(page, target).into(),
            PickerEvent::KeyDown { key, .. } => {
                if event.is_undo(self.platform) {
                    return if self.undo(page) {
                        EventOutcome::consumed(Effect::Undone).into()
                    } else {
                        EventOutcome::ignored().into()
                    };
                }
                match key {
                    Key::Escape => Handled::Cancel,
                    Key::Enter => Handled::Capture,
                    Key::Char(_) | Key::Other => EventOutcome::ignored().into(),
                }
            }
            PickerEvent::SelectionChange { range } => {
                self.set_selection(range);
                EventOutcome::ignored().into()
            }
        }
    }

    fn swallow_link(&self, page: &Page, target: NodeId, event: LinkEvent) -> Handled {
        if self.block_link(page, target, event) {
            EventOutcome::consumed(Effect::Blocked).into()
        } else {
            EventOutcome::ignored().into()
        }
    }

    fn click(&mut self, page: &Page, target: NodeId) -> Handled {
        if self.toolbar.contains(page, target) {
            return self.toolbar_click(page, target);
        }

        let link = self.block_link(page, target, LinkEvent::Click);
        let passthrough = || {
            if link {
                EventOutcome::consumed(Effect::Blocked)
            } else {
                EventOutcome::ignored()
            }
        };

        if self.armed.is_some() || self.has_selection() || !self.mode.picks_elements() {
            return passthrough().into();
        }
        match self.toggle_node(page, target) {
            Some((position, included)) => EventOutcome::consumed(Effect::Toggled { position, included }).into(),
            None => passthrough().into(),
        }
    }

    fn toolbar_click(&mut self, page: &Page, target: NodeId) -> Handled {
        if let Some(index) = self.toolbar.swatch_at(page, target) {
            return EventOutcome::consumed(Effect::Armed(self.arm_color(page, index))).into();
        }
        match self.toolbar.action_at(page, target) {
            Some(ToolbarAction::Reset) => {
                self.reset(page);
                EventOutcome::consumed(Effect::Reset).into()
            }
            Some(ToolbarAction::TogglePalette) => {
                EventOutcome::consumed(Effect::PaletteSwitched(self.toggle_palette(page))).into()
            }
            Some(ToolbarAction::Cancel) => Handled::Cancel,
            Some(ToolbarAction::Capture) => Handled::Capture,
            None => EventOutcome::consumed(Effect::None).into(),
        }
    }

    fn mouse_up(&mut self, page: &Page, target: NodeId) -> EventOutcome {
        if self.armed.is_none() || !self.has_selection() || self.toolbar.contains(page, target) {
            return EventOutcome::ignored();
        }
        match self.highlight_selection(page) {
            Some(wrapper) => EventOutcome::observed(Effect::Highlighted(wrapper)),
            None => EventOutcome::observed(Effect::HighlightDropped),
        }
    }

    // === Capture and teardown ===

    fn refuse(&mut self, page: &Page, notice: &'static str) -> Error {
        self.notice = Some(notice);
        self.render(page);
        tracing::debug!(notice, "capture refused");
        Error::NoContent
    }

    /// Build the capture payload.
    ///
    /// With nothing to capture a notice is shown and the session stays
    /// usable. Otherwise picker classes are already gone from the
    /// serialized HTML; highlight markers are kept.
    pub(crate) fn take_payload(&mut self, page: &Page) -> Result<CapturePayload> {
        let highlights: Vec<HighlightRecord> = self.highlights.iter().map(HighlightRecord::from).collect();

        if !self.mode.picks_elements() {
            let payload = self
                .selection
                .ok_or(Error::NoContent)
                .and_then(|selection| CapturePayload::from_selection(page, &selection, highlights));
            return payload.map_err(|err| {
                tracing::debug!(error = %err, "text capture failed");
                self.refuse(page, NOTHING_SELECTED)
            });
        }

        if self.inclusion.count() == 0 {
            return Err(self.refuse(page, NOTHING_INCLUDED));
        }
        self.clear_hover(page);
        self.ledger.restore(page);
        Ok(CapturePayload::from_elements(page, &self.included_nodes(), highlights))
    }

    /// Undo every change the session made to the page.
    pub(crate) fn teardown(mut self, page: &Page) {
        self.highlights.unwrap_all(page);
        self.clear_hover(page);
        self.ledger.restore(page);
        self.toolbar.remove(page);
        tracing::debug!(mode = %self.mode, "picker session ended");
        // the subscription guard drops here and detaches every listener
    }
}
