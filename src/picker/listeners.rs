//! Page listener registry and the scoped subscription a session holds.
//!
//! A session never binds or unbinds listeners by hand: it asks the page's
//! registry for a [`Subscription`] covering everything it needs, and dropping
//! that guard detaches all of it at once, whichever way the session ends.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Which anchor event a link blocker swallows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkEvent {
    Click,
    MouseDown,
    PointerDown,
    AuxClick,
}

impl LinkEvent {
    pub const ALL: [Self; 4] = [Self::Click, Self::MouseDown, Self::PointerDown, Self::AuxClick];
}

/// A listener the picker attaches to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    PointerMove,
    Click,
    MouseUp,
    KeyDown,
    SelectionChange,
    /// Capture-phase blocker on anchors.
    LinkBlock(LinkEvent),
}

impl Listener {
    /// Listeners a picker session installs: input handlers plus every link
    /// blocker.
    #[must_use]
    pub fn session_set() -> Vec<Self> {
        let mut set = vec![
            Self::PointerMove,
            Self::Click,
            Self::MouseUp,
            Self::KeyDown,
            Self::SelectionChange,
        ];
        set.extend(LinkEvent::ALL.into_iter().map(Self::LinkBlock));
        set
    }
}

/// Listeners currently attached to a page, grouped by owning subscription.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener)>>,
}

impl ListenerRegistry {
    /// Attach `listeners` and return the guard that detaches them.
    #[must_use = "dropping the subscription detaches its listeners immediately"]
    pub fn subscribe(self: &Rc<Self>, listeners: &[Listener]) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries
            .borrow_mut()
            .extend(listeners.iter().map(|listener| (id, *listener)));
        tracing::trace!(subscription = id, count = listeners.len(), "listeners attached");
        Subscription {
            registry: Rc::clone(self),
            id,
        }
    }

    /// Whether any subscription holds `listener`.
    #[must_use]
    pub fn is_listening(&self, listener: Listener) -> bool {
        self.entries.borrow().iter().any(|(_, l)| *l == listener)
    }

    /// Total attached listeners.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.borrow().len()
    }

    fn release(&self, id: u64) {
        self.entries.borrow_mut().retain(|(owner, _)| *owner != id);
        tracing::trace!(subscription = id, "listeners detached");
    }
}

/// Guard over a set of attached listeners.
#[derive(Debug)]
pub struct Subscription {
    registry: Rc<ListenerRegistry>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
