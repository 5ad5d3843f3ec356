//! Which candidates are currently included in the capture.

use std::collections::BTreeSet;

use super::mode::Mode;

/// Included subset of a session's candidates, stored as candidate positions.
///
/// Every position below `total` is either in the set (included) or not
/// (excluded), so the two states always partition the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inclusion {
    included: BTreeSet<usize>,
    total: usize,
}

impl Inclusion {
    /// Initial state for `mode` over `total` candidates.
    #[must_use]
    pub fn seeded(mode: Mode, total: usize) -> Self {
        let included = if mode.initial_inclusion() {
            (0..total).collect()
        } else {
            BTreeSet::new()
        };
        Self { included, total }
    }

    /// Back to the mode's initial state.
    pub fn reset(&mut self, mode: Mode) {
        *self = Self::seeded(mode, self.total);
    }

    /// Flip a candidate; returns its new state, or `None` for an unknown
    /// position.
    pub fn toggle(&mut self, position: usize) -> Option<bool> {
        if position >= self.total {
            return None;
        }
        if self.included.remove(&position) {
            Some(false)
        } else {
            self.included.insert(position);
            Some(true)
        }
    }

    #[must_use]
    pub fn is_included(&self, position: usize) -> bool {
        self.included.contains(&position)
    }

    /// Included positions in ascending order.
    pub fn included(&self) -> impl Iterator<Item = usize> + '_ {
        self.included.iter().copied()
    }

    /// Excluded positions in ascending order.
    pub fn excluded(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.total).filter(|p| !self.included.contains(p))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.included.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}
