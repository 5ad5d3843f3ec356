//! Navigation and boilerplate landmark detection.

use std::collections::HashSet;

use dom_query::{NodeId, NodeRef, Selection};

use crate::patterns::{LANDMARK_CLASS, LANDMARK_TAGS};

/// Ids of every landmark element under a root, precomputed once per scan so
/// that each candidate costs one ancestor walk of O(1) lookups.
pub(crate) struct LandmarkCache {
    root: NodeId,
    landmark_ids: HashSet<NodeId>,
}

impl LandmarkCache {
    pub(crate) fn new(root: &NodeRef) -> Self {
        let scope = Selection::from(*root);
        let mut landmark_ids = HashSet::new();

        for node in scope.select(LANDMARK_TAGS).nodes() {
            landmark_ids.insert(node.id);
        }

        // Only elements that carry a class or id can match by name
        for node in scope.select("[class], [id]").nodes() {
            let sel = Selection::from(*node);
            let named = |name: &str| sel.attr(name).is_some_and(|v| LANDMARK_CLASS.is_match(&v));
            if named("class") || named("id") {
                landmark_ids.insert(node.id);
            }
        }

        Self {
            root: root.id,
            landmark_ids,
        }
    }

    /// Whether `node` is, or sits inside, a landmark below the scan root.
    ///
    /// The walk stops at the root: a content region that itself lives in an
    /// oddly-named wrapper must still yield candidates.
    pub(crate) fn is_inside_landmark(&self, node: &NodeRef) -> bool {
        let mut current = Some(*node);
        while let Some(n) = current {
            if n.id == self.root {
                return false;
            }
            if self.landmark_ids.contains(&n.id) {
                return true;
            }
            current = n.parent();
        }
        false
    }
}
