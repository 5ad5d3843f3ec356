//! Class ledger: remembers each touched element's original `class` attribute.

use std::collections::HashMap;

use crate::dom::{self, NodeId};
use crate::page::Page;

/// Original `class` attribute of every element a session has restyled.
#[derive(Debug, Default)]
pub struct ClassLedger {
    originals: HashMap<NodeId, Option<String>>,
}

impl ClassLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&mut self, page: &Page, id: NodeId) {
        self.originals
            .entry(id)
            .or_insert_with(|| dom::attr(&page.node(id), "class"));
    }

    /// Add a class token to an element.
    pub fn add_class(&mut self, page: &Page, id: NodeId, class: &str) {
        self.remember(page, id);
        let node = page.node(id);
        let current = dom::attr(&node, "class").unwrap_or_default();
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let updated = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {class}", current.trim_end())
        };
        dom::set_attr(&node, "class", &updated);
    }

    /// Remove a class token from an element.
    pub fn remove_class(&mut self, page: &Page, id: NodeId, class: &str) {
        let node = page.node(id);
        let Some(current) = dom::attr(&node, "class") else {
            return;
        };
        if !current.split_whitespace().any(|c| c == class) {
            return;
        }
        self.remember(page, id);
        let updated: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        dom::set_attr(&node, "class", &updated.join(" "));
    }

    /// Put every touched element's `class` attribute back exactly as it was.
    pub fn restore(&mut self, page: &Page) {
        for (id, original) in self.originals.drain() {
            let node = page.node(id);
            match original {
                Some(value) => dom::set_attr(&node, "class", &value),
                None => dom::remove_attr(&node, "class"),
            }
        }
    }

    /// Number of elements touched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_is_exact() {
        let page = Page::parse(
            r#"<p id="a" class="  lead   intro ">x</p><p id="b">y</p>"#,
            "about:blank",
        );
        let before = page.html();
        let a = page.select_first("#a").expect("a");
        let b = page.select_first("#b").expect("b");

        let mut ledger = ClassLedger::new();
        ledger.add_class(&page, a, "lc-selected");
        ledger.add_class(&page, b, "lc-unselected");
        ledger.remove_class(&page, b, "lc-unselected");
        ledger.add_class(&page, b, "lc-selected");
        assert_eq!(dom::attr(&page.node(a), "class").as_deref(), Some("  lead   intro lc-selected"));
        assert_eq!(ledger.len(), 2);

        ledger.restore(&page);
        assert!(ledger.is_empty());
        assert_eq!(page.html(), before);
    }

    #[test]
    fn add_is_idempotent() {
        let page = Page::parse(r#"<p id="a">x</p>"#, "about:blank");
        let a = page.select_first("#a").expect("a");
        let mut ledger = ClassLedger::new();
        ledger.add_class(&page, a, "lc-selected");
        ledger.add_class(&page, a, "lc-selected");
        assert_eq!(dom::attr(&page.node(a), "class").as_deref(), Some("lc-selected"));
    }

    #[test]
    fn removing_an_absent_class_touches_nothing() {
        let page = Page::parse(r#"<p id="a">x</p>"#, "about:blank");
        let a = page.select_first("#a").expect("a");
        let mut ledger = ClassLedger::new();
        ledger.remove_class(&page, a, "lc-hover-include");
        assert!(ledger.is_empty());
    }
}
