//! The injected toolbar overlay: status line, counter, controls and colour bar.

use crate::dom::{self, NodeId, Selection};
use crate::highlight::PaletteKind;
use crate::page::Page;

pub const TOOLBAR_ID: &str = "lc-picker-toolbar";
const SWATCH_ATTR: &str = "data-lc-swatch";
const ACTION_ATTR: &str = "data-lc-action";

const STYLE: &str = "\
#lc-picker-toolbar{position:fixed;top:12px;right:12px;z-index:2147483647;display:flex;gap:8px;\
align-items:center;padding:8px 12px;border-radius:8px;background:#1f2328;color:#f5f5f5;\
font:13px/1.4 system-ui,sans-serif;box-shadow:0 4px 16px rgba(0,0,0,.3)}\
#lc-picker-toolbar button{cursor:pointer}\
#lc-picker-toolbar button[disabled]{opacity:.5;cursor:default}\
.lc-swatch{width:18px;height:18px;border-radius:50%;border:2px solid transparent}\
.lc-swatch.lc-armed{border-color:#f5f5f5}\
.lc-notice{color:#ffcc80}\
.lc-selected{outline:2px solid #2e7d32;outline-offset:2px}\
.lc-unselected{opacity:.35}\
.lc-hover-include{outline:2px dashed #43a047 !important}\
.lc-hover-exclude{outline:2px dashed #e53935 !important}";

/// Toolbar controls addressed by `data-lc-action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Reset,
    Cancel,
    Capture,
    TogglePalette,
}

impl ToolbarAction {
    fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Cancel => "cancel",
            Self::Capture => "capture",
            Self::TogglePalette => "palette",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        [Self::Reset, Self::Cancel, Self::Capture, Self::TogglePalette]
            .into_iter()
            .find(|a| a.name() == name)
    }
}

/// What the toolbar should currently show.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarView<'a> {
    pub status: &'a str,
    /// Included count; `None` hides the counter.
    pub selected: Option<usize>,
    pub capture_enabled: bool,
    pub notice: Option<&'a str>,
    pub palette: PaletteKind,
    pub armed: Option<usize>,
}

/// Handle to the mounted toolbar.
#[derive(Debug)]
pub struct Toolbar {
    node: NodeId,
}

impl Toolbar {
    /// Inject the toolbar at the end of `<body>`.
    pub fn mount(page: &Page, view: &ToolbarView<'_>) -> Self {
        let host = page.body().unwrap_or_else(|| page.document().root().id);
        let node = dom::new_element(page.document(), "div");
        dom::set_attr(&node, "id", TOOLBAR_ID);
        page.node(host).append_child(&node);
        let toolbar = Self { node: node.id };
        toolbar.render(page, view);
        toolbar
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn render(&self, page: &Page, view: &ToolbarView<'_>) {
        Selection::from(page.node(self.node)).set_html(markup(view));
    }

    /// Remove the toolbar from the page.
    pub fn remove(self, page: &Page) {
        page.node(self.node).remove_from_parent();
    }

    /// Whether `target` lies inside the toolbar.
    #[must_use]
    pub fn contains(&self, page: &Page, target: NodeId) -> bool {
        dom::contains(&page.node(self.node), &page.node(target))
    }

    /// Swatch index under `target`.
    #[must_use]
    pub fn swatch_at(&self, page: &Page, target: NodeId) -> Option<usize> {
        self.attr_at(page, target, SWATCH_ATTR)?.parse().ok()
    }

    /// Action button under `target`.
    #[must_use]
    pub fn action_at(&self, page: &Page, target: NodeId) -> Option<ToolbarAction> {
        ToolbarAction::from_name(&self.attr_at(page, target, ACTION_ATTR)?)
    }

    fn attr_at(&self, page: &Page, target: NodeId, name: &str) -> Option<String> {
        let start = page.node(target);
        let found = dom::closest(&start, |n| n.id == self.node || dom::attr(n, name).is_some())?;
        if found.id == self.node {
            return None;
        }
        dom::attr(&found, name)
    }

    /// The control carrying a swatch index, for hosts that route clicks.
    #[must_use]
    pub fn swatch(&self, page: &Page, index: usize) -> Option<NodeId> {
        let sel = format!("#{TOOLBAR_ID} [{SWATCH_ATTR}='{index}']");
        page.select_first(&sel)
    }

    /// The button for an action.
    #[must_use]
    pub fn button(&self, page: &Page, action: ToolbarAction) -> Option<NodeId> {
        let sel = format!("#{TOOLBAR_ID} [{ACTION_ATTR}='{}']", action.name());
        page.select_first(&sel)
    }
}

fn markup(view: &ToolbarView<'_>) -> String {
    let mut html = format!("<style>{STYLE}</style>");
    html.push_str(&format!(r#"<span class="lc-status">{}</span>"#, dom::escape_html(view.status)));
    if let Some(count) = view.selected {
        html.push_str(&format!(r#"<span class="lc-count">{count} selected</span>"#));
    }
    if let Some(notice) = view.notice {
        html.push_str(&format!(r#"<span class="lc-notice">{}</span>"#, dom::escape_html(notice)));
    }

    html.push_str(r#"<span class="lc-colors">"#);
    for (i, color) in view.palette.colors().iter().enumerate() {
        let armed = if view.armed == Some(i) { " lc-armed" } else { "" };
        html.push_str(&format!(
            r#"<button class="lc-swatch{armed}" {SWATCH_ATTR}="{i}" title="{}" style="background:{}"></button>"#,
            color.name, color.background
        ));
    }
    let other = match view.palette.toggled() {
        PaletteKind::Light => "Light colors",
        PaletteKind::Dark => "Dark colors",
    };
    html.push_str(&format!(r#"<button {ACTION_ATTR}="palette">{other}</button></span>"#));

    html.push_str(&format!(r#"<button {ACTION_ATTR}="reset">Reset</button>"#));
    html.push_str(&format!(r#"<button {ACTION_ATTR}="cancel">Cancel</button>"#));
    let disabled = if view.capture_enabled { "" } else { " disabled" };
    html.push_str(&format!(r#"<button {ACTION_ATTR}="capture"{disabled}>Capture</button>"#));
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(selected: usize) -> ToolbarView<'static> {
        ToolbarView {
            status: "Click elements",
            selected: Some(selected),
            capture_enabled: selected > 0,
            notice: None,
            palette: PaletteKind::Light,
            armed: Some(2),
        }
    }

    #[test]
    fn mounts_and_removes() {
        let page = Page::parse("<body><p>x</p></body>", "about:blank");
        let before = page.html();
        let toolbar = Toolbar::mount(&page, &view(3));

        assert!(page.select_first("#lc-picker-toolbar").is_some());
        let counter = page.select_first(".lc-count").expect("counter");
        assert_eq!(page.node(counter).text().to_string(), "3 selected");
        assert!(page.select_first(".lc-swatch.lc-armed[data-lc-swatch='2']").is_some());

        toolbar.remove(&page);
        assert_eq!(page.html(), before);
    }

    #[test]
    fn capture_disabled_at_zero() {
        let page = Page::parse("<body></body>", "about:blank");
        let toolbar = Toolbar::mount(&page, &view(0));
        let capture = toolbar.button(&page, ToolbarAction::Capture).expect("button");
        assert!(dom::attr(&page.node(capture), "disabled").is_some());

        toolbar.render(&page, &view(1));
        let capture = toolbar.button(&page, ToolbarAction::Capture).expect("button");
        assert!(dom::attr(&page.node(capture), "disabled").is_none());
    }

    #[test]
    fn targets_resolve_to_controls() {
        let page = Page::parse("<body><p id=\"p\">x</p></body>", "about:blank");
        let toolbar = Toolbar::mount(&page, &view(1));
        let swatch = toolbar.swatch(&page, 4).expect("swatch");
        assert_eq!(toolbar.swatch_at(&page, swatch), Some(4));
        let reset = toolbar.button(&page, ToolbarAction::Reset).expect("reset");
        assert_eq!(toolbar.action_at(&page, reset), Some(ToolbarAction::Reset));

        let p = page.select_first("#p").expect("p");
        assert!(!toolbar.contains(&page, p));
        assert!(toolbar.contains(&page, swatch));
        assert_eq!(toolbar.action_at(&page, p), None);
    }
}
