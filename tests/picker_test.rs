use logseq_clipper::dom::{self, NodeId};
use logseq_clipper::highlight::range::{find_text, markers};
use logseq_clipper::picker::{Inclusion, ToolbarAction};
use logseq_clipper::{
    Effect, Error, Key, Mode, Modifiers, Page, PaletteKind, Picker, PickerEvent, PickerOptions, Platform,
    StartOutcome, VecSink,
};

fn fixture() -> Page {
    let p1 = "Rust gives you control over memory without a garbage collector. ".repeat(4);
    let p2 = "Ownership rules are checked at compile time, not at run time. ".repeat(4);
    let html = format!(
        r#"<html><head><title>Picker fixture</title></head><body>
        <article class="post">
            <h2>Section heading</h2>
            <p id="p1">{p1}<a id="link" href="/next">read the next chapter</a></p>
            <p id="p2">{p2}</p>
            <nav><p>Navigation paragraph with enough text</p></nav>
        </article>
        </body></html>"#
    );
    Page::parse(&html, "https://example.com/post")
}

fn options() -> PickerOptions {
    PickerOptions {
        platform: Platform::Other,
        palette: Some(PaletteKind::Light),
        ..PickerOptions::default()
    }
}

fn id(page: &Page, selector: &str) -> NodeId {
    page.select_first(selector).expect("fixture element")
}

fn click(target: NodeId) -> PickerEvent {
    PickerEvent::Click { target }
}

fn key(key: Key) -> PickerEvent {
    PickerEvent::KeyDown {
        key,
        modifiers: Modifiers::NONE,
    }
}

fn has_class(page: &Page, node: NodeId, class: &str) -> bool {
    dom::attr(&page.node(node), "class").is_some_and(|c| c.split_whitespace().any(|t| t == class))
}

fn toolbar_count(page: &Page) -> usize {
    page.document().select("#lc-picker-toolbar").length()
}

#[test]
fn remove_mode_starts_with_everything_included() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    assert_eq!(picker.start(Mode::Remove), StartOutcome::Started);

    let session = picker.session().expect("session");
    assert_eq!(session.index().len(), 3);
    assert_eq!(session.inclusion().count(), 3);
    assert!(has_class(&page, id(&page, "#p1"), "lc-selected"));
}

#[test]
fn add_mode_starts_with_nothing_included() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Add);

    let session = picker.session().expect("session");
    assert_eq!(session.inclusion().count(), 0);
    assert_eq!(session.inclusion().excluded().count(), 3);
    assert!(has_class(&page, id(&page, "h2"), "lc-unselected"));
}

#[test]
fn add_toggle_twice_then_reset_is_initial_state() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Add);
    let p1 = id(&page, "#p1");

    let first = picker.dispatch(&click(p1));
    assert_eq!(first.effect, Effect::Toggled { position: 1, included: true });
    assert!(first.prevent_default);
    assert!(has_class(&page, p1, "lc-selected"));

    let second = picker.dispatch(&click(p1));
    assert_eq!(second.effect, Effect::Toggled { position: 1, included: false });
    assert!(picker.reset());

    let session = picker.session().expect("session");
    assert_eq!(session.inclusion(), &Inclusion::seeded(Mode::Add, 3));
    assert!(has_class(&page, p1, "lc-unselected"));
}

#[test]
fn reset_in_remove_mode_keeps_highlights() {
    let page = fixture();
    let before = page.html();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);
    let (h2, p1, p2) = (id(&page, "h2"), id(&page, "#p1"), id(&page, "#p2"));
    picker.toggle(h2);
    picker.toggle(p2);
    assert!(has_class(&page, p2, "lc-unselected"));

    picker.arm_color(0);
    let range = find_text(&page, "garbage collector").expect("text");
    picker.dispatch(&PickerEvent::SelectionChange { range: Some(range) });
    let outcome = picker.dispatch(&PickerEvent::MouseUp { target: p1 });
    assert!(matches!(outcome.effect, Effect::Highlighted(_)));
    assert_eq!(markers(&page).len(), 1);

    assert!(picker.reset());

    let session = picker.session().expect("session");
    assert_eq!(session.inclusion(), &Inclusion::seeded(Mode::Remove, 3));
    assert!(has_class(&page, h2, "lc-selected"));
    assert!(has_class(&page, p2, "lc-selected"));
    assert_eq!(session.highlights().len(), 1);
    assert_eq!(markers(&page).len(), 1);

    assert!(picker.cancel());
    assert!(markers(&page).is_empty());
    assert_eq!(page.html(), before);
}

#[test]
fn toggles_keep_included_and_excluded_a_partition() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);
    let targets = [id(&page, "h2"), id(&page, "#p2"), id(&page, "#p2"), id(&page, "#p1"), id(&page, "h2")];

    for target in targets {
        picker.dispatch(&click(target));
        let inclusion = picker.session().expect("session").inclusion();
        let mut all: Vec<usize> = inclusion.included().chain(inclusion.excluded()).collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2]);
    }
    let inclusion = picker.session().expect("session").inclusion();
    assert_eq!(inclusion.included().collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn capture_button_tracks_included_count() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Add);

    let capture_button = |picker: &Picker<'_, VecSink>| {
        let toolbar = picker.session().expect("session").toolbar();
        toolbar.button(&page, ToolbarAction::Capture).expect("capture button")
    };
    assert!(dom::attr(&page.node(capture_button(&picker)), "disabled").is_some());

    picker.toggle(id(&page, "h2"));
    assert!(dom::attr(&page.node(capture_button(&picker)), "disabled").is_none());
    let counter = page.document().select("#lc-picker-toolbar .lc-count").text();
    assert!(counter.contains('1'));
}

#[test]
fn hover_colour_depends_on_mode() {
    let page = fixture();
    let p2 = id(&page, "#p2");

    let mut remove = Picker::with_options(&page, options(), VecSink::new());
    remove.start(Mode::Remove);
    let outcome = remove.dispatch(&PickerEvent::PointerMove { target: p2 });
    assert_eq!(outcome.effect, Effect::Hover(Some(2)));
    assert!(!outcome.prevent_default);
    assert!(has_class(&page, p2, "lc-hover-exclude"));
    remove.cancel();

    let mut add = Picker::with_options(&page, options(), VecSink::new());
    add.start(Mode::Add);
    add.dispatch(&PickerEvent::PointerMove { target: p2 });
    assert!(has_class(&page, p2, "lc-hover-include"));

    add.dispatch(&PickerEvent::PointerMove { target: id(&page, "body") });
    assert!(!has_class(&page, p2, "lc-hover-include"));
}

#[test]
fn arming_the_same_swatch_twice_disarms() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);
    let swatch = picker.session().expect("session").toolbar().swatch(&page, 1).expect("swatch");

    assert_eq!(picker.dispatch(&click(swatch)).effect, Effect::Armed(Some(1)));
    assert_eq!(picker.session().expect("session").armed_color().map(|c| c.name), Some("Green"));
    let status = page.document().select("#lc-picker-toolbar .lc-status").text();
    assert_eq!(status.trim(), "Select text to highlight");

    let swatch = picker.session().expect("session").toolbar().swatch(&page, 1).expect("swatch");
    assert_eq!(picker.dispatch(&click(swatch)).effect, Effect::Armed(None));
    assert_eq!(picker.session().expect("session").armed(), None);
    assert!(page.select_first("#lc-picker-toolbar .lc-armed").is_none());
}

#[test]
fn armed_colour_suppresses_toggle_and_hover() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);
    picker.arm_color(0);
    let p1 = id(&page, "#p1");

    let outcome = picker.dispatch(&click(p1));
    assert_ne!(outcome.effect, Effect::Toggled { position: 1, included: false });
    assert_eq!(picker.session().expect("session").inclusion().count(), 3);

    assert_eq!(picker.dispatch(&PickerEvent::PointerMove { target: p1 }).effect, Effect::Hover(None));
    assert!(!has_class(&page, p1, "lc-hover-exclude"));
}

#[test]
fn palette_switch_keeps_index_and_remaps_colour() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);
    picker.arm_color(2);
    let light = picker.session().expect("session").armed_color().expect("armed");

    assert_eq!(picker.toggle_palette(), Some(PaletteKind::Dark));
    let session = picker.session().expect("session");
    let dark = session.armed_color().expect("armed");
    assert_eq!(session.armed(), Some(2));
    assert_eq!(light.name, dark.name);
    assert_ne!(light.background, dark.background);
}

#[test]
fn links_are_blocked_only_while_active() {
    let page = fixture();
    let link = id(&page, "#link");
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);

    for event in [
        PickerEvent::MouseDown { target: link },
        PickerEvent::PointerDown { target: link },
        PickerEvent::AuxClick { target: link },
    ] {
        let outcome = picker.dispatch(&event);
        assert!(outcome.prevent_default);
        assert!(outcome.stop_propagation);
        assert_eq!(outcome.effect, Effect::Blocked);
    }
    assert!(picker.dispatch(&click(link)).prevent_default);

    let plain = picker.dispatch(&PickerEvent::MouseDown { target: id(&page, "#p2") });
    assert!(!plain.prevent_default);

    picker.cancel();
    assert_eq!(page.listeners().count(), 0);
    let after = picker.dispatch(&PickerEvent::MouseDown { target: link });
    assert!(!after.prevent_default);
}

#[test]
fn second_start_is_rejected() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    assert_eq!(picker.start(Mode::Add), StartOutcome::Started);
    let listeners = page.listeners().count();

    assert_eq!(picker.start(Mode::Remove), StartOutcome::AlreadyActive);
    assert_eq!(picker.session().expect("session").mode(), Mode::Add);
    assert_eq!(toolbar_count(&page), 1);
    assert_eq!(page.listeners().count(), listeners);
}

#[test]
fn one_session_per_page_across_pickers() {
    let page = fixture();
    let before = page.html();
    let mut first = Picker::with_options(&page, options(), VecSink::new());
    let mut second = Picker::with_options(&page, options(), VecSink::new());

    assert_eq!(first.start(Mode::Remove), StartOutcome::Started);
    assert_eq!(second.start(Mode::Add), StartOutcome::AlreadyActive);
    assert!(!second.is_active());
    assert_eq!(toolbar_count(&page), 1);

    assert!(first.cancel());
    assert_eq!(page.html(), before);

    // the page is free again once the first session ends
    assert_eq!(second.start(Mode::Add), StartOutcome::Started);
    assert!(has_class(&page, id(&page, "h2"), "lc-unselected"));
    assert!(!has_class(&page, id(&page, "h2"), "lc-selected"));
    assert!(second.cancel());
    assert_eq!(page.html(), before);
}

#[test]
fn cancel_restores_the_page_exactly() {
    let page = fixture();
    let before = page.html();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Remove);

    picker.dispatch(&click(id(&page, "h2")));
    picker.dispatch(&PickerEvent::PointerMove { target: id(&page, "#p2") });
    picker.arm_color(3);
    let range = find_text(&page, "garbage coll").expect("text");
    picker.dispatch(&PickerEvent::SelectionChange { range: Some(range) });
    let highlighted = picker.dispatch(&PickerEvent::MouseUp { target: id(&page, "#p1") });
    assert!(matches!(highlighted.effect, Effect::Highlighted(_)));
    assert_ne!(page.html(), before);

    assert_eq!(picker.dispatch(&key(Key::Escape)).effect, Effect::Cancelled);
    assert!(!picker.is_active());
    assert_eq!(page.html(), before);
    assert_eq!(page.listeners().count(), 0);
    assert!(picker.sink().payloads().is_empty());
}

#[test]
fn cancel_button_ends_session() {
    let page = fixture();
    let before = page.html();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Add);
    let cancel = picker
        .session()
        .expect("session")
        .toolbar()
        .button(&page, ToolbarAction::Cancel)
        .expect("cancel button");

    assert_eq!(picker.dispatch(&click(cancel)).effect, Effect::Cancelled);
    assert_eq!(page.html(), before);
}

#[test]
fn dropping_the_picker_tears_down() {
    let page = fixture();
    let before = page.html();
    {
        let mut picker = Picker::with_options(&page, options(), VecSink::new());
        picker.start(Mode::Remove);
        picker.toggle(id(&page, "#p2"));
    }
    assert_eq!(page.html(), before);
    assert_eq!(page.listeners().count(), 0);
}

#[test]
fn capture_with_nothing_included_shows_notice() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Add);

    let outcome = picker.dispatch(&key(Key::Enter));
    assert_eq!(
        outcome.effect,
        Effect::Notice("Select at least one element to capture".to_string())
    );
    assert!(picker.is_active());
    assert!(matches!(picker.capture(), Err(Error::NoContent)));
    assert!(picker.sink().payloads().is_empty());
    let notice = page.document().select("#lc-picker-toolbar .lc-notice").text();
    assert!(notice.contains("Select at least one element"));

    // the notice clears on the next toggle
    picker.toggle(id(&page, "#p1"));
    assert_eq!(picker.session().expect("session").notice(), None);
}

#[test]
fn enter_captures_included_elements_in_document_order() {
    let page = fixture();
    let before = page.html();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::Add);
    picker.toggle(id(&page, "#p2"));
    picker.toggle(id(&page, "h2"));

    assert_eq!(
        picker.dispatch(&key(Key::Enter)).effect,
        Effect::Captured { element_count: 2 }
    );
    assert!(!picker.is_active());
    assert_eq!(page.html(), before);

    let payload = picker.sink().last().expect("payload");
    assert_eq!(payload.title, "Picker fixture");
    assert_eq!(payload.url, "https://example.com/post");
    assert_eq!(payload.element_count, 2);
    assert!(payload.html.starts_with("<h2>Section heading</h2>\n\n<p id=\"p2\">"));
    assert!(!payload.html.contains("lc-"));
    assert!(payload.text.starts_with("Section heading\n\nOwnership rules"));
}

#[test]
fn capture_without_session_is_an_error() {
    let page = fixture();
    let mut picker = Picker::new(&page, VecSink::new());
    assert!(matches!(picker.capture(), Err(Error::NoSession)));
    assert!(!picker.cancel());
    assert_eq!(picker.dispatch(&key(Key::Enter)), logseq_clipper::EventOutcome::ignored());
}

#[test]
fn text_mode_captures_the_selection() {
    let page = fixture();
    let mut picker = Picker::with_options(&page, options(), VecSink::new());
    picker.start(Mode::TextOnly);
    assert!(picker.session().expect("session").index().is_empty());

    // clicks never toggle in text mode
    let outcome = picker.dispatch(&click(id(&page, "#p2")));
    assert!(!matches!(outcome.effect, Effect::Toggled { .. }));

    assert!(matches!(picker.capture(), Err(Error::NoContent)));
    assert_eq!(picker.session().expect("session").notice(), Some("Select some text to capture"));

    let range = find_text(&page, "checked at compile time").expect("text");
    picker.set_selection(Some(range));
    assert_eq!(picker.capture().expect("capture"), 0);

    let payload = picker.sink().last().expect("payload");
    assert_eq!(payload.text, "checked at compile time");
    assert_eq!(payload.element_count, 0);
}
