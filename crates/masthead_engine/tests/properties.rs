//! End-to-end behavior through the scripted host

use std::time::Duration;

use masthead_dom::prelude::*;
use masthead_engine::prelude::*;
use masthead_engine::{locate_header, outermost_section_color, TextContrast};
use serde_json::{json, Value};

const ISLAND: &str = "bsh-config";

fn site(width: f32) -> MemoryDocument {
    let mut doc = MemoryDocument::new(Viewport::new(width, 800.0));
    doc.append_to_body(
        el("div")
            .class("wp-site-blocks")
            .child(el("header").class("wp-block-template-part").height(80.0).sticky())
            .child(el("section").id("hero").height(900.0).bg("rgb(255, 255, 255)"))
            .child(el("section").id("dark").height(900.0).bg("rgb(17, 17, 17)"))
            .child(el("footer").height(400.0)),
    );
    doc
}

fn with_island(mut doc: MemoryDocument, config: &Value) -> MemoryDocument {
    doc.append_to_body(el("script").id(ISLAND).text(config.to_string()));
    doc
}

/// Engine installed on a scripted page, advanced one step at a time
struct Harness {
    host: ScriptedHost,
    engine: Engine<ElementId>,
}

impl Harness {
    fn new(doc: MemoryDocument, steps: Vec<Step>) -> Self {
        Self::with_script(doc, Script::new(steps))
    }

    fn with_script(doc: MemoryDocument, script: Script) -> Self {
        let mut host = ScriptedHost::new(doc, script);
        let capabilities = host.capabilities();
        let engine = Engine::install(host.document_mut(), None, capabilities);
        Self { host, engine }
    }

    fn step(&mut self) {
        let tick = self.host.next_tick().expect("script exhausted");
        if let Some(notification) = tick.notification {
            self.engine
                .handle(self.host.document_mut(), notification, tick.now);
        }
    }

    fn run(mut self) -> Self {
        self.engine.drive(&mut self.host);
        self
    }

    fn doc(&self) -> &MemoryDocument {
        self.host.document()
    }

    fn coordinator(&self) -> &Coordinator<ElementId> {
        self.engine.coordinator().expect("engine not running")
    }

    fn header(&self) -> ElementId {
        self.coordinator().header()
    }
}

/// Classes and inline styles of every element
fn snapshot(doc: &MemoryDocument) -> Vec<(Vec<String>, Vec<(String, String)>)> {
    doc.query_selector_all("*")
        .unwrap()
        .into_iter()
        .map(|id| {
            (
                doc.classes(id).into_iter().map(String::from).collect(),
                doc.inline_style(id)
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        })
        .collect()
}

#[test]
fn test_disabled_config_mutates_nothing() {
    let config = json!({ "enabled": false, "push_content_down": true });
    let doc = with_island(site(1200.0), &config);
    let before = snapshot(&doc);

    let harness = Harness::new(doc, vec![Step::ScrollTo { y: 400.0 }, Step::Wait { ms: 500 }]).run();
    assert_eq!(harness.engine.inert_reason(), Some(&InertReason::Disabled));
    assert_eq!(snapshot(harness.doc()), before);
}

#[test]
fn test_unparsable_config_mutates_nothing() {
    let mut doc = site(1200.0);
    doc.append_to_body(el("script").id(ISLAND).text("{ not json"));
    let before = snapshot(&doc);

    let harness = Harness::new(doc, vec![Step::ScrollTo { y: 400.0 }]).run();
    assert!(matches!(
        harness.engine.inert_reason(),
        Some(InertReason::Config(ConfigError::Malformed(_)))
    ));
    assert_eq!(snapshot(harness.doc()), before);
}

#[test]
fn test_locator_skips_unmatched_and_invalid_selectors() {
    let mut doc = MemoryDocument::default();
    doc.append_to_body(el("header").class("y").height(0.0));
    let visible = doc.append_to_body(el("header").class("y").height(70.0));

    assert_eq!(locate_header(&doc, &["section.x", "header.y"]), Some(visible));
    assert_eq!(locate_header(&doc, &["::bad", "header.y"]), Some(visible));

    let config = json!({ "enabled": true, "selector": "section.x, header.y" });
    let harness = Harness::new(with_island(doc, &config), vec![]);
    assert_eq!(harness.header(), visible);
    assert!(harness.doc().has_class(visible, classes::HEADER));
}

#[test]
fn test_hide_then_reveal() {
    let config = json!({
        "enabled": true,
        "hide_on_scroll_down": true,
        "reveal_on_scroll_up": true,
        "hide_sensitivity_px": 10,
        "hide_delay_ms": 0
    });
    let mut harness = Harness::new(
        with_island(site(1200.0), &config),
        vec![Step::ScrollTo { y: 50.0 }, Step::ScrollTo { y: 30.0 }],
    );

    harness.step();
    assert!(harness.coordinator().is_hidden());
    assert!(harness.doc().has_class(harness.header(), classes::HIDDEN));

    harness.step();
    assert!(!harness.coordinator().is_hidden());
    assert_eq!(harness.coordinator().next_deadline(), None);
    assert!(!harness.doc().has_class(harness.header(), classes::HIDDEN));
}

#[test]
fn test_debounced_hide_superseded_by_scroll_up() {
    let config = json!({
        "enabled": true,
        "hide_on_scroll_down": true,
        "reveal_on_scroll_up": true,
        "hide_delay_ms": 200
    });
    let harness = Harness::new(
        with_island(site(1200.0), &config),
        vec![
            Step::ScrollTo { y: 100.0 },
            Step::Wait { ms: 120 },
            Step::ScrollTo { y: 40.0 },
            Step::Wait { ms: 500 },
        ],
    )
    .run();

    assert!(!harness.coordinator().is_hidden());
    assert_eq!(harness.doc().style_property(harness.header(), "transform"), None);
}

#[test]
fn test_debounced_hide_fires_after_quiet_period() {
    let config = json!({
        "enabled": true,
        "hide_on_scroll_down": true,
        "hide_delay_ms": 200
    });
    let mut harness = Harness::new(
        with_island(site(1200.0), &config),
        vec![
            Step::ScrollTo { y: 100.0 },
            Step::Wait { ms: 150 },
            Step::Wait { ms: 100 },
        ],
    );

    harness.step();
    harness.step();
    assert!(!harness.coordinator().is_hidden());

    harness.step();
    assert!(harness.coordinator().is_hidden());
    assert_eq!(
        harness
            .doc()
            .style_property(harness.header(), "transform")
            .as_deref(),
        Some("translateY(-100%)")
    );
}

#[test]
fn test_luminance_contrast() {
    assert_eq!(TextContrast::for_color(&Rgba::rgb(255, 255, 255)), TextContrast::Black);
    assert_eq!(TextContrast::for_color(&Rgba::rgb(0, 0, 0)), TextContrast::White);
    assert_eq!(TextContrast::for_luminance(0.5), TextContrast::White);
}

#[test]
fn test_outward_walk_takes_outermost_color() {
    let mut doc = MemoryDocument::new(Viewport::new(1000.0, 800.0));
    doc.append_to_body(
        el("section").height(700.0).bg("rgb(0, 80, 0)").child(
            el("div")
                .height(600.0)
                .child(el("div").id("a").height(300.0).bg("rgb(200, 0, 0)")),
        ),
    );
    let a = doc.element_by_id("a").unwrap();
    assert_eq!(outermost_section_color(&doc, a), Some(Rgba::rgb(0, 80, 0)));
}

#[test]
fn test_chameleon_end_to_end() {
    let config = json!({
        "enabled": true,
        "background_style": "chameleon",
        "sticky_bg_opacity": 0.9
    });
    let mut harness = Harness::new(
        with_island(site(1200.0), &config),
        vec![Step::ScrollTo { y: 950.0 }],
    );
    let header = harness.header();
    for class in [classes::HAS_BG, classes::CUSTOM_BG, classes::CHAMELEON] {
        assert!(harness.doc().has_class(header, class));
    }
    assert_eq!(
        harness.doc().style_property(header, vars::TEXT_COLOR).as_deref(),
        Some("#000000")
    );

    harness.step();
    assert_eq!(
        harness.doc().style_property(header, vars::BG).as_deref(),
        Some("rgba(17,17,17,0.9)")
    );
    assert_eq!(
        harness.doc().style_property(header, vars::TEXT_COLOR).as_deref(),
        Some("#ffffff")
    );
}

#[test]
fn test_push_spacer_tracks_activation() {
    let config = json!({
        "enabled": true,
        "push_content_down": true,
        "disable_mobile": true
    });
    let mut harness = Harness::new(
        with_island(site(1200.0), &config),
        vec![
            Step::ResizeHeader { height: 96.0 },
            Step::ResizeViewport {
                width: 700.0,
                height: 800.0,
            },
            Step::ResizeViewport {
                width: 1000.0,
                height: 800.0,
            },
        ],
    );
    let spacer = harness.coordinator().reflow().spacer().unwrap();
    assert_eq!(harness.doc().offset_height(spacer), 80.0);

    harness.step();
    assert_eq!(harness.doc().offset_height(spacer), 96.0);

    harness.step();
    assert_eq!(
        harness.doc().style_property(spacer, "height").as_deref(),
        Some("0px")
    );

    harness.step();
    assert_eq!(harness.doc().offset_height(spacer), 96.0);
    assert_eq!(harness.doc().style_property(spacer, "margin-top"), None);
}

#[test]
fn test_reflow_without_size_observer() {
    let config = json!({ "enabled": true, "push_content_down": true });
    let script = Script {
        size_observer: false,
        ..Script::new(vec![
            Step::ResizeHeader { height: 120.0 },
            Step::ScrollTo { y: 20.0 },
        ])
    };
    let mut harness = Harness::with_script(with_island(site(1200.0), &config), script);
    let spacer = harness.coordinator().reflow().spacer().unwrap();
    assert_eq!(harness.doc().offset_height(spacer), 80.0);

    harness.step();
    assert_eq!(harness.doc().offset_height(spacer), 80.0);

    harness.step();
    assert_eq!(harness.doc().offset_height(spacer), 120.0);
}

#[test]
fn test_overlay_margin_tracks_activation() {
    let config = json!({
        "enabled": true,
        "overlay_content": true,
        "push_content_down": true,
        "disable_mobile": true
    });
    let doc = with_island(site(1200.0), &config);
    let hero = doc.element_by_id("hero").unwrap();

    let mut harness = Harness::new(
        doc,
        vec![Step::ResizeViewport {
            width: 600.0,
            height: 800.0,
        }],
    );
    assert_eq!(harness.coordinator().reflow().spacer(), None);
    assert!(harness
        .doc()
        .query_selector_all(".bsh-content-spacer")
        .unwrap()
        .is_empty());
    assert_eq!(
        harness.doc().style_property(hero, "margin-top").as_deref(),
        Some("-80px")
    );
    assert_eq!(harness.doc().root_style_property(vars::HEADER_HEIGHT), Some("80px"));

    harness.step();
    assert_eq!(harness.doc().style_property(hero, "margin-top"), None);
    assert_eq!(harness.doc().root_style_property(vars::HEADER_HEIGHT), Some("0px"));
}

#[test]
fn test_mobile_kill_switch() {
    let config = json!({
        "enabled": true,
        "disable_mobile": true,
        "mobile_breakpoint_px": 782
    });

    let narrow = Harness::new(with_island(site(700.0), &config), vec![]);
    assert!(!narrow.coordinator().is_active());
    assert!(!narrow.doc().has_class(narrow.header(), classes::STUCK));

    let wide = Harness::new(with_island(site(900.0), &config), vec![]);
    assert!(wide.coordinator().is_active());
    assert!(wide.doc().has_class(wide.header(), classes::STUCK));
}

#[test]
fn test_deferred_install_waits_for_ready() {
    let config = json!({ "enabled": true });
    let mut doc = with_island(site(1200.0), &config);
    doc.set_ready_state(ReadyState::Loading);

    let mut harness = Harness::new(doc, vec![Step::ScrollTo { y: 10.0 }, Step::Ready]);
    assert!(harness.engine.is_pending());

    harness.step();
    assert!(harness.engine.is_pending());
    assert!(harness
        .doc()
        .query_selector_all(".bsh-header")
        .unwrap()
        .is_empty());

    harness.step();
    assert!(harness.engine.is_running());
    assert!(harness.coordinator().is_active());
    assert_eq!(harness.host.now(), Duration::ZERO);
}
