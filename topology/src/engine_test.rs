#![allow(clippy::float_cmp)]

use frames::{DeviceCreate, DeviceType, Stamp};
use serde_json::json;

use super::*;
use crate::input::{KeyEvent, PointerEvent};

// =============================================================
// Helpers
// =============================================================

fn editor() -> Editor {
    Editor::new(EditorConfig { client_id: 3, ..EditorConfig::default() })
}

fn decoded(actions: &[Action]) -> Vec<Message> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Send(text) => Some(frames::decode_text(text).expect("wire text")),
            Action::RenderNeeded => None,
        })
        .collect()
}

fn router(sender: u64, id: u64) -> Message {
    Message::DeviceCreate(DeviceCreate {
        stamp: Stamp { sender, message_id: 10 },
        id,
        x: 100.0,
        y: 100.0,
        name: format!("Router{id}"),
        kind: DeviceType::Router,
        host_id: None,
    })
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_editor_is_started_and_quiet() {
    let mut editor = editor();
    assert_eq!(editor.state_of(Machine::Mode), Some("Rack"));
    assert_eq!(editor.state_of(Machine::View), Some("Ready"));
    assert!(editor.session_mut().take_outbox().is_empty());
}

#[test]
fn default_editor_uses_default_config() {
    let editor = Editor::default();
    assert_eq!(editor.session().config, EditorConfig::default());
    assert_eq!(editor.session().viewport.width, editor.session().config.width);
}

// =============================================================
// Actions
// =============================================================

#[test]
fn sends_come_before_render() {
    let mut editor = editor();
    editor.handle(Event::MouseMove(PointerEvent::at(400.0, 300.0)));
    let actions = editor.handle(Event::KeyDown(KeyEvent::new("s")));
    assert!(matches!(actions.last(), Some(Action::RenderNeeded)));
    let messages = decoded(&actions);
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.sender() == 3));
    let ids: Vec<u64> = messages.iter().filter_map(|m| m.stamp().map(|s| s.message_id)).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn idle_input_produces_no_actions() {
    let mut editor = editor();
    assert!(editor.handle(Event::KeyDown(KeyEvent::new("q"))).is_empty());
}

#[test]
fn action_json_shape() {
    let send = serde_json::to_value(Action::Send("x".into())).expect("json");
    assert_eq!(send, json!({"Send": "x"}));
    assert_eq!(serde_json::to_value(Action::RenderNeeded).expect("json"), json!("RenderNeeded"));
}

// =============================================================
// Inbound
// =============================================================

#[test]
fn receive_applies_wire_text() {
    let mut editor = editor();
    let text = frames::encode_text(&router(9, 4)).expect("encode");
    let actions = editor.receive(&text).expect("receive");
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(editor.session().diagram.device(4).is_some());
}

#[test]
fn receive_rejects_garbage() {
    let mut editor = editor();
    let err = editor.receive("not an envelope").expect_err("garbage");
    assert!(matches!(err, EditorError::Codec(_)));
}

#[test]
fn client_id_assignment_restamps_later_sends() {
    let mut editor = editor();
    editor.receive_message(Message::ClientId(42));
    assert_eq!(editor.session().client_id, 42);
    let messages = decoded(&editor.reconnected());
    assert_eq!(messages.len(), 1);
    assert!(matches!(messages[0], Message::RequestSnapshot(_)));
    assert_eq!(messages[0].sender(), 42);
}

#[test]
fn snapshot_round_trips_through_a_second_editor() {
    let mut source = editor();
    source.receive_message(router(9, 1));
    source.receive_message(router(9, 2));
    let snapshot = source.snapshot();

    let mut target = Editor::default();
    target.receive_message(Message::Snapshot(snapshot.clone()));
    assert_eq!(target.snapshot(), snapshot);
    assert_eq!(target.state_of(Machine::Mode), Some("Rack"));
}

#[test]
fn snapshot_far_away_switches_mode() {
    let mut editor = editor();
    let mut snapshot = frames::Snapshot::default();
    for (id, x) in [(1, 0.0), (2, 50_000.0)] {
        snapshot.devices.push(frames::DeviceRecord {
            id,
            name: format!("S{id}"),
            x,
            y: 0.0,
            kind: DeviceType::Switch,
            host_id: None,
            interface_id_seq: 0,
            interfaces: Vec::new(),
        });
    }
    editor.receive_message(Message::Snapshot(snapshot));
    assert_eq!(editor.session().viewport.scale, 0.1);
    assert_eq!(editor.state_of(Machine::Mode), Some("MultiSite"));
    assert_eq!(editor.state_of(Machine::Move), Some("Disabled"));
}

// =============================================================
// Named events
// =============================================================

#[test]
fn handle_message_builds_events_from_type_and_payload() {
    let mut editor = editor();
    editor.handle_message("MouseMove", json!({"x": 400.0, "y": 300.0})).expect("move");
    editor.handle_message("NewDevice", json!("switch")).expect("new device");
    assert_eq!(editor.session().diagram.devices().len(), 1);
    editor.handle_message("UnselectAll", serde_json::Value::Null).expect("unit event");
    assert!(editor.session().selection.is_empty());
}

#[test]
fn handle_message_rejects_unknown_types() {
    let mut editor = editor();
    let err = editor.handle_message("Explode", json!({})).expect_err("unknown");
    assert!(matches!(err, EditorError::Event(_)));
}

// =============================================================
// Directive limit
// =============================================================

#[test]
fn runaway_directives_are_cut_off() {
    let mut editor = editor();
    for _ in 0..(MAX_DIRECTIVES * 2) {
        editor.session_mut().dispatch_later(Event::NewLink);
    }
    editor.handle(Event::UnselectAll);
    assert_eq!(editor.session_mut().next_directive(), None);
}
