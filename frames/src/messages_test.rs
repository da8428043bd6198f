use serde_json::json;

use super::*;

fn create(id: DeviceId) -> Message {
    Message::DeviceCreate(DeviceCreate {
        stamp: Stamp::default(),
        id,
        x: 10.0,
        y: 20.0,
        name: format!("Router{id}"),
        kind: DeviceType::Router,
        host_id: None,
    })
}

// ===== Type names =====

#[test]
fn device_type_round_trips_known_names() {
    for name in ["router", "switch", "host", "rack", "device"] {
        let kind = DeviceType::from(name.to_owned());
        assert_eq!(String::from(kind), name);
    }
}

#[test]
fn device_type_keeps_unknown_names() {
    let kind = DeviceType::from("firewall".to_owned());
    assert_eq!(kind, DeviceType::Other("firewall".to_owned()));
    assert_eq!(kind.as_str(), "firewall");
    assert_eq!(kind.name_prefix(), "Device");
}

#[test]
fn group_type_serializes_lowercase() {
    assert_eq!(serde_json::to_value(GroupType::Rack).expect("value"), json!("rack"));
    assert_eq!(GroupType::Site.name_prefix(), "Site");
}

// ===== Catalogue =====

#[test]
fn msg_type_matches_variant_name() {
    assert_eq!(create(1).msg_type(), "DeviceCreate");
    assert_eq!(Message::ClientId(1).msg_type(), "id");
    assert_eq!(
        Message::RequestSnapshot(RequestSnapshot::default()).msg_type(),
        "RequestSnapshot"
    );
}

#[test]
fn mutations_are_flagged_for_history() {
    assert!(create(1).is_mutation());
    assert!(!Message::ClientId(1).is_mutation());
    assert!(!Message::Snapshot(Snapshot::default()).is_mutation());
    assert!(
        !Message::DeviceSelected(SelectionChange { stamp: Stamp::default(), id: 1 }).is_mutation()
    );
}

// ===== Stamping =====

#[test]
fn stamp_sets_sender_and_next_id() {
    let mut message = create(1);
    let mut counter = 40;
    message.stamp_with(3, &mut || {
        counter += 1;
        counter
    });
    assert_eq!(message.stamp(), Some(&Stamp { sender: 3, message_id: 41 }));
    assert_eq!(message.sender(), 3);
}

#[test]
fn stamp_fans_out_to_sub_messages() {
    let mut message = Message::MultipleMessage(MultipleMessage {
        stamp: Stamp::default(),
        messages: vec![create(1), create(2)],
    });
    let mut counter = 0;
    message.stamp_with(9, &mut || {
        counter += 1;
        counter
    });
    let Message::MultipleMessage(multiple) = &message else {
        panic!("expected MultipleMessage");
    };
    assert_eq!(multiple.stamp.message_id, 1);
    let ids: Vec<_> = multiple.messages.iter().filter_map(|m| m.stamp()).map(|s| (s.sender, s.message_id)).collect();
    assert_eq!(ids, vec![(9, 2), (9, 3)]);
}

#[test]
fn stamp_skips_client_id() {
    let mut message = Message::ClientId(4);
    let mut calls = 0;
    message.stamp_with(1, &mut || {
        calls += 1;
        calls
    });
    assert_eq!(calls, 0);
    assert_eq!(message.sender(), 0);
}

// ===== Nested forms =====

#[test]
fn multiple_message_nests_tagged_records() {
    let message = Message::MultipleMessage(MultipleMessage {
        stamp: Stamp::default(),
        messages: vec![create(1)],
    });
    let payload = message.payload().expect("payload");
    assert_eq!(payload["messages"][0]["msg_type"], "DeviceCreate");
    assert_eq!(payload["messages"][0]["name"], "Router1");
}

#[test]
fn undo_carries_original_as_envelope() {
    let message = Message::Undo(HistoryStep { stamp: Stamp::default(), original_message: Box::new(create(5)) });
    let payload = message.payload().expect("payload");
    assert_eq!(payload["original_message"][0], "DeviceCreate");
    assert_eq!(payload["original_message"][1]["id"], 5);

    let decoded = Message::from_parts("Undo", payload).expect("decode");
    assert_eq!(decoded, message);
}

#[test]
fn snapshot_defaults_missing_collections() {
    let decoded = Message::from_parts("Snapshot", json!({"devices": []})).expect("decode");
    assert_eq!(decoded, Message::Snapshot(Snapshot::default()));
}

#[test]
fn topology_uses_camel_case_pan() {
    let decoded = Message::from_parts(
        "Topology",
        json!({"panX": 5, "panY": -5, "scale": 1.5, "device_id_seq": 3, "link_id_seq": 2}),
    )
    .expect("decode");
    let Message::Topology(topology) = decoded else {
        panic!("expected Topology");
    };
    assert_eq!(topology.pan_x, 5.0);
    assert_eq!(topology.device_id_seq, 3);
    assert_eq!(topology.group_id_seq, 0);
}
