use prost::Message as _;

use super::*;

fn sample_move() -> Message {
    Message::DeviceMove(DeviceMove {
        stamp: Stamp { sender: 2, message_id: 7 },
        id: 4,
        x: 100.0,
        y: 300.5,
        previous_x: 100.0,
        previous_y: 100.0,
    })
}

fn sample_link() -> Message {
    Message::LinkCreate(LinkSpec {
        stamp: Stamp { sender: 1, message_id: 3 },
        id: 9,
        name: "A-B".to_owned(),
        from_device_id: 1,
        to_device_id: 2,
        from_interface_id: 1,
        to_interface_id: 1,
    })
}

// =============================================================================
// JSON envelope
// =============================================================================

#[test]
fn envelope_is_two_element_array() {
    let value = to_envelope(&sample_move()).expect("envelope");
    let parts = value.as_array().expect("array");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], "DeviceMove");
    assert_eq!(parts[1]["previous_y"], 100.0);
    assert_eq!(parts[1]["sender"], 2);
}

#[test]
fn payload_repeats_msg_type() {
    let value = to_envelope(&sample_link()).expect("envelope");
    assert_eq!(value[1]["msg_type"], "LinkCreate");
}

#[test]
fn text_round_trip_preserves_message() {
    let text = encode_text(&sample_link()).expect("encode");
    let decoded = decode_text(&text).expect("decode");
    assert_eq!(decoded, sample_link());
}

#[test]
fn decode_text_accepts_integer_coordinates() {
    let text = r#"["DeviceCreate", {"id": 1, "x": 100, "y": 100, "name": "Router1", "type": "router"}]"#;
    let Message::DeviceCreate(create) = decode_text(text).expect("decode") else {
        panic!("expected DeviceCreate");
    };
    assert_eq!(create.x, 100.0);
    assert_eq!(create.kind, DeviceType::Router);
    assert_eq!(create.stamp, Stamp::default());
}

#[test]
fn decode_text_rejects_malformed_json() {
    let err = decode_text("[\"DeviceMove\", {").expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_text_rejects_bare_record_without_tag() {
    let err = decode_text(r#"{"id": 1}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::NotAnEnvelope));
}

#[test]
fn decode_text_rejects_three_element_array() {
    let err = decode_text(r#"["DeviceMove", {}, 1]"#).expect_err("should fail");
    assert!(matches!(err, CodecError::NotAnEnvelope));
}

#[test]
fn decode_text_rejects_unknown_type() {
    let err = decode_text(r#"["Teleport", {}]"#).expect_err("should fail");
    assert!(matches!(err, CodecError::UnknownType(t) if t == "Teleport"));
}

#[test]
fn decode_text_reports_payload_mismatch() {
    let err = decode_text(r#"["DeviceMove", {"id": "four"}]"#).expect_err("should fail");
    assert!(matches!(err, CodecError::Payload { msg_type, .. } if msg_type == "DeviceMove"));
}

#[test]
fn client_id_uses_bare_integer_payload() {
    let decoded = decode_text(r#"["id", 5]"#).expect("decode");
    assert_eq!(decoded, Message::ClientId(5));
    assert_eq!(encode_text(&decoded).expect("encode"), r#"["id",5]"#);
}

#[test]
fn tagged_record_form_decodes() {
    let value = sample_move().tagged().expect("tagged");
    assert_eq!(from_value(value).expect("decode"), sample_move());
}

// =============================================================================
// Binary envelope
// =============================================================================

#[test]
fn binary_round_trip_preserves_message() {
    let bytes = encode_binary(&sample_move()).expect("encode");
    assert!(!bytes.is_empty());
    assert_eq!(decode_binary(&bytes).expect("decode"), sample_move());
}

#[test]
fn binary_round_trip_restores_integer_ids() {
    let bytes = encode_binary(&sample_link()).expect("encode");
    let Message::LinkCreate(link) = decode_binary(&bytes).expect("decode") else {
        panic!("expected LinkCreate");
    };
    assert_eq!(link.id, 9);
    assert_eq!(link.stamp.message_id, 3);
}

#[test]
fn binary_round_trip_of_nested_multiple_message() {
    let message = Message::MultipleMessage(MultipleMessage {
        stamp: Stamp { sender: 1, message_id: 1 },
        messages: vec![sample_move(), sample_link()],
    });
    let bytes = encode_binary(&message).expect("encode");
    assert_eq!(decode_binary(&bytes).expect("decode"), message);
}

#[test]
fn decode_binary_rejects_malformed_bytes() {
    let err = decode_binary(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_binary_defaults_missing_payload_to_empty_record() {
    let wire = WireEnvelope { msg_type: "RequestSnapshot".to_owned(), payload: None };
    let decoded = decode_binary(&wire.encode_to_vec()).expect("decode");
    assert_eq!(decoded, Message::RequestSnapshot(RequestSnapshot::default()));
}

#[test]
fn proto_nan_number_becomes_json_null() {
    let value = prost_types::Value { kind: Some(prost_types::value::Kind::NumberValue(f64::NAN)) };
    assert_eq!(proto_to_json_value(&value), Value::Null);
}

#[test]
fn proto_fractional_number_stays_float() {
    assert_eq!(number_to_json(1.25), serde_json::json!(1.25));
    assert_eq!(number_to_json(-3.0), serde_json::json!(-3));
    assert_eq!(number_to_json(200.0), serde_json::json!(200));
}
