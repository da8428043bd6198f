//! Message catalogue and envelope codec for the topology editor protocol.
//!
//! Every message travels as a two-element `[type, payload]` envelope whose
//! payload is a flat record. Text transports carry the envelope as JSON; the
//! binary encoding wraps the same envelope in a small protobuf record whose
//! payload is a `google.protobuf.Value`.
//!
//! This crate owns the wire representation and nothing else. It knows nothing
//! about the diagram model the messages mutate.

pub mod messages;

use prost::Message as _;
use serde_json::{Map, Value};

pub use messages::*;

/// Error returned by the envelope codecs.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input is not valid JSON, or a payload could not be rendered as JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The value is neither a `[type, payload]` array nor a record with `msg_type`.
    #[error("expected a [type, payload] envelope")]
    NotAnEnvelope,
    /// The type tag names no known message.
    #[error("unknown message type: {0}")]
    UnknownType(String),
    /// The payload does not match the fields the type requires.
    #[error("invalid {msg_type} payload: {detail}")]
    Payload { msg_type: String, detail: String },
    /// The raw bytes could not be decoded as a protobuf envelope.
    #[error("failed to decode binary envelope: {0}")]
    Decode(#[from] prost::DecodeError),
}

// =============================================================================
// JSON ENVELOPE
// =============================================================================

/// Render a message as its `[type, payload]` envelope.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be represented as JSON.
pub fn to_envelope(message: &Message) -> Result<Value, CodecError> {
    Ok(Value::Array(vec![Value::from(message.msg_type()), message.payload()?]))
}

/// Parse either envelope form: a `[type, payload]` array, or a record that
/// carries its own `msg_type` (the form used inside `MultipleMessage`).
///
/// # Errors
///
/// Returns [`CodecError::NotAnEnvelope`] for any other shape, plus the
/// errors of [`Message::from_parts`].
pub fn from_value(value: Value) -> Result<Message, CodecError> {
    match value {
        Value::Array(mut parts) if parts.len() == 2 => {
            let payload = parts.pop().unwrap_or(Value::Null);
            let Some(Value::String(msg_type)) = parts.pop() else {
                return Err(CodecError::NotAnEnvelope);
            };
            Message::from_parts(&msg_type, payload)
        }
        Value::Object(fields) => {
            let Some(msg_type) = fields.get("msg_type").and_then(Value::as_str).map(str::to_owned) else {
                return Err(CodecError::NotAnEnvelope);
            };
            Message::from_parts(&msg_type, Value::Object(fields))
        }
        _ => Err(CodecError::NotAnEnvelope),
    }
}

/// Serialize a message to envelope JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be represented as JSON.
pub fn encode_text(message: &Message) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&to_envelope(message)?)?)
}

/// Parse envelope JSON text into a message.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text and the errors of
/// [`from_value`] for well-formed text of the wrong shape.
pub fn decode_text(text: &str) -> Result<Message, CodecError> {
    from_value(serde_json::from_str(text)?)
}

// =============================================================================
// BINARY ENVELOPE
// =============================================================================

/// Encode a message into protobuf bytes.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be represented as JSON.
pub fn encode_binary(message: &Message) -> Result<Vec<u8>, CodecError> {
    let wire = WireEnvelope {
        msg_type: message.msg_type().to_owned(),
        payload: Some(json_to_proto_value(&message.payload()?)),
    };
    Ok(wire.encode_to_vec())
}

/// Decode protobuf bytes into a message.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes and the errors of
/// [`Message::from_parts`] for a payload that does not fit its type.
pub fn decode_binary(bytes: &[u8]) -> Result<Message, CodecError> {
    let wire = WireEnvelope::decode(bytes)?;
    let payload = wire
        .payload
        .map_or(Value::Object(Map::new()), |v| proto_to_json_value(&v));
    Message::from_parts(&wire.msg_type, payload)
}

fn json_to_proto_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => {
            prost_types::value::Kind::NullValue(prost_types::NullValue::NullValue as i32)
        }
        Value::Bool(v) => prost_types::value::Kind::BoolValue(*v),
        Value::Number(v) => prost_types::value::Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => prost_types::value::Kind::StringValue(v.clone()),
        Value::Array(v) => prost_types::value::Kind::ListValue(prost_types::ListValue {
            values: v.iter().map(json_to_proto_value).collect(),
        }),
        Value::Object(v) => prost_types::value::Kind::StructValue(prost_types::Struct {
            fields: v
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto_value(v)))
                .collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

/// Largest integer an f64 represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

// Ids are integers on the JSON side; protobuf only has doubles.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn number_to_json(v: f64) -> Value {
    if v.trunc() == v && v.abs() <= MAX_EXACT_INT {
        if v >= 0.0 {
            return Value::from(v as u64);
        }
        return Value::from(v as i64);
    }
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn proto_to_json_value(value: &prost_types::Value) -> Value {
    let Some(kind) = &value.kind else {
        return Value::Null;
    };

    match kind {
        prost_types::value::Kind::NullValue(_) => Value::Null,
        prost_types::value::Kind::NumberValue(v) => number_to_json(*v),
        prost_types::value::Kind::StringValue(v) => Value::String(v.clone()),
        prost_types::value::Kind::BoolValue(v) => Value::Bool(*v),
        prost_types::value::Kind::StructValue(v) => Value::Object(
            v.fields
                .iter()
                .map(|(k, v)| (k.clone(), proto_to_json_value(v)))
                .collect(),
        ),
        prost_types::value::Kind::ListValue(v) => {
            Value::Array(v.values.iter().map(proto_to_json_value).collect())
        }
    }
}

#[derive(Clone, PartialEq, prost::Message)]
struct WireEnvelope {
    #[prost(string, tag = "1")]
    msg_type: String,
    #[prost(message, optional, tag = "2")]
    payload: Option<prost_types::Value>,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
