//! Typed message catalogue.
//!
//! Every payload is a flat record. The string tag that names a message type
//! only exists at the serialization boundary: inside the editor a message is
//! one variant of the closed [`Message`] enum and is matched exhaustively.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::CodecError;

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

pub type ClientId = u64;
pub type MessageId = u64;
pub type DeviceId = u64;
pub type InterfaceId = u64;
pub type LinkId = u64;
pub type GroupId = u64;

/// Wire tag of the client id assignment, the only message whose payload is a
/// bare integer instead of a record.
pub const CLIENT_ID_TYPE: &str = "id";

// =============================================================================
// SHARED FIELDS
// =============================================================================

/// Sender and sequence number assigned immediately before serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    #[serde(default)]
    pub sender: ClientId,
    #[serde(default)]
    pub message_id: MessageId,
}

/// Kind of device, which decides its outline and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceType {
    Router,
    Switch,
    Host,
    Rack,
    Device,
    Other(String),
}

impl DeviceType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Router => "router",
            Self::Switch => "switch",
            Self::Host => "host",
            Self::Rack => "rack",
            Self::Device => "device",
            Self::Other(name) => name,
        }
    }

    /// Prefix used when naming a freshly created device, e.g. `Router3`.
    #[must_use]
    pub fn name_prefix(&self) -> &str {
        match self {
            Self::Router => "Router",
            Self::Switch => "Switch",
            Self::Host => "Host",
            Self::Rack => "Rack",
            Self::Device | Self::Other(_) => "Device",
        }
    }
}

impl From<String> for DeviceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "router" => Self::Router,
            "switch" => Self::Switch,
            "host" => Self::Host,
            "rack" => Self::Rack,
            "device" => Self::Device,
            _ => Self::Other(value),
        }
    }
}

impl From<DeviceType> for String {
    fn from(value: DeviceType) -> Self {
        match value {
            DeviceType::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

/// Kind of group rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroupType {
    Rack,
    Site,
    Group,
    Other(String),
}

impl GroupType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rack => "rack",
            Self::Site => "site",
            Self::Group => "group",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub fn name_prefix(&self) -> &str {
        match self {
            Self::Rack => "Rack",
            Self::Site => "Site",
            Self::Group | Self::Other(_) => "Group",
        }
    }
}

impl From<String> for GroupType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "rack" => Self::Rack,
            "site" => Self::Site,
            "group" => Self::Group,
            _ => Self::Other(value),
        }
    }
}

impl From<GroupType> for String {
    fn from(value: GroupType) -> Self {
        match value {
            GroupType::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(flatten)]
    pub stamp: Stamp,
    #[serde(default)]
    pub topology_id: u64,
    #[serde(rename = "panX")]
    pub pan_x: f64,
    #[serde(rename = "panY")]
    pub pan_y: f64,
    pub scale: f64,
    #[serde(default)]
    pub device_id_seq: DeviceId,
    #[serde(default)]
    pub link_id_seq: LinkId,
    #[serde(default)]
    pub group_id_seq: GroupId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub id: InterfaceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<u64>,
    #[serde(default)]
    pub interface_id_seq: InterfaceId,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: LinkId,
    #[serde(default)]
    pub name: String,
    pub from_device_id: DeviceId,
    pub to_device_id: DeviceId,
    pub from_interface_id: InterfaceId,
    pub to_interface_id: InterfaceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GroupType,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub members: Vec<DeviceId>,
}

/// Full diagram state. Replaces the receiver's model wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub stamp: Stamp,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    #[serde(flatten)]
    pub stamp: Stamp,
}

/// Several messages applied in order. Stamping fans out to each of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipleMessage {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub messages: Vec<Message>,
}

/// Payload of `Undo` and `Redo`: the history entry being stepped over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStep {
    #[serde(flatten)]
    pub stamp: Stamp,
    #[serde(with = "envelope_field")]
    pub original_message: Box<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCreate {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: DeviceId,
    pub x: f64,
    pub y: f64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<u64>,
}

/// Removes a device and every link touching it. Carries the prior state so
/// the removal can be inverted into a `DeviceCreate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDestroy {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: DeviceId,
    pub previous_x: f64,
    pub previous_y: f64,
    pub previous_name: String,
    pub previous_type: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_host_id: Option<u64>,
    #[serde(default)]
    pub previous_interfaces: Vec<InterfaceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMove {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: DeviceId,
    pub x: f64,
    pub y: f64,
    pub previous_x: f64,
    pub previous_y: f64,
}

/// Rename of a device, link or group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEdit {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: u64,
    pub name: String,
    pub previous_name: String,
}

/// Remote selection highlight for a device or link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionChange {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub name: String,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub working: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub device_name: String,
    pub task_id: u64,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub working: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub device_id: DeviceId,
    pub id: InterfaceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceLabelEdit {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub device_id: DeviceId,
    pub id: InterfaceId,
    pub name: String,
    pub previous_name: String,
}

/// Payload shared by `LinkCreate` and `LinkDestroy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: LinkId,
    #[serde(default)]
    pub name: String,
    pub from_device_id: DeviceId,
    pub to_device_id: DeviceId,
    pub from_interface_id: InterfaceId,
    pub to_interface_id: InterfaceId,
}

/// Payload shared by `GroupCreate` and `GroupDestroy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: GroupId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GroupType,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMove {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: GroupId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub previous_x1: f64,
    pub previous_y1: f64,
    pub previous_x2: f64,
    pub previous_y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub id: GroupId,
    pub members: Vec<DeviceId>,
}

// =============================================================================
// CATALOGUE
// =============================================================================

macro_rules! catalogue {
    ($($variant:ident($payload:ty)),* $(,)?) => {
        /// Every message the protocol carries.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            /// `["id", n]`: the relay tells this client who it is.
            ClientId(ClientId),
            $($variant($payload),)*
        }

        impl Message {
            /// Wire tag for this message type.
            #[must_use]
            pub fn msg_type(&self) -> &'static str {
                match self {
                    Self::ClientId(_) => CLIENT_ID_TYPE,
                    $(Self::$variant(_) => stringify!($variant),)*
                }
            }

            /// Sender and message id, if this type carries them.
            #[must_use]
            pub fn stamp(&self) -> Option<&Stamp> {
                match self {
                    Self::ClientId(_) => None,
                    $(Self::$variant(m) => Some(&m.stamp),)*
                }
            }

            fn stamp_mut(&mut self) -> Option<&mut Stamp> {
                match self {
                    Self::ClientId(_) => None,
                    $(Self::$variant(m) => Some(&mut m.stamp),)*
                }
            }

            /// Envelope payload: a flat record that also repeats `msg_type`.
            ///
            /// # Errors
            ///
            /// Returns [`CodecError::Json`] if a payload cannot be represented as JSON.
            pub fn payload(&self) -> Result<Value, CodecError> {
                let mut value = match self {
                    Self::ClientId(id) => return Ok(Value::from(*id)),
                    $(Self::$variant(m) => serde_json::to_value(m)?,)*
                };
                if let Value::Object(fields) = &mut value {
                    fields.insert("msg_type".to_owned(), Value::from(self.msg_type()));
                }
                Ok(value)
            }

            /// Rebuild a message from its wire tag and payload.
            ///
            /// # Errors
            ///
            /// Returns [`CodecError::UnknownType`] for an unrecognized tag and
            /// [`CodecError::Payload`] when the payload does not fit the type.
            pub fn from_parts(msg_type: &str, payload: Value) -> Result<Self, CodecError> {
                match msg_type {
                    CLIENT_ID_TYPE => client_id_from(payload),
                    $(stringify!($variant) => decode_payload(msg_type, payload).map(Self::$variant),)*
                    other => Err(CodecError::UnknownType(other.to_owned())),
                }
            }
        }
    };
}

catalogue! {
    Topology(Topology),
    Snapshot(Snapshot),
    RequestSnapshot(RequestSnapshot),
    MultipleMessage(MultipleMessage),
    Undo(HistoryStep),
    Redo(HistoryStep),
    DeviceCreate(DeviceCreate),
    DeviceDestroy(DeviceDestroy),
    DeviceMove(DeviceMove),
    DeviceLabelEdit(LabelEdit),
    DeviceSelected(SelectionChange),
    DeviceUnSelected(SelectionChange),
    DeviceStatus(DeviceStatus),
    TaskStatus(TaskStatus),
    InterfaceCreate(InterfaceSpec),
    InterfaceDestroy(InterfaceSpec),
    InterfaceLabelEdit(InterfaceLabelEdit),
    LinkCreate(LinkSpec),
    LinkDestroy(LinkSpec),
    LinkLabelEdit(LabelEdit),
    LinkSelected(SelectionChange),
    LinkUnSelected(SelectionChange),
    GroupCreate(GroupSpec),
    GroupDestroy(GroupSpec),
    GroupMove(GroupMove),
    GroupLabelEdit(LabelEdit),
    GroupMembership(GroupMembership),
}

impl Message {
    /// Whether this message mutates the diagram and belongs in undo history.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::DeviceCreate(_)
                | Self::DeviceDestroy(_)
                | Self::DeviceMove(_)
                | Self::DeviceLabelEdit(_)
                | Self::InterfaceCreate(_)
                | Self::InterfaceDestroy(_)
                | Self::InterfaceLabelEdit(_)
                | Self::LinkCreate(_)
                | Self::LinkDestroy(_)
                | Self::LinkLabelEdit(_)
                | Self::GroupCreate(_)
                | Self::GroupDestroy(_)
                | Self::GroupMove(_)
                | Self::GroupLabelEdit(_)
        )
    }

    /// Client that sent this message. Zero when unstamped.
    #[must_use]
    pub fn sender(&self) -> ClientId {
        self.stamp().map_or(0, |s| s.sender)
    }

    /// Stamp this message and, for a `MultipleMessage`, every sub-message.
    ///
    /// The composite takes its id before its children do.
    pub fn stamp_with(&mut self, sender: ClientId, next_id: &mut impl FnMut() -> MessageId) {
        if let Some(stamp) = self.stamp_mut() {
            stamp.sender = sender;
            stamp.message_id = next_id();
        }
        if let Self::MultipleMessage(multiple) = self {
            for message in &mut multiple.messages {
                message.stamp_with(sender, next_id);
            }
        }
    }

    /// Self-describing record form: the payload with `msg_type` inside.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if a payload cannot be represented as JSON.
    pub fn tagged(&self) -> Result<Value, CodecError> {
        match self {
            Self::ClientId(id) => Ok(serde_json::json!({ "msg_type": CLIENT_ID_TYPE, "id": id })),
            _ => self.payload(),
        }
    }
}

fn client_id_from(payload: Value) -> Result<Message, CodecError> {
    let id = match &payload {
        Value::Object(fields) => fields.get("id").and_then(Value::as_u64),
        other => other.as_u64(),
    };
    id.map(Message::ClientId)
        .ok_or_else(|| CodecError::Payload { msg_type: CLIENT_ID_TYPE.to_owned(), detail: payload.to_string() })
}

fn decode_payload<T: serde::de::DeserializeOwned>(msg_type: &str, payload: Value) -> Result<T, CodecError> {
    serde_json::from_value(payload)
        .map_err(|e| CodecError::Payload { msg_type: msg_type.to_owned(), detail: e.to_string() })
}

// Nested messages (inside `MultipleMessage`) use the tagged record form.
impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tagged()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// `original_message` travels as a `[type, payload]` envelope.
mod envelope_field {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use super::Message;

    #[allow(clippy::borrowed_box)]
    pub fn serialize<S: Serializer>(message: &Box<Message>, serializer: S) -> Result<S::Ok, S::Error> {
        crate::to_envelope(message)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Box<Message>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::from_value(value).map(Box::new).map_err(serde::de::Error::custom)
    }
}
