//! Events consumed by the controller chain.
//!
//! Raw pointer, wheel, keyboard and touch input from the host share one
//! closed [`Event`] type with command events (toolbar buttons, toolbox drops,
//! hotkey expansions) and with decoded inbound protocol messages. Every
//! controller in the chain sees the same event type.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::{DeviceType, GroupType, InterfaceRecord, Message};
use serde::{Deserialize, Serialize};

use crate::viewport::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Wheel / trackpad scroll. Positive `delta` zooms in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub x: f64,
    pub y: f64,
    pub delta: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// A key press. `key` is the key name as the browser reports it
/// (`"a"`, `"Z"`, `"Backspace"`, `"Enter"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn with(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self { key: key.into(), modifiers }
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.key.as_str(), "Backspace" | "Delete")
    }

    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.key == "Enter"
    }

    /// The character this key types into a label, if any.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.command() || self.modifiers.alt {
            return None;
        }
        let mut chars = self.key.chars();
        let c = chars.next()?;
        (chars.next().is_none() && !c.is_control()).then_some(c)
    }

    #[must_use]
    pub fn is_undo(&self) -> bool {
        self.modifiers.command() && !self.modifiers.shift && self.key.eq_ignore_ascii_case("z")
    }

    #[must_use]
    pub fn is_redo(&self) -> bool {
        self.modifiers.command() && self.modifiers.shift && self.key.eq_ignore_ascii_case("z")
    }
}

/// Active touch points in screen pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub touches: Vec<Point>,
}

/// A device offered by a toolbox or copied from the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTemplate {
    pub name: String,
    pub kind: DeviceType,
    #[serde(default)]
    pub host_id: Option<u64>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
}

/// A rack or site rectangle offered by a toolbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTemplate {
    pub name: String,
    pub kind: GroupType,
    pub width: f64,
    pub height: f64,
}

/// Everything the controller chain handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MouseDown(PointerEvent),
    MouseUp(PointerEvent),
    MouseMove(PointerEvent),
    MouseWheel(WheelEvent),
    KeyDown(KeyEvent),
    TouchStart(TouchEvent),
    TouchMove(TouchEvent),
    TouchEnd(TouchEvent),
    /// Start placing a new device at the cursor.
    NewDevice(DeviceType),
    /// Start drawing a new group rectangle.
    NewGroup(GroupType),
    /// Start drawing a link between two devices.
    NewLink,
    /// A device template dropped on the diagram.
    PasteDevice(DeviceTemplate),
    /// A group template dropped on the diagram.
    PasteGroup(GroupTemplate),
    /// Begin editing the label of the selected item.
    LabelEdit,
    UnselectAll,
    Undo,
    Redo,
    /// Reset pan and scale to identity.
    ResetViewport,
    /// Pan or scale changed outside of a gesture.
    ViewportChanged,
    /// A message decoded from the transport.
    Inbound(Message),
}

/// Discriminant of [`Event`], used for logging and transition metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseWheel,
    KeyDown,
    TouchStart,
    TouchMove,
    TouchEnd,
    NewDevice,
    NewGroup,
    NewLink,
    PasteDevice,
    PasteGroup,
    LabelEdit,
    UnselectAll,
    Undo,
    Redo,
    ResetViewport,
    ViewportChanged,
    Inbound,
}

impl EventKind {
    /// Handler name by the `on<Kind>` convention.
    #[must_use]
    pub fn handler_name(self) -> String {
        format!("on{self:?}")
    }
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MouseDown(_) => EventKind::MouseDown,
            Self::MouseUp(_) => EventKind::MouseUp,
            Self::MouseMove(_) => EventKind::MouseMove,
            Self::MouseWheel(_) => EventKind::MouseWheel,
            Self::KeyDown(_) => EventKind::KeyDown,
            Self::TouchStart(_) => EventKind::TouchStart,
            Self::TouchMove(_) => EventKind::TouchMove,
            Self::TouchEnd(_) => EventKind::TouchEnd,
            Self::NewDevice(_) => EventKind::NewDevice,
            Self::NewGroup(_) => EventKind::NewGroup,
            Self::NewLink => EventKind::NewLink,
            Self::PasteDevice(_) => EventKind::PasteDevice,
            Self::PasteGroup(_) => EventKind::PasteGroup,
            Self::LabelEdit => EventKind::LabelEdit,
            Self::UnselectAll => EventKind::UnselectAll,
            Self::Undo => EventKind::Undo,
            Self::Redo => EventKind::Redo,
            Self::ResetViewport => EventKind::ResetViewport,
            Self::ViewportChanged => EventKind::ViewportChanged,
            Self::Inbound(_) => EventKind::Inbound,
        }
    }

    /// Screen position carried by pointer and wheel events.
    #[must_use]
    pub fn screen_point(&self) -> Option<Point> {
        match self {
            Self::MouseDown(e) | Self::MouseUp(e) | Self::MouseMove(e) => Some(e.point()),
            Self::MouseWheel(e) => Some(Point::new(e.x, e.y)),
            Self::TouchStart(t) | Self::TouchMove(t) if t.touches.len() == 1 => t.touches.first().copied(),
            _ => None,
        }
    }

    /// Modifier keys held during a pointer or key event.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::MouseDown(e) | Self::MouseUp(e) | Self::MouseMove(e) => e.modifiers,
            Self::MouseWheel(e) => e.modifiers,
            Self::KeyDown(e) => e.modifiers,
            _ => Modifiers::default(),
        }
    }
}
