//! Interaction state machines and the chain they form.
//!
//! Chain order, head first:
//!
//! | Machine | Role |
//! |---------|------|
//! | [`mode`] | Zoom-driven UI mode; arms and disarms [`movement`] and [`group`] |
//! | [`toolbox`] | Drag templates out of the active toolbox |
//! | [`time`] | Inbound messages, undo and redo |
//! | [`group`] | Rack/site rectangles: draw, resize, move, relabel |
//! | [`link`] | Draw a link between two devices |
//! | [`movement`] | Select, drag, delete and relabel devices, interfaces and links |
//! | [`hotkeys`] | Single-key shortcuts |
//! | [`view`] | Pan and zoom |
//!
//! Hotkeys sit behind the editing machines so a label being edited receives
//! plain keys before they are read as shortcuts.

pub mod group;
pub mod hotkeys;
pub mod link;
pub mod mode;
pub mod movement;
pub mod time;
pub mod toolbox;
pub mod view;


use frames::{InterfaceLabelEdit, LabelEdit, Message, Stamp};

use crate::fsm::Chain;
use crate::input::KeyEvent;
use crate::session::{Item, Session};

/// Build the editor chain in its fixed order.
#[must_use]
pub fn chain() -> Chain {
    Chain::builder()
        .then(mode::ModeState::Start)
        .then(toolbox::ToolboxState::Ready)
        .then(time::TimeState::Present)
        .then(group::GroupState::Disabled)
        .then(link::LinkState::Ready)
        .then(movement::MoveState::Disabled)
        .then(hotkeys::HotkeysState::Enabled)
        .then(view::ViewState::Start)
        .build()
}

// =============================================================================
// LABEL EDITING
// =============================================================================

/// What a key press did to a label being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelKey {
    Edited,
    /// Enter: editing is over.
    Done,
    Ignored,
}

/// Apply one key press to the label of `item` and commit the edit.
pub(crate) fn edit_label(session: &mut Session, item: Item, key: &KeyEvent) -> LabelKey {
    if key.is_enter() {
        return LabelKey::Done;
    }
    let Some(previous) = label_of(session, item) else {
        return LabelKey::Ignored;
    };
    let name = if key.is_delete() {
        let mut name = previous.clone();
        name.pop();
        name
    } else if let Some(c) = key.printable() {
        format!("{previous}{c}")
    } else {
        return LabelKey::Ignored;
    };
    if name == previous {
        return LabelKey::Ignored;
    }
    session.commit(label_message(item, name, previous));
    LabelKey::Edited
}

fn label_of(session: &Session, item: Item) -> Option<String> {
    let diagram = &session.diagram;
    match item {
        Item::Device(id) => diagram.device(id).map(|d| d.name.clone()),
        Item::Interface(endpoint) => diagram
            .device(endpoint.device)
            .and_then(|d| d.interface(endpoint.interface))
            .map(|i| i.name.clone()),
        Item::Link(id) => diagram.link(id).map(|l| l.name.clone()),
        Item::Group(id) => diagram.group(id).map(|g| g.name.clone()),
    }
}

fn label_message(item: Item, name: String, previous_name: String) -> Message {
    let stamp = Stamp::default();
    match item {
        Item::Device(id) => Message::DeviceLabelEdit(LabelEdit { stamp, id, name, previous_name }),
        Item::Interface(endpoint) => Message::InterfaceLabelEdit(InterfaceLabelEdit {
            stamp,
            device_id: endpoint.device,
            id: endpoint.interface,
            name,
            previous_name,
        }),
        Item::Link(id) => Message::LinkLabelEdit(LabelEdit { stamp, id, name, previous_name }),
        Item::Group(id) => Message::GroupLabelEdit(LabelEdit { stamp, id, name, previous_name }),
    }
}

/// Show or hide the label cursor on `item`.
pub(crate) fn set_editing(session: &mut Session, item: Item, on: bool) {
    let diagram = &mut session.diagram;
    match item {
        Item::Device(id) => {
            if let Some(device) = diagram.device_mut(id) {
                device.edit_label = on;
            }
        }
        Item::Interface(endpoint) => {
            if let Some(interface) = diagram.device_mut(endpoint.device).and_then(|d| d.interface_mut(endpoint.interface)) {
                interface.edit_label = on;
            }
        }
        Item::Link(id) => {
            if let Some(link) = diagram.link_mut(id) {
                link.edit_label = on;
            }
        }
        Item::Group(id) => {
            if let Some(group) = diagram.group_mut(id) {
                group.edit_label = on;
            }
        }
    }
    session.mark_dirty();
}
