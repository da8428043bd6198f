//! Selecting, dragging, deleting and relabelling devices, interfaces and
//! links.
//!
//! A press selects whatever the hit test picks. Dragging a selection moves
//! every selected device and commits one `DeviceMove` per device per step,
//! each carrying the previous position. A second press on the same single
//! item followed by a release starts label editing; every keystroke commits a
//! label edit carrying the previous name.
//!
//! Armed only in rack mode; while disabled every event passes through.

use frames::{DeviceCreate, DeviceMove, InterfaceRecord, InterfaceSpec, Message, MultipleMessage, Stamp};

use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{DeviceTemplate, Event, EventKind};
use crate::machines::toolbox::ToolboxItem;
use crate::machines::{LabelKey, edit_label, set_editing};
use crate::model::{DeviceId, DeviceType, LinkId};
use crate::session::{Item, Session};
use crate::sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Disabled,
    Ready,
    Selected1,
    Move,
    Selected2,
    Selected3,
    EditLabel,
    Placing,
}

impl StateSet for MoveState {
    const MACHINE: Machine = Machine::Move;
    const READY: Self = Self::Ready;
    const DISABLED: Option<Self> = Some(Self::Disabled);

    fn name(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Ready => "Ready",
            Self::Selected1 => "Selected1",
            Self::Move => "Move",
            Self::Selected2 => "Selected2",
            Self::Selected3 => "Selected3",
            Self::EditLabel => "EditLabel",
            Self::Placing => "Placing",
        }
    }

    fn start(self, step: &mut Step<'_, Self>) {
        match self {
            Self::Move => {
                for id in step.session.selection.devices() {
                    if let Some(device) = step.session.diagram.device_mut(id) {
                        device.moving = true;
                    }
                }
            }
            Self::EditLabel => {
                if let Some(item) = step.session.selection.first() {
                    set_editing(step.session, item, true);
                }
            }
            _ => {}
        }
    }

    fn end(self, step: &mut Step<'_, Self>) {
        match self {
            Self::Move => {
                for device in step.session.diagram.devices_mut() {
                    device.moving = false;
                }
            }
            Self::EditLabel => {
                if let Some(item) = step.session.selection.first() {
                    set_editing(step.session, item, false);
                }
            }
            _ => {}
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        match (self, event) {
            (Self::Disabled, _) => Flow::Forward,
            (_, Event::UnselectAll) => {
                step.session.clear_selections();
                step.change_state(Self::Ready);
                Flow::Forward
            }

            // --- Ready ---
            (Self::Ready, Event::MouseDown(pointer)) => {
                let hits = step.session.select_items(pointer.modifiers.shift);
                if hits.item().is_some() {
                    step.change_state(Self::Selected1);
                    Flow::Handled
                } else {
                    Flow::Forward
                }
            }
            (Self::Ready, Event::NewDevice(kind)) => {
                new_device(step.session, kind);
                step.change_state(Self::Placing);
                Flow::Handled
            }
            (Self::Ready, Event::PasteDevice(template)) => {
                paste_device(step.session, template);
                step.change_state(Self::Selected2);
                Flow::Handled
            }
            // New devices always start from Ready, whatever is in progress.
            (_, Event::NewDevice(_) | Event::PasteDevice(_)) => {
                step.change_state(Self::Ready);
                step.redispatch(event)
            }

            // --- Selected1: pressed on an item ---
            (Self::Selected1 | Self::Selected3 | Self::Placing, Event::MouseMove(_)) => {
                step.change_state(Self::Move);
                Flow::Handled
            }
            (Self::Selected1 | Self::Move, Event::MouseUp(_)) => {
                step.change_state(Self::Selected2);
                Flow::Handled
            }
            (Self::Selected1, Event::MouseDown(_)) => Flow::Handled,

            // --- Move ---
            (Self::Move, Event::MouseMove(_)) => {
                drag_selected(step.session);
                Flow::Handled
            }
            (Self::Move | Self::Placing, Event::MouseDown(_)) => {
                step.change_state(Self::Selected1);
                Flow::Handled
            }

            // --- Selected2: released on an item ---
            (Self::Selected2, Event::MouseDown(_)) => {
                let current = single_selection(step.session);
                let cursor = step.session.cursor();
                let picked = step.session.hit_test(cursor).item();
                if current.is_some() && current == picked {
                    step.change_state(Self::Selected3);
                    Flow::Handled
                } else {
                    step.change_state(Self::Ready);
                    step.redispatch(event)
                }
            }
            (Self::Selected2, Event::KeyDown(key)) if key.is_delete() => {
                delete_selected(step.session);
                step.change_state(Self::Ready);
                Flow::Handled
            }
            (Self::Selected2, Event::LabelEdit) => {
                if single_selection(step.session).is_some() {
                    step.change_state(Self::EditLabel);
                }
                Flow::Handled
            }
            // --- Selected3: pressed again on the same item ---
            (Self::Selected3, Event::MouseUp(_)) => {
                step.change_state(Self::EditLabel);
                Flow::Handled
            }

            // --- EditLabel ---
            (Self::EditLabel, Event::KeyDown(key)) => {
                let Some(item) = step.session.selection.first() else {
                    step.change_state(Self::Ready);
                    return Flow::Handled;
                };
                if edit_label(step.session, item, key) == LabelKey::Done {
                    step.change_state(Self::Selected2);
                }
                Flow::Handled
            }
            (Self::EditLabel, Event::MouseDown(_)) => {
                step.change_state(Self::Ready);
                step.redispatch(event)
            }

            _ => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        let Trigger::Event(kind) = trigger else {
            return &[];
        };
        match (self, kind) {
            (Self::Disabled, _) => &[],
            (_, EventKind::UnselectAll) => &[Self::Ready],
            (Self::Ready, EventKind::MouseDown) => &[Self::Selected1],
            (Self::Ready, EventKind::NewDevice) => &[Self::Placing],
            (Self::Ready, EventKind::PasteDevice) => &[Self::Selected2],
            (_, EventKind::NewDevice | EventKind::PasteDevice) => &[Self::Ready],
            (Self::Selected1 | Self::Selected3 | Self::Placing, EventKind::MouseMove) => &[Self::Move],
            (Self::Selected1 | Self::Move, EventKind::MouseUp) => &[Self::Selected2],
            (Self::Move | Self::Placing, EventKind::MouseDown) => &[Self::Selected1],
            // Pressing elsewhere replays the press in Ready.
            (Self::Selected2, EventKind::MouseDown) => &[Self::Selected3, Self::Ready],
            (Self::Selected2, EventKind::KeyDown) => &[Self::Ready],
            (Self::Selected2, EventKind::LabelEdit) => &[Self::EditLabel],
            (Self::Selected3, EventKind::MouseUp) => &[Self::EditLabel],
            (Self::EditLabel, EventKind::KeyDown) => &[Self::Selected2, Self::Ready],
            (Self::EditLabel, EventKind::MouseDown) => &[Self::Ready],
            _ => &[],
        }
    }
}

/// The only selected item, if exactly one is selected.
fn single_selection(session: &Session) -> Option<Item> {
    match session.selection.items() {
        [item] => Some(*item),
        _ => None,
    }
}

/// Create a device of `kind` at the cursor, named after its kind and id.
fn new_device(session: &mut Session, kind: &DeviceType) {
    session.clear_selections();
    session.press();
    let id = session.seqs.device.next_id();
    let cursor = session.cursor();
    session.commit(Message::DeviceCreate(DeviceCreate {
        stamp: Stamp::default(),
        id,
        x: cursor.x,
        y: cursor.y,
        name: format!("{}{id}", kind.name_prefix()),
        kind: kind.clone(),
        host_id: None,
    }));
    session.select(Item::Device(id));
}

/// Create a device and its interfaces from a template, as one message.
fn paste_device(session: &mut Session, template: &DeviceTemplate) {
    session.clear_selections();
    session.press();
    let id = session.seqs.device.next_id();
    let cursor = session.cursor();
    let mut messages = vec![Message::DeviceCreate(DeviceCreate {
        stamp: Stamp::default(),
        id,
        x: cursor.x,
        y: cursor.y,
        name: template.name.clone(),
        kind: template.kind.clone(),
        host_id: template.host_id,
    })];
    messages.extend(template.interfaces.iter().map(|i| {
        Message::InterfaceCreate(InterfaceSpec { stamp: Stamp::default(), device_id: id, id: i.id, name: i.name.clone() })
    }));
    session.commit(Message::MultipleMessage(MultipleMessage { stamp: Stamp::default(), messages }));
    session.select(Item::Device(id));
}

/// Move every selected device by the distance dragged since the last step.
fn drag_selected(session: &mut Session) {
    let (dx, dy) = session.take_drag_delta();
    for id in session.selection.devices() {
        let Some(device) = session.diagram.device(id) else {
            continue;
        };
        let (previous_x, previous_y) = (device.x, device.y);
        session.commit(Message::DeviceMove(DeviceMove {
            stamp: Stamp::default(),
            id,
            x: previous_x + dx,
            y: previous_y + dy,
            previous_x,
            previous_y,
        }));
    }
    session.refresh_memberships();
}

/// Destroy selected links, then selected devices together with their links.
/// Destroyed devices go back to the inventory.
fn delete_selected(session: &mut Session) {
    let links = session.selection.links();
    let devices = session.selection.devices();
    session.clear_selections();

    for id in links {
        destroy_link(session, id);
    }
    for id in devices {
        let touching: Vec<_> = session.diagram.links().iter().filter(|l| l.touches(id)).map(|l| l.id).collect();
        for link in touching {
            destroy_link(session, link);
        }
        let Some(device) = session.diagram.device(id) else {
            continue;
        };
        let destroy = sync::destroy_message(device);
        let template = template_of(session, id);
        session.commit(destroy);
        if let Some(template) = template {
            session.toolboxes.inventory.items.push(ToolboxItem::Device(template));
        }
    }
}

fn destroy_link(session: &mut Session, id: LinkId) {
    if let Some(spec) = session.diagram.link(id).and_then(sync::link_spec) {
        session.commit(Message::LinkDestroy(spec));
    }
}

fn template_of(session: &Session, id: DeviceId) -> Option<DeviceTemplate> {
    let device = session.diagram.device(id)?;
    Some(DeviceTemplate {
        name: device.name.clone(),
        kind: device.kind.clone(),
        host_id: device.host_id,
        interfaces: device
            .interfaces
            .iter()
            .map(|i| InterfaceRecord { id: i.id, name: i.name.clone() })
            .collect(),
    })
}
