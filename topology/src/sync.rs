//! Applying protocol messages to the model.
//!
//! DESIGN
//! ======
//! [`apply`] is the only code that turns a message into a model change. The
//! local commit path, the inbound path for other clients' messages, undo
//! (applying an [`inverse`]) and redo (applying the original again) all go
//! through it, so the model's cross-reference rules live in one place.
//!
//! Every lookup is by id. A message naming an entity that no longer exists
//! is a no-op, which keeps undo of already-deleted entities harmless.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use frames::{
    DeviceCreate, DeviceDestroy, DeviceMove, DeviceRecord, GroupMove, GroupRecord, GroupSpec, InterfaceLabelEdit,
    InterfaceRecord, InterfaceSpec, LabelEdit, LinkRecord, LinkSpec, Message, MultipleMessage, Snapshot, Stamp,
};
use tracing::{debug, warn};

use crate::input::Event;
use crate::model::{Device, Endpoint, Group, Interface, Link};
use crate::session::{Item, Session};
use crate::viewport::Point;

// =============================================================================
// APPLY
// =============================================================================

/// Apply one message to the session's model.
pub fn apply(session: &mut Session, message: &Message) {
    debug!(msg_type = message.msg_type(), sender = message.sender(), "apply");
    match message {
        Message::ClientId(id) => session.client_id = *id,
        Message::Topology(topology) => {
            session.viewport.pan_x = topology.pan_x;
            session.viewport.pan_y = topology.pan_y;
            if topology.scale > 0.0 {
                session.viewport.scale = topology.scale;
            }
            session.seqs.device.reseed(topology.device_id_seq);
            session.seqs.link.reseed(topology.link_id_seq);
            session.seqs.group.reseed(topology.group_id_seq);
            session.refresh_pointer();
            session.dispatch_later(Event::ViewportChanged);
        }
        Message::Snapshot(snapshot) => apply_snapshot(session, snapshot),
        Message::MultipleMessage(multiple) => {
            for part in &multiple.messages {
                apply(session, part);
            }
        }
        Message::RequestSnapshot(_) | Message::Undo(_) | Message::Redo(_) => {}
        Message::DeviceCreate(m) => {
            let mut device = Device::new(m.id, m.name.clone(), m.x, m.y, m.kind.clone());
            device.host_id = m.host_id;
            if session.diagram.insert_device(device) {
                session.seqs.device.observe(m.id);
                session.toolboxes.inventory.forget_device(&m.name);
            } else {
                debug!(id = m.id, "device already exists");
            }
        }
        Message::DeviceDestroy(m) => {
            if session.diagram.remove_device(m.id).is_some() {
                deselect_device(session, m.id);
            }
        }
        Message::DeviceMove(m) => {
            session.diagram.move_device(m.id, m.x, m.y);
        }
        Message::DeviceLabelEdit(m) => {
            if let Some(device) = session.diagram.device_mut(m.id) {
                device.name.clone_from(&m.name);
            }
        }
        Message::DeviceSelected(m) | Message::DeviceUnSelected(m) => {
            if let Some(device) = session.diagram.device_mut(m.id) {
                device.remote_selected = matches!(message, Message::DeviceSelected(_));
            }
        }
        Message::DeviceStatus(m) => {
            if let Some(device) = session.diagram.device_named_mut(&m.name) {
                device.status = m.status;
                device.working = m.working;
            }
        }
        Message::TaskStatus(m) => {
            if let Some(device) = session.diagram.device_named_mut(&m.device_name) {
                match device.tasks.iter_mut().find(|t| t.id == m.task_id) {
                    Some(task) => {
                        task.status = m.status;
                        task.working = m.working;
                    }
                    None => device.tasks.push(crate::model::Task { id: m.task_id, status: m.status, working: m.working }),
                }
            }
        }
        Message::InterfaceCreate(m) => {
            if !session.diagram.add_interface(m.device_id, Interface::new(m.id, m.name.clone())) {
                debug!(device = m.device_id, id = m.id, "interface not added");
            }
        }
        Message::InterfaceDestroy(m) => {
            if session.diagram.remove_interface(m.device_id, m.id).is_some() {
                let endpoint = Endpoint { device: m.device_id, interface: m.id };
                session.selection.remove(Item::Interface(endpoint));
                prune_link_selection(session);
            }
        }
        Message::InterfaceLabelEdit(m) => {
            if let Some(interface) = session.diagram.device_mut(m.device_id).and_then(|d| d.interface_mut(m.id)) {
                interface.name.clone_from(&m.name);
            }
        }
        Message::LinkCreate(m) => {
            let link = link_from_spec(m);
            if session.diagram.insert_link(link) {
                session.seqs.link.observe(m.id);
                prune_link_selection(session);
            } else {
                warn!(id = m.id, "link references a missing endpoint or already exists");
            }
        }
        Message::LinkDestroy(m) => {
            let from = Endpoint { device: m.from_device_id, interface: m.from_interface_id };
            let to = Endpoint { device: m.to_device_id, interface: m.to_interface_id };
            if session.diagram.remove_link_between(m.id, from, to).is_some() {
                session.selection.remove(Item::Link(m.id));
            }
        }
        Message::LinkLabelEdit(m) => {
            if let Some(link) = session.diagram.link_mut(m.id) {
                link.name.clone_from(&m.name);
            }
        }
        Message::LinkSelected(m) | Message::LinkUnSelected(m) => {
            if let Some(link) = session.diagram.link_mut(m.id) {
                link.remote_selected = matches!(message, Message::LinkSelected(_));
            }
        }
        Message::GroupCreate(m) => {
            let group = Group::new(m.id, m.name.clone(), m.kind.clone(), Point::new(m.x1, m.y1), Some(Point::new(m.x2, m.y2)));
            if session.diagram.insert_group(group) {
                session.seqs.group.observe(m.id);
                let cursor = session.cursor();
                session.diagram.update_membership(m.id, cursor);
            } else {
                debug!(id = m.id, "group already exists");
            }
        }
        Message::GroupDestroy(m) => {
            if session.diagram.remove_group(m.id).is_some() {
                session.selection.remove(Item::Group(m.id));
            }
        }
        Message::GroupMove(m) => {
            if let Some(group) = session.diagram.group_mut(m.id) {
                group.x1 = m.x1;
                group.y1 = m.y1;
                group.second = Some(Point::new(m.x2, m.y2));
            }
        }
        Message::GroupLabelEdit(m) => {
            if let Some(group) = session.diagram.group_mut(m.id) {
                group.name.clone_from(&m.name);
            }
        }
        Message::GroupMembership(m) => {
            if let Some(group) = session.diagram.group_mut(m.id) {
                group.members.clone_from(&m.members);
            }
        }
    }
    session.mark_dirty();
}

fn deselect_device(session: &mut Session, id: u64) {
    session.selection.retain(|item| match item {
        Item::Device(d) => *d != id,
        Item::Interface(endpoint) => endpoint.device != id,
        _ => true,
    });
    prune_link_selection(session);
}

/// Drop selected links that no longer exist.
fn prune_link_selection(session: &mut Session) {
    let diagram = &session.diagram;
    session.selection.retain(|item| match item {
        Item::Link(id) => diagram.link(*id).is_some(),
        _ => true,
    });
}

fn link_from_spec(m: &LinkSpec) -> Link {
    Link::new(
        m.id,
        m.name.clone(),
        Endpoint { device: m.from_device_id, interface: m.from_interface_id },
        Endpoint { device: m.to_device_id, interface: m.to_interface_id },
    )
}

// =============================================================================
// INVERSE
// =============================================================================

/// The message that undoes `message`, built only from fields it carries.
///
/// Returns `None` for messages that are not undoable.
#[must_use]
pub fn inverse(message: &Message) -> Option<Message> {
    let stamp = message.stamp().copied().unwrap_or_default();
    let inverted = match message {
        Message::DeviceMove(m) => Message::DeviceMove(DeviceMove {
            stamp,
            id: m.id,
            x: m.previous_x,
            y: m.previous_y,
            previous_x: m.x,
            previous_y: m.y,
        }),
        Message::DeviceCreate(m) => Message::DeviceDestroy(DeviceDestroy {
            stamp,
            id: m.id,
            previous_x: m.x,
            previous_y: m.y,
            previous_name: m.name.clone(),
            previous_type: m.kind.clone(),
            previous_host_id: m.host_id,
            previous_interfaces: Vec::new(),
        }),
        Message::DeviceDestroy(m) => {
            let mut messages = vec![Message::DeviceCreate(DeviceCreate {
                stamp,
                id: m.id,
                x: m.previous_x,
                y: m.previous_y,
                name: m.previous_name.clone(),
                kind: m.previous_type.clone(),
                host_id: m.previous_host_id,
            })];
            messages.extend(m.previous_interfaces.iter().map(|i| {
                Message::InterfaceCreate(InterfaceSpec { stamp, device_id: m.id, id: i.id, name: i.name.clone() })
            }));
            Message::MultipleMessage(MultipleMessage { stamp, messages })
        }
        Message::DeviceLabelEdit(m) => Message::DeviceLabelEdit(swap_label(m)),
        Message::LinkLabelEdit(m) => Message::LinkLabelEdit(swap_label(m)),
        Message::GroupLabelEdit(m) => Message::GroupLabelEdit(swap_label(m)),
        Message::InterfaceLabelEdit(m) => Message::InterfaceLabelEdit(InterfaceLabelEdit {
            stamp,
            device_id: m.device_id,
            id: m.id,
            name: m.previous_name.clone(),
            previous_name: m.name.clone(),
        }),
        Message::InterfaceCreate(m) => Message::InterfaceDestroy(m.clone()),
        Message::InterfaceDestroy(m) => Message::InterfaceCreate(m.clone()),
        Message::LinkCreate(m) => Message::LinkDestroy(m.clone()),
        Message::LinkDestroy(m) => Message::LinkCreate(m.clone()),
        Message::GroupCreate(m) => Message::GroupDestroy(m.clone()),
        Message::GroupDestroy(m) => Message::GroupCreate(m.clone()),
        Message::GroupMove(m) => Message::GroupMove(GroupMove {
            stamp,
            id: m.id,
            x1: m.previous_x1,
            y1: m.previous_y1,
            x2: m.previous_x2,
            y2: m.previous_y2,
            previous_x1: m.x1,
            previous_y1: m.y1,
            previous_x2: m.x2,
            previous_y2: m.y2,
        }),
        Message::MultipleMessage(m) => Message::MultipleMessage(MultipleMessage {
            stamp,
            messages: m.messages.iter().rev().filter_map(inverse).collect(),
        }),
        _ => return None,
    };
    Some(inverted)
}

fn swap_label(m: &LabelEdit) -> LabelEdit {
    LabelEdit { stamp: m.stamp, id: m.id, name: m.previous_name.clone(), previous_name: m.name.clone() }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Replace the whole model with `snapshot`.
///
/// Devices, their interfaces, links and groups are rebuilt by id. Duplicate
/// ids and links whose endpoints do not resolve are skipped with a warning.
/// The viewport is fitted to the devices and every sequencer is reseeded from
/// the highest id present. History is left alone.
pub fn apply_snapshot(session: &mut Session, snapshot: &Snapshot) {
    session.diagram.clear();
    session.selection.take();
    session.new_link = None;
    session.new_group = None;

    for record in &snapshot.devices {
        if session.diagram.insert_device(device_from_record(record)) {
            session.toolboxes.inventory.forget_device(&record.name);
        } else {
            warn!(id = record.id, "snapshot repeats a device id");
        }
    }
    for record in &snapshot.links {
        let link = Link::new(
            record.id,
            record.name.clone(),
            Endpoint { device: record.from_device_id, interface: record.from_interface_id },
            Endpoint { device: record.to_device_id, interface: record.to_interface_id },
        );
        if !session.diagram.insert_link(link) {
            warn!(id = record.id, "snapshot link is unresolved or repeated");
        }
    }
    for record in &snapshot.groups {
        let mut group = Group::new(
            record.id,
            record.name.clone(),
            record.kind.clone(),
            Point::new(record.x1, record.y1),
            Some(Point::new(record.x2, record.y2)),
        );
        group.members.clone_from(&record.members);
        if !session.diagram.insert_group(group) {
            warn!(id = record.id, "snapshot repeats a group id");
        }
    }

    if let Some(max) = session.diagram.devices().iter().map(|d| d.id).max() {
        session.seqs.device.reseed(max);
    }
    if let Some(max) = session.diagram.links().iter().map(|l| l.id).max() {
        session.seqs.link.reseed(max);
    }
    if let Some(max) = session.diagram.groups().iter().map(|g| g.id).max() {
        session.seqs.group.reseed(max);
    }

    if let Some(bounds) = session.diagram.device_bounds() {
        session.viewport.fit(bounds);
    }
    session.refresh_pointer();
    session.dispatch_later(Event::ViewportChanged);
    debug!(
        devices = session.diagram.devices().len(),
        links = session.diagram.links().len(),
        groups = session.diagram.groups().len(),
        "snapshot applied"
    );
}

fn device_from_record(record: &DeviceRecord) -> Device {
    let mut device = Device::new(record.id, record.name.clone(), record.x, record.y, record.kind.clone());
    device.host_id = record.host_id;
    for interface in &record.interfaces {
        if device.interface(interface.id).is_none() {
            device.interfaces.push(Interface::new(interface.id, interface.name.clone()));
        }
    }
    let max_interface = device.interfaces.iter().map(|i| i.id).max().unwrap_or_default();
    device.interface_seq.reseed(record.interface_id_seq.max(max_interface));
    device
}

/// The current model as a snapshot payload.
#[must_use]
pub fn capture(session: &Session) -> Snapshot {
    let diagram = &session.diagram;
    let devices = diagram
        .devices()
        .iter()
        .map(|d| DeviceRecord {
            id: d.id,
            name: d.name.clone(),
            x: d.x,
            y: d.y,
            kind: d.kind.clone(),
            host_id: d.host_id,
            interface_id_seq: d.interface_seq.last(),
            interfaces: d.interfaces.iter().map(|i| InterfaceRecord { id: i.id, name: i.name.clone() }).collect(),
        })
        .collect();
    let links = diagram
        .links()
        .iter()
        .filter_map(|l| {
            let (from, to) = l.endpoints()?;
            Some(LinkRecord {
                id: l.id,
                name: l.name.clone(),
                from_device_id: from.device,
                to_device_id: to.device,
                from_interface_id: from.interface,
                to_interface_id: to.interface,
            })
        })
        .collect();
    let cursor = session.cursor();
    let groups = diagram
        .groups()
        .iter()
        .map(|g| {
            let (x1, y1, x2, y2) = g.corners(cursor);
            GroupRecord { id: g.id, name: g.name.clone(), kind: g.kind.clone(), x1, y1, x2, y2, members: g.members.clone() }
        })
        .collect();
    Snapshot { stamp: Stamp::default(), devices, links, groups }
}

/// A `DeviceDestroy` carrying everything needed to rebuild `device`.
#[must_use]
pub fn destroy_message(device: &Device) -> Message {
    Message::DeviceDestroy(DeviceDestroy {
        stamp: Stamp::default(),
        id: device.id,
        previous_x: device.x,
        previous_y: device.y,
        previous_name: device.name.clone(),
        previous_type: device.kind.clone(),
        previous_host_id: device.host_id,
        previous_interfaces: device.interfaces.iter().map(|i| InterfaceRecord { id: i.id, name: i.name.clone() }).collect(),
    })
}

/// A `LinkCreate`/`LinkDestroy` payload for a resolved link.
#[must_use]
pub fn link_spec(link: &Link) -> Option<LinkSpec> {
    let (from, to) = link.endpoints()?;
    Some(LinkSpec {
        stamp: Stamp::default(),
        id: link.id,
        name: link.name.clone(),
        from_device_id: from.device,
        to_device_id: to.device,
        from_interface_id: from.interface,
        to_interface_id: to.interface,
    })
}

/// A `GroupCreate`/`GroupDestroy` payload for a group.
#[must_use]
pub fn group_spec(group: &Group, cursor: Point) -> GroupSpec {
    let (x1, y1, x2, y2) = group.corners(cursor);
    GroupSpec { stamp: Stamp::default(), id: group.id, name: group.name.clone(), kind: group.kind.clone(), x1, y1, x2, y2 }
}
