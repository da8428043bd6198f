//! Editor session: the single mutable context every controller works on.
//!
//! DESIGN
//! ======
//! The session owns the diagram, viewport, pointer tracking, selection,
//! identifier sequencers, undo history and toolboxes. Handlers receive it as
//! `&mut Session` through [`crate::fsm::Step`]; nothing is global.
//!
//! OUTBOUND PATH
//! =============
//! [`Session::send`] stamps a message with this client's id and the next
//! message id, then queues it. [`Session::commit`] is the path for local
//! mutations: stamp, apply to the model through [`crate::sync::apply`],
//! record in history, queue. The model changes immediately; the relay's echo
//! of the same message is ignored on receipt.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::VecDeque;

use frames::{ClientId, Message, SelectionChange, Stamp};

use crate::config::EditorConfig;
use crate::diagram::Diagram;
use crate::fsm::{Directive, Machine, Transition};
use crate::history::History;
use crate::input::Event;
use crate::machines::toolbox::Toolboxes;
use crate::model::{DeviceId, Endpoint, Group, GroupId, GroupType, Link, LinkId};
use crate::seq::Sequencers;
use crate::sync;
use crate::viewport::{Pinch, Point, Viewport};

// =============================================================================
// POINTER
// =============================================================================

/// Cursor position in both coordinate spaces, plus where the last press
/// landed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub screen: Point,
    pub world: Point,
    pub pressed: Point,
    pub pressed_world: Point,
}

// =============================================================================
// SELECTION
// =============================================================================

/// Something that can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Device(DeviceId),
    Interface(Endpoint),
    Link(LinkId),
    Group(GroupId),
}

/// Locally selected items in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<Item>,
}

impl Selection {
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn first(&self) -> Option<Item> {
        self.items.first().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, item: Item) -> bool {
        self.items.contains(&item)
    }

    pub fn push(&mut self, item: Item) {
        if !self.contains(item) {
            self.items.push(item);
        }
    }

    pub fn remove(&mut self, item: Item) {
        self.items.retain(|&i| i != item);
    }

    /// Drop every item for which `keep` is false.
    pub fn retain(&mut self, keep: impl FnMut(&Item) -> bool) {
        self.items.retain(keep);
    }

    pub fn take(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.items)
    }

    #[must_use]
    pub fn devices(&self) -> Vec<DeviceId> {
        self.items
            .iter()
            .filter_map(|i| match i {
                Item::Device(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn links(&self) -> Vec<LinkId> {
        self.items
            .iter()
            .filter_map(|i| match i {
                Item::Link(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn groups(&self) -> Vec<GroupId> {
        self.items
            .iter()
            .filter_map(|i| match i {
                Item::Group(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

/// What one hit test picked. At most one of the three is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hits {
    pub device: Option<DeviceId>,
    pub interface: Option<Endpoint>,
    pub link: Option<LinkId>,
}

impl Hits {
    #[must_use]
    pub fn item(&self) -> Option<Item> {
        self.device
            .map(Item::Device)
            .or(self.interface.map(Item::Interface))
            .or(self.link.map(Item::Link))
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    pub client_id: ClientId,
    pub diagram: Diagram,
    pub viewport: Viewport,
    pub pointer: Pointer,
    pub selection: Selection,
    pub seqs: Sequencers,
    pub history: History,
    pub toolboxes: Toolboxes,
    /// Link being drawn; never part of the diagram.
    pub new_link: Option<Link>,
    /// Group being drawn; never part of the diagram.
    pub new_group: Option<Group>,
    /// Kind chosen by the last `NewGroup`, consumed when drawing starts.
    pub new_group_type: Option<GroupType>,
    /// Baseline of an active two-finger gesture.
    pub pinch: Option<Pinch>,
    pub config: EditorConfig,
    outbox: Vec<Message>,
    directives: VecDeque<Directive>,
    transitions: VecDeque<Transition>,
    dirty: bool,
}

impl Session {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let viewport = Viewport { width: config.width, height: config.height, ..Viewport::default() };
        Self {
            client_id: config.client_id,
            diagram: Diagram::new(),
            viewport,
            pointer: Pointer::default(),
            selection: Selection::default(),
            seqs: Sequencers::default(),
            history: History::new(config.history_limit),
            toolboxes: Toolboxes::new(config.height),
            new_link: None,
            new_group: None,
            new_group_type: None,
            pinch: None,
            config,
            outbox: Vec::new(),
            directives: VecDeque::new(),
            transitions: VecDeque::new(),
            dirty: false,
        }
    }

    // --- Pointer ---

    /// Current cursor position in world coordinates.
    #[must_use]
    pub fn cursor(&self) -> Point {
        self.pointer.world
    }

    /// Record a new cursor position in screen coordinates.
    pub fn track_pointer(&mut self, screen: Point) {
        self.pointer.screen = screen;
        self.pointer.world = self.viewport.screen_to_world(screen);
    }

    /// Recompute the world position after the viewport changed.
    pub fn refresh_pointer(&mut self) {
        self.pointer.world = self.viewport.screen_to_world(self.pointer.screen);
    }

    /// Remember the cursor as the press origin.
    pub fn press(&mut self) {
        self.pointer.pressed = self.pointer.screen;
        self.pointer.pressed_world = self.pointer.world;
    }

    /// World distance moved since the press origin; the origin then follows
    /// the cursor so each call yields an increment.
    pub fn take_drag_delta(&mut self) -> (f64, f64) {
        let delta = (self.pointer.world.x - self.pointer.pressed_world.x, self.pointer.world.y - self.pointer.pressed_world.y);
        self.pointer.pressed_world = self.pointer.world;
        delta
    }

    // --- Outbound ---

    fn stamp(&mut self, message: &mut Message) {
        let seq = &mut self.seqs.message;
        message.stamp_with(self.client_id, &mut || seq.next_id());
    }

    /// Stamp and queue a message without touching the model.
    pub fn send(&mut self, mut message: Message) {
        self.stamp(&mut message);
        tracing::debug!(msg_type = message.msg_type(), sender = self.client_id, "send");
        self.outbox.push(message);
    }

    /// Apply a local mutation, record it for undo, and queue it.
    pub fn commit(&mut self, mut message: Message) {
        self.stamp(&mut message);
        sync::apply(self, &message);
        self.history.record(&message);
        tracing::debug!(msg_type = message.msg_type(), sender = self.client_id, "commit");
        self.outbox.push(message);
        self.dirty = true;
    }

    /// Messages queued since the last call.
    pub fn take_outbox(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    #[must_use]
    pub fn outbox(&self) -> &[Message] {
        &self.outbox
    }

    // --- Redraw ---

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether anything visible changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // --- Directives ---

    pub fn arm(&mut self, machine: Machine) {
        self.directives.push_back(Directive::Arm(machine));
    }

    pub fn disarm(&mut self, machine: Machine) {
        self.directives.push_back(Directive::Disarm(machine));
    }

    /// Dispatch `event` from the head of the chain once the current dispatch
    /// completes.
    pub fn dispatch_later(&mut self, event: Event) {
        self.directives.push_back(Directive::Dispatch(event));
    }

    pub fn next_directive(&mut self) -> Option<Directive> {
        self.directives.pop_front()
    }

    // --- Transitions ---

    pub fn record_transition(&mut self, transition: Transition) {
        if self.config.transition_log_capacity == 0 {
            return;
        }
        while self.transitions.len() >= self.config.transition_log_capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Recorded transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn clear_transitions(&mut self) {
        self.transitions.clear();
    }

    // --- Selection ---

    /// Select one item, flag it on the model and announce device and link
    /// selections to peers.
    pub fn select(&mut self, item: Item) {
        match item {
            Item::Device(id) => {
                if let Some(device) = self.diagram.device_mut(id) {
                    device.selected = true;
                    self.send(Message::DeviceSelected(SelectionChange { stamp: Stamp::default(), id }));
                }
            }
            Item::Interface(endpoint) => {
                if let Some(interface) = self
                    .diagram
                    .device_mut(endpoint.device)
                    .and_then(|d| d.interface_mut(endpoint.interface))
                {
                    interface.selected = true;
                }
            }
            Item::Link(id) => {
                if let Some(link) = self.diagram.link_mut(id) {
                    link.selected = true;
                    self.send(Message::LinkSelected(SelectionChange { stamp: Stamp::default(), id }));
                }
            }
            Item::Group(id) => {
                if let Some(group) = self.diagram.group_mut(id) {
                    group.selected = true;
                }
            }
        }
        self.selection.push(item);
        self.dirty = true;
    }

    /// Unselect everything and announce the device and link unselections.
    pub fn clear_selections(&mut self) {
        for item in self.selection.take() {
            match item {
                Item::Device(id) => {
                    if let Some(device) = self.diagram.device_mut(id) {
                        device.selected = false;
                        device.edit_label = false;
                        self.send(Message::DeviceUnSelected(SelectionChange { stamp: Stamp::default(), id }));
                    }
                }
                Item::Link(id) => {
                    if let Some(link) = self.diagram.link_mut(id) {
                        link.selected = false;
                        link.edit_label = false;
                        self.send(Message::LinkUnSelected(SelectionChange { stamp: Stamp::default(), id }));
                    }
                }
                Item::Interface(_) | Item::Group(_) => {}
            }
        }
        for device in self.diagram.devices_mut() {
            for interface in &mut device.interfaces {
                interface.selected = false;
                interface.edit_label = false;
            }
        }
        for group in self.diagram.groups_mut() {
            group.selected = false;
            group.edit_label = false;
            group.selected_corner = None;
        }
        self.dirty = true;
    }

    /// Hit-test the cursor and select what it picks.
    ///
    /// Devices are tested last to first and the first hit wins. Interfaces
    /// are only tested when no device was hit, and links only when neither a
    /// device nor an interface was hit. Prior selections are cleared unless
    /// `multiple` is set.
    pub fn select_items(&mut self, multiple: bool) -> Hits {
        if !multiple {
            self.clear_selections();
        }
        let cursor = self.cursor();
        let hits = self.hit_test(cursor);
        if let Some(item) = hits.item() {
            self.select(item);
        }
        hits
    }

    /// What lies under `p`, by the selection precedence, without selecting.
    #[must_use]
    pub fn hit_test(&self, p: Point) -> Hits {
        let devices = self.diagram.devices();
        if let Some(device) = devices.iter().rev().find(|d| d.is_selected(p)) {
            return Hits { device: Some(device.id), ..Hits::default() };
        }
        for device in devices.iter().rev() {
            if let Some(interface) = device
                .interfaces
                .iter()
                .rev()
                .find(|i| self.diagram.is_interface_selected(device, i, p))
            {
                let endpoint = Endpoint { device: device.id, interface: interface.id };
                return Hits { interface: Some(endpoint), ..Hits::default() };
            }
        }
        let link = self
            .diagram
            .links()
            .iter()
            .rev()
            .find(|l| self.diagram.is_link_selected(l, p))
            .map(|l| l.id);
        Hits { link, ..Hits::default() }
    }

    /// Recompute group membership and announce groups whose members changed.
    pub fn refresh_memberships(&mut self) {
        let cursor = self.cursor();
        for change in self.diagram.update_all_memberships(cursor) {
            self.send(Message::GroupMembership(frames::GroupMembership {
                stamp: Stamp::default(),
                id: change.group,
                members: change.members,
            }));
        }
    }
}
