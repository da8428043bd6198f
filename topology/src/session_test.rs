#![allow(clippy::float_cmp)]

use frames::{DeviceCreate, DeviceMove, InterfaceSpec, LinkSpec, MultipleMessage};

use super::*;
use crate::model::{Device, DeviceType};

// =============================================================
// Helpers
// =============================================================

fn session() -> Session {
    Session::new(EditorConfig { client_id: 7, ..EditorConfig::default() })
}

fn create(id: DeviceId, x: f64, y: f64) -> Message {
    Message::DeviceCreate(DeviceCreate {
        stamp: Stamp::default(),
        id,
        x,
        y,
        name: format!("Switch{id}"),
        kind: DeviceType::Switch,
        host_id: None,
    })
}

/// Two switches 400 apart joined by link 1 on interface 1 of each.
fn linked(session: &mut Session) {
    let iface = |device_id| Message::InterfaceCreate(InterfaceSpec { stamp: Stamp::default(), device_id, id: 1, name: "eth1".into() });
    let link = Message::LinkCreate(LinkSpec {
        stamp: Stamp::default(),
        id: 1,
        name: String::new(),
        from_device_id: 1,
        to_device_id: 2,
        from_interface_id: 1,
        to_interface_id: 1,
    });
    session.commit(Message::MultipleMessage(MultipleMessage {
        stamp: Stamp::default(),
        messages: vec![create(1, 0.0, 0.0), create(2, 400.0, 0.0), iface(1), iface(2), link],
    }));
    session.take_outbox();
}

fn types(messages: &[Message]) -> Vec<&'static str> {
    messages.iter().map(Message::msg_type).collect()
}

// =============================================================
// Outbound
// =============================================================

#[test]
fn send_stamps_sender_and_sequential_ids() {
    let mut session = session();
    session.send(Message::RequestSnapshot(frames::RequestSnapshot::default()));
    session.send(Message::RequestSnapshot(frames::RequestSnapshot::default()));
    let stamps: Vec<Stamp> = session.take_outbox().iter().filter_map(|m| m.stamp().copied()).collect();
    assert_eq!(stamps.iter().map(|s| s.sender).collect::<Vec<_>>(), vec![7, 7]);
    assert_eq!(stamps.iter().map(|s| s.message_id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(session.outbox().is_empty());
}

#[test]
fn commit_applies_records_and_queues() {
    let mut session = session();
    session.commit(create(1, 10.0, 20.0));
    assert!(session.diagram.device(1).is_some());
    assert_eq!(session.history.len(), 1);
    assert_eq!(types(session.outbox()), vec!["DeviceCreate"]);
    assert!(session.take_dirty());
    assert!(!session.take_dirty());
}

#[test]
fn composite_children_are_stamped_after_the_parent() {
    let mut session = session();
    linked(&mut session);
    session.commit(Message::MultipleMessage(MultipleMessage { stamp: Stamp::default(), messages: vec![create(3, 0.0, 0.0)] }));
    let second = session.take_outbox();
    let Message::MultipleMessage(multiple) = &second[0] else {
        panic!("expected a composite");
    };
    let child = multiple.messages[0].stamp().expect("stamp").message_id;
    assert_eq!(child, multiple.stamp.message_id + 1);
}

// =============================================================
// Pointer
// =============================================================

#[test]
fn drag_delta_is_incremental_in_world_space() {
    let mut session = session();
    session.viewport.scale = 2.0;
    session.track_pointer(Point::new(100.0, 100.0));
    session.press();
    session.track_pointer(Point::new(120.0, 100.0));
    assert_eq!(session.take_drag_delta(), (10.0, 0.0));
    session.track_pointer(Point::new(120.0, 140.0));
    assert_eq!(session.take_drag_delta(), (0.0, 20.0));
    assert_eq!(session.take_drag_delta(), (0.0, 0.0));
}

#[test]
fn refresh_pointer_follows_the_viewport() {
    let mut session = session();
    session.track_pointer(Point::new(100.0, 50.0));
    session.viewport.pan_x = 100.0;
    session.refresh_pointer();
    assert_eq!(session.cursor(), Point::new(0.0, 50.0));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn hit_test_prefers_devices_then_interfaces_then_links() {
    let mut session = session();
    linked(&mut session);
    assert_eq!(session.hit_test(Point::new(0.0, 0.0)).item(), Some(Item::Device(1)));
    // Just outside switch 1, on the link, within its anchor plus slack.
    assert_eq!(
        session.hit_test(Point::new(60.0, 0.0)).item(),
        Some(Item::Interface(Endpoint { device: 1, interface: 1 }))
    );
    assert_eq!(session.hit_test(Point::new(200.0, 5.0)).item(), Some(Item::Link(1)));
    assert_eq!(session.hit_test(Point::new(200.0, 50.0)).item(), None);
}

#[test]
fn topmost_device_wins() {
    let mut session = session();
    session.commit(create(1, 0.0, 0.0));
    session.commit(create(2, 20.0, 0.0));
    assert_eq!(session.hit_test(Point::new(10.0, 0.0)).device, Some(2));
}

#[test]
fn select_items_announces_and_clears_unless_multiple() {
    let mut session = session();
    linked(&mut session);
    session.track_pointer(Point::new(0.0, 0.0));
    session.select_items(false);
    session.track_pointer(Point::new(400.0, 0.0));
    session.select_items(true);
    assert_eq!(session.selection.devices(), vec![1, 2]);
    assert_eq!(types(&session.take_outbox()), vec!["DeviceSelected", "DeviceSelected"]);

    session.track_pointer(Point::new(200.0, 5.0));
    let hits = session.select_items(false);
    assert_eq!(hits.link, Some(1));
    assert_eq!(types(&session.take_outbox()), vec!["DeviceUnSelected", "DeviceUnSelected", "LinkSelected"]);
    assert!(session.diagram.link(1).expect("link").selected);
    assert!(!session.diagram.device(1).expect("device").selected);
}

#[test]
fn clear_selections_resets_group_flags() {
    let mut session = session();
    let mut group = Group::new(1, "Rack1", GroupType::Rack, Point::new(0.0, 0.0), Some(Point::new(10.0, 10.0)));
    group.selected_corner = Some(crate::model::Corner::TopLeft);
    session.diagram.insert_group(group);
    session.select(Item::Group(1));
    session.clear_selections();
    let group = session.diagram.group(1).expect("group");
    assert!(!group.selected);
    assert_eq!(group.selected_corner, None);
    assert!(session.selection.is_empty());
}

// =============================================================
// Membership
// =============================================================

#[test]
fn refresh_memberships_announces_only_changes() {
    let mut session = session();
    session.diagram.insert_device(Device::new(1, "Host1", 50.0, 50.0, DeviceType::Host));
    session.diagram.insert_group(Group::new(1, "Rack1", GroupType::Rack, Point::new(0.0, 0.0), Some(Point::new(100.0, 100.0))));
    session.refresh_memberships();
    assert_eq!(session.diagram.group(1).expect("group").members, vec![1]);
    assert_eq!(types(&session.take_outbox()), vec!["GroupMembership"]);

    session.refresh_memberships();
    assert!(session.take_outbox().is_empty());

    session.commit(Message::DeviceMove(DeviceMove { stamp: Stamp::default(), id: 1, x: 500.0, y: 50.0, previous_x: 50.0, previous_y: 50.0 }));
    session.take_outbox();
    session.refresh_memberships();
    assert!(session.diagram.group(1).expect("group").members.is_empty());
    assert_eq!(types(&session.take_outbox()), vec!["GroupMembership"]);
}

// =============================================================
// Directives and transitions
// =============================================================

#[test]
fn directives_come_back_in_order() {
    let mut session = session();
    session.arm(Machine::Move);
    session.dispatch_later(Event::NewLink);
    session.disarm(Machine::Group);
    assert_eq!(session.next_directive(), Some(Directive::Arm(Machine::Move)));
    assert_eq!(session.next_directive(), Some(Directive::Dispatch(Event::NewLink)));
    assert_eq!(session.next_directive(), Some(Directive::Disarm(Machine::Group)));
    assert_eq!(session.next_directive(), None);
}

#[test]
fn zero_capacity_disables_the_transition_log() {
    let mut session = Session::new(EditorConfig { transition_log_capacity: 0, ..EditorConfig::default() });
    session.record_transition(Transition { machine: Machine::View, from: "Ready", to: "Pan", trigger: crate::fsm::Trigger::Start });
    assert_eq!(session.transitions().count(), 0);
}
