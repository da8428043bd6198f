#![allow(clippy::float_cmp)]

use super::*;
use crate::model::{DeviceType, GroupType};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// =============================================================
// Helpers
// =============================================================

fn device(id: DeviceId, x: f64, y: f64, kind: DeviceType) -> Device {
    let mut device = Device::new(id, format!("D{id}"), x, y, kind);
    device.interfaces.push(Interface::new(1, "eth1"));
    device
}

fn ep(device: DeviceId, interface: InterfaceId) -> Endpoint {
    Endpoint { device, interface }
}

/// Router A at (100,100) and switch B at (300,100) joined by link 1.
fn linked_pair() -> Diagram {
    let mut diagram = Diagram::new();
    assert!(diagram.insert_device(device(1, 100.0, 100.0, DeviceType::Router)));
    assert!(diagram.insert_device(device(2, 300.0, 100.0, DeviceType::Switch)));
    assert!(diagram.insert_link(Link::new(1, "A-B", ep(1, 1), ep(2, 1))));
    diagram
}

fn dot(diagram: &Diagram, device: DeviceId) -> Option<Point> {
    diagram.device(device)?.interface(1)?.dot
}

// =============================================================
// Links and anchors
// =============================================================

#[test]
fn link_create_binds_interfaces_and_places_dots() {
    let diagram = linked_pair();
    let a = diagram.device(1).expect("a");
    let b = diagram.device(2).expect("b");
    assert_eq!(a.interface(1).expect("eth").link, Some(1));
    assert_eq!(b.interface(1).expect("eth").link, Some(1));
    assert!(dot(&diagram, 1).is_some());
    assert!(dot(&diagram, 2).is_some());

    let link = diagram.link(1).expect("link");
    assert!(approx_eq(diagram.link_length(link).expect("length"), 200.0));
}

#[test]
fn dots_sit_on_device_outlines() {
    let diagram = linked_pair();
    let a = dot(&diagram, 1).expect("router dot");
    let b = dot(&diagram, 2).expect("switch dot");
    assert!(approx_eq(a.x, 150.0) && approx_eq(a.y, 100.0));
    assert!(approx_eq(b.x, 250.0) && approx_eq(b.y, 100.0));

    let router = diagram.device(1).expect("router");
    let distance = router.dot_distance(router.interface(1).expect("eth")).expect("distance");
    assert!(approx_eq(distance, 50.0));
}

#[test]
fn moving_a_device_recomputes_both_anchors() {
    let mut diagram = linked_pair();
    assert!(diagram.move_device(1, 100.0, 300.0));

    let router = diagram.device(1).expect("router");
    let a = dot(&diagram, 1).expect("router dot");
    assert!(approx_eq(router.center().distance(a), 50.0));

    // The switch dot must stay on the switch's box and on the line A-B.
    let b = dot(&diagram, 2).expect("switch dot");
    let on_box = approx_eq((b.x - 300.0).abs(), 50.0) || approx_eq((b.y - 100.0).abs(), 50.0);
    assert!(on_box);
    let cross = (300.0 - 100.0) * (b.y - 300.0) - (100.0 - 300.0) * (b.x - 100.0);
    assert!(cross.abs() < 1e-6);
}

#[test]
fn link_with_missing_interface_is_not_stored() {
    let mut diagram = Diagram::new();
    diagram.insert_device(device(1, 0.0, 0.0, DeviceType::Router));
    diagram.insert_device(device(2, 100.0, 0.0, DeviceType::Router));
    assert!(!diagram.insert_link(Link::new(1, "", ep(1, 1), ep(2, 9))));
    assert!(diagram.links().is_empty());
    assert_eq!(diagram.device(1).expect("a").interface(1).expect("eth").link, None);
}

#[test]
fn provisional_link_is_rejected_and_never_hits() {
    let mut diagram = linked_pair();
    let provisional = Link::provisional(5, 1);
    assert!(!diagram.is_link_selected(&provisional, Point::new(100.0, 100.0)));
    assert!(diagram.link_length(&provisional).is_none());
    assert!(!diagram.insert_link(provisional));
}

#[test]
fn link_hit_tolerance_is_ten_pixels() {
    let diagram = linked_pair();
    let link = diagram.link(1).expect("link");
    assert!(diagram.is_link_selected(link, Point::new(200.0, 105.0)));
    assert!(!diagram.is_link_selected(link, Point::new(200.0, 115.0)));
}

#[test]
fn remove_link_clears_both_back_references() {
    let mut diagram = linked_pair();
    assert!(diagram.remove_link(1).is_some());
    for id in [1, 2] {
        let interface = diagram.device(id).expect("device").interface(1).expect("eth").clone();
        assert_eq!(interface.link, None);
        assert_eq!(interface.dot, None);
    }
}

#[test]
fn remove_link_between_checks_endpoints() {
    let mut diagram = linked_pair();
    assert!(diagram.remove_link_between(1, ep(2, 1), ep(1, 1)).is_none());
    assert!(diagram.remove_link_between(1, ep(1, 1), ep(2, 1)).is_some());
}

#[test]
fn rebinding_an_interface_drops_its_old_link() {
    let mut diagram = linked_pair();
    let mut c = device(3, 100.0, 400.0, DeviceType::Host);
    c.interfaces.clear();
    c.interfaces.push(Interface::new(1, "eth1"));
    diagram.insert_device(c);
    assert!(diagram.insert_link(Link::new(2, "", ep(1, 1), ep(3, 1))));
    assert!(diagram.link(1).is_none());
    assert_eq!(diagram.device(2).expect("b").interface(1).expect("eth").link, None);
}

// =============================================================
// Interfaces
// =============================================================

#[test]
fn interface_hit_requires_link_hit_and_proximity() {
    let diagram = linked_pair();
    let router = diagram.device(1).expect("router");
    let eth = router.interface(1).expect("eth");
    // On the link, 60px from the router centre: within dot (50) + 30.
    assert!(diagram.is_interface_selected(router, eth, Point::new(160.0, 100.0)));
    // On the link but 90px out.
    assert!(!diagram.is_interface_selected(router, eth, Point::new(190.0, 100.0)));
    // Close to the router but off the link.
    assert!(!diagram.is_interface_selected(router, eth, Point::new(150.0, 130.0)));
}

#[test]
fn unbound_interface_never_hits() {
    let mut diagram = Diagram::new();
    diagram.insert_device(device(1, 0.0, 0.0, DeviceType::Router));
    let router = diagram.device(1).expect("router");
    assert!(!diagram.is_interface_selected(router, &router.interfaces[0], Point::new(0.0, 0.0)));
}

#[test]
fn add_interface_advances_device_sequence() {
    let mut diagram = Diagram::new();
    diagram.insert_device(device(1, 0.0, 0.0, DeviceType::Router));
    assert!(diagram.add_interface(1, Interface::new(7, "eth7")));
    assert!(!diagram.add_interface(1, Interface::new(7, "dup")));
    assert_eq!(diagram.device(1).expect("router").interface_seq.last(), 7);
}

#[test]
fn remove_interface_drops_bound_link() {
    let mut diagram = linked_pair();
    assert!(diagram.remove_interface(1, 1).is_some());
    assert!(diagram.links().is_empty());
    assert_eq!(diagram.device(2).expect("b").interface(1).expect("eth").link, None);
}

// =============================================================
// Devices
// =============================================================

#[test]
fn duplicate_device_id_is_not_added_twice() {
    let mut diagram = Diagram::new();
    assert!(diagram.insert_device(device(1, 0.0, 0.0, DeviceType::Router)));
    assert!(!diagram.insert_device(device(1, 50.0, 50.0, DeviceType::Host)));
    assert_eq!(diagram.devices().len(), 1);
    assert_eq!(diagram.device(1).expect("d").x, 0.0);
}

#[test]
fn remove_device_cascades_links() {
    let mut diagram = linked_pair();
    let removed = diagram.remove_device(1).expect("removed");
    assert_eq!(removed.id, 1);
    assert!(diagram.links().is_empty());
    assert_eq!(diagram.device(2).expect("b").interface(1).expect("eth").link, None);
}

#[test]
fn remove_unknown_device_is_none() {
    let mut diagram = linked_pair();
    assert!(diagram.remove_device(99).is_none());
    assert_eq!(diagram.links().len(), 1);
}

#[test]
fn device_bounds_cover_centres() {
    let diagram = linked_pair();
    let bounds = diagram.device_bounds().expect("bounds");
    assert_eq!((bounds.min_x, bounds.max_x), (100.0, 300.0));
}

// =============================================================
// Groups
// =============================================================

#[test]
fn membership_reports_only_changes() {
    let mut diagram = linked_pair();
    let rack = Group::new(1, "Rack1", GroupType::Rack, Point::new(50.0, 50.0), Some(Point::new(200.0, 200.0)));
    diagram.insert_group(rack);
    let cursor = Point::default();

    let change = diagram.update_membership(1, cursor).expect("changed");
    assert_eq!(change.members, vec![1]);
    assert!(diagram.update_membership(1, cursor).is_none());

    diagram.move_device(2, 150.0, 150.0);
    let changes = diagram.update_all_memberships(cursor);
    assert_eq!(changes, vec![MembershipChange { group: 1, members: vec![1, 2] }]);
}

#[test]
fn removing_device_drops_group_membership() {
    let mut diagram = linked_pair();
    diagram.insert_group(Group::new(1, "G", GroupType::Group, Point::new(0.0, 0.0), Some(Point::new(400.0, 400.0))));
    diagram.update_membership(1, Point::default());
    diagram.remove_device(1);
    assert_eq!(diagram.group(1).expect("group").members, vec![2]);
}
