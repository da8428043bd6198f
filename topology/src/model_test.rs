#![allow(clippy::float_cmp)]

use super::*;

fn rack(x1: f64, y1: f64, x2: f64, y2: f64) -> Group {
    Group::new(1, "Rack1", GroupType::Rack, Point::new(x1, y1), Some(Point::new(x2, y2)))
}

const FAR: Point = Point { x: 1e6, y: 1e6 };

// =============================================================
// Devices
// =============================================================

#[test]
fn shapes_follow_device_kind() {
    assert_eq!(Shape::for_kind(&DeviceType::Router), Shape::Circle { radius: 50.0 });
    assert_eq!(Shape::for_kind(&DeviceType::Host).half_extents(), (30.0, 40.0));
    assert_eq!(Shape::for_kind(&DeviceType::Other("firewall".into())).half_extents(), (50.0, 50.0));
}

#[test]
fn device_hit_box_is_open() {
    let host = Device::new(1, "Host1", 100.0, 100.0, DeviceType::Host);
    assert!(host.is_selected(Point::new(100.0, 100.0)));
    assert!(host.is_selected(Point::new(129.0, 139.0)));
    assert!(!host.is_selected(Point::new(130.0, 100.0)));
    assert!(!host.is_selected(Point::new(100.0, 60.0)));
}

#[test]
fn dot_distance_needs_an_anchor() {
    let device = Device::new(1, "R", 0.0, 0.0, DeviceType::Router);
    let mut interface = Interface::new(1, "eth1");
    assert_eq!(device.dot_distance(&interface), None);
    interface.dot = Some(Point::new(30.0, 40.0));
    assert_eq!(device.dot_distance(&interface), Some(50.0));
}

// =============================================================
// Links
// =============================================================

#[test]
fn provisional_link_has_no_endpoints() {
    let link = Link::provisional(0, 7);
    assert_eq!(link.endpoints(), None);
    assert!(link.touches(7));
    assert!(!link.touches(8));
}

#[test]
fn resolved_link_touches_both_devices() {
    let link = Link::new(1, "", Endpoint { device: 1, interface: 2 }, Endpoint { device: 3, interface: 4 });
    let (from, to) = link.endpoints().expect("endpoints");
    assert_eq!((from.device, from.interface, to.device, to.interface), (1, 2, 3, 4));
    assert!(link.touches(1));
    assert!(link.touches(3));
}

// =============================================================
// Groups
// =============================================================

#[test]
fn extents_are_normalized_from_raw_corners() {
    let group = rack(200.0, 150.0, 100.0, 50.0);
    let e = group.extents(FAR);
    assert_eq!((e.left, e.top, e.right, e.bottom), (100.0, 50.0, 200.0, 150.0));
    assert_eq!(e.width(), 100.0);
    assert_eq!(e.height(), 100.0);
}

#[test]
fn missing_second_corner_follows_cursor() {
    let group = Group::new(1, "G", GroupType::Group, Point::new(10.0, 10.0), None);
    let e = group.extents(Point::new(0.0, 40.0));
    assert_eq!((e.left, e.top, e.right, e.bottom), (0.0, 10.0, 10.0, 40.0));
}

#[test]
fn corner_hit_square_is_ten_pixels() {
    let group = rack(0.0, 0.0, 100.0, 100.0);
    assert!(group.has_corner_selected(Point::new(95.0, 105.0), FAR));
    assert!(!group.has_corner_selected(Point::new(89.0, 100.0), FAR));
    assert!(!group.has_corner_selected(Point::new(50.0, 50.0), FAR));
}

#[test]
fn select_corner_picks_nearest_within_thirty() {
    let group = rack(0.0, 0.0, 100.0, 100.0);
    assert_eq!(group.select_corner(Point::new(20.0, 5.0), FAR), Some(Corner::TopLeft));
    assert_eq!(group.select_corner(Point::new(90.0, 110.0), FAR), Some(Corner::BottomRight));
    assert_eq!(group.select_corner(Point::new(50.0, 50.0), FAR), None);
}

#[test]
fn border_band_selects_but_interior_does_not() {
    let group = rack(0.0, 0.0, 200.0, 200.0);
    assert!(group.is_selected(Point::new(5.0, 100.0), FAR));
    assert!(group.is_selected(Point::new(100.0, 195.0), FAR));
    assert!(!group.is_selected(Point::new(100.0, 100.0), FAR));
    assert!(!group.is_selected(Point::new(5.0, 300.0), FAR));
}

#[test]
fn move_corner_adjusts_the_raw_coordinate_forming_that_side() {
    // First corner is bottom-right here.
    let mut group = rack(100.0, 100.0, 0.0, 0.0);
    group.move_corner(Corner::BottomRight, 10.0, 20.0, FAR);
    assert_eq!((group.x1, group.y1), (110.0, 120.0));
    assert_eq!(group.second, Some(Point::new(0.0, 0.0)));

    group.move_corner(Corner::TopLeft, -5.0, -5.0, FAR);
    assert_eq!(group.second, Some(Point::new(-5.0, -5.0)));
}

#[test]
fn dragging_past_the_opposite_side_flips() {
    let mut group = rack(0.0, 0.0, 100.0, 100.0);
    group.move_corner(Corner::BottomRight, -150.0, 0.0, FAR);
    let e = group.extents(FAR);
    assert_eq!((e.left, e.right), (-50.0, 0.0));
}

#[test]
fn translate_fixes_a_floating_second_corner() {
    let mut group = Group::new(1, "G", GroupType::Group, Point::new(0.0, 0.0), None);
    group.translate(10.0, 10.0, Point::new(50.0, 50.0));
    assert_eq!((group.x1, group.y1), (10.0, 10.0));
    assert_eq!(group.second, Some(Point::new(60.0, 60.0)));
}
