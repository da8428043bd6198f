#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn sized(width: f64, height: f64) -> Viewport {
    Viewport { width, height, ..Viewport::default() }
}

// --- Point ---

#[test]
fn point_distance_is_euclidean() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_midpoint() {
    assert_eq!(Point::new(0.0, 10.0).midpoint(Point::new(10.0, 20.0)), Point::new(5.0, 15.0));
}

// --- Bounds ---

#[test]
fn bounds_of_empty_set_is_none() {
    assert!(Bounds::around(std::iter::empty()).is_none());
}

#[test]
fn bounds_cover_all_points() {
    let b = Bounds::around([Point::new(100.0, 50.0), Point::new(-20.0, 300.0), Point::new(40.0, 0.0)])
        .expect("bounds");
    assert_eq!(b, Bounds { min_x: -20.0, min_y: 0.0, max_x: 100.0, max_y: 300.0 });
}

// --- Conversions ---

#[test]
fn default_viewport_is_identity() {
    let vp = Viewport::default();
    let p = Point::new(12.5, -3.0);
    assert_eq!(vp.screen_to_world(p), p);
    assert_eq!(vp.world_to_screen(p), p);
}

#[test]
fn screen_world_round_trip_with_pan_and_scale() {
    let vp = Viewport { pan_x: 40.0, pan_y: -25.0, scale: 2.5, ..Viewport::default() };
    let p = Point::new(310.0, 77.0);
    assert!(point_approx_eq(vp.world_to_screen(vp.screen_to_world(p)), p));
}

#[test]
fn screen_distance_scales_inversely() {
    let vp = Viewport { scale: 4.0, ..Viewport::default() };
    assert!(approx_eq(vp.screen_dist_to_world(20.0), 5.0));
}

// --- Wheel zoom ---

#[test]
fn zoom_keeps_anchor_fixed() {
    let mut vp = Viewport { pan_x: 30.0, pan_y: 10.0, scale: 1.0, ..Viewport::default() };
    let anchor = Point::new(200.0, 150.0);
    let world_before = vp.screen_to_world(anchor);
    vp.zoom_at(anchor, 50.0);
    assert!(approx_eq(vp.scale, 1.5));
    assert!(point_approx_eq(vp.screen_to_world(anchor), world_before));
}

#[test]
fn zoom_clamps_to_floor() {
    let mut vp = Viewport { scale: 0.12, ..Viewport::default() };
    vp.zoom_at(Point::new(0.0, 0.0), -90.0);
    assert!(approx_eq(vp.scale, 0.1));
}

#[test]
fn zoom_clamps_to_ceiling() {
    let mut vp = Viewport { scale: 9.0, ..Viewport::default() };
    vp.zoom_at(Point::new(0.0, 0.0), 100.0);
    assert!(approx_eq(vp.scale, 10.0));
}

// --- Pinch ---

#[test]
fn pinch_spread_doubles_scale_around_midpoint() {
    let mut vp = Viewport::default();
    let a = Point::new(100.0, 100.0);
    let b = Point::new(200.0, 100.0);
    let pinch = vp.pinch_baseline(a, b);
    let world_mid = vp.screen_to_world(pinch.midpoint);

    vp.apply_pinch(&pinch, Point::new(50.0, 100.0), Point::new(250.0, 100.0));
    assert!(approx_eq(vp.scale, 2.0));
    assert!(point_approx_eq(vp.screen_to_world(Point::new(150.0, 100.0)), world_mid));
}

#[test]
fn pinch_drag_pans_without_scaling() {
    let mut vp = Viewport::default();
    let pinch = vp.pinch_baseline(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    vp.apply_pinch(&pinch, Point::new(10.0, 20.0), Point::new(110.0, 20.0));
    assert!(approx_eq(vp.scale, 1.0));
    assert!(approx_eq(vp.pan_x, 10.0));
    assert!(approx_eq(vp.pan_y, 20.0));
}

#[test]
fn pinch_with_coincident_fingers_is_ignored() {
    let mut vp = Viewport::default();
    let pinch = vp.pinch_baseline(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
    vp.apply_pinch(&pinch, Point::new(0.0, 0.0), Point::new(300.0, 0.0));
    assert_eq!(vp, Viewport::default());
}

// --- Fit ---

#[test]
fn fit_centres_bounds() {
    let mut vp = sized(1200.0, 900.0);
    let bounds = Bounds { min_x: 0.0, min_y: 0.0, max_x: 500.0, max_y: 300.0 };
    vp.fit(bounds);
    // min((1200-200)/500, (900-300)/300) = 2.0
    assert!(approx_eq(vp.scale, 2.0));
    let centre = vp.world_to_screen(Point::new(250.0, 150.0));
    assert!(point_approx_eq(centre, Point::new(600.0, 450.0)));
}

#[test]
fn fit_clamps_small_scale() {
    let mut vp = sized(1200.0, 900.0);
    vp.fit(Bounds { min_x: 0.0, min_y: 0.0, max_x: 100_000.0, max_y: 10.0 });
    assert!(approx_eq(vp.scale, 0.10));
}

#[test]
fn fit_single_point_uses_ceiling() {
    let mut vp = sized(1000.0, 800.0);
    vp.fit(Bounds { min_x: 100.0, min_y: 100.0, max_x: 100.0, max_y: 100.0 });
    assert!(approx_eq(vp.scale, 2.0));
    assert!(point_approx_eq(vp.world_to_screen(Point::new(100.0, 100.0)), Point::new(500.0, 400.0)));
}

#[test]
fn reset_restores_identity() {
    let mut vp = Viewport { pan_x: 5.0, pan_y: 6.0, scale: 3.0, width: 10.0, height: 10.0 };
    vp.reset();
    assert_eq!(vp.scale, 1.0);
    assert_eq!(vp.pan_x, 0.0);
    assert_eq!(vp.width, 10.0);
}
