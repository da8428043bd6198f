//! Plane geometry behind hit-testing and anchor placement.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::f64::consts::PI;

use crate::model::Shape;
use crate::viewport::Point;

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 { (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Crossing point of segments `p1`–`p2` and `p3`–`p4`.
///
/// Both segment parameters must fall in `[0, 1]`; parallel segments never cross.
#[must_use]
pub fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(Point::new(p1.x + ua * (p2.x - p1.x), p1.y + ua * (p2.y - p1.y)))
    } else {
        None
    }
}

/// Where the link `from`–`to` leaves the outline of the device at `center`.
///
/// `is_from` says which end of the link the device sits on. Circles take the
/// point along the link direction; rectangles take the first edge crossed,
/// tested top, bottom, right, left.
#[must_use]
pub fn anchor(shape: Shape, center: Point, from: Point, to: Point, is_from: bool) -> Option<Point> {
    match shape {
        Shape::Circle { radius } => {
            if from == to {
                return None;
            }
            let slope = (to.y - from.y).atan2(to.x - from.x);
            let theta = if is_from { slope + PI } else { slope };
            Some(Point::new(center.x - theta.cos() * radius, center.y - theta.sin() * radius))
        }
        Shape::Rect { half_width, half_height } => {
            let left = center.x - half_width;
            let right = center.x + half_width;
            let top = center.y - half_height;
            let bottom = center.y + half_height;
            let edges = [
                (Point::new(left, top), Point::new(right, top)),
                (Point::new(left, bottom), Point::new(right, bottom)),
                (Point::new(right, top), Point::new(right, bottom)),
                (Point::new(left, top), Point::new(left, bottom)),
            ];
            edges
                .iter()
                .find_map(|&(a, b)| segment_intersection(from, to, a, b))
        }
    }
}

/// Whether `p` lies within `tolerance` of the segment `a`–`b`.
#[must_use]
pub fn near_segment(p: Point, a: Point, b: Point, tolerance: f64) -> bool {
    point_segment_distance(p, a, b) < tolerance
}
