#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FIT_MARGIN_X, FIT_MARGIN_Y, MAX_FIT_SCALE, MAX_ZOOM, MIN_FIT_SCALE, MIN_ZOOM, WHEEL_STEP};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// World-space bounding box of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty set.
    pub fn around(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }
}

/// Two-finger gesture baseline captured on touch start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pinch {
    /// Finger separation at the start, in screen pixels.
    pub distance: f64,
    /// Screen-space midpoint between the fingers at the start.
    pub midpoint: Point,
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

/// Pan and scale applied to the diagram, plus the size of the drawing surface.
///
/// `pan_x` / `pan_y` are in screen pixels; `scale` multiplies world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, scale: 1.0, width: 0.0, height: 0.0 }
    }
}

impl Viewport {
    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.scale,
            y: (screen.y - self.pan_y) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.pan_x,
            y: world.y * self.scale + self.pan_y,
        }
    }

    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Apply a wheel step, keeping the world point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, delta: f64) {
        let next = (self.scale + delta / (WHEEL_STEP / self.scale)).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = anchor.x - next * ((anchor.x - self.pan_x) / self.scale);
        self.pan_y = anchor.y - next * ((anchor.y - self.pan_y) / self.scale);
        self.scale = next;
    }

    /// Capture the baseline for a two-finger gesture.
    #[must_use]
    pub fn pinch_baseline(&self, a: Point, b: Point) -> Pinch {
        Pinch {
            distance: a.distance(b),
            midpoint: a.midpoint(b),
            scale: self.scale,
            pan_x: self.pan_x,
            pan_y: self.pan_y,
        }
    }

    /// Resolve pan and scale together from the current finger positions.
    ///
    /// The world point that sat under the baseline midpoint follows the new
    /// midpoint; the scale follows the change in finger separation.
    pub fn apply_pinch(&mut self, pinch: &Pinch, a: Point, b: Point) {
        if pinch.distance <= f64::EPSILON {
            return;
        }
        let midpoint = a.midpoint(b);
        let next = (pinch.scale * a.distance(b) / pinch.distance).clamp(MIN_ZOOM, MAX_ZOOM);
        let world_x = (pinch.midpoint.x - pinch.pan_x) / pinch.scale;
        let world_y = (pinch.midpoint.y - pinch.pan_y) / pinch.scale;
        self.scale = next;
        self.pan_x = midpoint.x - world_x * next;
        self.pan_y = midpoint.y - world_y * next;
    }

    /// Choose scale and pan so `bounds` is centred on the surface.
    ///
    /// Zero-size extents impose no limit; the scale is clamped to the fit range.
    pub fn fit(&mut self, bounds: Bounds) {
        let diff_x = bounds.max_x - bounds.min_x;
        let diff_y = bounds.max_y - bounds.min_y;
        let ratio = |room: f64, extent: f64| if extent > 0.0 { room / extent } else { f64::INFINITY };
        let wanted = ratio(self.width - FIT_MARGIN_X, diff_x).min(ratio(self.height - FIT_MARGIN_Y, diff_y));
        self.scale = if wanted.is_nan() { MAX_FIT_SCALE } else { wanted.clamp(MIN_FIT_SCALE, MAX_FIT_SCALE) };
        self.pan_x = self.scale * (-bounds.min_x - diff_x / 2.0) + self.width / 2.0;
        self.pan_y = self.scale * (-bounds.min_y - diff_y / 2.0) + self.height / 2.0;
    }

    /// Back to unit scale with no pan.
    pub fn reset(&mut self) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.scale = 1.0;
    }
}
