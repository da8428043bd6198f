//! Diagram entities: devices with their interfaces, links, and groups.
//!
//! Entities refer to each other by id only. A device owns its interfaces; an
//! interface names the link bound to it; a link names its two
//! (device, interface) endpoints. Cross-entity geometry (anchors, link hit
//! tests) needs lookups and lives on [`crate::diagram::Diagram`].

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

pub use frames::{DeviceId, DeviceType, GroupId, GroupType, InterfaceId, LinkId};

use crate::consts::{
    CORNER_HIT_PX, CORNER_SELECT_PX, DEVICE_HALF_EXTENT, GROUP_BORDER_PX, HOST_HALF_HEIGHT, HOST_HALF_WIDTH,
    ROUTER_RADIUS, SWITCH_HALF_EXTENT,
};
use crate::seq::IdSequence;
use crate::viewport::Point;

// =============================================================================
// DEVICES
// =============================================================================

/// Outline a device is drawn with; anchors sit on this boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    Rect { half_width: f64, half_height: f64 },
}

impl Shape {
    #[must_use]
    pub fn for_kind(kind: &DeviceType) -> Self {
        match kind {
            DeviceType::Router => Self::Circle { radius: ROUTER_RADIUS },
            DeviceType::Switch => Self::Rect { half_width: SWITCH_HALF_EXTENT, half_height: SWITCH_HALF_EXTENT },
            DeviceType::Host => Self::Rect { half_width: HOST_HALF_WIDTH, half_height: HOST_HALF_HEIGHT },
            DeviceType::Rack | DeviceType::Device | DeviceType::Other(_) => {
                Self::Rect { half_width: DEVICE_HALF_EXTENT, half_height: DEVICE_HALF_EXTENT }
            }
        }
    }

    /// Half width and half height of the axis-aligned box around the outline.
    #[must_use]
    pub fn half_extents(self) -> (f64, f64) {
        match self {
            Self::Circle { radius } => (radius, radius),
            Self::Rect { half_width, half_height } => (half_width, half_height),
        }
    }
}

/// A network port on a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub id: InterfaceId,
    pub name: String,
    /// Link bound to this interface, if any.
    pub link: Option<LinkId>,
    /// Where the bound link crosses the device outline. Only set while
    /// `link` is set and both of the link's devices exist.
    pub dot: Option<Point>,
    pub selected: bool,
    pub edit_label: bool,
}

impl Interface {
    #[must_use]
    pub fn new(id: InterfaceId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), link: None, dot: None, selected: false, edit_label: false }
    }
}

/// Progress of a remote job running against a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub status: Option<bool>,
    pub working: bool,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub kind: DeviceType,
    pub host_id: Option<u64>,
    pub interfaces: Vec<Interface>,
    /// Allocates ids for interfaces created on this device.
    pub interface_seq: IdSequence,
    pub selected: bool,
    /// Selected by another client.
    pub remote_selected: bool,
    pub moving: bool,
    pub edit_label: bool,
    /// Last reported health; `None` until a status arrives.
    pub status: Option<bool>,
    pub working: bool,
    pub tasks: Vec<Task>,
}

impl Device {
    #[must_use]
    pub fn new(id: DeviceId, name: impl Into<String>, x: f64, y: f64, kind: DeviceType) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            kind,
            host_id: None,
            interfaces: Vec::new(),
            interface_seq: IdSequence::default(),
            selected: false,
            remote_selected: false,
            moving: false,
            edit_label: false,
            status: None,
            working: false,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        Shape::for_kind(&self.kind)
    }

    /// Whether `p` falls inside the axis-aligned box centred on the device.
    #[must_use]
    pub fn is_selected(&self, p: Point) -> bool {
        let (half_w, half_h) = self.shape().half_extents();
        p.x > self.x - half_w && p.x < self.x + half_w && p.y > self.y - half_h && p.y < self.y + half_h
    }

    #[must_use]
    pub fn interface(&self, id: InterfaceId) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.id == id)
    }

    pub fn interface_mut(&mut self, id: InterfaceId) -> Option<&mut Interface> {
        self.interfaces.iter_mut().find(|i| i.id == id)
    }

    /// Distance from the device centre to an interface's anchor.
    #[must_use]
    pub fn dot_distance(&self, interface: &Interface) -> Option<f64> {
        interface.dot.map(|dot| self.center().distance(dot))
    }
}

// =============================================================================
// LINKS
// =============================================================================

/// One end of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub device: DeviceId,
    pub interface: InterfaceId,
}

/// A cable between two interfaces.
///
/// While a link is being drawn only its `from_device` is known; such a link
/// never enters the diagram and never reports a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub name: String,
    pub from_device: DeviceId,
    pub to_device: Option<DeviceId>,
    pub from_interface: Option<InterfaceId>,
    pub to_interface: Option<InterfaceId>,
    pub selected: bool,
    pub remote_selected: bool,
    pub edit_label: bool,
}

impl Link {
    #[must_use]
    pub fn new(id: LinkId, name: impl Into<String>, from: Endpoint, to: Endpoint) -> Self {
        Self {
            id,
            name: name.into(),
            from_device: from.device,
            to_device: Some(to.device),
            from_interface: Some(from.interface),
            to_interface: Some(to.interface),
            selected: false,
            remote_selected: false,
            edit_label: false,
        }
    }

    /// A link still being drawn out of `from_device`.
    #[must_use]
    pub fn provisional(id: LinkId, from_device: DeviceId) -> Self {
        Self {
            id,
            name: String::new(),
            from_device,
            to_device: None,
            from_interface: None,
            to_interface: None,
            selected: false,
            remote_selected: false,
            edit_label: false,
        }
    }

    /// Both endpoints, once fully resolved.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Endpoint, Endpoint)> {
        Some((
            Endpoint { device: self.from_device, interface: self.from_interface? },
            Endpoint { device: self.to_device?, interface: self.to_interface? },
        ))
    }

    #[must_use]
    pub fn touches(&self, device: DeviceId) -> bool {
        self.from_device == device || self.to_device == Some(device)
    }
}

// =============================================================================
// GROUPS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// Normalized sides of a group rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Extents {
    #[must_use]
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.left, self.top),
            Corner::TopRight => Point::new(self.right, self.top),
            Corner::BottomLeft => Point::new(self.left, self.bottom),
            Corner::BottomRight => Point::new(self.right, self.bottom),
        }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.left && p.x < self.right && p.y > self.top && p.y < self.bottom
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A rack, site or plain group drawn as a rectangle.
///
/// The corners are kept as entered; sides are derived on every read. The
/// second corner is absent while the group is being drawn and then follows
/// the cursor.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub kind: GroupType,
    pub x1: f64,
    pub y1: f64,
    pub second: Option<Point>,
    /// Devices whose centre lies inside the rectangle.
    pub members: Vec<DeviceId>,
    pub selected: bool,
    pub remote_selected: bool,
    pub moving: bool,
    pub edit_label: bool,
    pub selected_corner: Option<Corner>,
}

impl Group {
    #[must_use]
    pub fn new(id: GroupId, name: impl Into<String>, kind: GroupType, first: Point, second: Option<Point>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            x1: first.x,
            y1: first.y,
            second,
            members: Vec::new(),
            selected: false,
            remote_selected: false,
            moving: false,
            edit_label: false,
            selected_corner: None,
        }
    }

    /// The second corner, or the live cursor while it is still unset.
    #[must_use]
    pub fn second_or(&self, cursor: Point) -> Point {
        self.second.unwrap_or(cursor)
    }

    /// Raw corners as `(x1, y1, x2, y2)`.
    #[must_use]
    pub fn corners(&self, cursor: Point) -> (f64, f64, f64, f64) {
        let second = self.second_or(cursor);
        (self.x1, self.y1, second.x, second.y)
    }

    #[must_use]
    pub fn extents(&self, cursor: Point) -> Extents {
        let (x1, y1, x2, y2) = self.corners(cursor);
        Extents { left: x1.min(x2), top: y1.min(y2), right: x1.max(x2), bottom: y1.max(y2) }
    }

    /// Whether `p` lies in the small square around any corner.
    #[must_use]
    pub fn has_corner_selected(&self, p: Point, cursor: Point) -> bool {
        let extents = self.extents(cursor);
        Corner::ALL.iter().any(|&c| {
            let corner = extents.corner(c);
            (p.x - corner.x).abs() < CORNER_HIT_PX && (p.y - corner.y).abs() < CORNER_HIT_PX
        })
    }

    /// Nearest corner to `p`, if it is close enough to grab.
    #[must_use]
    pub fn select_corner(&self, p: Point, cursor: Point) -> Option<Corner> {
        let extents = self.extents(cursor);
        let (corner, distance) = Corner::ALL
            .iter()
            .map(|&c| (c, extents.corner(c).distance(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        (distance <= CORNER_SELECT_PX).then_some(corner)
    }

    /// Whether `p` lies on the band around the border.
    #[must_use]
    pub fn is_selected(&self, p: Point, cursor: Point) -> bool {
        let e = self.extents(cursor);
        let within_y = p.y > e.top - GROUP_BORDER_PX && p.y < e.bottom + GROUP_BORDER_PX;
        let within_x = p.x > e.left - GROUP_BORDER_PX && p.x < e.right + GROUP_BORDER_PX;
        let near_vertical = (p.x - e.left).abs() < GROUP_BORDER_PX || (p.x - e.right).abs() < GROUP_BORDER_PX;
        let near_horizontal = (p.y - e.top).abs() < GROUP_BORDER_PX || (p.y - e.bottom).abs() < GROUP_BORDER_PX;
        (near_vertical && within_y) || (near_horizontal && within_x)
    }

    /// Move the given extent corner by `(dx, dy)`.
    ///
    /// The raw coordinate that currently forms that side is the one adjusted,
    /// so dragging past the opposite side flips the rectangle.
    pub fn move_corner(&mut self, corner: Corner, dx: f64, dy: f64, cursor: Point) {
        let mut second = self.second_or(cursor);
        let first_is_left = self.x1 <= second.x;
        let first_is_top = self.y1 <= second.y;
        if corner.is_left() == first_is_left {
            self.x1 += dx;
        } else {
            second.x += dx;
        }
        if corner.is_top() == first_is_top {
            self.y1 += dy;
        } else {
            second.y += dy;
        }
        self.second = Some(second);
    }

    pub fn translate(&mut self, dx: f64, dy: f64, cursor: Point) {
        let second = self.second_or(cursor);
        self.x1 += dx;
        self.y1 += dy;
        self.second = Some(Point::new(second.x + dx, second.y + dy));
    }
}
