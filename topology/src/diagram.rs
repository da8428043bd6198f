//! In-memory diagram store.
//!
//! Devices, links and groups are kept in creation order so hit-testing can
//! walk them last to first. All mutation goes through the methods here, which
//! keep the cross references consistent:
//!
//! - a link is only stored once both endpoints resolve to existing interfaces,
//! - every stored link is named by exactly its two endpoint interfaces,
//! - interface anchors are recomputed whenever either end of their link moves.

#[cfg(test)]
#[path = "diagram_test.rs"]
mod diagram_test;

use tracing::warn;

use crate::consts::{INTERFACE_HIT_SLACK_PX, LINK_HIT_PX};
use crate::geometry;
use crate::model::{Device, DeviceId, Endpoint, Group, GroupId, Interface, InterfaceId, Link, LinkId};
use crate::viewport::{Bounds, Point};

/// Membership change of one group after devices or the group moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    pub group: GroupId,
    pub members: Vec<DeviceId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    devices: Vec<Device>,
    links: Vec<Link>,
    groups: Vec<Group>,
}

impl Diagram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.links.clear();
        self.groups.clear();
    }

    // --- Lookups ---

    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    #[must_use]
    pub fn device_named(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn device_named_mut(&mut self, name: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.name == name)
    }

    #[must_use]
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.id == id)
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.iter_mut()
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut()
    }

    /// Bounding box of all device centres.
    #[must_use]
    pub fn device_bounds(&self) -> Option<Bounds> {
        Bounds::around(self.devices.iter().map(Device::center))
    }

    // --- Link geometry ---

    /// Centres of the two devices a link joins. `None` for a provisional link.
    #[must_use]
    pub fn link_segment(&self, link: &Link) -> Option<(Point, Point)> {
        let from = self.device(link.from_device)?;
        let to = self.device(link.to_device?)?;
        Some((from.center(), to.center()))
    }

    /// Centre-to-centre length of a link.
    #[must_use]
    pub fn link_length(&self, link: &Link) -> Option<f64> {
        self.link_segment(link).map(|(a, b)| a.distance(b))
    }

    /// Whether `p` is within the hit tolerance of the link.
    #[must_use]
    pub fn is_link_selected(&self, link: &Link, p: Point) -> bool {
        self.link_segment(link)
            .is_some_and(|(a, b)| geometry::near_segment(p, a, b, LINK_HIT_PX))
    }

    /// Whether `p` picks the interface: it must hit the bound link and sit
    /// no farther from the device than the anchor plus some slack.
    #[must_use]
    pub fn is_interface_selected(&self, device: &Device, interface: &Interface, p: Point) -> bool {
        let Some(link) = interface.link.and_then(|id| self.link(id)) else {
            return false;
        };
        let Some(dot_distance) = device.dot_distance(interface) else {
            return false;
        };
        self.is_link_selected(link, p) && device.center().distance(p) < dot_distance + INTERFACE_HIT_SLACK_PX
    }

    fn anchor_for(&self, link: &Link, device_id: DeviceId) -> Option<Point> {
        let (from, to) = self.link_segment(link)?;
        let device = self.device(device_id)?;
        let is_from = link.from_device == device_id;
        geometry::anchor(device.shape(), device.center(), from, to, is_from)
    }

    /// Recompute the anchors at both ends of one link.
    pub fn refresh_link_dots(&mut self, link_id: LinkId) {
        let Some(link) = self.link(link_id) else {
            return;
        };
        let Some((from, to)) = link.endpoints() else {
            return;
        };
        let from_dot = self.anchor_for(link, from.device);
        let to_dot = self.anchor_for(link, to.device);
        self.set_dot(from, from_dot);
        self.set_dot(to, to_dot);
    }

    fn set_dot(&mut self, endpoint: Endpoint, dot: Option<Point>) {
        if let Some(interface) = self
            .device_mut(endpoint.device)
            .and_then(|d| d.interface_mut(endpoint.interface))
        {
            interface.dot = dot;
        }
    }

    /// Recompute every anchor touched by links of `device_id`.
    pub fn update_dots(&mut self, device_id: DeviceId) {
        let link_ids: Vec<LinkId> = self
            .device(device_id)
            .map(|d| d.interfaces.iter().filter_map(|i| i.link).collect())
            .unwrap_or_default();
        for link_id in link_ids {
            self.refresh_link_dots(link_id);
        }
    }

    // --- Devices ---

    /// Insert a device unless one with the same id exists.
    pub fn insert_device(&mut self, device: Device) -> bool {
        if self.device(device.id).is_some() {
            return false;
        }
        self.devices.push(device);
        true
    }

    /// Remove a device and every link touching it, returning the device.
    pub fn remove_device(&mut self, id: DeviceId) -> Option<Device> {
        let index = self.devices.iter().position(|d| d.id == id)?;
        let touching: Vec<LinkId> = self.links.iter().filter(|l| l.touches(id)).map(|l| l.id).collect();
        for link_id in touching {
            self.remove_link(link_id);
        }
        for group in &mut self.groups {
            group.members.retain(|&m| m != id);
        }
        Some(self.devices.remove(index))
    }

    /// Move a device and refresh the anchors of its links.
    pub fn move_device(&mut self, id: DeviceId, x: f64, y: f64) -> bool {
        let Some(device) = self.device_mut(id) else {
            return false;
        };
        device.x = x;
        device.y = y;
        self.update_dots(id);
        true
    }

    // --- Interfaces ---

    /// Add an interface to a device unless the id is taken.
    pub fn add_interface(&mut self, device_id: DeviceId, interface: Interface) -> bool {
        let Some(device) = self.device_mut(device_id) else {
            return false;
        };
        if device.interface(interface.id).is_some() {
            return false;
        }
        device.interface_seq.observe(interface.id);
        device.interfaces.push(interface);
        true
    }

    /// Remove an interface together with any link bound to it.
    pub fn remove_interface(&mut self, device_id: DeviceId, interface_id: InterfaceId) -> Option<Interface> {
        let link = self.device(device_id)?.interface(interface_id)?.link;
        if let Some(link_id) = link {
            self.remove_link(link_id);
        }
        let device = self.device_mut(device_id)?;
        let index = device.interfaces.iter().position(|i| i.id == interface_id)?;
        Some(device.interfaces.remove(index))
    }

    // --- Links ---

    /// Store a link whose endpoints both resolve, binding its interfaces.
    ///
    /// Returns `false` (and stores nothing) when the id is taken or either
    /// endpoint device or interface is missing. A link already bound to one
    /// of the endpoint interfaces is replaced.
    pub fn insert_link(&mut self, link: Link) -> bool {
        let Some((from, to)) = link.endpoints() else {
            return false;
        };
        if self.link(link.id).is_some() || !self.has_interface(from) || !self.has_interface(to) {
            return false;
        }
        let id = link.id;
        for endpoint in [from, to] {
            if let Some(previous) = self.bound_link(endpoint).filter(|&l| l != id) {
                warn!(
                    link = id,
                    replaced = previous,
                    device = endpoint.device,
                    interface = endpoint.interface,
                    "interface already bound, replacing link"
                );
                self.remove_link(previous);
            }
        }
        self.links.push(link);
        self.bind(from, Some(id));
        self.bind(to, Some(id));
        self.refresh_link_dots(id);
        true
    }

    /// Remove a link, first clearing both endpoint interfaces.
    pub fn remove_link(&mut self, id: LinkId) -> Option<Link> {
        let index = self.links.iter().position(|l| l.id == id)?;
        if let Some((from, to)) = self.links[index].endpoints() {
            self.bind(from, None);
            self.bind(to, None);
        }
        Some(self.links.remove(index))
    }

    /// Remove a link only if it joins exactly the given endpoints.
    pub fn remove_link_between(&mut self, id: LinkId, from: Endpoint, to: Endpoint) -> Option<Link> {
        let matches = self.link(id).and_then(Link::endpoints) == Some((from, to));
        if matches { self.remove_link(id) } else { None }
    }

    fn has_interface(&self, endpoint: Endpoint) -> bool {
        self.device(endpoint.device)
            .is_some_and(|d| d.interface(endpoint.interface).is_some())
    }

    fn bound_link(&self, endpoint: Endpoint) -> Option<LinkId> {
        self.device(endpoint.device)?.interface(endpoint.interface)?.link
    }

    fn bind(&mut self, endpoint: Endpoint, link: Option<LinkId>) {
        if let Some(interface) = self
            .device_mut(endpoint.device)
            .and_then(|d| d.interface_mut(endpoint.interface))
        {
            interface.link = link;
            if link.is_none() {
                interface.dot = None;
            }
        }
    }

    // --- Groups ---

    pub fn insert_group(&mut self, group: Group) -> bool {
        if self.group(group.id).is_some() {
            return false;
        }
        self.groups.push(group);
        true
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let index = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(index))
    }

    /// Recompute one group's members from spatial containment.
    ///
    /// Returns the new member list only when it changed.
    pub fn update_membership(&mut self, id: GroupId, cursor: Point) -> Option<MembershipChange> {
        let group = self.group(id)?;
        let extents = group.extents(cursor);
        let members: Vec<DeviceId> = self
            .devices
            .iter()
            .filter(|d| extents.contains(d.center()))
            .map(|d| d.id)
            .collect();
        let group = self.group_mut(id)?;
        if group.members == members {
            return None;
        }
        group.members.clone_from(&members);
        Some(MembershipChange { group: id, members })
    }

    /// Recompute every group's members, returning the groups that changed.
    pub fn update_all_memberships(&mut self, cursor: Point) -> Vec<MembershipChange> {
        let ids: Vec<GroupId> = self.groups.iter().map(|g| g.id).collect();
        ids.into_iter()
            .filter_map(|id| self.update_membership(id, cursor))
            .collect()
    }
}
