//! Toolboxes and dragging templates out of them.
//!
//! A toolbox is a scrollable column of templates docked at the left edge of
//! the screen. Only the toolbox chosen by the current mode is active. Pressing
//! on a template and dragging it off the toolbox drops it onto the diagram as
//! a `PasteDevice` or `PasteGroup` command, dispatched from the head of the
//! chain. Releasing over the toolbox itself cancels the drag.

use crate::consts::{GROUP_TEMPLATE_HEIGHT, GROUP_TEMPLATE_WIDTH, TOOLBOX_SPACING, TOOLBOX_TITLE_HEIGHT, TOOLBOX_WIDTH};
use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{DeviceTemplate, Event, EventKind, GroupTemplate};
use crate::model::GroupType;
use crate::session::Session;
use crate::viewport::Point;

// =============================================================================
// TOOLBOXES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolboxKind {
    /// Devices removed from the diagram, ready to be placed again.
    Inventory,
    Rack,
    Site,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolboxItem {
    Device(DeviceTemplate),
    Group(GroupTemplate),
}

impl ToolboxItem {
    /// The command that drops this template onto the diagram.
    #[must_use]
    pub fn paste_event(&self) -> Event {
        match self {
            Self::Device(template) => Event::PasteDevice(template.clone()),
            Self::Group(template) => Event::PasteGroup(template.clone()),
        }
    }
}

/// One column of templates, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolbox {
    pub kind: ToolboxKind,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub items: Vec<ToolboxItem>,
    /// Vertical scroll applied to the items, in pixels.
    pub scroll_offset: f64,
    /// Item being dragged out.
    pub selected_item: Option<usize>,
    /// Whether a dropped item leaves the toolbox.
    pub remove_on_drop: bool,
}

impl Toolbox {
    #[must_use]
    pub fn new(kind: ToolboxKind, name: impl Into<String>, height: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            x: 0.0,
            y: 0.0,
            width: TOOLBOX_WIDTH,
            height,
            items: Vec::new(),
            scroll_offset: 0.0,
            selected_item: None,
            remove_on_drop: false,
        }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }

    /// Screen position of an item's centre.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn item_position(&self, index: usize) -> Point {
        Point::new(
            self.x + self.width / 2.0,
            self.y + TOOLBOX_TITLE_HEIGHT + TOOLBOX_SPACING / 2.0 + index as f64 * TOOLBOX_SPACING + self.scroll_offset,
        )
    }

    /// Index of the item under `p`, if any.
    #[must_use]
    pub fn item_at(&self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        (0..self.items.len()).find(|&i| (self.item_position(i).y - p.y).abs() < TOOLBOX_SPACING / 2.0)
    }

    /// Drop device templates named `name`; the device is back on the
    /// diagram. A drag in progress keeps pointing at the same item.
    pub fn forget_device(&mut self, name: &str) {
        let mut kept = Vec::with_capacity(self.items.len());
        let mut selected = None;
        for (index, item) in self.items.drain(..).enumerate() {
            if matches!(&item, ToolboxItem::Device(t) if t.name == name) {
                continue;
            }
            if self.selected_item == Some(index) {
                selected = Some(kept.len());
            }
            kept.push(item);
        }
        self.items = kept;
        self.selected_item = selected;
    }

    /// Scroll by a wheel delta, keeping at least the first item reachable.
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll(&mut self, delta: f64) {
        let content = self.items.len() as f64 * TOOLBOX_SPACING;
        let room = (self.height - TOOLBOX_TITLE_HEIGHT).max(0.0);
        let min = (room - content).min(0.0);
        self.scroll_offset = (self.scroll_offset + delta).clamp(min, 0.0);
    }
}

/// Every toolbox and which one is active.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolboxes {
    pub inventory: Toolbox,
    pub rack: Toolbox,
    pub site: Toolbox,
    active: Option<ToolboxKind>,
}

impl Toolboxes {
    /// Toolboxes sized to a surface `height` pixels tall.
    #[must_use]
    pub fn new(height: f64) -> Self {
        let mut inventory = Toolbox::new(ToolboxKind::Inventory, "Inventory", height);
        inventory.remove_on_drop = true;
        let mut rack = Toolbox::new(ToolboxKind::Rack, "Racks", height);
        rack.items.push(group_template("Rack", GroupType::Rack));
        let mut site = Toolbox::new(ToolboxKind::Site, "Sites", height);
        site.items.push(group_template("Site", GroupType::Site));
        Self { inventory, rack, site, active: None }
    }

    #[must_use]
    pub fn get(&self, kind: ToolboxKind) -> &Toolbox {
        match kind {
            ToolboxKind::Inventory => &self.inventory,
            ToolboxKind::Rack => &self.rack,
            ToolboxKind::Site => &self.site,
        }
    }

    pub fn get_mut(&mut self, kind: ToolboxKind) -> &mut Toolbox {
        match kind {
            ToolboxKind::Inventory => &mut self.inventory,
            ToolboxKind::Rack => &mut self.rack,
            ToolboxKind::Site => &mut self.site,
        }
    }

    #[must_use]
    pub fn active_kind(&self) -> Option<ToolboxKind> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&Toolbox> {
        self.active.map(|kind| self.get(kind))
    }

    pub fn active_mut(&mut self) -> Option<&mut Toolbox> {
        let kind = self.active?;
        Some(self.get_mut(kind))
    }

    /// Switch toolboxes; any drag in progress on the old one is dropped.
    pub fn set_active(&mut self, kind: Option<ToolboxKind>) {
        if let Some(toolbox) = self.active_mut() {
            toolbox.selected_item = None;
        }
        self.active = kind;
    }
}

fn group_template(name: &str, kind: GroupType) -> ToolboxItem {
    ToolboxItem::Group(GroupTemplate {
        name: name.to_owned(),
        kind,
        width: GROUP_TEMPLATE_WIDTH,
        height: GROUP_TEMPLATE_HEIGHT,
    })
}

// =============================================================================
// MACHINE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolboxState {
    Ready,
    Selected,
    Move,
    Dropping,
}

impl StateSet for ToolboxState {
    const MACHINE: Machine = Machine::Toolbox;
    const READY: Self = Self::Ready;
    const DISABLED: Option<Self> = None;

    fn name(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Selected => "Selected",
            Self::Move => "Move",
            Self::Dropping => "Dropping",
        }
    }

    fn start(self, step: &mut Step<'_, Self>) {
        if self == Self::Dropping {
            drop_selected(step.session);
            step.change_state(Self::Ready);
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        let screen = step.session.pointer.screen;
        match (self, event) {
            (Self::Ready, Event::MouseDown(_)) => {
                let Some(toolbox) = step.session.toolboxes.active_mut().filter(|t| t.contains(screen)) else {
                    return Flow::Forward;
                };
                toolbox.selected_item = toolbox.item_at(screen);
                if toolbox.selected_item.is_some() {
                    step.change_state(Self::Selected);
                }
                Flow::Handled
            }
            (Self::Ready, Event::MouseWheel(wheel)) => {
                let Some(toolbox) = step.session.toolboxes.active_mut().filter(|t| t.contains(screen)) else {
                    return Flow::Forward;
                };
                toolbox.scroll(wheel.delta);
                step.session.mark_dirty();
                Flow::Handled
            }
            (Self::Selected, Event::MouseMove(_)) => {
                step.change_state(Self::Move);
                Flow::Handled
            }
            (Self::Selected, Event::MouseUp(_)) => {
                if let Some(toolbox) = step.session.toolboxes.active_mut() {
                    toolbox.selected_item = None;
                }
                step.change_state(Self::Ready);
                Flow::Handled
            }
            (Self::Move, Event::MouseMove(_)) => {
                step.session.mark_dirty();
                Flow::Handled
            }
            (Self::Move, Event::MouseUp(_)) => {
                step.change_state(Self::Dropping);
                Flow::Handled
            }
            _ => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        match (self, trigger) {
            (Self::Ready, Trigger::Event(EventKind::MouseDown)) => &[Self::Selected],
            (Self::Selected, Trigger::Event(EventKind::MouseMove)) => &[Self::Move],
            (Self::Selected, Trigger::Event(EventKind::MouseUp)) => &[Self::Ready],
            (Self::Move, Trigger::Event(EventKind::MouseUp)) => &[Self::Dropping],
            (Self::Dropping, Trigger::Start) => &[Self::Ready],
            _ => &[],
        }
    }
}

/// Drop the dragged template at the cursor, unless the cursor is back over
/// the toolbox.
fn drop_selected(session: &mut Session) {
    let screen = session.pointer.screen;
    let Some(toolbox) = session.toolboxes.active_mut() else {
        return;
    };
    let Some(index) = toolbox.selected_item.take() else {
        return;
    };
    if toolbox.contains(screen) {
        tracing::debug!(toolbox = %toolbox.name, "drop cancelled over toolbox");
        return;
    }
    let Some(item) = toolbox.items.get(index) else {
        return;
    };
    let event = item.paste_event();
    if toolbox.remove_on_drop {
        toolbox.items.remove(index);
    }
    session.dispatch_later(event);
}
