//! Zoom-driven UI mode.
//!
//! The scale picks a mode from a fixed ladder. Wheel and pinch input is
//! first passed down the chain so the view can zoom, then the mode steps
//! one rung toward the one the new scale calls for. A viewport change from
//! outside a gesture (snapshot, reset) jumps straight to it.
//!
//! Entering a mode selects the active toolbox. Rack mode is where devices
//! and groups are edited: entering it arms the move and group machines and
//! leaving it disarms them.

use crate::consts::{MULTI_SITE_MAX_SCALE, RACK_MAX_SCALE, SITE_MAX_SCALE};
use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{Event, EventKind};
use crate::machines::toolbox::ToolboxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeState {
    Start,
    MultiSite,
    Site,
    Rack,
    Device,
}

const LADDER: [ModeState; 4] = [ModeState::MultiSite, ModeState::Site, ModeState::Rack, ModeState::Device];

impl ModeState {
    /// Mode for a scale. Each bound is inclusive on the lower mode's side.
    #[must_use]
    pub fn for_scale(scale: f64) -> Self {
        if scale <= MULTI_SITE_MAX_SCALE {
            Self::MultiSite
        } else if scale <= SITE_MAX_SCALE {
            Self::Site
        } else if scale <= RACK_MAX_SCALE {
            Self::Rack
        } else {
            Self::Device
        }
    }

    /// Toolbox offered while this mode is active.
    #[must_use]
    pub fn toolbox(self) -> Option<ToolboxKind> {
        match self {
            Self::MultiSite => Some(ToolboxKind::Site),
            Self::Site => Some(ToolboxKind::Rack),
            Self::Rack => Some(ToolboxKind::Inventory),
            Self::Start | Self::Device => None,
        }
    }

    fn rung(self) -> Option<usize> {
        LADDER.iter().position(|&m| m == self)
    }

    /// The neighbour one rung from `self` toward `target`.
    fn toward(self, target: Self) -> Self {
        match (self.rung(), target.rung()) {
            (Some(current), Some(wanted)) if wanted > current => LADDER[current + 1],
            (Some(current), Some(wanted)) if wanted < current => LADDER[current - 1],
            (None, _) => target,
            _ => self,
        }
    }
}

impl StateSet for ModeState {
    const MACHINE: Machine = Machine::Mode;
    const READY: Self = Self::Start;
    const DISABLED: Option<Self> = None;

    fn name(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::MultiSite => "MultiSite",
            Self::Site => "Site",
            Self::Rack => "Rack",
            Self::Device => "Device",
        }
    }

    fn start(self, step: &mut Step<'_, Self>) {
        if self == Self::Start {
            let target = Self::for_scale(step.session.viewport.scale);
            step.change_state(target);
            return;
        }
        step.session.toolboxes.set_active(self.toolbox());
        if self == Self::Rack {
            step.session.arm(Machine::Move);
            step.session.arm(Machine::Group);
        }
    }

    fn end(self, step: &mut Step<'_, Self>) {
        if self == Self::Rack {
            step.session.disarm(Machine::Move);
            step.session.disarm(Machine::Group);
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        match event {
            Event::MouseWheel(_) | Event::TouchMove(_) => {
                let flow = step.forward(event);
                let target = Self::for_scale(step.session.viewport.scale);
                let next = self.toward(target);
                if next != self {
                    step.change_state(next);
                }
                flow
            }
            Event::ViewportChanged => {
                let target = Self::for_scale(step.session.viewport.scale);
                if target != self {
                    step.change_state(target);
                }
                Flow::Handled
            }
            _ => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        match (self, trigger) {
            (Self::Start, Trigger::Start) | (_, Trigger::Event(EventKind::ViewportChanged)) => &LADDER,
            (Self::MultiSite, Trigger::Event(EventKind::MouseWheel | EventKind::TouchMove)) => &[Self::Site],
            (Self::Site, Trigger::Event(EventKind::MouseWheel | EventKind::TouchMove)) => &[Self::MultiSite, Self::Rack],
            (Self::Rack, Trigger::Event(EventKind::MouseWheel | EventKind::TouchMove)) => &[Self::Site, Self::Device],
            (Self::Device, Trigger::Event(EventKind::MouseWheel | EventKind::TouchMove)) => &[Self::Rack],
            _ => &[],
        }
    }
}
