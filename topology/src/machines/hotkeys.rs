//! Single-key shortcuts.
//!
//! A recognized key is turned into a command event and re-entered at the
//! head of the chain, so the command reaches whichever machine owns it in
//! its current state. Keys held with ctrl or meta are never shortcuts here.

use frames::{DeviceType, GroupType};

use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{Event, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeysState {
    Enabled,
}

/// Command bound to a key, if any.
#[must_use]
pub fn binding(key: &KeyEvent) -> Option<Event> {
    if key.modifiers.command() || key.modifiers.alt {
        return None;
    }
    let event = match key.key.as_str() {
        "r" => Event::NewDevice(DeviceType::Router),
        "s" => Event::NewDevice(DeviceType::Switch),
        "h" => Event::NewDevice(DeviceType::Host),
        "l" => Event::NewLink,
        "g" => Event::NewGroup(GroupType::Group),
        "0" => Event::ResetViewport,
        _ => return None,
    };
    Some(event)
}

impl StateSet for HotkeysState {
    const MACHINE: Machine = Machine::Hotkeys;
    const READY: Self = Self::Enabled;
    const DISABLED: Option<Self> = None;

    fn name(self) -> &'static str {
        "Enabled"
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        let Event::KeyDown(key) = event else {
            return Flow::Forward;
        };
        match binding(key) {
            Some(command) => {
                tracing::debug!(key = %key.key, command = ?command.kind(), "hotkey");
                step.session.dispatch_later(command);
                Flow::Handled
            }
            None => Flow::Forward,
        }
    }

    fn transitions(self, _trigger: Trigger) -> &'static [Self] {
        &[]
    }
}
