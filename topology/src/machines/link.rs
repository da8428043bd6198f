//! Drawing a link between two devices.
//!
//! `NewLink` arms drawing. Releasing over a device fixes the first endpoint
//! and starts a provisional link held on the session; releasing over a
//! different device completes it. Completion allocates one interface on each
//! device and commits both interfaces and the link as one composite message.
//! Releasing anywhere else cancels and discards the provisional link.

use frames::{InterfaceSpec, LinkSpec, Message, MultipleMessage, Stamp};

use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{Event, EventKind};
use crate::model::{DeviceId, Link};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Ready,
    Selecting,
    Connecting,
    Connected,
}

impl StateSet for LinkState {
    const MACHINE: Machine = Machine::Link;
    const READY: Self = Self::Ready;
    const DISABLED: Option<Self> = None;

    fn name(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Selecting => "Selecting",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
        }
    }

    fn start(self, step: &mut Step<'_, Self>) {
        if self == Self::Connected {
            connect(step.session);
            step.change_state(Self::Ready);
        }
    }

    fn end(self, step: &mut Step<'_, Self>) {
        if self == Self::Connecting {
            step.session.mark_dirty();
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        match (self, event) {
            (Self::Ready, Event::NewLink) => {
                step.session.clear_selections();
                step.change_state(Self::Selecting);
                Flow::Handled
            }
            (Self::Selecting | Self::Connecting, Event::MouseDown(_)) => Flow::Handled,
            (Self::Selecting, Event::MouseUp(_)) => {
                if let Some(device) = device_under_cursor(step.session) {
                    step.session.new_link = Some(Link::provisional(0, device));
                    step.change_state(Self::Connecting);
                }
                Flow::Handled
            }
            (Self::Connecting, Event::MouseMove(_)) => {
                step.session.mark_dirty();
                Flow::Handled
            }
            (Self::Connecting, Event::MouseUp(_)) => {
                let from = step.session.new_link.as_ref().map(|l| l.from_device);
                match (from, device_under_cursor(step.session)) {
                    (Some(from), Some(to)) if from != to => {
                        if let Some(link) = step.session.new_link.as_mut() {
                            link.to_device = Some(to);
                        }
                        step.change_state(Self::Connected);
                    }
                    _ => {
                        tracing::debug!("link cancelled");
                        step.session.new_link = None;
                        step.change_state(Self::Ready);
                    }
                }
                Flow::Handled
            }
            _ => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        match (self, trigger) {
            (Self::Ready, Trigger::Event(EventKind::NewLink)) => &[Self::Selecting],
            (Self::Selecting, Trigger::Event(EventKind::MouseUp)) => &[Self::Connecting],
            (Self::Connecting, Trigger::Event(EventKind::MouseUp)) => &[Self::Connected, Self::Ready],
            (Self::Connected, Trigger::Start) => &[Self::Ready],
            _ => &[],
        }
    }
}

fn device_under_cursor(session: &Session) -> Option<DeviceId> {
    let cursor = session.cursor();
    session
        .diagram
        .devices()
        .iter()
        .rev()
        .find(|d| d.is_selected(cursor))
        .map(|d| d.id)
}

/// Commit the provisional link: a fresh interface on each end, then the link.
fn connect(session: &mut Session) {
    let Some(pending) = session.new_link.take() else {
        return;
    };
    let Some(to_device) = pending.to_device else {
        return;
    };
    let (Some(from), Some(to)) = (new_interface(session, pending.from_device), new_interface(session, to_device)) else {
        tracing::debug!(from = pending.from_device, to = to_device, "link endpoint vanished");
        return;
    };
    let id = session.seqs.link.next_id();
    let link = LinkSpec {
        stamp: Stamp::default(),
        id,
        name: String::new(),
        from_device_id: from.device_id,
        to_device_id: to.device_id,
        from_interface_id: from.id,
        to_interface_id: to.id,
    };
    let messages = vec![Message::InterfaceCreate(from), Message::InterfaceCreate(to), Message::LinkCreate(link)];
    session.commit(Message::MultipleMessage(MultipleMessage { stamp: Stamp::default(), messages }));
}

fn new_interface(session: &mut Session, device_id: DeviceId) -> Option<InterfaceSpec> {
    let device = session.diagram.device_mut(device_id)?;
    let id = device.interface_seq.next_id();
    Some(InterfaceSpec { stamp: Stamp::default(), device_id, id, name: format!("eth{id}") })
}
