//! Inbound messages, undo and redo.
//!
//! DESIGN
//! ======
//! Every decoded message enters the chain as [`Event::Inbound`] and is
//! applied here, so remote changes take the same [`sync::apply`] path as
//! local ones. The relay echoes a client's own messages back to it; those
//! were applied when they were committed and are ignored.
//!
//! History is shared by all clients. `Present` means the history pointer is
//! at the end. Undo steps the pointer back, applies the inverse of the entry
//! it passed, and tells peers with an `Undo` carrying that entry; redo
//! re-applies the entry verbatim. A peer's `Undo`/`Redo` moves the local
//! pointer the same way. Any new mutation while in `Past` drops the redo
//! tail and returns to `Present`.

use frames::{HistoryStep, Message, Stamp};
use tracing::debug;

use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{Event, EventKind};
use crate::session::Session;
use crate::sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeState {
    Present,
    Past,
}

impl StateSet for TimeState {
    const MACHINE: Machine = Machine::Time;
    const READY: Self = Self::Present;
    const DISABLED: Option<Self> = None;

    fn name(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Past => "Past",
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        if let Event::Inbound(message) = event {
            receive(step, message);
            return Flow::Handled;
        }
        match command(event) {
            Some(Command::Undo) => {
                if undo(step.session) && self == Self::Present {
                    step.change_state(Self::Past);
                }
                Flow::Handled
            }
            Some(Command::Redo) => {
                if redo(step.session) && self == Self::Past && step.session.history.at_present() {
                    step.change_state(Self::Present);
                }
                Flow::Handled
            }
            None if self == Self::Past && step.session.history.at_present() => {
                step.change_state(Self::Present);
                step.redispatch(event)
            }
            None => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        match (self, trigger) {
            (Self::Present, Trigger::Event(EventKind::Inbound | EventKind::KeyDown | EventKind::MouseWheel | EventKind::Undo)) => {
                &[Self::Past]
            }
            (Self::Past, Trigger::Event(_)) => &[Self::Present],
            _ => &[],
        }
    }
}

enum Command {
    Undo,
    Redo,
}

/// The history command an input event stands for, if any.
fn command(event: &Event) -> Option<Command> {
    match event {
        Event::Undo => Some(Command::Undo),
        Event::Redo => Some(Command::Redo),
        Event::KeyDown(key) if key.is_undo() => Some(Command::Undo),
        Event::KeyDown(key) if key.is_redo() => Some(Command::Redo),
        Event::MouseWheel(wheel) if wheel.modifiers.meta && wheel.delta < 0.0 => Some(Command::Undo),
        Event::MouseWheel(wheel) if wheel.modifiers.meta && wheel.delta > 0.0 => Some(Command::Redo),
        _ => None,
    }
}

/// Step back over one history entry. Returns whether anything was undone.
fn undo(session: &mut Session) -> bool {
    let Some(entry) = session.history.step_back() else {
        debug!("nothing to undo");
        return false;
    };
    if let Some(inverse) = sync::inverse(&entry) {
        sync::apply(session, &inverse);
    }
    session.send(Message::Undo(HistoryStep { stamp: Stamp::default(), original_message: Box::new(entry) }));
    true
}

/// Re-apply the next undone entry. Returns whether anything was redone.
fn redo(session: &mut Session) -> bool {
    let Some(entry) = session.history.step_forward() else {
        debug!("nothing to redo");
        return false;
    };
    sync::apply(session, &entry);
    session.send(Message::Redo(HistoryStep { stamp: Stamp::default(), original_message: Box::new(entry) }));
    true
}

/// Apply one message from the relay.
fn receive(step: &mut Step<'_, TimeState>, message: &Message) {
    let session = &mut *step.session;
    let sender = message.sender();
    if session.client_id != 0 && sender == session.client_id && !matches!(message, Message::ClientId(_)) {
        debug!(msg_type = message.msg_type(), "own echo ignored");
        return;
    }
    match message {
        Message::Undo(entry) => {
            session.history.rewind();
            if let Some(inverse) = sync::inverse(&entry.original_message) {
                sync::apply(session, &inverse);
            }
            if step.state() == TimeState::Present {
                step.change_state(TimeState::Past);
            }
        }
        Message::Redo(entry) => {
            session.history.advance();
            sync::apply(session, &entry.original_message);
            if step.state() == TimeState::Past && step.session.history.at_present() {
                step.change_state(TimeState::Present);
            }
        }
        _ if carries_mutation(message) && session.history.has_recorded(message) => {
            debug!(msg_type = message.msg_type(), sender, "repeated delivery ignored");
        }
        _ => {
            sync::apply(session, message);
            if carries_mutation(message) {
                session.history.record(message);
                if step.state() == TimeState::Past {
                    step.change_state(TimeState::Present);
                }
            }
        }
    }
}

fn carries_mutation(message: &Message) -> bool {
    match message {
        Message::MultipleMessage(multiple) => multiple.messages.iter().any(carries_mutation),
        other => other.is_mutation(),
    }
}
