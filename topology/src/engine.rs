//! The editor facade: one session, one chain, one entry point per input.
//!
//! DESIGN
//! ======
//! [`Editor`] is what a host talks to. Raw input, command events and decoded
//! inbound messages all go through [`Editor::handle`], which updates the
//! pointer, dispatches down the chain, runs any queued directives, and
//! returns [`Action`]s for the host: wire text to send and redraw requests.
//! Nothing here knows what a machine does with an event.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use frames::{Message, RequestSnapshot, Snapshot};
use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::fsm::{Chain, Directive, Flow, Machine};
use crate::input::Event;
use crate::machines;
use crate::session::Session;
use crate::sync;

/// Directives run per input before the rest are dropped.
const MAX_DIRECTIVES: usize = 256;

/// Work handed back to the host after an input is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Stamped wire text for the transport, in send order.
    Send(String),
    /// The model or viewport changed; redraw.
    RenderNeeded,
}

pub struct Editor {
    session: Session,
    chain: Chain,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Build the chain and run every machine's start hook.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let mut session = Session::new(config);
        let mut chain = machines::chain();
        chain.start(&mut session);
        let mut editor = Self { session, chain };
        editor.drain();
        editor
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Name of a machine's current state.
    #[must_use]
    pub fn state_of(&self, machine: Machine) -> Option<&'static str> {
        self.chain.state_of(machine)
    }

    // --- Entry points ---

    /// Process one event and everything it triggers.
    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        if let Some(screen) = event.screen_point() {
            self.session.track_pointer(screen);
        }
        let pressed = match &event {
            Event::MouseDown(_) => true,
            Event::TouchStart(touch) => touch.touches.len() == 1,
            _ => false,
        };
        if pressed {
            self.session.press();
        }
        self.dispatch(&event);
        self.drain();
        self.flush()
    }

    /// Process an event named by its kind, e.g. `("MouseDown", {"x": 1, "y": 2})`
    /// or `("NewLink", null)`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Event`] if the type and payload do not form an
    /// event.
    pub fn handle_message(&mut self, msg_type: &str, payload: Value) -> Result<Vec<Action>, EditorError> {
        let tagged = if payload.is_null() {
            Value::String(msg_type.to_owned())
        } else {
            let mut map = serde_json::Map::new();
            map.insert(msg_type.to_owned(), payload);
            Value::Object(map)
        };
        let event: Event = serde_json::from_value(tagged)?;
        Ok(self.handle(event))
    }

    /// Decode wire text from the relay and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Codec`] if the text is not a valid envelope.
    pub fn receive(&mut self, text: &str) -> Result<Vec<Action>, EditorError> {
        let message = frames::decode_text(text)?;
        Ok(self.receive_message(message))
    }

    /// Apply an already decoded message from the relay.
    pub fn receive_message(&mut self, message: Message) -> Vec<Action> {
        self.handle(Event::Inbound(message))
    }

    /// The transport came back; ask for the full state again.
    pub fn reconnected(&mut self) -> Vec<Action> {
        self.session.send(Message::RequestSnapshot(RequestSnapshot::default()));
        self.flush()
    }

    /// The current model as a snapshot payload.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        sync::capture(&self.session)
    }

    // --- Internals ---

    fn dispatch(&mut self, event: &Event) {
        if self.chain.dispatch(&mut self.session, event) == Flow::Forward {
            trace!(kind = ?event.kind(), "event not handled");
        }
    }

    /// Run queued directives until none remain.
    fn drain(&mut self) {
        let mut ran = 0;
        while let Some(directive) = self.session.next_directive() {
            ran += 1;
            if ran > MAX_DIRECTIVES {
                warn!(limit = MAX_DIRECTIVES, "directive limit reached, dropping the rest");
                while self.session.next_directive().is_some() {}
                return;
            }
            match directive {
                Directive::Dispatch(event) => self.dispatch(&event),
                other => self.chain.direct(&mut self.session, &other),
            }
        }
    }

    /// Encode queued messages and report whether a redraw is due.
    fn flush(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        for message in self.session.take_outbox() {
            match frames::encode_text(&message) {
                Ok(text) => actions.push(Action::Send(text)),
                Err(error) => warn!(msg_type = message.msg_type(), %error, "dropping unencodable message"),
            }
        }
        if self.session.take_dirty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }
}
