//! Finite-state controllers and the chain they form.
//!
//! DESIGN
//! ======
//! Each interaction machine is a closed enum of states implementing
//! [`StateSet`]. A [`Controller`] holds the current variant. Controllers are
//! assembled once, in order, into a [`Chain`]: a controller's fallback is the
//! controller after it, and the last one has none. The order never changes
//! after [`ChainBuilder::build`].
//!
//! Dispatch offers an event to the head controller's current state. A state
//! either handles it or returns [`Flow::Forward`], in which case the next
//! controller is tried. An event forwarded past the tail is dropped.
//!
//! LIFECYCLE
//! =========
//! `Step::change_state` runs `end` on the old state, stores the new one,
//! records the transition, then runs `start` on the new state. Handlers may
//! change state any number of times and may re-dispatch the event against the
//! state they just entered.
//!
//! Requests that target other controllers (arming, disarming, re-entering the
//! chain from the head) are queued as [`Directive`]s on the session and run
//! after the current dispatch completes.

#[cfg(test)]
#[path = "fsm_test.rs"]
mod fsm_test;

use std::fmt;

use crate::input::{Event, EventKind};
use crate::session::Session;

// =============================================================================
// TYPES
// =============================================================================

/// Controllers that make up the editor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    Mode,
    Toolbox,
    Time,
    Group,
    Link,
    Move,
    Hotkeys,
    View,
}

/// Outcome of offering an event to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Handled,
    /// Not handled here; try the fallback controller.
    Forward,
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A `start` hook, including the initial start of the chain.
    Start,
    Event(EventKind),
    Arm,
    Disarm,
}

/// One recorded state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub machine: Machine,
    pub from: &'static str,
    pub to: &'static str,
    pub trigger: Trigger,
}

/// Cross-controller request, applied once the current dispatch completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Move a disabled controller to its ready state.
    Arm(Machine),
    /// Move a controller to its disabled state.
    Disarm(Machine),
    /// Dispatch an event from the head of the chain.
    Dispatch(Event),
}

/// A closed set of states for one machine.
pub trait StateSet: Copy + Eq + fmt::Debug + 'static {
    const MACHINE: Machine;
    /// Entered when the controller is armed.
    const READY: Self;
    /// Entered when the controller is disarmed; `None` if it cannot be.
    const DISABLED: Option<Self>;

    fn name(self) -> &'static str;

    fn start(self, _step: &mut Step<'_, Self>) {}

    fn end(self, _step: &mut Step<'_, Self>) {}

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow;

    /// States this state may move to for the given trigger. Used to validate
    /// recorded transitions, never consulted during dispatch.
    fn transitions(self, trigger: Trigger) -> &'static [Self];
}

// =============================================================================
// STEP
// =============================================================================

/// Handle given to a state while it runs: the owning controller's state slot,
/// the session, and the controllers behind it in the chain.
pub struct Step<'a, S: StateSet> {
    state: &'a mut S,
    pub session: &'a mut Session,
    rest: &'a mut [Box<dyn Dispatch>],
    trigger: Trigger,
}

impl<S: StateSet> Step<'_, S> {
    #[must_use]
    pub fn state(&self) -> S {
        *self.state
    }

    /// End the current state, enter `next`, start it.
    pub fn change_state(&mut self, next: S) {
        let previous = *self.state;
        previous.end(self);
        *self.state = next;
        let transition = Transition { machine: S::MACHINE, from: previous.name(), to: next.name(), trigger: self.trigger };
        tracing::debug!(machine = ?transition.machine, from = transition.from, to = transition.to, trigger = ?transition.trigger, "transition");
        self.session.record_transition(transition);

        let outer = std::mem::replace(&mut self.trigger, Trigger::Start);
        next.start(self);
        self.trigger = outer;
    }

    /// Offer `event` again to whatever state is current now.
    pub fn redispatch(&mut self, event: &Event) -> Flow {
        let state = *self.state;
        state.handle(self, event)
    }

    /// Hand `event` to the fallback chain now and return its outcome.
    pub fn forward(&mut self, event: &Event) -> Flow {
        dispatch_chain(self.rest, self.session, event)
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Object-safe view of a controller, so one chain can hold every machine.
pub trait Dispatch {
    fn machine(&self) -> Machine;

    fn state_name(&self) -> &'static str;

    fn start(&mut self, session: &mut Session, rest: &mut [Box<dyn Dispatch>]);

    fn handle(&mut self, session: &mut Session, rest: &mut [Box<dyn Dispatch>], event: &Event) -> Flow;

    fn direct(&mut self, session: &mut Session, rest: &mut [Box<dyn Dispatch>], directive: &Directive);
}

/// One machine's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controller<S: StateSet> {
    state: S,
}

impl<S: StateSet> Controller<S> {
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self { state: initial }
    }

    #[must_use]
    pub fn state(&self) -> S {
        self.state
    }

    fn step<'a>(&'a mut self, session: &'a mut Session, rest: &'a mut [Box<dyn Dispatch>], trigger: Trigger) -> Step<'a, S> {
        Step { state: &mut self.state, session, rest, trigger }
    }
}

impl<S: StateSet> Dispatch for Controller<S> {
    fn machine(&self) -> Machine {
        S::MACHINE
    }

    fn state_name(&self) -> &'static str {
        self.state.name()
    }

    fn start(&mut self, session: &mut Session, rest: &mut [Box<dyn Dispatch>]) {
        let state = self.state;
        state.start(&mut self.step(session, rest, Trigger::Start));
    }

    fn handle(&mut self, session: &mut Session, rest: &mut [Box<dyn Dispatch>], event: &Event) -> Flow {
        let state = self.state;
        state.handle(&mut self.step(session, rest, Trigger::Event(event.kind())), event)
    }

    fn direct(&mut self, session: &mut Session, rest: &mut [Box<dyn Dispatch>], directive: &Directive) {
        match directive {
            Directive::Arm(machine) if *machine == S::MACHINE => {
                if Some(self.state) == S::DISABLED {
                    self.step(session, rest, Trigger::Arm).change_state(S::READY);
                }
            }
            Directive::Disarm(machine) if *machine == S::MACHINE => {
                if let Some(disabled) = S::DISABLED.filter(|&d| d != self.state) {
                    self.step(session, rest, Trigger::Disarm).change_state(disabled);
                }
            }
            _ => {}
        }
    }
}

// =============================================================================
// CHAIN
// =============================================================================

/// Offer `event` to each controller in turn until one handles it.
pub(crate) fn dispatch_chain(chain: &mut [Box<dyn Dispatch>], session: &mut Session, event: &Event) -> Flow {
    let Some((head, rest)) = chain.split_first_mut() else {
        return Flow::Forward;
    };
    match head.handle(session, rest, event) {
        Flow::Handled => Flow::Handled,
        Flow::Forward => dispatch_chain(rest, session, event),
    }
}

/// Ordered, fixed list of controllers.
pub struct Chain {
    controllers: Vec<Box<dyn Dispatch>>,
}

impl Chain {
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder { controllers: Vec::new() }
    }

    /// Run every controller's initial `start` hook, head first.
    pub fn start(&mut self, session: &mut Session) {
        for index in 0..self.controllers.len() {
            let (head, rest) = self.controllers[index..].split_at_mut(1);
            head[0].start(session, rest);
        }
    }

    pub fn dispatch(&mut self, session: &mut Session, event: &Event) -> Flow {
        dispatch_chain(&mut self.controllers, session, event)
    }

    /// Offer a directive to every controller; only its target reacts.
    pub fn direct(&mut self, session: &mut Session, directive: &Directive) {
        for index in 0..self.controllers.len() {
            let (head, rest) = self.controllers[index..].split_at_mut(1);
            head[0].direct(session, rest, directive);
        }
    }

    /// Machines from head to tail.
    #[must_use]
    pub fn machines(&self) -> Vec<Machine> {
        self.controllers.iter().map(|c| c.machine()).collect()
    }

    /// Name of a machine's current state.
    #[must_use]
    pub fn state_of(&self, machine: Machine) -> Option<&'static str> {
        self.controllers
            .iter()
            .find(|c| c.machine() == machine)
            .map(|c| c.state_name())
    }

    /// The controller a machine falls back to.
    #[must_use]
    pub fn fallback_of(&self, machine: Machine) -> Option<Machine> {
        let index = self.controllers.iter().position(|c| c.machine() == machine)?;
        self.controllers.get(index + 1).map(|c| c.machine())
    }
}

/// Appends controllers head first.
pub struct ChainBuilder {
    controllers: Vec<Box<dyn Dispatch>>,
}

impl ChainBuilder {
    /// Append a controller starting in `initial`; it becomes the fallback of
    /// the previously appended one.
    #[must_use]
    pub fn then<S: StateSet>(mut self, initial: S) -> Self {
        self.controllers.push(Box::new(Controller::new(initial)));
        self
    }

    #[must_use]
    pub fn build(self) -> Chain {
        Chain { controllers: self.controllers }
    }
}
