//! Pan and zoom.
//!
//! Tail of the chain: pointer input nobody else claimed pans the view, and
//! wheel input zooms around the cursor. A two-finger touch pans and scales
//! in one gesture from a baseline captured when the second finger lands.

use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{Event, EventKind};
use crate::viewport::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Start,
    Ready,
    Pressed,
    Pan,
    Scale,
}

impl StateSet for ViewState {
    const MACHINE: Machine = Machine::View;
    const READY: Self = Self::Ready;
    const DISABLED: Option<Self> = None;

    fn name(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Ready => "Ready",
            Self::Pressed => "Pressed",
            Self::Pan => "Pan",
            Self::Scale => "Scale",
        }
    }

    fn start(self, step: &mut Step<'_, Self>) {
        if self == Self::Start {
            step.change_state(Self::Ready);
        }
    }

    fn end(self, step: &mut Step<'_, Self>) {
        if self == Self::Pan {
            step.session.pinch = None;
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        match (self, event) {
            (Self::Ready, Event::MouseDown(_)) => {
                step.change_state(Self::Pressed);
                Flow::Handled
            }
            (Self::Ready, Event::TouchStart(touch)) => {
                if let [a, b] = touch.touches.as_slice() {
                    step.session.pinch = Some(step.session.viewport.pinch_baseline(*a, *b));
                    step.change_state(Self::Pan);
                } else {
                    step.change_state(Self::Pressed);
                }
                Flow::Handled
            }
            (Self::Ready, Event::MouseWheel(_)) => {
                step.change_state(Self::Scale);
                step.redispatch(event)
            }
            (Self::Ready, Event::ResetViewport) => {
                step.session.viewport.reset();
                step.session.refresh_pointer();
                step.session.mark_dirty();
                step.session.dispatch_later(Event::ViewportChanged);
                Flow::Handled
            }
            (Self::Pressed, Event::MouseMove(_) | Event::TouchMove(_)) => {
                step.change_state(Self::Pan);
                Flow::Handled
            }
            (Self::Pressed | Self::Pan, Event::MouseUp(_) | Event::TouchEnd(_)) => {
                step.change_state(Self::Ready);
                Flow::Handled
            }
            (Self::Pan, Event::MouseMove(_)) => {
                pan_to_pointer(step);
                Flow::Handled
            }
            (Self::Pan, Event::TouchMove(touch)) => {
                match (step.session.pinch, touch.touches.as_slice()) {
                    (Some(pinch), [a, b]) => {
                        step.session.viewport.apply_pinch(&pinch, *a, *b);
                        step.session.refresh_pointer();
                        step.session.mark_dirty();
                    }
                    (None, [_]) => pan_to_pointer(step),
                    _ => {}
                }
                Flow::Handled
            }
            (Self::Scale, Event::MouseWheel(wheel)) => {
                step.session.viewport.zoom_at(Point::new(wheel.x, wheel.y), wheel.delta);
                step.session.refresh_pointer();
                step.session.mark_dirty();
                step.change_state(Self::Ready);
                Flow::Handled
            }
            _ => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        match (self, trigger) {
            (Self::Start, Trigger::Start) => &[Self::Ready],
            (Self::Ready, Trigger::Event(EventKind::MouseDown)) => &[Self::Pressed],
            (Self::Ready, Trigger::Event(EventKind::TouchStart)) => &[Self::Pressed, Self::Pan],
            (Self::Ready, Trigger::Event(EventKind::MouseWheel)) => &[Self::Scale],
            (Self::Pressed, Trigger::Event(EventKind::MouseMove | EventKind::TouchMove)) => &[Self::Pan],
            (Self::Pressed | Self::Pan, Trigger::Event(EventKind::MouseUp | EventKind::TouchEnd)) => &[Self::Ready],
            // A wheel event enters Scale from Ready and leaves it again.
            (Self::Scale, Trigger::Event(EventKind::MouseWheel)) => &[Self::Ready],
            _ => &[],
        }
    }
}

/// Pan by the screen distance the pointer moved since the last pan step.
fn pan_to_pointer(step: &mut Step<'_, ViewState>) {
    let session = &mut *step.session;
    let screen = session.pointer.screen;
    session.viewport.pan_x += screen.x - session.pointer.pressed.x;
    session.viewport.pan_y += screen.y - session.pointer.pressed.y;
    session.pointer.pressed = screen;
    session.refresh_pointer();
    session.mark_dirty();
}

