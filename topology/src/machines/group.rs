//! Rack, site and plain group rectangles.
//!
//! `NewGroup` waits in `Placing` for a press, which starts a provisional
//! group held on the session; its second corner follows the cursor until
//! release, when it is committed as a `GroupCreate`. Groups smaller than
//! [`MIN_GROUP_SIZE`] on either side are discarded instead.
//!
//! A press within a corner's hit square starts a resize; a press on the
//! border band selects the group for moving. Both emit one `GroupMove` per
//! group per pointer step and then announce membership changes.
//!
//! Armed only in rack mode. `PasteGroup` is still honoured while disabled,
//! since the rack and site toolboxes are offered in the zoomed-out modes.

use frames::{GroupMove, Message, Stamp};

use crate::consts::MIN_GROUP_SIZE;
use crate::fsm::{Flow, Machine, StateSet, Step, Trigger};
use crate::input::{Event, EventKind, GroupTemplate};
use crate::machines::{LabelKey, edit_label, set_editing};
use crate::model::{Corner, Group, GroupId, GroupType};
use crate::session::{Item, Session};
use crate::sync;
use crate::viewport::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Disabled,
    Ready,
    Selected1,
    CornerSelected,
    Resize,
    Move,
    Selected2,
    Selected3,
    EditLabel,
    Placing,
}

impl StateSet for GroupState {
    const MACHINE: Machine = Machine::Group;
    const READY: Self = Self::Ready;
    const DISABLED: Option<Self> = Some(Self::Disabled);

    fn name(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Ready => "Ready",
            Self::Selected1 => "Selected1",
            Self::CornerSelected => "CornerSelected",
            Self::Resize => "Resize",
            Self::Move => "Move",
            Self::Selected2 => "Selected2",
            Self::Selected3 => "Selected3",
            Self::EditLabel => "EditLabel",
            Self::Placing => "Placing",
        }
    }

    fn start(self, step: &mut Step<'_, Self>) {
        match self {
            Self::Resize | Self::Move => set_moving(step.session, true),
            Self::EditLabel => {
                if let Some(id) = single_group(step.session) {
                    set_editing(step.session, Item::Group(id), true);
                }
            }
            _ => {}
        }
    }

    fn end(self, step: &mut Step<'_, Self>) {
        match self {
            Self::Resize | Self::Move => set_moving(step.session, false),
            Self::EditLabel => {
                if let Some(id) = single_group(step.session) {
                    set_editing(step.session, Item::Group(id), false);
                }
            }
            Self::Placing => step.session.new_group_type = None,
            _ => {}
        }
    }

    fn handle(self, step: &mut Step<'_, Self>, event: &Event) -> Flow {
        match (self, event) {
            (Self::Disabled, Event::PasteGroup(template)) => {
                paste_group(step.session, template);
                Flow::Handled
            }
            (Self::Disabled, _) => Flow::Forward,
            (_, Event::UnselectAll) => {
                step.session.new_group = None;
                step.session.clear_selections();
                step.change_state(Self::Ready);
                Flow::Forward
            }

            // --- Ready ---
            (Self::Ready, Event::MouseDown(_)) => match press_group(step.session) {
                Some(Press::Corner) => {
                    step.change_state(Self::CornerSelected);
                    Flow::Handled
                }
                Some(Press::Border) => {
                    step.change_state(Self::Selected1);
                    Flow::Handled
                }
                None => Flow::Forward,
            },
            (Self::Ready, Event::NewGroup(kind)) => {
                step.session.clear_selections();
                step.change_state(Self::Placing);
                step.session.new_group_type = Some(kind.clone());
                Flow::Handled
            }
            (Self::Ready, Event::PasteGroup(template)) => {
                if paste_group(step.session, template) {
                    step.change_state(Self::Selected2);
                }
                Flow::Handled
            }

            // --- Placing: waiting for the first corner ---
            (Self::Placing, Event::MouseDown(_)) => {
                let kind = step.session.new_group_type.take().unwrap_or(GroupType::Group);
                let mut group = Group::new(0, String::new(), kind, step.session.cursor(), None);
                group.selected = true;
                group.selected_corner = Some(Corner::BottomRight);
                step.session.new_group = Some(group);
                step.change_state(Self::Resize);
                Flow::Handled
            }

            // --- Pressed on a corner or the border ---
            (Self::CornerSelected, Event::MouseMove(_)) => {
                step.change_state(Self::Resize);
                Flow::Handled
            }
            (Self::Selected1 | Self::Selected3, Event::MouseMove(_)) => {
                step.change_state(Self::Move);
                Flow::Handled
            }
            (Self::Selected1 | Self::CornerSelected | Self::Move, Event::MouseUp(_)) => {
                step.change_state(Self::Selected2);
                Flow::Handled
            }

            // --- Resize ---
            (Self::Resize, Event::MouseMove(_)) => {
                if step.session.new_group.is_some() {
                    step.session.mark_dirty();
                } else {
                    resize_selected(step.session);
                }
                Flow::Handled
            }
            (Self::Resize, Event::MouseUp(_)) => {
                if step.session.new_group.is_some() {
                    let next = if finish_new_group(step.session) { Self::Selected2 } else { Self::Ready };
                    step.change_state(next);
                } else {
                    step.change_state(Self::Selected2);
                }
                Flow::Handled
            }

            // --- Move ---
            (Self::Move, Event::MouseMove(_)) => {
                translate_selected(step.session);
                Flow::Handled
            }
            (Self::Move, Event::MouseDown(_)) => {
                step.change_state(Self::Selected1);
                Flow::Handled
            }

            // --- Selected2 ---
            (Self::Selected2, Event::MouseDown(_)) => {
                let cursor = step.session.cursor();
                let diagram = &step.session.diagram;
                let selected: Vec<&Group> =
                    step.session.selection.groups().into_iter().filter_map(|id| diagram.group(id)).collect();
                let on_corner = selected.iter().any(|g| g.has_corner_selected(cursor, cursor));
                let on_border = selected.iter().any(|g| g.is_selected(cursor, cursor));
                if on_border && !on_corner {
                    step.change_state(Self::Selected3);
                    Flow::Handled
                } else {
                    step.change_state(Self::Ready);
                    step.redispatch(event)
                }
            }
            (Self::Selected2, Event::KeyDown(key)) if key.is_delete() => {
                delete_selected(step.session);
                step.change_state(Self::Ready);
                Flow::Handled
            }
            (Self::Selected2, Event::LabelEdit) => {
                if single_group(step.session).is_some() {
                    step.change_state(Self::EditLabel);
                }
                Flow::Handled
            }
            (Self::Selected2, Event::NewGroup(_) | Event::PasteGroup(_)) => {
                step.change_state(Self::Ready);
                step.redispatch(event)
            }

            // --- Selected3 ---
            (Self::Selected3, Event::MouseUp(_)) => {
                step.change_state(Self::EditLabel);
                Flow::Handled
            }

            // --- EditLabel ---
            (Self::EditLabel, Event::KeyDown(key)) => {
                let Some(id) = single_group(step.session) else {
                    step.change_state(Self::Ready);
                    return Flow::Handled;
                };
                if edit_label(step.session, Item::Group(id), key) == LabelKey::Done {
                    step.change_state(Self::Selected2);
                }
                Flow::Handled
            }
            (Self::EditLabel, Event::MouseDown(_)) => {
                step.change_state(Self::Ready);
                step.redispatch(event)
            }

            _ => Flow::Forward,
        }
    }

    fn transitions(self, trigger: Trigger) -> &'static [Self] {
        let Trigger::Event(kind) = trigger else {
            return &[];
        };
        match (self, kind) {
            (Self::Disabled, _) => &[],
            (_, EventKind::UnselectAll) => &[Self::Ready],
            (Self::Ready, EventKind::MouseDown) => &[Self::CornerSelected, Self::Selected1],
            (Self::Ready, EventKind::NewGroup) => &[Self::Placing],
            (Self::Ready, EventKind::PasteGroup) => &[Self::Selected2],
            (Self::Placing, EventKind::MouseDown) => &[Self::Resize],
            (Self::CornerSelected, EventKind::MouseMove) => &[Self::Resize],
            (Self::Selected1 | Self::Selected3, EventKind::MouseMove) => &[Self::Move],
            (Self::Selected1 | Self::CornerSelected | Self::Move, EventKind::MouseUp) => &[Self::Selected2],
            (Self::Resize, EventKind::MouseUp) => &[Self::Selected2, Self::Ready],
            (Self::Move, EventKind::MouseDown) => &[Self::Selected1],
            // Pressing elsewhere replays the press in Ready.
            (Self::Selected2, EventKind::MouseDown) => &[Self::Selected3, Self::Ready, Self::CornerSelected, Self::Selected1],
            (Self::Selected2, EventKind::KeyDown) => &[Self::Ready],
            (Self::Selected2, EventKind::LabelEdit) => &[Self::EditLabel],
            (Self::Selected2, EventKind::NewGroup) => &[Self::Ready, Self::Placing],
            (Self::Selected2, EventKind::PasteGroup) => &[Self::Ready, Self::Selected2],
            (Self::Selected3, EventKind::MouseUp) => &[Self::EditLabel],
            (Self::EditLabel, EventKind::KeyDown) => &[Self::Selected2, Self::Ready],
            (Self::EditLabel, EventKind::MouseDown) => &[Self::Ready, Self::CornerSelected, Self::Selected1],
            _ => &[],
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

enum Press {
    Corner,
    Border,
}

/// Select the topmost group under the cursor, preferring corner hits.
fn press_group(session: &mut Session) -> Option<Press> {
    let cursor = session.cursor();
    let (id, press) = session.diagram.groups().iter().rev().find_map(|g| {
        if g.has_corner_selected(cursor, cursor) {
            Some((g.id, Press::Corner))
        } else if g.is_selected(cursor, cursor) {
            Some((g.id, Press::Border))
        } else {
            None
        }
    })?;
    session.clear_selections();
    session.select(Item::Group(id));
    if matches!(press, Press::Corner) {
        if let Some(group) = session.diagram.group_mut(id) {
            group.selected_corner = group.select_corner(cursor, cursor);
        }
    }
    Some(press)
}

fn single_group(session: &Session) -> Option<GroupId> {
    match session.selection.items() {
        [Item::Group(id)] => Some(*id),
        _ => None,
    }
}

fn set_moving(session: &mut Session, on: bool) {
    for id in session.selection.groups() {
        if let Some(group) = session.diagram.group_mut(id) {
            group.moving = on;
        }
    }
    if let Some(group) = session.new_group.as_mut() {
        group.moving = on;
    }
}

/// Commit a `GroupMove` taking `group` to `moved`.
fn commit_move(session: &mut Session, group: &Group, moved: &Group) {
    let cursor = session.cursor();
    let (previous_x1, previous_y1, previous_x2, previous_y2) = group.corners(cursor);
    let (x1, y1, x2, y2) = moved.corners(cursor);
    session.commit(Message::GroupMove(GroupMove {
        stamp: Stamp::default(),
        id: group.id,
        x1,
        y1,
        x2,
        y2,
        previous_x1,
        previous_y1,
        previous_x2,
        previous_y2,
    }));
}

fn resize_selected(session: &mut Session) {
    let (dx, dy) = session.take_drag_delta();
    let cursor = session.cursor();
    for id in session.selection.groups() {
        let Some(group) = session.diagram.group(id).cloned() else {
            continue;
        };
        let Some(corner) = group.selected_corner else {
            continue;
        };
        let mut moved = group.clone();
        moved.move_corner(corner, dx, dy, cursor);
        commit_move(session, &group, &moved);
    }
    session.refresh_memberships();
}

fn translate_selected(session: &mut Session) {
    let (dx, dy) = session.take_drag_delta();
    let cursor = session.cursor();
    for id in session.selection.groups() {
        let Some(group) = session.diagram.group(id).cloned() else {
            continue;
        };
        let mut moved = group.clone();
        moved.translate(dx, dy, cursor);
        commit_move(session, &group, &moved);
    }
    session.refresh_memberships();
}

/// Fix the provisional group's second corner and commit it. Returns whether
/// a group was created.
fn finish_new_group(session: &mut Session) -> bool {
    let Some(mut group) = session.new_group.take() else {
        return false;
    };
    let cursor = session.cursor();
    let extents = group.extents(cursor);
    if extents.width() < MIN_GROUP_SIZE || extents.height() < MIN_GROUP_SIZE {
        tracing::debug!(width = extents.width(), height = extents.height(), "group too small, discarded");
        session.mark_dirty();
        return false;
    }
    group.second = Some(cursor);
    group.id = session.seqs.group.next_id();
    group.name = format!("{}{}", group.kind.name_prefix(), group.id);
    create_group(session, &group);
    true
}

/// Create a group of the template's size centred on the cursor. Returns
/// whether a group was created.
fn paste_group(session: &mut Session, template: &GroupTemplate) -> bool {
    if template.width < MIN_GROUP_SIZE || template.height < MIN_GROUP_SIZE {
        tracing::debug!(name = %template.name, "group template too small");
        return false;
    }
    let cursor = session.cursor();
    let id = session.seqs.group.next_id();
    let first = Point::new(cursor.x - template.width / 2.0, cursor.y - template.height / 2.0);
    let second = Point::new(cursor.x + template.width / 2.0, cursor.y + template.height / 2.0);
    let name = format!("{}{id}", template.name);
    let group = Group::new(id, name, template.kind.clone(), first, Some(second));
    create_group(session, &group);
    true
}

fn create_group(session: &mut Session, group: &Group) {
    session.clear_selections();
    let cursor = session.cursor();
    session.commit(Message::GroupCreate(sync::group_spec(group, cursor)));
    session.select(Item::Group(group.id));
    session.refresh_memberships();
}

fn delete_selected(session: &mut Session) {
    let groups = session.selection.groups();
    session.clear_selections();
    let cursor = session.cursor();
    for id in groups {
        let Some(group) = session.diagram.group(id) else {
            continue;
        };
        let spec = sync::group_spec(group, cursor);
        session.commit(Message::GroupDestroy(spec));
    }
}
