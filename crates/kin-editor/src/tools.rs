//! Tool system for canvas interactions.
//!
//! Each tool translates input events into at most one `FamilyMutation`,
//! which the session commits through the mutation engine. Tools never see
//! the graph; whether a mutation is accepted is the engine's call.
//!
//! | Tool           | Node click                      | Edge click        | Pointer move        |
//! |----------------|---------------------------------|-------------------|---------------------|
//! | Select         | select node                     | —                 | —                   |
//! | AddRelation    | pick source, then commit target | —                 | drag provisional end |
//! | RemoveRelation | —                               | remove relation   | —                   |

use crate::adapter::{EdgeEnd, ProvisionalEdge};
use crate::input::{Hit, InputEvent};
use kin_core::id::PersonId;
use kin_core::mutation::FamilyMutation;

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Select,
    AddRelation,
    RemoveRelation,
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event, returning the mutation it completes, if any.
    fn handle(&mut self, event: &InputEvent) -> Option<FamilyMutation>;

    /// Drop any in-flight gesture.
    fn reset(&mut self) {}

    /// The edge to draw for a gesture that has not committed yet.
    fn provisional(&self) -> Option<ProvisionalEdge> {
        None
    }
}

// ─── Select Tool ─────────────────────────────────────────────────────────

/// Tracks the current edit/delete target. The session feeds it every click
/// regardless of which tool is active.
#[derive(Debug, Default)]
pub struct SelectTool {
    pub selected: Option<PersonId>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent) -> Option<FamilyMutation> {
        match event {
            InputEvent::Click {
                hit: Hit::Node(id), ..
            } => self.selected = Some(*id),
            InputEvent::Click {
                hit: Hit::Empty, ..
            } => self.selected = None,
            _ => {}
        }
        None
    }

    fn reset(&mut self) {
        self.clear();
    }
}

// ─── Add Relation Tool ───────────────────────────────────────────────────

/// Two-click gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Source picked; `pointer` is the last move position, if any.
    Pending {
        source: PersonId,
        pointer: Option<(f32, f32)>,
    },
}

/// Click a parent, then click a child.
#[derive(Debug, Default)]
pub struct AddRelationTool {
    state: GestureState,
}

impl AddRelationTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn pending_source(&self) -> Option<PersonId> {
        match self.state {
            GestureState::Pending { source, .. } => Some(source),
            GestureState::Idle => None,
        }
    }
}

impl Tool for AddRelationTool {
    fn kind(&self) -> ToolKind {
        ToolKind::AddRelation
    }

    fn handle(&mut self, event: &InputEvent) -> Option<FamilyMutation> {
        match (*event, self.state) {
            (
                InputEvent::Click {
                    hit: Hit::Node(id), ..
                },
                GestureState::Idle,
            ) => {
                log::trace!("add-relation: source {id}");
                self.state = GestureState::Pending {
                    source: id,
                    pointer: None,
                };
                None
            }
            (
                InputEvent::Click {
                    hit: Hit::Node(id), ..
                },
                GestureState::Pending { source, .. },
            ) => {
                if id == source {
                    log::trace!("add-relation: ignoring self-loop on {id}");
                    return None;
                }
                // Success or failure, the gesture ends here.
                self.state = GestureState::Idle;
                Some(FamilyMutation::AddRelation { source, target: id })
            }
            (InputEvent::PointerMove { x, y }, GestureState::Pending { source, .. }) => {
                self.state = GestureState::Pending {
                    source,
                    pointer: Some((x, y)),
                };
                None
            }
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    fn provisional(&self) -> Option<ProvisionalEdge> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Pending { source, pointer } => Some(ProvisionalEdge {
                source,
                end: match pointer {
                    Some((x, y)) => EdgeEnd::Point { x, y },
                    None => EdgeEnd::Node { id: source },
                },
            }),
        }
    }
}

// ─── Remove Relation Tool ────────────────────────────────────────────────

/// Click an edge to delete it. Stateless.
#[derive(Debug, Default)]
pub struct RemoveRelationTool;

impl RemoveRelationTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for RemoveRelationTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RemoveRelation
    }

    fn handle(&mut self, event: &InputEvent) -> Option<FamilyMutation> {
        match event {
            InputEvent::Click {
                hit: Hit::Edge { source, target },
                ..
            } => Some(FamilyMutation::RemoveRelation {
                source: *source,
                target: *target,
            }),
            _ => None,
        }
    }
}
