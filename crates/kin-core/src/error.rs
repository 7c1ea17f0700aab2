//! Errors returned by the mutation engine.
//!
//! Every variant is a rejected mutation; the graph is left exactly as it
//! was before the call.

use crate::id::PersonId;
use crate::model::ParentSlot;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FamilyError {
    #[error("a person with id `{0}` already exists")]
    DuplicateId(PersonId),

    #[error("no person with id `{0}`")]
    UnknownPerson(PersonId),

    #[error("parent `{0}` does not exist")]
    UnknownParent(PersonId),

    /// `parent` already descends from `child`, so linking them would close a loop.
    #[error("`{parent}` is a descendant of `{child}`; the relation would form a cycle")]
    Cycle { parent: PersonId, child: PersonId },

    #[error("`{0}` cannot be their own parent")]
    SelfRelation(PersonId),

    #[error("`{parent}` has the wrong gender to be a {slot}")]
    GenderMismatch { parent: PersonId, slot: ParentSlot },

    /// Only raised under `RelationPolicy::Reject`.
    #[error("`{child}` already has a {slot} (`{existing}`)")]
    SlotOccupied {
        child: PersonId,
        slot: ParentSlot,
        existing: PersonId,
    },

    #[error("no relation from `{parent}` to `{child}`")]
    UnknownRelation { parent: PersonId, child: PersonId },

    #[error("invalid birth date `{0}` (expected YYYY-MM-DD)")]
    InvalidBirthDate(String),

    /// An imported edge contradicts the parent fields of its target.
    #[error("relation `{parent}` -> `{child}` conflicts with the child's parents")]
    InconsistentData { parent: PersonId, child: PersonId },
}
