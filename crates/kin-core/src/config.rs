//! Graph-level settings.

use serde::{Deserialize, Serialize};

/// What `add_relation` does when the target's slot already holds a
/// different parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationPolicy {
    /// Last click wins: the old parent is unlinked and replaced.
    #[default]
    Overwrite,
    /// Refuse with `FamilyError::SlotOccupied`.
    Reject,
}

/// Configuration for a `FamilyGraph`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Default: **overwrite**.
    pub relation_policy: RelationPolicy,
}
