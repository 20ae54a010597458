//! The family graph: persons, memories, and relationship edges with
//! transactionally enforced structural invariants.
//!
//! All relationship edits go through [`FamilyGraph::link_relationship`] /
//! [`FamilyGraph::unlink_relationship`], which apply both sides of an edge
//! inside one invariant-checking transaction. There are no independent
//! single-sided writes anywhere.

mod locks;
mod store;
mod traversal;

pub use locks::LockRegistry;
pub use store::FamilyGraph;

use crate::models::{EntityId, MemoryId, PersonId};
use serde::{Deserialize, Serialize};

/// Kinds of relationship edge the graph maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Directed: `link(Parent, a, b)` makes `a` a parent of `b`. Mirrored as
    /// `a.children_ids ∋ b` and `b.parent_ids ∋ a`; participates in the
    /// acyclicity check.
    Parent,
    /// Undirected and symmetric; excluded from the acyclicity check.
    Spouse,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
            Self::Spouse => write!(f, "spouse"),
        }
    }
}

/// Error type for graph commands and queries.
///
/// Structural errors are returned before any mutation; a failed command
/// leaves the graph exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A structural rule rejected the command. `rule` names the rule.
    #[error("invariant violated ({rule}): {detail}")]
    InvariantViolation { rule: &'static str, detail: String },

    /// Registering the parent edge would make a person their own ancestor.
    #[error("cycle detected: making {parent} a parent of {child} would close an ancestry loop")]
    CycleDetected { parent: PersonId, child: PersonId },

    /// The ancestry walk hit the configured depth cap; the command fails
    /// closed instead of doing unbounded work.
    #[error("traversal depth exceeded (max {max_depth})")]
    DepthExceeded { max_depth: usize },

    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    #[error("memory not found: {0}")]
    MemoryNotFound(MemoryId),

    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("already exists: {0}")]
    AlreadyExists(EntityId),

    #[error("entity is tombstoned: {0}")]
    Tombstoned(EntityId),
}
