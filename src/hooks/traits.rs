//! Traits for graph commit hooks.
//!
//! Every successful mutating command on the family graph emits a
//! [`CommitEvent`]. Hooks consume those events; the archive service registers
//! itself as a hook so committed entities flow into content-addressed storage
//! without the caller doing anything extra.

use crate::models::{ActorId, ArchiveEntity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A successfully committed graph mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitEvent {
    /// Snapshot of the entity as committed.
    pub entity: ArchiveEntity,
    pub actor: ActorId,
    pub committed_at: DateTime<Utc>,
}

/// Result of a single hook execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookResult {
    Continue,
    /// The hook failed. The mutation has already committed; failures are
    /// logged and surfaced to operators, never unwound.
    Failed(String),
}

/// Trait for commit-event consumers.
///
/// Hooks run in priority order (higher first) with a per-hook timeout. A
/// failing or timed-out hook does not affect other hooks or the committed
/// mutation.
#[async_trait]
pub trait CommitHook: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &str {
        "unnamed_hook"
    }

    /// Execution priority; higher runs earlier.
    fn priority(&self) -> i32 {
        0
    }

    /// Per-invocation timeout in milliseconds.
    fn timeout_ms(&self) -> u64 {
        5_000
    }

    /// Called after a graph mutation has committed.
    async fn on_commit(&self, event: &CommitEvent) -> HookResult;
}
