//! Commit-event hooks connecting the family graph to downstream consumers.

mod registry;
mod traits;

pub use registry::HookRegistry;
pub use traits::{CommitEvent, CommitHook, HookResult};
