//! Storage seams and reference backends.
//!
//! The durable stores are external collaborators reached through the
//! [`ContentStore`] and [`AnchorLedger`] traits; the in-memory implementations
//! here are the embedded default and double as test backends.

mod errors;
mod memory;
mod traits;

pub use errors::{StorageError, StorageResult};
pub use memory::{MemoryContentStore, MemoryLedger};
pub use traits::{AnchorLedger, ContentIndex, ContentStore};
