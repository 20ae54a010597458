//! Trait seams for the external collaborators: the content-addressed blob
//! store and the anchoring ledger.
//!
//! Both are treated as append-only, externally shared services. No component
//! assumes exclusive access; idempotency via content addressing and monotonic
//! receipt ordering stand in for distributed locking.

use crate::addressing::ContentId;
use crate::archive::records::AnchorReceipt;
use crate::models::EntityId;
use crate::storage::errors::StorageResult;
use async_trait::async_trait;
use std::fmt::Debug;

/// Content-addressed blob store (e.g. an IPFS node behind an HTTP API).
///
/// The identifier returned by [`put`](ContentStore::put) must agree with
/// [`ContentId::identify`] over the same bytes; the archive service rejects a
/// backend whose identifiers disagree rather than trusting two schemes.
#[async_trait]
pub trait ContentStore: Send + Sync + Debug + 'static {
    /// Store a byte sequence and return its content identifier. Idempotent:
    /// identical bytes land at the identical identifier.
    async fn put(&self, bytes: &[u8]) -> StorageResult<ContentId>;

    /// Fetch the bytes stored under the identifier.
    async fn get(&self, id: &ContentId) -> StorageResult<Vec<u8>>;

    /// Ask the backend to retain the blob durably.
    async fn pin(&self, id: &ContentId) -> StorageResult<()>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }
}

/// Append-only ledger anchoring `(entity id, content id)` pairs.
#[async_trait]
pub trait AnchorLedger: Send + Sync + Debug + 'static {
    /// Anchor a content identifier against an entity id, returning the
    /// receipt. Receipts accumulate per entity; nothing is overwritten.
    async fn anchor(
        &self,
        entity_id: &EntityId,
        content_id: &ContentId,
    ) -> StorageResult<AnchorReceipt>;

    /// Latest receipt for an entity id, if any anchor exists.
    async fn lookup(&self, entity_id: &EntityId) -> StorageResult<Option<AnchorReceipt>>;

    /// Full receipt history for an entity id, oldest first.
    async fn receipts_of(&self, entity_id: &EntityId) -> StorageResult<Vec<AnchorReceipt>>;

    /// Check that the ledger is reachable.
    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }
}

/// Lookup seam the graph store uses to check that referenced content ids have
/// a successful archive record (no dangling media references).
#[async_trait]
pub trait ContentIndex: Send + Sync + Debug + 'static {
    async fn has_content(&self, content_id: &ContentId) -> bool;
}
