//! In-memory reference backends.
//!
//! These back the embedded default wiring and serve as test doubles. They are
//! explicit, constructed service objects handed to the archive service;
//! nothing in the crate reaches for a global instance.

use crate::addressing::ContentId;
use crate::archive::records::AnchorReceipt;
use crate::models::{EntityId, now_millis};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::traits::{AnchorLedger, ContentStore};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory content-addressed blob store.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<ContentId, Vec<u8>>>,
    pins: RwLock<HashSet<ContentId>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Whether the blob has been pinned.
    pub async fn is_pinned(&self, id: &ContentId) -> bool {
        self.pins.read().await.contains(id)
    }

    /// Overwrite stored bytes in place, bypassing content addressing.
    ///
    /// Exists to simulate a corrupted or hostile backend; a subsequent
    /// verified read of the affected content must fail.
    pub async fn corrupt(&self, id: &ContentId, bytes: Vec<u8>) {
        self.blobs.write().await.insert(*id, bytes);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, bytes: &[u8]) -> StorageResult<ContentId> {
        let id = ContentId::identify(bytes);
        self.blobs
            .write()
            .await
            .entry(id)
            .or_insert_with(|| bytes.to_vec());
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> StorageResult<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn pin(&self, id: &ContentId) -> StorageResult<()> {
        if !self.blobs.read().await.contains_key(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.pins.write().await.insert(*id);
        Ok(())
    }
}

/// In-memory anchoring ledger. Receipts accumulate per entity id and are
/// never mutated or deleted.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    receipts: RwLock<HashMap<EntityId, Vec<AnchorReceipt>>>,
    sequence: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of receipts across all entities.
    pub async fn receipt_count(&self) -> usize {
        self.receipts.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl AnchorLedger for MemoryLedger {
    async fn anchor(
        &self,
        entity_id: &EntityId,
        content_id: &ContentId,
    ) -> StorageResult<AnchorReceipt> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let receipt = AnchorReceipt {
            entity_id: entity_id.clone(),
            content_id: *content_id,
            anchored_at: now_millis(),
            tx_ref: format!("mem-{seq:016x}"),
        };
        self.receipts
            .write()
            .await
            .entry(entity_id.clone())
            .or_default()
            .push(receipt.clone());
        Ok(receipt)
    }

    async fn lookup(&self, entity_id: &EntityId) -> StorageResult<Option<AnchorReceipt>> {
        Ok(self
            .receipts
            .read()
            .await
            .get(entity_id)
            .and_then(|v| v.last())
            .cloned())
    }

    async fn receipts_of(&self, entity_id: &EntityId) -> StorageResult<Vec<AnchorReceipt>> {
        Ok(self
            .receipts
            .read()
            .await
            .get(entity_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_is_idempotent_by_content() {
        let store = MemoryContentStore::new();
        let a = store.put(b"same bytes").await.unwrap();
        let b = store.put(b"same bytes").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn pin_requires_existing_blob() {
        let store = MemoryContentStore::new();
        let missing = ContentId::identify(b"never stored");
        assert!(matches!(
            store.pin(&missing).await,
            Err(StorageError::NotFound(_))
        ));

        let id = store.put(b"stored").await.unwrap();
        store.pin(&id).await.unwrap();
        assert!(store.is_pinned(&id).await);
    }

    #[tokio::test]
    async fn ledger_accumulates_receipts_latest_last() {
        let ledger = MemoryLedger::new();
        let entity = EntityId::from_string("p1");
        let first = ledger
            .anchor(&entity, &ContentId::identify(b"v1"))
            .await
            .unwrap();
        let second = ledger
            .anchor(&entity, &ContentId::identify(b"v2"))
            .await
            .unwrap();
        assert_ne!(first.tx_ref, second.tx_ref);

        let history = ledger.receipts_of(&entity).await.unwrap();
        assert_eq!(history, vec![first, second.clone()]);
        assert_eq!(ledger.lookup(&entity).await.unwrap(), Some(second));
    }
}
