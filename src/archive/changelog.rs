//! Append-only change log of archive commits.
//!
//! Every successful commit appends exactly one entry; there is no delete or
//! mutate API. Per-entity histories are singly linked through `previous`, the
//! content id of the entity's prior snapshot. The latest-pointer index kept by
//! the archive service is a cache over this log; the log is authoritative.

use crate::addressing::ContentId;
use crate::models::{ActorId, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One committed snapshot of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub entity_id: EntityId,
    pub content_id: ContentId,
    pub timestamp: DateTime<Utc>,
    /// Actor attributed with the change.
    pub actor: ActorId,
    /// Content id of the entity's previous snapshot, `None` for the first.
    pub previous: Option<ContentId>,
}

/// In-memory ordered log of commit entries.
#[derive(Debug, Default)]
pub struct ChangeLog {
    entries: RwLock<Vec<ChangeLogEntry>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries keep insertion order; nothing is ever
    /// removed or rewritten.
    pub async fn append(&self, entry: ChangeLogEntry) {
        self.entries.write().await.push(entry);
    }

    /// History of one entity, oldest to newest, as a restartable iterator
    /// over a snapshot of the log taken at call time.
    pub async fn history_of(&self, entity_id: &EntityId) -> ChangeHistory {
        let entries = self.entries.read().await;
        let matching: Vec<ChangeLogEntry> = entries
            .iter()
            .filter(|e| &e.entity_id == entity_id)
            .cloned()
            .collect();
        ChangeHistory {
            entries: Arc::from(matching),
            cursor: 0,
        }
    }

    /// Snapshot of the whole log in insertion order.
    pub async fn entries(&self) -> Vec<ChangeLogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Finite iterator over one entity's commit history, oldest first.
///
/// Iterates a snapshot, so it stays valid while new commits land;
/// [`restart`](ChangeHistory::restart) rewinds to the beginning.
#[derive(Debug, Clone)]
pub struct ChangeHistory {
    entries: Arc<[ChangeLogEntry]>,
    cursor: usize,
}

impl ChangeHistory {
    /// Rewind to the oldest entry.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Iterator for ChangeHistory {
    type Item = ChangeLogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(entry)
    }
}
