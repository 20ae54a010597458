//! Per-entity lock registry.
//!
//! Commands affecting the same entity serialize on that entity's mutex;
//! commands on unrelated entities proceed in parallel. Relationship commands
//! take both endpoints' locks in sorted id order so two concurrent edits of
//! the same pair can never deadlock.

use crate::models::EntityId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out per-entity async mutexes, creating them on first use.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: StdMutex<HashMap<EntityId, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: &EntityId) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.clone()).or_default())
    }

    /// Acquire the writer lock for a single entity.
    pub async fn acquire(&self, id: &EntityId) -> OwnedMutexGuard<()> {
        self.handle(id).lock_owned().await
    }

    /// Acquire the writer locks for two entities in sorted id order.
    ///
    /// Returns one guard when both ids name the same entity.
    pub async fn acquire_pair(
        &self,
        a: &EntityId,
        b: &EntityId,
    ) -> (OwnedMutexGuard<()>, Option<OwnedMutexGuard<()>>) {
        if a == b {
            return (self.acquire(a).await, None);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_guard = self.acquire(first).await;
        let second_guard = self.acquire(second).await;
        (first_guard, Some(second_guard))
    }
}
