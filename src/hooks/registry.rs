//! Registry for commit hooks.
//!
//! Handles registration, priority ordering, per-hook timeout enforcement,
//! and safe failure handling: a misbehaving hook is logged, never fatal.

use super::traits::{CommitEvent, CommitHook, HookResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug)]
struct HookEntry {
    hook: Arc<dyn CommitHook>,
    priority: i32,
}

/// Thread-safe registry of commit hooks, kept sorted by priority.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<RwLock<Vec<HookEntry>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. Subsequent commit events will reach it in priority
    /// order (highest first, ties broken by name).
    pub async fn register(&self, hook: Arc<dyn CommitHook>) {
        let priority = hook.priority();
        let name = hook.name().to_string();
        let mut hooks = self.hooks.write().await;
        hooks.push(HookEntry { hook, priority });
        hooks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.hook.name().cmp(b.hook.name()))
        });
        debug!("Hook registered: {} (priority: {})", name, priority);
    }

    /// Number of registered hooks.
    pub async fn len(&self) -> usize {
        self.hooks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.hooks.read().await.is_empty()
    }

    /// Deliver a commit event to every registered hook.
    ///
    /// Hooks run sequentially in priority order. Failures and timeouts are
    /// logged and do not stop delivery to the remaining hooks.
    pub async fn dispatch(&self, event: &CommitEvent) {
        let hooks = self.hooks.read().await;
        for entry in hooks.iter() {
            let hook = Arc::clone(&entry.hook);
            let name = hook.name().to_string();
            let timeout = Duration::from_millis(hook.timeout_ms());

            match tokio::time::timeout(timeout, hook.on_commit(event)).await {
                Ok(HookResult::Continue) => {
                    debug!(hook = %name, entity = %event.entity.entity_id(), "hook completed");
                }
                Ok(HookResult::Failed(reason)) => {
                    warn!(hook = %name, entity = %event.entity.entity_id(), %reason, "hook failed");
                }
                Err(_) => {
                    warn!(
                        hook = %name,
                        entity = %event.entity.entity_id(),
                        timeout_ms = hook.timeout_ms(),
                        "hook timed out"
                    );
                }
            }
        }
    }
}
