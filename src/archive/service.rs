//! The archive service: canonical snapshots into content-addressed storage,
//! anchored on an append-only ledger.
//!
//! `commit` is the write path: canonicalize, identify, push (idempotent),
//! anchor, log. Its failure mode is deliberately asymmetric: a failed push
//! leaves nothing behind, while a failed anchor after a successful push leaves
//! the content record in place and reports [`ArchiveError::AnchorPending`] so
//! the caller can retry without re-pushing bytes.
//!
//! `read_verified` is the read path: latest receipt, fetch, recompute the
//! content id, require exact equality, then decode. A mismatch refuses the
//! read with [`ArchiveError::IntegrityViolation`]; there is no best-effort
//! fallback to unverified bytes.

use crate::addressing::ContentId;
use crate::archive::changelog::{ChangeHistory, ChangeLog, ChangeLogEntry};
use crate::archive::records::{AnchorReceipt, ContentRecord, MediaType};
use crate::archive::verifier::{IntegrityVerifier, VerificationOutcome};
use crate::codec::{self, CodecError};
use crate::config::{ArchiveConfig, ReanchorPolicy};
use crate::hooks::{CommitEvent, CommitHook, HookResult};
use crate::models::{ActorId, ArchiveEntity, EntityId, now_millis};
use crate::storage::{AnchorLedger, ContentIndex, ContentStore, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Error type for archive operations.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The content push succeeded but the ledger anchor did not. The content
    /// record is retained; retrying the commit skips the push and re-attempts
    /// the anchor only.
    #[error("anchor pending for {entity_id} (content {content_id}): {reason}")]
    AnchorPending {
        entity_id: EntityId,
        content_id: ContentId,
        reason: String,
    },

    /// Fetched bytes do not hash to the anchored content id. Never
    /// downgraded; the read is refused.
    #[error("integrity violation for {entity_id}: anchored {anchored}, computed {computed}")]
    IntegrityViolation {
        entity_id: EntityId,
        anchored: ContentId,
        computed: ContentId,
    },

    /// No anchor exists for the entity id.
    #[error("entity has no archive anchor: {0}")]
    NotArchived(EntityId),
}

/// Archives canonical entity snapshots and verifies them on the way back.
///
/// Holds no global state; construct one per store/ledger pair and share it
/// via `Arc`. Registering it on a [`FamilyGraph`]'s hook registry makes every
/// graph commit flow into the archive automatically, and handing it to the
/// graph as its content index closes the dangling-media check.
///
/// [`FamilyGraph`]: crate::graph::FamilyGraph
#[derive(Debug)]
pub struct ArchiveService {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn AnchorLedger>,
    changelog: ChangeLog,
    /// Content records by id; presence means the push succeeded.
    records: RwLock<HashMap<ContentId, ContentRecord>>,
    /// Latest receipt per entity. A cache over the changelog and ledger,
    /// rebuildable via [`Self::rebuild_index`].
    latest: RwLock<HashMap<EntityId, AnchorReceipt>>,
    config: ArchiveConfig,
}

impl ArchiveService {
    pub fn new(
        store: Arc<dyn ContentStore>,
        ledger: Arc<dyn AnchorLedger>,
        config: ArchiveConfig,
    ) -> Self {
        info!("🗄️ ArchiveService initialized");
        Self {
            store,
            ledger,
            changelog: ChangeLog::new(),
            records: RwLock::new(HashMap::new()),
            latest: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Archive an entity snapshot and anchor it on the ledger.
    pub async fn commit(
        &self,
        actor: &ActorId,
        entity: &ArchiveEntity,
    ) -> Result<AnchorReceipt, ArchiveError> {
        let entity_id = entity.entity_id();
        let bytes = codec::canonicalize(entity)?;
        let content_id = ContentId::identify(&bytes);

        let previous = self.latest.read().await.get(&entity_id).cloned();
        if let Some(prev) = &previous
            && prev.content_id == content_id
            && self.config.reanchor == ReanchorPolicy::Skip
        {
            debug!(entity = %entity_id, content = %content_id, "content unchanged, reusing anchor");
            return Ok(prev.clone());
        }

        self.push(&bytes, content_id, MediaType::Snapshot).await?;

        let receipt = match tokio::time::timeout(
            self.config.anchor_timeout,
            self.ledger.anchor(&entity_id, &content_id),
        )
        .await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                warn!(entity = %entity_id, content = %content_id, error = %e, "anchor failed after push");
                return Err(ArchiveError::AnchorPending {
                    entity_id,
                    content_id,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(entity = %entity_id, content = %content_id, "anchor timed out after push");
                return Err(ArchiveError::AnchorPending {
                    entity_id,
                    content_id,
                    reason: format!("timed out after {:?}", self.config.anchor_timeout),
                });
            }
        };

        self.changelog
            .append(ChangeLogEntry {
                entity_id: entity_id.clone(),
                content_id,
                timestamp: receipt.anchored_at,
                actor: actor.clone(),
                previous: previous.map(|p| p.content_id),
            })
            .await;
        self.latest
            .write()
            .await
            .insert(entity_id.clone(), receipt.clone());

        debug!(entity = %entity_id, content = %content_id, tx = %receipt.tx_ref, "entity anchored");
        Ok(receipt)
    }

    /// [`commit`](Self::commit) with bounded exponential backoff on
    /// transient failures. An `AnchorPending` retry resumes from the
    /// existing content record; bytes are never pushed twice.
    pub async fn commit_with_retry(
        &self,
        actor: &ActorId,
        entity: &ArchiveEntity,
    ) -> Result<AnchorReceipt, ArchiveError> {
        let retry = &self.config.retry;
        let mut backoff = retry.initial_backoff;
        let mut attempt = 1u32;
        loop {
            match self.commit(actor, entity).await {
                Ok(receipt) => return Ok(receipt),
                Err(e) if attempt < retry.max_attempts && is_transient(&e) => {
                    warn!(
                        entity = %entity.entity_id(),
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "commit failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(retry.backoff_multiplier);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Archive an opaque media blob (photo, recording, document), returning
    /// its content id for use in person and memory records.
    pub async fn put_media(
        &self,
        bytes: &[u8],
        media_type: MediaType,
    ) -> Result<ContentId, ArchiveError> {
        let content_id = ContentId::identify(bytes);
        self.push(bytes, content_id, media_type).await?;
        Ok(content_id)
    }

    /// Fetch and decode the latest anchored snapshot of an entity, refusing
    /// to return bytes whose hash does not match the anchor.
    pub async fn read_verified(&self, entity_id: &EntityId) -> Result<ArchiveEntity, ArchiveError> {
        let receipt = match self.latest.read().await.get(entity_id).cloned() {
            Some(receipt) => receipt,
            None => self
                .ledger
                .lookup(entity_id)
                .await?
                .ok_or_else(|| ArchiveError::NotArchived(entity_id.clone()))?,
        };

        let bytes = tokio::time::timeout(
            self.config.store_timeout,
            self.store.get(&receipt.content_id),
        )
        .await
        .map_err(|_| StorageError::Timeout("content fetch".to_string()))??;

        let predecessor = self.predecessor_of(&receipt).await?;
        let verification =
            IntegrityVerifier::verify_with_predecessor(&receipt, predecessor.as_ref(), &bytes);
        if let VerificationOutcome::Mismatch { anchored, computed } = verification.outcome {
            return Err(ArchiveError::IntegrityViolation {
                entity_id: entity_id.clone(),
                anchored,
                computed,
            });
        }

        Ok(codec::parse(&bytes)?)
    }

    /// Latest anchor receipt for an entity, if any.
    pub async fn latest_receipt(
        &self,
        entity_id: &EntityId,
    ) -> Result<Option<AnchorReceipt>, ArchiveError> {
        if let Some(receipt) = self.latest.read().await.get(entity_id) {
            return Ok(Some(receipt.clone()));
        }
        Ok(self.ledger.lookup(entity_id).await?)
    }

    /// Full anchor receipt history for an entity, oldest first.
    pub async fn receipts_of(
        &self,
        entity_id: &EntityId,
    ) -> Result<Vec<AnchorReceipt>, ArchiveError> {
        Ok(self.ledger.receipts_of(entity_id).await?)
    }

    /// Commit history of an entity from the change log, oldest first.
    pub async fn history_of(&self, entity_id: &EntityId) -> ChangeHistory {
        self.changelog.history_of(entity_id).await
    }

    /// Rebuild the latest-pointer index by replaying the change log.
    ///
    /// The log is authoritative for which content id is an entity's latest;
    /// the ledger supplies the matching receipt. Returns the number of
    /// entities indexed.
    pub async fn rebuild_index(&self) -> Result<usize, ArchiveError> {
        let mut latest_content: HashMap<EntityId, ContentId> = HashMap::new();
        for entry in self.changelog.entries().await {
            latest_content.insert(entry.entity_id, entry.content_id);
        }

        let mut rebuilt = HashMap::with_capacity(latest_content.len());
        for (entity_id, content_id) in latest_content {
            let receipts = self.ledger.receipts_of(&entity_id).await?;
            match receipts.into_iter().rev().find(|r| r.content_id == content_id) {
                Some(receipt) => {
                    rebuilt.insert(entity_id, receipt);
                }
                None => {
                    warn!(
                        entity = %entity_id,
                        content = %content_id,
                        "change log names a content id the ledger has no receipt for"
                    );
                }
            }
        }

        let count = rebuilt.len();
        *self.latest.write().await = rebuilt;
        info!(entities = count, "latest-pointer index rebuilt from change log");
        Ok(count)
    }

    /// Check that both external collaborators are reachable.
    pub async fn health_check(&self) -> Result<bool, ArchiveError> {
        let store_ok = self.store.health_check().await?;
        let ledger_ok = self.ledger.health_check().await?;
        Ok(store_ok && ledger_ok)
    }

    /// Push bytes unless a record already exists for their content id.
    async fn push(
        &self,
        bytes: &[u8],
        content_id: ContentId,
        media_type: MediaType,
    ) -> Result<(), ArchiveError> {
        if self.records.read().await.contains_key(&content_id) {
            debug!(content = %content_id, "content already archived, skipping push");
            return Ok(());
        }

        let returned = tokio::time::timeout(self.config.store_timeout, self.store.put(bytes))
            .await
            .map_err(|_| StorageError::Timeout("content push".to_string()))??;
        if returned != content_id {
            return Err(StorageError::IdentifierMismatch {
                returned,
                computed: content_id,
            }
            .into());
        }

        // Pinning is durability advice; a pin failure never fails the commit.
        if let Err(e) = self.store.pin(&content_id).await {
            warn!(content = %content_id, error = %e, "pin failed, content remains unpinned");
        }

        self.records.write().await.insert(
            content_id,
            ContentRecord {
                content_id,
                size: bytes.len() as u64,
                media_type,
                storage_token: returned.to_hex(),
                stored_at: now_millis(),
            },
        );
        Ok(())
    }

    /// The receipt immediately preceding `receipt` in the entity's ledger
    /// history, for the ordering check.
    async fn predecessor_of(
        &self,
        receipt: &AnchorReceipt,
    ) -> Result<Option<AnchorReceipt>, ArchiveError> {
        let receipts = self.ledger.receipts_of(&receipt.entity_id).await?;
        let position = receipts.iter().rposition(|r| r.tx_ref == receipt.tx_ref);
        Ok(match position {
            Some(i) if i > 0 => Some(receipts[i - 1].clone()),
            _ => None,
        })
    }
}

fn is_transient(error: &ArchiveError) -> bool {
    match error {
        ArchiveError::AnchorPending { .. } => true,
        ArchiveError::Storage(StorageError::Unavailable(_) | StorageError::Timeout(_)) => true,
        _ => false,
    }
}

/// Graph commits flow straight into the archive.
#[async_trait]
impl CommitHook for ArchiveService {
    fn name(&self) -> &str {
        "archive_service"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn timeout_ms(&self) -> u64 {
        60_000
    }

    async fn on_commit(&self, event: &CommitEvent) -> HookResult {
        match self.commit_with_retry(&event.actor, &event.entity).await {
            Ok(_) => HookResult::Continue,
            Err(e) => HookResult::Failed(e.to_string()),
        }
    }
}

/// The graph's dangling-reference check: a content id counts as archived when
/// a successful push recorded it.
#[async_trait]
impl ContentIndex for ArchiveService {
    async fn has_content(&self, content_id: &ContentId) -> bool {
        self.records.read().await.contains_key(content_id)
    }
}
