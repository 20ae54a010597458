//! Immutable bookkeeping records for archived content and ledger anchors.

use crate::addressing::ContentId;
use crate::models::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad media classification for archived blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// A canonical entity snapshot produced by the codec.
    Snapshot,
    Image,
    Video,
    Audio,
    Document,
    Other(String),
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot => write!(f, "snapshot"),
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Document => write!(f, "document"),
            Self::Other(s) => write!(f, "other:{s}"),
        }
    }
}

/// Local record of content successfully pushed to the content store.
///
/// Immutable once written: identical bytes always produce the identical
/// content id, so a record either exists for a given id or it does not, and a
/// repeated push is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub content_id: ContentId,
    /// Size of the stored bytes.
    pub size: u64,
    pub media_type: MediaType,
    /// Backend-issued location token for the blob.
    pub storage_token: String,
    pub stored_at: DateTime<Utc>,
}

/// Receipt returned by the ledger after anchoring `(entity_id, content_id)`.
///
/// Receipts accumulate per entity id on the ledger and are never mutated;
/// the latest receipt for an entity is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub entity_id: EntityId,
    pub content_id: ContentId,
    pub anchored_at: DateTime<Utc>,
    /// Anchoring transaction reference on the ledger.
    pub tx_ref: String,
}
