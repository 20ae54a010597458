//! Error types for the external storage collaborators.

use crate::addressing::ContentId;

/// Error type for content-store and ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the request; transient,
    /// safe to retry.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The backend's identifier scheme disagrees with local content
    /// addressing; equality checks against it cannot be trusted.
    #[error("backend returned identifier {returned}, local hashing produced {computed}")]
    IdentifierMismatch {
        returned: ContentId,
        computed: ContentId,
    },

    /// Backend-specific failure that is not known to be transient.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
