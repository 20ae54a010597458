//! Blockchain-anchored archival of family history entities.
//!
//! The archive turns committed graph entities into canonical content-addressed
//! snapshots, anchors their identifiers on an append-only ledger, and refuses
//! to serve any snapshot whose bytes no longer hash to the anchored id.

pub mod changelog;
pub mod records;
pub mod service;
pub mod verifier;

pub use changelog::{ChangeHistory, ChangeLog, ChangeLogEntry};
pub use records::{AnchorReceipt, ContentRecord, MediaType};
pub use service::{ArchiveError, ArchiveService};
pub use verifier::{IntegrityVerifier, Verification, VerificationOutcome};
