//! Integrity verification of anchored snapshots.
//!
//! Verification is a pure hash comparison: recompute the content id of the
//! fetched bytes and require exact equality with the receipt. There is no
//! partial credit and no fuzzy match. A receipt timestamp that runs backwards
//! relative to its predecessor is flagged as suspicious ordering; that flag is
//! advisory and never blocks a read whose hash matches.

use crate::addressing::ContentId;
use crate::archive::records::AnchorReceipt;
use tracing::warn;

/// Outcome of verifying fetched bytes against a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Recomputed content id equals the anchored one.
    Verified,
    /// The bytes do not hash to the anchored content id. The snapshot must
    /// not be decoded or returned to the caller.
    Mismatch {
        anchored: ContentId,
        computed: ContentId,
    },
}

/// Result of a verification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub outcome: VerificationOutcome,
    /// The receipt's timestamp precedes its predecessor's for the same
    /// entity. Advisory; logged, surfaced, non-fatal.
    pub suspicious_ordering: bool,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self.outcome, VerificationOutcome::Verified)
    }
}

/// Stateless verifier for anchored content.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    /// Verify bytes against a receipt.
    pub fn verify(receipt: &AnchorReceipt, bytes: &[u8]) -> Verification {
        Self::verify_with_predecessor(receipt, None, bytes)
    }

    /// Verify bytes against a receipt, also checking that the receipt's
    /// timestamp does not precede its predecessor's.
    pub fn verify_with_predecessor(
        receipt: &AnchorReceipt,
        predecessor: Option<&AnchorReceipt>,
        bytes: &[u8],
    ) -> Verification {
        let computed = ContentId::identify(bytes);
        let outcome = if computed == receipt.content_id {
            VerificationOutcome::Verified
        } else {
            warn!(
                entity = %receipt.entity_id,
                anchored = %receipt.content_id,
                computed = %computed,
                "content hash mismatch against anchor receipt"
            );
            VerificationOutcome::Mismatch {
                anchored: receipt.content_id,
                computed,
            }
        };

        let suspicious_ordering = match predecessor {
            Some(prev) => {
                let backwards = receipt.anchored_at < prev.anchored_at;
                if backwards {
                    warn!(
                        entity = %receipt.entity_id,
                        receipt_at = %receipt.anchored_at,
                        predecessor_at = %prev.anchored_at,
                        "anchor receipt timestamp precedes its predecessor"
                    );
                }
                backwards
            }
            None => false,
        };

        Verification {
            outcome,
            suspicious_ordering,
        }
    }
}
