//! Content addressing for archived snapshots.
//!
//! A [`ContentId`] is the SHA-256 digest of a canonical byte sequence. Identical
//! bytes always produce the identical identifier, which is what makes content
//! pushes idempotent and hash verification on read possible.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of a content identifier in bytes (SHA-256 output).
pub const CONTENT_ID_LEN: usize = 32;

/// Content identifier: the SHA-256 digest of a canonical byte sequence.
///
/// Rendered as lowercase hex in `Display`, `FromStr`, and serde.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId([u8; CONTENT_ID_LEN]);

impl ContentId {
    /// Compute the content identifier for a byte sequence.
    ///
    /// Pure and total: any input, including the empty sequence, yields a
    /// well-defined identifier.
    pub fn identify(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut out = [0u8; CONTENT_ID_LEN];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; CONTENT_ID_LEN] {
        &self.0
    }

    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.to_hex())
    }
}

/// Error parsing a content identifier from its hex rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentIdParseError {
    #[error("content id is not valid hex: {0}")]
    InvalidHex(String),

    #[error("content id must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl FromStr for ContentId {
    type Err = ContentIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded =
            hex::decode(s).map_err(|e| ContentIdParseError::InvalidHex(e.to_string()))?;
        if decoded.len() != CONTENT_ID_LEN {
            return Err(ContentIdParseError::InvalidLength {
                expected: CONTENT_ID_LEN,
                actual: decoded.len(),
            });
        }
        let mut out = [0u8; CONTENT_ID_LEN];
        out.copy_from_slice(&decoded);
        Ok(Self(out))
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_yield_identical_ids() {
        let a = ContentId::identify(b"family history");
        let b = ContentId::identify(b"family history");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_has_a_well_defined_id() {
        let id = ContentId::identify(b"");
        // SHA-256 of the empty string.
        assert_eq!(
            id.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn near_duplicates_diverge() {
        let a = ContentId::identify(b"hanako 1920-03-01");
        let b = ContentId::identify(b"hanako 1920-03-02");
        assert_ne!(a, b);

        // Single-bit difference.
        let base = vec![0u8; 64];
        let mut flipped = base.clone();
        flipped[63] ^= 0x01;
        assert_ne!(ContentId::identify(&base), ContentId::identify(&flipped));
    }

    #[test]
    fn hex_round_trip() {
        let id = ContentId::identify(b"snapshot");
        let parsed: ContentId = id.to_hex().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            "zzzz".parse::<ContentId>(),
            Err(ContentIdParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "abcd".parse::<ContentId>(),
            Err(ContentIdParseError::InvalidLength { .. })
        ));
    }

    #[test]
    fn serde_round_trip() {
        let id = ContentId::identify(b"photo bytes");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
