//! Domain records for the family archive: persons, memories, and the
//! identifiers that name them.

mod memory;
mod person;

pub use memory::{Memory, MemoryBuilder};
pub use person::{Gender, Person, PersonBuilder};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for a person record (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

/// Identifier for a memory record (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(String);

/// Opaque identifier naming any archivable entity.
///
/// Receipts, changelog entries, and the per-entity lock discipline all key on
/// this type rather than on the concrete person/memory id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

/// Identifier for the actor attributed with a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing identifier string.
            pub fn from_string<S: Into<String>>(raw: S) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(PersonId);
string_id!(MemoryId);
string_id!(EntityId);
string_id!(ActorId);

impl ActorId {
    /// Actor used when no caller identity is available.
    pub fn system() -> Self {
        Self("system".to_string())
    }
}

impl From<&PersonId> for EntityId {
    fn from(id: &PersonId) -> Self {
        Self(id.0.clone())
    }
}

impl From<&MemoryId> for EntityId {
    fn from(id: &MemoryId) -> Self {
        Self(id.0.clone())
    }
}

/// Any entity the archive can snapshot and anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArchiveEntity {
    Person(Person),
    Memory(Memory),
}

impl ArchiveEntity {
    /// The logical identity the entity is anchored under.
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::Person(p) => EntityId::from(&p.id),
            Self::Memory(m) => EntityId::from(&m.id),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Person(_) => "person",
            Self::Memory(_) => "memory",
        }
    }
}

/// Current time truncated to millisecond precision.
///
/// All record timestamps carry at most millisecond precision so that the
/// canonical snapshot encoding (i64 unix milliseconds) round-trips exactly.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_matches_inner_id() {
        let pid = PersonId::generate();
        let eid = EntityId::from(&pid);
        assert_eq!(eid.as_str(), pid.as_str());
    }

    #[test]
    fn now_millis_has_no_submillisecond_state() {
        let t = now_millis();
        let back = DateTime::from_timestamp_millis(t.timestamp_millis()).unwrap();
        assert_eq!(t, back);
    }
}
