//! Memory record and builder.

use super::{ActorId, MemoryId, PersonId, now_millis};
use crate::addressing::ContentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recorded memory: a story, event, or piece of family lore tied to one or
/// more persons, with optional archived media attachments.
///
/// `person_ids` and `tags` are sorted and unique; `media_content_ids` keeps
/// the caller's attachment order. Every media content id must have a
/// successful archive record before the graph store accepts the memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    /// Persons this memory is about. Never empty.
    pub person_ids: Vec<PersonId>,
    pub title: String,
    pub body: String,
    /// When the remembered event took place.
    pub occurred_at: DateTime<Utc>,
    /// Archived media attachments, in attachment order.
    pub media_content_ids: Vec<ContentId>,
    pub tags: Vec<String>,
    pub created_by: ActorId,
    /// Bounded application-specific extras, capped by the graph store.
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// Logical deletion flag; see [`super::Person::tombstoned`].
    pub tombstoned: bool,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// Builder for constructing a memory about one person.
    pub fn builder<S: Into<String>>(person_id: PersonId, title: S) -> MemoryBuilder {
        MemoryBuilder::about(person_id, title)
    }
}

/// Builder for [`Memory`] records.
pub struct MemoryBuilder {
    memory: Memory,
}

impl MemoryBuilder {
    /// Start building a memory about the given person.
    pub fn about<S: Into<String>>(person_id: PersonId, title: S) -> Self {
        let now = now_millis();
        Self {
            memory: Memory {
                id: MemoryId::generate(),
                person_ids: vec![person_id],
                title: title.into(),
                body: String::new(),
                occurred_at: now,
                media_content_ids: Vec::new(),
                tags: Vec::new(),
                created_by: ActorId::system(),
                extensions: BTreeMap::new(),
                tombstoned: false,
                created_at: now,
            },
        }
    }

    /// Use a caller-chosen identifier instead of a generated one.
    pub fn id(mut self, id: MemoryId) -> Self {
        self.memory.id = id;
        self
    }

    /// Associate another person with this memory.
    pub fn also_about(mut self, person_id: PersonId) -> Self {
        self.memory.person_ids.push(person_id);
        self
    }

    pub fn body<S: Into<String>>(mut self, body: S) -> Self {
        self.memory.body = body.into();
        self
    }

    /// Set when the remembered event took place. Truncated to millisecond
    /// precision to match the canonical encoding.
    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.memory.occurred_at = DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at);
        self
    }

    /// Attach an archived media blob by content id.
    pub fn media(mut self, content_id: ContentId) -> Self {
        self.memory.media_content_ids.push(content_id);
        self
    }

    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.memory.tags.push(tag.into());
        self
    }

    pub fn created_by(mut self, actor: ActorId) -> Self {
        self.memory.created_by = actor;
        self
    }

    pub fn extension<S: Into<String>>(mut self, key: S, value: serde_json::Value) -> Self {
        self.memory.extensions.insert(key.into(), value);
        self
    }

    /// Finish the memory. Person ids and tags are normalized to sorted unique
    /// form so equal memories canonicalize identically.
    pub fn build(self) -> Memory {
        let mut memory = self.memory;
        memory.person_ids.sort();
        memory.person_ids.dedup();
        memory.tags.sort();
        memory.tags.dedup();
        memory
    }
}
