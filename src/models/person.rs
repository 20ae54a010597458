//! Person record and builder.

use super::{PersonId, now_millis};
use crate::addressing::ContentId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gender tag carried on a person record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "female"),
            Self::Male => write!(f, "male"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A person in the family graph.
///
/// Relationship edges (`parent_ids`, `children_ids`, `spouse_ids`) are owned
/// and mirrored by the graph store; they are kept sorted and unique so that
/// structurally equal persons canonicalize to identical bytes. Edit them only
/// through `FamilyGraph::link_relationship` / `unlink_relationship`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub gender: Gender,
    pub biography: Option<String>,
    /// Content identifier of an archived profile photo, if any.
    pub photo_content_id: Option<ContentId>,
    pub parent_ids: Vec<PersonId>,
    pub children_ids: Vec<PersonId>,
    pub spouse_ids: Vec<PersonId>,
    /// Bounded application-specific extras. The entry cap is enforced by the
    /// graph store on every command.
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// Logical deletion flag; tombstoned persons are never physically removed
    /// so historical anchors stay verifiable.
    pub tombstoned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Create a person with a generated id and no edges.
    pub fn new<S: Into<String>>(name: S, gender: Gender) -> Self {
        let now = now_millis();
        Self {
            id: PersonId::generate(),
            name: name.into(),
            birth_date: None,
            death_date: None,
            gender,
            biography: None,
            photo_content_id: None,
            parent_ids: Vec::new(),
            children_ids: Vec::new(),
            spouse_ids: Vec::new(),
            extensions: BTreeMap::new(),
            tombstoned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder for more involved construction.
    pub fn builder<S: Into<String>>(name: S) -> PersonBuilder {
        PersonBuilder::named(name)
    }

    /// Whether this person has any relationship edges.
    pub fn has_edges(&self) -> bool {
        !self.parent_ids.is_empty()
            || !self.children_ids.is_empty()
            || !self.spouse_ids.is_empty()
    }
}

/// Builder for [`Person`] records.
pub struct PersonBuilder {
    person: Person,
}

impl PersonBuilder {
    /// Start building a person with the given name.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            person: Person::new(name, Gender::Other),
        }
    }

    /// Use a caller-chosen identifier instead of a generated one.
    pub fn id(mut self, id: PersonId) -> Self {
        self.person.id = id;
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.person.gender = gender;
        self
    }

    pub fn birth_date(mut self, date: NaiveDate) -> Self {
        self.person.birth_date = Some(date);
        self
    }

    pub fn death_date(mut self, date: NaiveDate) -> Self {
        self.person.death_date = Some(date);
        self
    }

    pub fn biography<S: Into<String>>(mut self, text: S) -> Self {
        self.person.biography = Some(text.into());
        self
    }

    pub fn photo(mut self, content_id: ContentId) -> Self {
        self.person.photo_content_id = Some(content_id);
        self
    }

    /// Attach a single extension entry.
    pub fn extension<S: Into<String>>(mut self, key: S, value: serde_json::Value) -> Self {
        self.person.extensions.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Person {
        self.person
    }
}
