//! Canonical snapshot encoding.
//!
//! [`canonicalize`] renders an entity into a deterministic byte form suitable
//! for hashing and content-addressed storage: a fixed schema-version envelope
//! followed by canonical JSON of dedicated wire structs. Field order is the
//! struct declaration order, set-valued id lists are sorted, maps are
//! `BTreeMap`-ordered, timestamps are i64 unix milliseconds, and dates are
//! `YYYY-MM-DD` strings. Nothing non-deterministic (wall clock, random ids)
//! is ever generated during encoding.
//!
//! [`parse`] is the exact inverse: `parse(canonicalize(e)) == e` for every
//! valid entity.

use crate::addressing::ContentId;
use crate::models::{
    ActorId, ArchiveEntity, Gender, Memory, MemoryId, Person, PersonId,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Envelope tag prefixed to every canonical snapshot. Bump the version when
/// the wire schema changes shape.
pub const SCHEMA_TAG: &[u8] = b"kizuna.v1\n";

/// Error type for snapshot encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The byte stream does not match the expected schema version tag or does
    /// not decode as a valid snapshot.
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("snapshot serialization failed: {0}")]
    Serialize(String),
}

/// Render an entity into its canonical byte form.
pub fn canonicalize(entity: &ArchiveEntity) -> Result<Vec<u8>, CodecError> {
    let wire = WireEntity::from(entity);
    let body = serde_json::to_vec(&wire).map_err(|e| CodecError::Serialize(e.to_string()))?;
    let mut out = Vec::with_capacity(SCHEMA_TAG.len() + body.len());
    out.extend_from_slice(SCHEMA_TAG);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a canonical byte form back into the entity it was rendered from.
pub fn parse(bytes: &[u8]) -> Result<ArchiveEntity, CodecError> {
    let body = bytes.strip_prefix(SCHEMA_TAG).ok_or_else(|| {
        CodecError::Malformed("missing or unsupported snapshot envelope tag".to_string())
    })?;
    let wire: WireEntity =
        serde_json::from_slice(body).map_err(|e| CodecError::Malformed(e.to_string()))?;
    ArchiveEntity::try_from(wire)
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireEntity {
    Person(WirePerson),
    Memory(WireMemory),
}

#[derive(Serialize, Deserialize)]
struct WirePerson {
    id: String,
    name: String,
    birth_date: Option<String>,
    death_date: Option<String>,
    gender: Gender,
    biography: Option<String>,
    photo: Option<String>,
    parents: Vec<String>,
    children: Vec<String>,
    spouses: Vec<String>,
    extensions: BTreeMap<String, serde_json::Value>,
    tombstoned: bool,
    created_at_ms: i64,
    updated_at_ms: i64,
}

#[derive(Serialize, Deserialize)]
struct WireMemory {
    id: String,
    persons: Vec<String>,
    title: String,
    body: String,
    occurred_at_ms: i64,
    media: Vec<String>,
    tags: Vec<String>,
    created_by: String,
    extensions: BTreeMap<String, serde_json::Value>,
    tombstoned: bool,
    created_at_ms: i64,
}

fn sorted_ids(ids: &[PersonId]) -> Vec<String> {
    let mut out: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
    out.sort();
    out.dedup();
    out
}

impl From<&ArchiveEntity> for WireEntity {
    fn from(entity: &ArchiveEntity) -> Self {
        match entity {
            ArchiveEntity::Person(p) => WireEntity::Person(WirePerson {
                id: p.id.as_str().to_string(),
                name: p.name.clone(),
                birth_date: p.birth_date.map(|d| d.to_string()),
                death_date: p.death_date.map(|d| d.to_string()),
                gender: p.gender,
                biography: p.biography.clone(),
                photo: p.photo_content_id.map(|c| c.to_hex()),
                parents: sorted_ids(&p.parent_ids),
                children: sorted_ids(&p.children_ids),
                spouses: sorted_ids(&p.spouse_ids),
                extensions: p.extensions.clone(),
                tombstoned: p.tombstoned,
                created_at_ms: p.created_at.timestamp_millis(),
                updated_at_ms: p.updated_at.timestamp_millis(),
            }),
            ArchiveEntity::Memory(m) => {
                let mut tags = m.tags.clone();
                tags.sort();
                tags.dedup();
                WireEntity::Memory(WireMemory {
                    id: m.id.as_str().to_string(),
                    persons: sorted_ids(&m.person_ids),
                    title: m.title.clone(),
                    body: m.body.clone(),
                    occurred_at_ms: m.occurred_at.timestamp_millis(),
                    media: m.media_content_ids.iter().map(|c| c.to_hex()).collect(),
                    tags,
                    created_by: m.created_by.as_str().to_string(),
                    extensions: m.extensions.clone(),
                    tombstoned: m.tombstoned,
                    created_at_ms: m.created_at.timestamp_millis(),
                })
            }
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, CodecError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| CodecError::Malformed(format!("invalid date '{raw}': {e}")))
}

fn parse_timestamp(ms: i64) -> Result<DateTime<Utc>, CodecError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| CodecError::Malformed(format!("timestamp out of range: {ms}")))
}

fn parse_content_id(raw: &str) -> Result<ContentId, CodecError> {
    raw.parse()
        .map_err(|e| CodecError::Malformed(format!("invalid content id '{raw}': {e}")))
}

impl TryFrom<WireEntity> for ArchiveEntity {
    type Error = CodecError;

    fn try_from(wire: WireEntity) -> Result<Self, Self::Error> {
        match wire {
            WireEntity::Person(w) => {
                let photo = w.photo.as_deref().map(parse_content_id).transpose()?;
                let birth_date = w.birth_date.as_deref().map(parse_date).transpose()?;
                let death_date = w.death_date.as_deref().map(parse_date).transpose()?;
                Ok(ArchiveEntity::Person(Person {
                    id: PersonId::from_string(w.id),
                    name: w.name,
                    birth_date,
                    death_date,
                    gender: w.gender,
                    biography: w.biography,
                    photo_content_id: photo,
                    parent_ids: w.parents.into_iter().map(PersonId::from_string).collect(),
                    children_ids: w.children.into_iter().map(PersonId::from_string).collect(),
                    spouse_ids: w.spouses.into_iter().map(PersonId::from_string).collect(),
                    extensions: w.extensions,
                    tombstoned: w.tombstoned,
                    created_at: parse_timestamp(w.created_at_ms)?,
                    updated_at: parse_timestamp(w.updated_at_ms)?,
                }))
            }
            WireEntity::Memory(w) => {
                let media = w
                    .media
                    .iter()
                    .map(|raw| parse_content_id(raw))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ArchiveEntity::Memory(Memory {
                    id: MemoryId::from_string(w.id),
                    person_ids: w.persons.into_iter().map(PersonId::from_string).collect(),
                    title: w.title,
                    body: w.body,
                    occurred_at: parse_timestamp(w.occurred_at_ms)?,
                    media_content_ids: media,
                    tags: w.tags,
                    created_by: ActorId::from_string(w.created_by),
                    extensions: w.extensions,
                    tombstoned: w.tombstoned,
                    created_at: parse_timestamp(w.created_at_ms)?,
                }))
            }
        }
    }
}
