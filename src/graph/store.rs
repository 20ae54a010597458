//! The family graph store.

use super::traversal::{self, Direction};
use super::{GraphError, LockRegistry, RelationshipKind};
use crate::config::GraphConfig;
use crate::hooks::{CommitEvent, HookRegistry};
use crate::models::{
    ActorId, ArchiveEntity, EntityId, Memory, MemoryId, Person, PersonId, now_millis,
};
use crate::storage::ContentIndex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// In-memory store of persons, memories, and their relationship edges.
///
/// Commands are transactional: either every invariant check passes and the
/// mutation commits atomically together with its mirrored edge updates, or
/// nothing changes and the error names the violated rule. Commands on the
/// same entity serialize through [`LockRegistry`]; unrelated entities
/// proceed in parallel.
///
/// Every successful mutating command emits a [`CommitEvent`] through the
/// hook registry, which is how committed snapshots reach the archive.
#[derive(Debug)]
pub struct FamilyGraph {
    persons: RwLock<HashMap<PersonId, Person>>,
    memories: RwLock<HashMap<MemoryId, Memory>>,
    locks: LockRegistry,
    hooks: HookRegistry,
    content_index: Option<Arc<dyn ContentIndex>>,
    config: GraphConfig,
}

impl FamilyGraph {
    pub fn new(config: GraphConfig) -> Self {
        info!(
            max_traversal_depth = config.max_traversal_depth,
            "🌳 FamilyGraph initialized"
        );
        Self {
            persons: RwLock::new(HashMap::new()),
            memories: RwLock::new(HashMap::new()),
            locks: LockRegistry::new(),
            hooks: HookRegistry::new(),
            content_index: None,
            config,
        }
    }

    /// Attach the archive's content index so media and photo references can
    /// be checked for dangling content ids. Without an index those checks
    /// are skipped (standalone graph usage).
    pub fn with_content_index(mut self, index: Arc<dyn ContentIndex>) -> Self {
        self.content_index = Some(index);
        self
    }

    /// Registry the archive service (and any other consumer) registers with.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    // ---- commands ----------------------------------------------------

    /// Create a person. The person must carry no relationship edges; edges
    /// are registered through [`Self::link_relationship`].
    pub async fn create_person(
        &self,
        actor: &ActorId,
        person: Person,
    ) -> Result<Person, GraphError> {
        self.check_extensions(person.extensions.len())?;
        if person.has_edges() {
            return Err(GraphError::InvariantViolation {
                rule: "edges-via-link",
                detail: "relationship edges must be registered via link_relationship".to_string(),
            });
        }
        self.check_archived(person.photo_content_id.iter(), "dangling-photo")
            .await?;

        let entity_id = EntityId::from(&person.id);
        let _guard = self.locks.acquire(&entity_id).await;
        {
            let mut persons = self.persons.write().await;
            if persons.contains_key(&person.id) {
                return Err(GraphError::AlreadyExists(entity_id));
            }
            persons.insert(person.id.clone(), person.clone());
        }
        debug!(person = %person.id, "person created");
        self.emit(actor, ArchiveEntity::Person(person.clone())).await;
        Ok(person)
    }

    /// Replace a person's scalar fields. Edges and the creation timestamp
    /// are owned by the store and must not differ from the stored record.
    pub async fn update_person(
        &self,
        actor: &ActorId,
        person: Person,
    ) -> Result<Person, GraphError> {
        self.check_extensions(person.extensions.len())?;
        self.check_archived(person.photo_content_id.iter(), "dangling-photo")
            .await?;

        let entity_id = EntityId::from(&person.id);
        let _guard = self.locks.acquire(&entity_id).await;
        let updated = {
            let mut persons = self.persons.write().await;
            let existing = persons
                .get(&person.id)
                .ok_or_else(|| GraphError::PersonNotFound(person.id.clone()))?;
            if existing.tombstoned {
                return Err(GraphError::Tombstoned(entity_id));
            }
            if existing.parent_ids != person.parent_ids
                || existing.children_ids != person.children_ids
                || existing.spouse_ids != person.spouse_ids
            {
                return Err(GraphError::InvariantViolation {
                    rule: "edges-via-link",
                    detail: "relationship edges change via link/unlink_relationship only"
                        .to_string(),
                });
            }
            let mut updated = person;
            updated.created_at = existing.created_at;
            updated.tombstoned = false;
            updated.updated_at = now_millis();
            persons.insert(updated.id.clone(), updated.clone());
            updated
        };
        debug!(person = %updated.id, "person updated");
        self.emit(actor, ArchiveEntity::Person(updated.clone())).await;
        Ok(updated)
    }

    /// Register a relationship edge between two persons, mirroring both
    /// sides atomically.
    pub async fn link_relationship(
        &self,
        actor: &ActorId,
        kind: RelationshipKind,
        a: &PersonId,
        b: &PersonId,
    ) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::InvariantViolation {
                rule: "self-relationship",
                detail: format!("{a} cannot be linked to itself"),
            });
        }

        let (ea, eb) = (EntityId::from(a), EntityId::from(b));
        let _guards = self.locks.acquire_pair(&ea, &eb).await;

        let (snapshot_a, snapshot_b) = {
            let mut persons = self.persons.write().await;
            let person_a = persons
                .get(a)
                .ok_or_else(|| GraphError::PersonNotFound(a.clone()))?;
            let person_b = persons
                .get(b)
                .ok_or_else(|| GraphError::PersonNotFound(b.clone()))?;
            if person_a.tombstoned {
                return Err(GraphError::Tombstoned(ea));
            }
            if person_b.tombstoned {
                return Err(GraphError::Tombstoned(eb));
            }

            let mut person_a = person_a.clone();
            let mut person_b = person_b.clone();
            let now = now_millis();

            match kind {
                RelationshipKind::Parent => {
                    if person_a.children_ids.contains(b) {
                        return Err(GraphError::InvariantViolation {
                            rule: "duplicate-relationship",
                            detail: format!("{a} is already a parent of {b}"),
                        });
                    }
                    // Making `a` a parent of `b` closes a loop exactly when
                    // `b` is already an ancestor of `a`.
                    if traversal::is_ancestor_within(
                        &persons,
                        b,
                        a,
                        self.config.max_traversal_depth,
                    )? {
                        return Err(GraphError::CycleDetected {
                            parent: a.clone(),
                            child: b.clone(),
                        });
                    }
                    insert_sorted(&mut person_a.children_ids, b.clone());
                    insert_sorted(&mut person_b.parent_ids, a.clone());
                }
                RelationshipKind::Spouse => {
                    if person_a.spouse_ids.contains(b) {
                        return Err(GraphError::InvariantViolation {
                            rule: "duplicate-relationship",
                            detail: format!("{a} and {b} are already spouses"),
                        });
                    }
                    insert_sorted(&mut person_a.spouse_ids, b.clone());
                    insert_sorted(&mut person_b.spouse_ids, a.clone());
                }
            }

            person_a.updated_at = now;
            person_b.updated_at = now;
            persons.insert(a.clone(), person_a.clone());
            persons.insert(b.clone(), person_b.clone());
            (person_a, person_b)
        };

        debug!(%kind, from = %a, to = %b, "relationship linked");
        self.emit(actor, ArchiveEntity::Person(snapshot_a)).await;
        self.emit(actor, ArchiveEntity::Person(snapshot_b)).await;
        Ok(())
    }

    /// Remove a relationship edge, unmirroring both sides atomically.
    pub async fn unlink_relationship(
        &self,
        actor: &ActorId,
        kind: RelationshipKind,
        a: &PersonId,
        b: &PersonId,
    ) -> Result<(), GraphError> {
        let (ea, eb) = (EntityId::from(a), EntityId::from(b));
        let _guards = self.locks.acquire_pair(&ea, &eb).await;

        let (snapshot_a, snapshot_b) = {
            let mut persons = self.persons.write().await;
            let person_a = persons
                .get(a)
                .ok_or_else(|| GraphError::PersonNotFound(a.clone()))?;
            let person_b = persons
                .get(b)
                .ok_or_else(|| GraphError::PersonNotFound(b.clone()))?;
            if person_a.tombstoned {
                return Err(GraphError::Tombstoned(ea));
            }
            if person_b.tombstoned {
                return Err(GraphError::Tombstoned(eb));
            }

            let mut person_a = person_a.clone();
            let mut person_b = person_b.clone();

            let removed = match kind {
                RelationshipKind::Parent => {
                    remove_sorted(&mut person_a.children_ids, b)
                        && remove_sorted(&mut person_b.parent_ids, a)
                }
                RelationshipKind::Spouse => {
                    remove_sorted(&mut person_a.spouse_ids, b)
                        && remove_sorted(&mut person_b.spouse_ids, a)
                }
            };
            if !removed {
                return Err(GraphError::InvariantViolation {
                    rule: "not-linked",
                    detail: format!("no {kind} relationship between {a} and {b}"),
                });
            }

            let now = now_millis();
            person_a.updated_at = now;
            person_b.updated_at = now;
            persons.insert(a.clone(), person_a.clone());
            persons.insert(b.clone(), person_b.clone());
            (person_a, person_b)
        };

        debug!(%kind, from = %a, to = %b, "relationship unlinked");
        self.emit(actor, ArchiveEntity::Person(snapshot_a)).await;
        self.emit(actor, ArchiveEntity::Person(snapshot_b)).await;
        Ok(())
    }

    /// Create a memory. Every referenced person must exist and every media
    /// content id must have a successful archive record.
    pub async fn create_memory(
        &self,
        actor: &ActorId,
        memory: Memory,
    ) -> Result<Memory, GraphError> {
        let mut memory = memory;
        normalize_memory(&mut memory);
        self.check_memory(&memory).await?;

        let entity_id = EntityId::from(&memory.id);
        let _guard = self.locks.acquire(&entity_id).await;
        {
            let mut memories = self.memories.write().await;
            if memories.contains_key(&memory.id) {
                return Err(GraphError::AlreadyExists(entity_id));
            }
            memories.insert(memory.id.clone(), memory.clone());
        }
        debug!(memory = %memory.id, "memory created");
        self.emit(actor, ArchiveEntity::Memory(memory.clone())).await;
        Ok(memory)
    }

    /// Replace a memory's fields, under the same checks as creation.
    pub async fn update_memory(
        &self,
        actor: &ActorId,
        memory: Memory,
    ) -> Result<Memory, GraphError> {
        let mut memory = memory;
        normalize_memory(&mut memory);
        self.check_memory(&memory).await?;

        let entity_id = EntityId::from(&memory.id);
        let _guard = self.locks.acquire(&entity_id).await;
        let updated = {
            let mut memories = self.memories.write().await;
            let existing = memories
                .get(&memory.id)
                .ok_or_else(|| GraphError::MemoryNotFound(memory.id.clone()))?;
            if existing.tombstoned {
                return Err(GraphError::Tombstoned(entity_id));
            }
            let mut updated = memory;
            updated.created_at = existing.created_at;
            updated.tombstoned = false;
            memories.insert(updated.id.clone(), updated.clone());
            updated
        };
        debug!(memory = %updated.id, "memory updated");
        self.emit(actor, ArchiveEntity::Memory(updated.clone())).await;
        Ok(updated)
    }

    /// Logically delete an entity. The record stays in place with its
    /// tombstone flag set so historical anchors remain verifiable; the
    /// tombstoned state itself is committed. Idempotent.
    pub async fn tombstone(&self, actor: &ActorId, id: &EntityId) -> Result<(), GraphError> {
        let _guard = self.locks.acquire(id).await;

        let person_id = PersonId::from_string(id.as_str());
        {
            let mut persons = self.persons.write().await;
            if let Some(person) = persons.get_mut(&person_id) {
                if person.tombstoned {
                    return Ok(());
                }
                person.tombstoned = true;
                person.updated_at = now_millis();
                let snapshot = person.clone();
                drop(persons);
                debug!(entity = %id, "person tombstoned");
                self.emit(actor, ArchiveEntity::Person(snapshot)).await;
                return Ok(());
            }
        }

        let memory_id = MemoryId::from_string(id.as_str());
        {
            let mut memories = self.memories.write().await;
            if let Some(memory) = memories.get_mut(&memory_id) {
                if memory.tombstoned {
                    return Ok(());
                }
                memory.tombstoned = true;
                let snapshot = memory.clone();
                drop(memories);
                debug!(entity = %id, "memory tombstoned");
                self.emit(actor, ArchiveEntity::Memory(snapshot)).await;
                return Ok(());
            }
        }

        Err(GraphError::EntityNotFound(id.clone()))
    }

    // ---- queries -----------------------------------------------------

    pub async fn get_person(&self, id: &PersonId) -> Option<Person> {
        self.persons.read().await.get(id).cloned()
    }

    pub async fn get_memory(&self, id: &MemoryId) -> Option<Memory> {
        self.memories.read().await.get(id).cloned()
    }

    /// Ancestors of a person in breadth-first order, up to `max_depth`
    /// generations (capped by the configured traversal depth).
    pub async fn ancestors_of(
        &self,
        id: &PersonId,
        max_depth: usize,
    ) -> Result<Vec<Person>, GraphError> {
        let depth = max_depth.min(self.config.max_traversal_depth);
        let persons = self.persons.read().await;
        traversal::collect_related(&persons, id, Direction::Up, depth)
    }

    /// Descendants of a person in breadth-first order, up to `max_depth`
    /// generations (capped by the configured traversal depth).
    pub async fn descendants_of(
        &self,
        id: &PersonId,
        max_depth: usize,
    ) -> Result<Vec<Person>, GraphError> {
        let depth = max_depth.min(self.config.max_traversal_depth);
        let persons = self.persons.read().await;
        traversal::collect_related(&persons, id, Direction::Down, depth)
    }

    /// Whether `a` is an ancestor of `b`, walking at most the configured
    /// traversal depth.
    pub async fn is_ancestor(&self, a: &PersonId, b: &PersonId) -> Result<bool, GraphError> {
        let persons = self.persons.read().await;
        traversal::is_ancestor_within(&persons, a, b, self.config.max_traversal_depth)
    }

    // ---- internals ---------------------------------------------------

    fn check_extensions(&self, entries: usize) -> Result<(), GraphError> {
        if entries > self.config.max_extension_entries {
            return Err(GraphError::InvariantViolation {
                rule: "extension-cap",
                detail: format!(
                    "extension map has {entries} entries, cap is {}",
                    self.config.max_extension_entries
                ),
            });
        }
        Ok(())
    }

    async fn check_archived<'a>(
        &self,
        content_ids: impl Iterator<Item = &'a crate::addressing::ContentId>,
        rule: &'static str,
    ) -> Result<(), GraphError> {
        let Some(index) = &self.content_index else {
            return Ok(());
        };
        for content_id in content_ids {
            if !index.has_content(content_id).await {
                return Err(GraphError::InvariantViolation {
                    rule,
                    detail: format!("no archive record for content {content_id}"),
                });
            }
        }
        Ok(())
    }

    async fn check_memory(&self, memory: &Memory) -> Result<(), GraphError> {
        self.check_extensions(memory.extensions.len())?;
        if memory.person_ids.is_empty() {
            return Err(GraphError::InvariantViolation {
                rule: "memory-person-required",
                detail: "a memory must reference at least one person".to_string(),
            });
        }
        {
            let persons = self.persons.read().await;
            for person_id in &memory.person_ids {
                let person = persons
                    .get(person_id)
                    .ok_or_else(|| GraphError::PersonNotFound(person_id.clone()))?;
                if person.tombstoned {
                    return Err(GraphError::Tombstoned(EntityId::from(person_id)));
                }
            }
        }
        self.check_archived(memory.media_content_ids.iter(), "dangling-media")
            .await
    }

    async fn emit(&self, actor: &ActorId, entity: ArchiveEntity) {
        let event = CommitEvent {
            entity,
            actor: actor.clone(),
            committed_at: now_millis(),
        };
        self.hooks.dispatch(&event).await;
    }
}

/// Stored memories keep `person_ids` and `tags` in sorted unique form, so
/// the canonical encoding decodes back to exactly the stored record.
fn normalize_memory(memory: &mut Memory) {
    memory.person_ids.sort();
    memory.person_ids.dedup();
    memory.tags.sort();
    memory.tags.dedup();
}

fn insert_sorted(ids: &mut Vec<PersonId>, id: PersonId) {
    if let Err(pos) = ids.binary_search(&id) {
        ids.insert(pos, id);
    }
}

fn remove_sorted(ids: &mut Vec<PersonId>, id: &PersonId) -> bool {
    match ids.binary_search(id) {
        Ok(pos) => {
            ids.remove(pos);
            true
        }
        Err(_) => false,
    }
}
