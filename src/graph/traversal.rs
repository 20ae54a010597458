//! Bounded graph traversals over parent/child edges.
//!
//! Ancestry is computed by walking edges on demand, never by storing a
//! transitive closure. Walks are breadth-first with an explicit depth bound;
//! the acyclicity check fails closed with `DepthExceeded` when the bound is
//! hit.

use super::GraphError;
use crate::models::{Person, PersonId};
use std::collections::{HashMap, HashSet};

/// Direction of a generational walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Follow `parent_ids` (towards ancestors).
    Up,
    /// Follow `children_ids` (towards descendants).
    Down,
}

fn edges<'a>(person: &'a Person, direction: Direction) -> &'a [PersonId] {
    match direction {
        Direction::Up => &person.parent_ids,
        Direction::Down => &person.children_ids,
    }
}

/// Whether `ancestor` is reachable walking upward from `of`.
///
/// Errors with [`GraphError::DepthExceeded`] if the walk would pass
/// `max_depth` generations while unexplored ancestors remain.
pub(crate) fn is_ancestor_within(
    persons: &HashMap<PersonId, Person>,
    ancestor: &PersonId,
    of: &PersonId,
    max_depth: usize,
) -> Result<bool, GraphError> {
    let mut frontier: Vec<PersonId> = match persons.get(of) {
        Some(p) => p.parent_ids.clone(),
        None => return Ok(false),
    };
    let mut seen: HashSet<PersonId> = frontier.iter().cloned().collect();
    let mut depth = 0usize;

    while !frontier.is_empty() {
        depth += 1;
        if depth > max_depth {
            return Err(GraphError::DepthExceeded { max_depth });
        }
        if frontier.iter().any(|id| id == ancestor) {
            return Ok(true);
        }
        let mut next = Vec::new();
        for id in &frontier {
            if let Some(person) = persons.get(id) {
                for parent in &person.parent_ids {
                    if seen.insert(parent.clone()) {
                        next.push(parent.clone());
                    }
                }
            }
        }
        frontier = next;
    }

    Ok(false)
}

/// Collect the persons reachable from `root` in the given direction, in
/// breadth-first order, stopping after `max_depth` generations.
pub(crate) fn collect_related(
    persons: &HashMap<PersonId, Person>,
    root: &PersonId,
    direction: Direction,
    max_depth: usize,
) -> Result<Vec<Person>, GraphError> {
    let start = persons
        .get(root)
        .ok_or_else(|| GraphError::PersonNotFound(root.clone()))?;

    let mut collected = Vec::new();
    let mut seen: HashSet<PersonId> = HashSet::from([root.clone()]);
    let mut frontier: Vec<PersonId> = edges(start, direction).to_vec();
    frontier.retain(|id| seen.insert(id.clone()));

    let mut depth = 0usize;
    while !frontier.is_empty() && depth < max_depth {
        depth += 1;
        let mut next = Vec::new();
        for id in &frontier {
            if let Some(person) = persons.get(id) {
                collected.push(person.clone());
                for linked in edges(person, direction) {
                    if seen.insert(linked.clone()) {
                        next.push(linked.clone());
                    }
                }
            }
        }
        frontier = next;
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Person};

    /// Build a chain root -> child -> grandchild ... of the given length,
    /// returning the map and the ids oldest-first.
    fn chain(len: usize) -> (HashMap<PersonId, Person>, Vec<PersonId>) {
        let mut map: HashMap<PersonId, Person> = HashMap::new();
        let mut ids = Vec::new();
        let mut previous: Option<PersonId> = None;
        for i in 0..len {
            let mut person = Person::new(format!("gen-{i}"), Gender::Other);
            if let Some(parent) = &previous {
                person.parent_ids.push(parent.clone());
                if let Some(p) = map.get_mut(parent) {
                    p.children_ids.push(person.id.clone());
                }
            }
            previous = Some(person.id.clone());
            ids.push(person.id.clone());
            map.insert(person.id.clone(), person);
        }
        (map, ids)
    }

    #[test]
    fn finds_distant_ancestor() {
        let (map, ids) = chain(5);
        assert!(is_ancestor_within(&map, &ids[0], &ids[4], 64).unwrap());
        assert!(!is_ancestor_within(&map, &ids[4], &ids[0], 64).unwrap());
    }

    #[test]
    fn depth_cap_fails_closed() {
        let (map, ids) = chain(6);
        let err = is_ancestor_within(&map, &ids[0], &ids[5], 2).unwrap_err();
        assert!(matches!(err, GraphError::DepthExceeded { max_depth: 2 }));
    }

    #[test]
    fn collect_ancestors_breadth_first() {
        let (map, ids) = chain(4);
        let ancestors = collect_related(&map, &ids[3], Direction::Up, 64).unwrap();
        let names: Vec<_> = ancestors.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["gen-2", "gen-1", "gen-0"]);
    }

    #[test]
    fn collect_descendants_respects_depth() {
        let (map, ids) = chain(4);
        let descendants = collect_related(&map, &ids[0], Direction::Down, 2).unwrap();
        assert_eq!(descendants.len(), 2);
    }
}
