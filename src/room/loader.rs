use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{ParadoxError, Result};

use super::types::{Catalog, Room, RoomId};

/// The catalog shipped with the game.
pub const BUILTIN_CATALOG: &str = include_str!("../../data/rooms.toml");

pub fn load_catalog(content: &str) -> Result<Catalog> {
    let catalog: Catalog = toml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Check closure (every exit names a defined room) and that a breadth-first
/// walk from the start room reaches every room.
pub fn validate_catalog(catalog: &Catalog) -> Result<()> {
    let mut by_id: HashMap<RoomId, &Room> = HashMap::new();
    for room in &catalog.rooms {
        if by_id.insert(room.id, room).is_some() {
            return Err(ParadoxError::InvalidCatalog(format!("room {} defined twice", room.id)));
        }
    }

    for room in &catalog.rooms {
        for (direction, dest) in &room.exits {
            if !by_id.contains_key(dest) {
                return Err(ParadoxError::InvalidCatalog(format!(
                    "exit {} of {} leads to undefined room {}",
                    direction, room.id, dest
                )));
            }
        }
    }

    if !by_id.contains_key(&catalog.meta.start) {
        return Err(ParadoxError::RoomNotFound(catalog.meta.start.to_string()));
    }

    let visited = reachable_from(catalog.meta.start, &by_id);
    if visited.len() != by_id.len() {
        let mut missing: Vec<_> = by_id
            .keys()
            .filter(|id| !visited.contains(id))
            .map(|id| id.as_str())
            .collect();
        missing.sort_unstable();
        return Err(ParadoxError::InvalidCatalog(format!(
            "unreachable from {}: {}",
            catalog.meta.start, missing.join(", ")
        )));
    }

    Ok(())
}

fn reachable_from(start: RoomId, rooms: &HashMap<RoomId, &Room>) -> HashSet<RoomId> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(room) = rooms.get(&current) {
            queue.extend(room.exits.values().filter(|id| !visited.contains(id)));
        }
    }

    visited
}
