use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ParadoxError, Result};

use super::loader::{load_catalog, BUILTIN_CATALOG};
use super::types::{Direction, Room, RoomId};

/// Read-only room catalog with navigation queries.
///
/// Every accessor hands out an owned copy so callers can mutate the item list
/// of "their" room without touching the catalog.
#[derive(Debug, Clone)]
pub struct RoomGraph {
    rooms: BTreeMap<RoomId, Room>,
    start: RoomId,
}

impl RoomGraph {
    /// Build the graph from the catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog = load_catalog(content)?;
        let rooms = catalog.rooms.into_iter().map(|r| (r.id, r)).collect();
        Ok(RoomGraph {
            rooms,
            start: catalog.meta.start,
        })
    }

    pub fn start(&self) -> RoomId {
        self.start
    }

    pub fn get(&self, id: RoomId) -> Result<Room> {
        self.rooms
            .get(&id)
            .cloned()
            .ok_or_else(|| ParadoxError::RoomNotFound(id.to_string()))
    }

    pub fn can_move(&self, room: &Room, direction: Direction) -> bool {
        room.exits.contains_key(&direction)
    }

    pub fn destination(&self, room: &Room, direction: Direction) -> Option<RoomId> {
        room.exits.get(&direction).copied()
    }

    pub fn all_rooms(&self) -> Vec<Room> {
        self.rooms.values().cloned().collect()
    }

    /// Rooms directly reachable from each room.
    pub fn connections(&self) -> BTreeMap<RoomId, BTreeSet<RoomId>> {
        self.rooms
            .iter()
            .map(|(id, room)| (*id, room.exits.values().copied().collect()))
            .collect()
    }
}
