use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::room::{Item, RoomId};

pub const DEFAULT_MAX_INVENTORY: usize = 5;
pub const HISTORY_CAPACITY: usize = 100;
pub const MAX_CORRUPTION: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_room: RoomId,
    pub inventory: Vec<Item>,
    pub max_inventory: usize,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    pub corruption: u8,
    pub moves: u32,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub history: VecDeque<String>,
    /// Item lists of the rooms the player has taken from or dropped into.
    /// Rooms missing here still hold their catalog items.
    #[serde(default)]
    pub floors: BTreeMap<RoomId, Vec<Item>>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INVENTORY)
    }
}

impl GameState {
    pub fn new(max_inventory: usize) -> Self {
        GameState {
            current_room: RoomId::BootSequence,
            inventory: Vec::new(),
            max_inventory,
            flags: BTreeMap::new(),
            corruption: 0,
            moves: 0,
            start_time: Utc::now(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            floors: BTreeMap::new(),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn inventory_full(&self) -> bool {
        self.inventory.len() >= self.max_inventory
    }

    /// Append `[HH:MM:SS] entry`, dropping the oldest line past capacity.
    pub(crate) fn push_history(&mut self, entry: &str) {
        let stamp = Utc::now().format("%H:%M:%S");
        self.history.push_back(format!("[{}] {}", stamp, entry));
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }
}

/// `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state() {
        let state = GameState::default();
        assert_eq!(state.current_room, RoomId::BootSequence);
        assert!(state.inventory.is_empty());
        assert_eq!(state.max_inventory, 5);
        assert_eq!(state.corruption, 0);
        assert_eq!(state.moves, 0);
        assert!(!state.flag("anything"));
    }

    #[test]
    fn history_is_bounded() {
        let mut state = GameState::default();
        for i in 0..150 {
            state.push_history(&format!("entry {i}"));
        }
        assert_eq!(state.history.len(), HISTORY_CAPACITY);
        assert!(state.history.front().unwrap().ends_with("entry 50"));
        assert!(state.history.back().unwrap().ends_with("entry 149"));
    }

    #[test]
    fn history_stamp_shape() {
        let mut state = GameState::default();
        state.push_history("hello");
        let line = state.history.back().unwrap();
        assert_eq!(line.len(), "[00:00:00] hello".len());
        assert!(line.starts_with('['));
        assert_eq!(&line[9..], "] hello");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::seconds(0)), "00:00:00");
        assert_eq!(format_duration(Duration::seconds(61)), "00:01:01");
        let long = Duration::seconds(3600 * 26 + 5);
        assert_eq!(format_duration(long), "26:00:05");
        assert_eq!(format_duration(Duration::milliseconds(1999)), "00:00:01");
    }
}
