use chrono::{Duration, Utc};
use std::fmt;

use crate::error::Result;
use crate::room::{Item, RoomId};

use super::snapshot::{decode, encode, NoSnapshot, SnapshotStore};
use super::types::{format_duration, GameState, DEFAULT_MAX_INVENTORY, MAX_CORRUPTION};

pub const CORRUPTION_WARNING: &str = "WARNING: System corruption detected";
const WARNING_LEVEL: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameState)>;

/// Sole owner of [`GameState`].
///
/// Every mutation writes a snapshot (failures are logged and dropped) and
/// then calls each listener in the order it subscribed.
pub struct GameStateStore {
    state: GameState,
    max_inventory: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    snapshots: Box<dyn SnapshotStore>,
}

impl fmt::Debug for GameStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStateStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for GameStateStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl GameStateStore {
    /// Start fresh, or from the stored snapshot when `autoload` is set and
    /// one decodes cleanly.
    pub fn new(snapshots: Box<dyn SnapshotStore>, max_inventory: usize, autoload: bool) -> Self {
        let mut store = GameStateStore {
            state: GameState::new(max_inventory),
            max_inventory,
            listeners: Vec::new(),
            next_subscription: 0,
            snapshots,
        };
        if autoload {
            if let Some(state) = store.load_snapshot() {
                store.state = state;
            }
        }
        store
    }

    /// No persistence, default capacity.
    pub fn in_memory() -> Self {
        Self::new(Box::new(NoSnapshot), DEFAULT_MAX_INVENTORY, false)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn move_to_room(&mut self, room: RoomId) {
        self.state.current_room = room;
        self.state.moves += 1;
        self.state.push_history(&format!("Entered {}", room));
        log::info!("entered {} (move {})", room, self.state.moves);
        self.commit();
    }

    pub fn add_item(&mut self, item: Item) -> bool {
        if self.state.inventory_full() {
            return false;
        }
        self.state.inventory.push(item);
        let entry = format!("Acquired command: {}", item);
        self.state.push_history(&entry);
        self.commit();
        true
    }

    pub fn remove_item(&mut self, item: Item) -> bool {
        let Some(index) = self.state.inventory.iter().position(|i| *i == item) else {
            return false;
        };
        self.state.inventory.remove(index);
        self.state.push_history(&format!("Used command: {}", item));
        self.commit();
        true
    }

    pub fn has_item(&self, item: Item) -> bool {
        self.state.inventory.contains(&item)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.state.flags.insert(key.to_string(), value);
        self.commit();
    }

    pub fn get_flag(&self, key: &str) -> bool {
        self.state.flag(key)
    }

    /// Clamped at 100. Any increase that leaves the level above 50 logs the
    /// warning line, whether or not this call was the one that crossed.
    pub fn increase_corruption(&mut self, amount: u32) {
        let current = u32::from(self.state.corruption);
        let raised = current.saturating_add(amount).min(MAX_CORRUPTION.into());
        self.state.corruption = raised as u8;
        if self.state.corruption > WARNING_LEVEL {
            self.state.push_history(CORRUPTION_WARNING);
        }
        self.commit();
    }

    pub fn decrease_corruption(&mut self, amount: u32) {
        let lowered = u32::from(self.state.corruption).saturating_sub(amount);
        self.state.corruption = lowered as u8;
        self.commit();
    }

    /// Record the current item list of a room the player changed.
    pub fn set_room_items(&mut self, room: RoomId, items: Vec<Item>) {
        self.state.floors.insert(room, items);
        self.commit();
    }

    pub fn expand_inventory(&mut self, extra: usize) {
        self.state.max_inventory += extra;
        self.commit();
    }

    /// Replace the whole state with a fresh one.
    pub fn reset(&mut self) {
        self.state = GameState::new(self.max_inventory);
        log::info!("game state reset");
        self.commit();
    }

    pub fn elapsed(&self) -> Duration {
        Utc::now() - self.state.start_time
    }

    pub fn format_elapsed(&self) -> String {
        format_duration(self.elapsed())
    }

    /// Write a snapshot now and report the outcome, unlike the silent
    /// per-mutation write.
    pub fn save(&mut self) -> Result<()> {
        let data = encode(&self.state)?;
        self.snapshots.write(&data)
    }

    /// Swap in the stored snapshot. `false` leaves the state untouched.
    pub fn reload(&mut self) -> bool {
        match self.load_snapshot() {
            Some(state) => {
                self.state = state;
                self.notify();
                true
            }
            None => false,
        }
    }

    fn load_snapshot(&self) -> Option<GameState> {
        let data = match self.snapshots.read() {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("failed to read snapshot: {}", err);
                return None;
            }
        };
        match decode(&data) {
            Ok(state) => Some(state),
            Err(err) => {
                log::warn!("ignoring snapshot: {}", err);
                None
            }
        }
    }

    fn commit(&mut self) {
        if let Err(err) = self.save() {
            log::warn!("failed to save game: {}", err);
        }
        self.notify();
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::snapshot::{FileSnapshot, MemorySnapshot};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn warnings(store: &GameStateStore) -> usize {
        store
            .state()
            .history
            .iter()
            .filter(|l| l.ends_with(CORRUPTION_WARNING))
            .count()
    }

    #[test]
    fn move_counts_and_logs() {
        let mut store = GameStateStore::in_memory();
        store.move_to_room(RoomId::FileMaze);
        let state = store.state();
        assert_eq!(state.current_room, RoomId::FileMaze);
        assert_eq!(state.moves, 1);
        assert!(state.history.back().unwrap().contains("Entered file-maze"));
    }

    #[test]
    fn inventory_capacity() {
        let mut store = GameStateStore::in_memory();
        for item in [Item::Ls, Item::Grep, Item::Cat, Item::Echo, Item::Ls] {
            assert!(store.add_item(item));
        }
        assert!(!store.add_item(Item::Kill));
        assert_eq!(store.state().inventory.len(), 5);
        assert!(!store.has_item(Item::Kill));

        store.expand_inventory(3);
        assert!(store.add_item(Item::Kill));
        assert_eq!(store.state().inventory.len(), 6);
    }

    #[test]
    fn remove_takes_first_occurrence() {
        let mut store = GameStateStore::in_memory();
        store.add_item(Item::Ls);
        store.add_item(Item::Grep);
        store.add_item(Item::Ls);
        assert!(store.remove_item(Item::Ls));
        assert_eq!(store.state().inventory, vec![Item::Grep, Item::Ls]);
        assert!(!store.remove_item(Item::Sudo));
        assert!(store.state().history.back().unwrap().ends_with("Used command: ls"));
    }

    #[test]
    fn flags_default_false() {
        let mut store = GameStateStore::in_memory();
        assert!(!store.get_flag("has_root"));
        store.set_flag("has_root", true);
        assert!(store.get_flag("has_root"));
        store.set_flag("has_root", false);
        assert!(!store.get_flag("has_root"));
    }

    #[test]
    fn corruption_clamps() {
        let mut store = GameStateStore::in_memory();
        store.increase_corruption(250);
        assert_eq!(store.state().corruption, 100);
        store.decrease_corruption(300);
        assert_eq!(store.state().corruption, 0);
    }

    #[test]
    fn warning_on_crossing() {
        let mut store = GameStateStore::in_memory();
        store.increase_corruption(45);
        assert_eq!(warnings(&store), 0);
        store.increase_corruption(10);
        assert_eq!(warnings(&store), 1);
        store.decrease_corruption(30);
        assert_eq!(warnings(&store), 1);
        store.increase_corruption(5);
        assert_eq!(warnings(&store), 1);
    }

    #[test]
    fn reset_restores_start_state() {
        let mut store = GameStateStore::in_memory();
        store.move_to_room(RoomId::FileMaze);
        store.add_item(Item::Grep);
        store.increase_corruption(70);
        store.set_flag("found_escape", true);
        store.expand_inventory(3);
        store.reset();

        let state = store.state();
        assert_eq!(state.current_room, RoomId::BootSequence);
        assert!(state.inventory.is_empty());
        assert_eq!(state.corruption, 0);
        assert_eq!(state.moves, 0);
        assert_eq!(state.max_inventory, 5);
        assert!(state.flags.is_empty());
        assert!(state.history.is_empty());
    }

    #[test]
    fn listeners_run_in_order_until_unsubscribed() {
        let mut store = GameStateStore::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        let first = store.subscribe(move |s| log.borrow_mut().push(("first", s.moves)));
        let log = Rc::clone(&seen);
        store.subscribe(move |s| log.borrow_mut().push(("second", s.moves)));

        store.move_to_room(RoomId::FileMaze);
        assert_eq!(*seen.borrow(), vec![("first", 1), ("second", 1)]);

        assert!(store.unsubscribe(first));
        assert!(!store.unsubscribe(first));
        store.move_to_room(RoomId::BootSequence);
        assert_eq!(seen.borrow().last(), Some(&("second", 2)));
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn every_mutation_persists() {
        let slot = MemorySnapshot::new();
        let mut store = GameStateStore::new(Box::new(slot.clone()), 5, false);
        assert!(slot.contents().is_none());

        store.add_item(Item::Ls);
        let saved = decode(&slot.contents().unwrap()).unwrap();
        assert_eq!(saved.inventory, vec![Item::Ls]);

        store.set_flag("found_hidden", true);
        let saved = decode(&slot.contents().unwrap()).unwrap();
        assert!(saved.flag("found_hidden"));
    }

    #[test]
    fn autoload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = GameStateStore::new(Box::new(FileSnapshot::new(&path)), 5, true);
        store.move_to_room(RoomId::FileMaze);
        store.add_item(Item::Grep);

        let loaded = GameStateStore::new(Box::new(FileSnapshot::new(&path)), 5, true);
        assert_eq!(loaded.state().current_room, RoomId::FileMaze);
        assert_eq!(loaded.state().inventory, vec![Item::Grep]);

        let fresh = GameStateStore::new(Box::new(FileSnapshot::new(&path)), 5, false);
        assert_eq!(fresh.state().moves, 0);
    }

    #[test]
    fn bad_snapshots_fall_back_to_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        std::fs::write(&path, "{ not json").unwrap();
        let store = GameStateStore::new(Box::new(FileSnapshot::new(&path)), 5, true);
        assert_eq!(store.state().current_room, RoomId::BootSequence);

        let mut old = GameState::default();
        old.current_room = RoomId::RootVault;
        let data = encode(&old).unwrap().replace("1.0.0", "2.0.0");
        std::fs::write(&path, data).unwrap();
        let store = GameStateStore::new(Box::new(FileSnapshot::new(&path)), 5, true);
        assert_eq!(store.state().current_room, RoomId::BootSequence);
    }

    #[test]
    fn reload_swaps_in_saved_state() {
        let slot = MemorySnapshot::new();
        let mut store = GameStateStore::new(Box::new(slot.clone()), 5, false);
        store.move_to_room(RoomId::ProcessPrison);
        store.save().unwrap();

        let mut other = GameStateStore::new(Box::new(slot), 5, false);
        assert_eq!(other.state().current_room, RoomId::BootSequence);
        assert!(other.reload());
        assert_eq!(other.state().current_room, RoomId::ProcessPrison);

        let mut empty = GameStateStore::in_memory();
        assert!(!empty.reload());
    }

    #[test]
    fn reload_clamps_corruption() {
        let slot = MemorySnapshot::new();
        let mut state = GameState::default();
        state.corruption = 230;
        slot.clone().write(&encode(&state).unwrap()).unwrap();

        let mut store = GameStateStore::new(Box::new(slot), 5, true);
        assert_eq!(store.state().corruption, 100);
        assert!(store.reload());
        assert_eq!(store.state().corruption, 100);
    }

    #[test]
    fn room_items_persist_and_reset() {
        let slot = MemorySnapshot::new();
        let mut store = GameStateStore::new(Box::new(slot.clone()), 5, false);
        store.set_room_items(RoomId::FileMaze, vec![Item::Ls]);
        let saved = decode(&slot.contents().unwrap()).unwrap();
        assert_eq!(saved.floors.get(&RoomId::FileMaze), Some(&vec![Item::Ls]));

        store.reset();
        assert!(store.state().floors.is_empty());
    }

    #[test]
    fn elapsed_formats() {
        let store = GameStateStore::in_memory();
        assert_eq!(store.format_elapsed().len(), 8);
        assert!(store.elapsed() >= Duration::zero());
    }
}
