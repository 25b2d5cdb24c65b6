//! Where game snapshots live. The store only moves opaque JSON strings;
//! encoding and version checks happen in [`encode`] / [`decode`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ParadoxError, Result};

use super::types::{GameState, MAX_CORRUPTION};

pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    state: GameState,
    /// Milliseconds since the Unix epoch at write time.
    timestamp: i64,
    version: String,
}

pub fn encode(state: &GameState) -> Result<String> {
    let snapshot = Snapshot {
        state: state.clone(),
        timestamp: Utc::now().timestamp_millis(),
        version: SNAPSHOT_VERSION.to_string(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// A snapshot without a version, or with a different one, is rejected whole.
/// An out-of-range corruption level is clamped.
pub fn decode(data: &str) -> Result<GameState> {
    let snapshot: Snapshot = serde_json::from_str(data)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(ParadoxError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    let mut state = snapshot.state;
    state.corruption = state.corruption.min(MAX_CORRUPTION);
    Ok(state)
}

pub trait SnapshotStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, data: &str) -> Result<()>;
}

/// Snapshot in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSnapshot { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshot {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&mut self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// In-process slot. Clones share the same slot, so a test can keep a handle
/// and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SnapshotStore for MemorySnapshot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&mut self, data: &str) -> Result<()> {
        *self.slot.borrow_mut() = Some(data.to_string());
        Ok(())
    }
}

/// Persistence switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshot;

impl SnapshotStore for NoSnapshot {
    fn read(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&mut self, _data: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{Item, RoomId};

    #[test]
    fn encode_decode() {
        let mut state = GameState::default();
        state.current_room = RoomId::MemoryLeak;
        state.corruption = 42;
        let data = encode(&state).unwrap();
        assert!(data.contains("\"version\": \"1.0.0\""));
        assert!(data.contains("\"memory-leak\""));
        assert_eq!(decode(&data).unwrap(), state);
    }

    #[test]
    fn corruption_is_clamped_on_decode() {
        let mut state = GameState::default();
        state.corruption = 200;
        let data = encode(&state).unwrap();
        assert_eq!(decode(&data).unwrap().corruption, 100);
    }

    #[test]
    fn floors_survive_encoding() {
        let mut state = GameState::default();
        state.floors.insert(RoomId::BootSequence, Vec::new());
        state.floors.insert(RoomId::RootVault, vec![Item::Chmod]);
        let data = encode(&state).unwrap();
        assert_eq!(decode(&data).unwrap().floors, state.floors);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let data = encode(&GameState::default())
            .unwrap()
            .replace("\"1.0.0\"", "\"0.9.0\"");
        match decode(&data) {
            Err(ParadoxError::VersionMismatch { found, .. }) => assert_eq!(found, "0.9.0"),
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_version_is_rejected() {
        let state = serde_json::to_value(GameState::default()).unwrap();
        let data = serde_json::json!({ "state": state, "timestamp": 0 }).to_string();
        assert!(decode(&data).is_err());
    }

    #[test]
    fn file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSnapshot::new(dir.path().join("nested/save.json"));
        assert!(store.read().unwrap().is_none());
        store.write("{}").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn memory_store_shares_slot() {
        let handle = MemorySnapshot::new();
        let mut store = handle.clone();
        store.write("abc").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("abc"));
    }
}
