use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::room::RoomId;

use super::permission::access_denied;
use super::process_tree::fork_bomb_defusal;
use super::regex_escape::pattern_recognition;
use super::types::{Hint, Puzzle, PuzzleOutcome, PuzzleRule, PuzzleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub solved: usize,
    pub percentage: u32,
}

/// Registry of puzzles, their per-puzzle state, and which rooms host them.
#[derive(Debug, Clone)]
pub struct PuzzleEngine {
    puzzles: BTreeMap<&'static str, Puzzle>,
    states: BTreeMap<String, PuzzleState>,
    rooms: BTreeMap<RoomId, Vec<&'static str>>,
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleEngine {
    pub fn new() -> Self {
        let mut puzzles = BTreeMap::new();
        for puzzle in [pattern_recognition(), access_denied(), fork_bomb_defusal()] {
            puzzles.insert(puzzle.id, puzzle);
        }

        let states = puzzles
            .keys()
            .map(|id| (id.to_string(), PuzzleState::default()))
            .collect();

        let rooms = BTreeMap::from([
            (RoomId::BootSequence, vec!["binary-permission-1"]),
            (
                RoomId::FileMaze,
                vec!["regex-escape-1", "binary-permission-1"],
            ),
            (RoomId::ProcessPrison, vec!["process-tree-1"]),
            (RoomId::MemoryLeak, vec![]),
            (RoomId::RootVault, vec!["regex-escape-1"]),
        ]);

        PuzzleEngine {
            puzzles,
            states,
            rooms,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Puzzle> {
        self.puzzles.get(id)
    }

    pub fn state(&self, id: &str) -> Option<&PuzzleState> {
        self.states.get(id)
    }

    pub fn list_for_room(&self, room: RoomId) -> Vec<&Puzzle> {
        self.rooms
            .get(&room)
            .map(|ids| ids.iter().filter_map(|id| self.puzzles.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn unsolved_for_room(&self, room: RoomId) -> Vec<&Puzzle> {
        self.list_for_room(room)
            .into_iter()
            .filter(|p| self.states.get(p.id).is_some_and(|s| !s.solved))
            .collect()
    }

    /// Count the attempt, record the input, run the validator.
    pub fn attempt(&mut self, id: &str, input: &str) -> PuzzleOutcome {
        let (Some(puzzle), Some(state)) = (self.puzzles.get(id), self.states.get_mut(id)) else {
            return PuzzleOutcome::failed("Puzzle not found", 5);
        };

        state.attempts += 1;
        state.last_attempt = Some(input.to_string());

        let outcome = puzzle.validate(input);
        if outcome.success && !state.solved {
            state.solved = true;
            state.solved_at = Some(Utc::now());
        }
        log::debug!(
            "puzzle {} attempt #{}: success={} delta={}",
            id,
            state.attempts,
            outcome.success,
            outcome.corruption_delta
        );
        outcome
    }

    /// Unlocked hints that have not been revealed yet.
    pub fn hints(&self, id: &str) -> Vec<String> {
        self.pending_hints(id)
            .into_iter()
            .map(|(_, hint)| hint.text.to_string())
            .collect()
    }

    fn pending_hints(&self, id: &str) -> Vec<(usize, &Hint)> {
        let (Some(puzzle), Some(state)) = (self.puzzles.get(id), self.states.get(id)) else {
            return Vec::new();
        };
        puzzle
            .available_hints(state.attempts)
            .filter(|(index, _)| !state.hints_revealed.contains(index))
            .collect()
    }

    /// Mark hint `index` delivered. `None` if it is locked, already revealed or unknown.
    pub fn reveal_hint(&mut self, id: &str, index: usize) -> Option<Hint> {
        let puzzle = self.puzzles.get(id)?;
        let state = self.states.get_mut(id)?;
        let hint = puzzle.hints.get(index)?;
        if state.attempts < hint.threshold || !state.hints_revealed.insert(index) {
            return None;
        }
        Some(hint.clone())
    }

    /// Reveal the next pending hint, if any.
    pub fn reveal_next_hint(&mut self, id: &str) -> Option<Hint> {
        let index = self.pending_hints(id).first().map(|(index, _)| *index)?;
        self.reveal_hint(id, index)
    }

    /// Rendered process listing for a process-tree puzzle.
    pub fn process_table(&self, id: &str) -> Option<String> {
        match &self.puzzles.get(id)?.rule {
            PuzzleRule::Processes(tree) => Some(tree.table()),
            _ => None,
        }
    }

    pub fn progress(&self) -> Progress {
        let total = self.puzzles.len();
        let solved = self.states.values().filter(|s| s.solved).count();
        let percentage = if total > 0 {
            ((solved as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Progress {
            total,
            solved,
            percentage,
        }
    }

    pub fn solved_ids(&self) -> Vec<&str> {
        self.states
            .iter()
            .filter(|(_, s)| s.solved)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Put an unsolved puzzle back to zero attempts. Solved puzzles stay solved.
    pub fn reset(&mut self, id: &str) {
        if let Some(state) = self.states.get_mut(id) {
            if !state.solved {
                *state = PuzzleState::default();
            }
        }
    }

    pub fn reset_all(&mut self) {
        let ids: Vec<String> = self.states.keys().cloned().collect();
        for id in ids {
            self.reset(&id);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.states)?)
    }

    /// Replace puzzle states from [`to_json`](Self::to_json) output. Ids we do
    /// not know are dropped; known puzzles missing from the data keep their state.
    pub fn restore_json(&mut self, data: &str) -> Result<()> {
        let restored: BTreeMap<String, PuzzleState> = serde_json::from_str(data)?;
        for (id, state) in restored {
            if let Some(slot) = self.states.get_mut(&id) {
                *slot = state;
            }
        }
        Ok(())
    }
}
