use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::room::Item;

use super::permission::PermissionLock;
use super::process_tree::ProcessTree;
use super::regex_escape::PatternMatch;

const PROMPT_GLYPHS: &[char] = &['░', '▒', '▓', '█', '▌', '▐', '│', '┤'];

/// Prompts stay readable below this corruption level.
pub const PROMPT_CORRUPTION_THRESHOLD: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PuzzleKind {
    BinaryPermission,
    RegexEscape,
    ProcessTree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Nightmare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hint {
    /// Attempts needed before the hint unlocks.
    pub threshold: u32,
    pub text: &'static str,
    /// Corruption charged when the hint is revealed.
    pub cost: Option<u8>,
}

impl Hint {
    pub const fn free(threshold: u32, text: &'static str) -> Self {
        Hint {
            threshold,
            text,
            cost: None,
        }
    }

    pub const fn costly(threshold: u32, text: &'static str, cost: u8) -> Self {
        Hint {
            threshold,
            text,
            cost: Some(cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuzzleOutcome {
    pub success: bool,
    pub message: String,
    /// Signed change to apply to the corruption meter.
    pub corruption_delta: i32,
    pub reward: Option<Item>,
}

impl PuzzleOutcome {
    pub fn solved(message: impl Into<String>, corruption_delta: i32, reward: Item) -> Self {
        PuzzleOutcome {
            success: true,
            message: message.into(),
            corruption_delta,
            reward: Some(reward),
        }
    }

    pub fn failed(message: impl Into<String>, corruption_delta: i32) -> Self {
        PuzzleOutcome {
            success: false,
            message: message.into(),
            corruption_delta,
            reward: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PuzzleState {
    pub attempts: u32,
    pub solved: bool,
    pub hints_revealed: BTreeSet<usize>,
    pub last_attempt: Option<String>,
    pub solved_at: Option<DateTime<Utc>>,
}

/// Validation rule, one variant per puzzle type.
#[derive(Debug, Clone)]
pub enum PuzzleRule {
    Permission(PermissionLock),
    Pattern(PatternMatch),
    Processes(ProcessTree),
}

impl PuzzleRule {
    pub fn kind(&self) -> PuzzleKind {
        match self {
            PuzzleRule::Permission(_) => PuzzleKind::BinaryPermission,
            PuzzleRule::Pattern(_) => PuzzleKind::RegexEscape,
            PuzzleRule::Processes(_) => PuzzleKind::ProcessTree,
        }
    }

    pub fn validate(&self, input: &str) -> PuzzleOutcome {
        match self {
            PuzzleRule::Permission(lock) => lock.validate(input),
            PuzzleRule::Pattern(pattern) => pattern.validate(input),
            PuzzleRule::Processes(tree) => tree.validate(input),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Puzzle {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub corruption_modifier: u8,
    pub hints: Vec<Hint>,
    pub rule: PuzzleRule,
}

impl Puzzle {
    pub fn kind(&self) -> PuzzleKind {
        self.rule.kind()
    }

    pub fn validate(&self, input: &str) -> PuzzleOutcome {
        self.rule.validate(input)
    }

    pub fn available_hints(&self, attempts: u32) -> impl Iterator<Item = (usize, &Hint)> {
        self.hints
            .iter()
            .enumerate()
            .filter(move |(_, h)| attempts >= h.threshold)
    }

    /// The description, glitched in proportion to corruption once it passes
    /// [`PROMPT_CORRUPTION_THRESHOLD`]. Character count never changes.
    pub fn prompt(&self, corruption: u8, rng: &mut impl Rng) -> String {
        if corruption < PROMPT_CORRUPTION_THRESHOLD {
            return self.description.to_string();
        }
        let chance = f64::from(corruption.min(100)) / 200.0;
        self.description
            .chars()
            .map(|c| {
                if c.is_whitespace() || !rng.gen_bool(chance) {
                    c
                } else {
                    PROMPT_GLYPHS[rng.gen_range(0..PROMPT_GLYPHS.len())]
                }
            })
            .collect()
    }
}
