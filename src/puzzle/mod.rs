pub mod engine;
pub mod permission;
pub mod process_tree;
pub mod regex_escape;
pub mod types;

pub use engine::{Progress, PuzzleEngine};
pub use permission::{octal_to_symbolic, symbolic_to_octal};
pub use types::{Difficulty, Hint, Puzzle, PuzzleKind, PuzzleOutcome, PuzzleRule, PuzzleState};
