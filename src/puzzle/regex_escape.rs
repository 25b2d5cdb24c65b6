use regex::Regex;

use crate::room::Item;

use super::types::{Difficulty, Hint, Puzzle, PuzzleOutcome, PuzzleRule};

pub const CORRUPTED_LOG_LINE: &str = "[ERROR] Memory corruption detected at 0x7fff";

/// Player supplies a pattern; it has to match one fixed log line.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    target: &'static str,
}

impl PatternMatch {
    pub fn validate(&self, input: &str) -> PuzzleOutcome {
        match Regex::new(input) {
            Ok(pattern) if pattern.is_match(self.target) => PuzzleOutcome::solved(
                "Pattern matched! The corruption clears slightly.",
                -5,
                Item::Grep,
            ),
            Ok(_) => PuzzleOutcome::failed("Pattern does not match the corrupted logs.", 2),
            Err(err) => PuzzleOutcome::failed(format!("REGEX ERROR: {}", err), 3),
        }
    }
}

pub fn pattern_recognition() -> Puzzle {
    Puzzle {
        id: "regex-escape-1",
        name: "Pattern Recognition",
        description: "Match the corrupted log pattern: [ERROR] *corruption* detected at 0x????",
        difficulty: Difficulty::Medium,
        corruption_modifier: 5,
        hints: vec![
            Hint::free(3, "Remember to anchor your pattern with ^ and $"),
            Hint::free(5, "The brackets around ERROR need escaping: \\[ERROR\\]"),
            Hint::costly(7, "Use .* for any characters and 0x[0-9a-fA-F]+ for hex", 5),
            Hint::costly(
                10,
                "Full solution: ^\\[ERROR\\].*corruption.*0x[0-9a-fA-F]+$",
                10,
            ),
        ],
        rule: PuzzleRule::Pattern(PatternMatch {
            target: CORRUPTED_LOG_LINE,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_patterns_solve() {
        let puzzle = pattern_recognition();
        for pattern in [
            r"^\[ERROR\].*corruption.*$",
            r"^\[ERROR\].*corruption.*0x[0-9a-fA-F]+$",
            "corruption",
        ] {
            let outcome = puzzle.validate(pattern);
            assert!(outcome.success, "{pattern}");
            assert_eq!(outcome.reward, Some(Item::Grep));
        }
    }

    #[test]
    fn mismatch_is_plain_failure() {
        let outcome = pattern_recognition().validate("wrong pattern");
        assert!(!outcome.success);
        assert!(outcome.corruption_delta > 0);
        assert!(!outcome.message.starts_with("REGEX ERROR"));
    }

    #[test]
    fn compile_error_carries_syntax_description() {
        let outcome = pattern_recognition().validate("[ERROR");
        assert!(!outcome.success);
        let message = &outcome.message;
        assert!(message.starts_with("REGEX ERROR: "), "{message}");
        assert!(message.len() > "REGEX ERROR: ".len());
        assert_eq!(outcome.corruption_delta, 3);
    }
}
