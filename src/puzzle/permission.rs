use crate::room::Item;

use super::types::{Difficulty, Hint, Puzzle, PuzzleOutcome, PuzzleRule};

const TRIPLETS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];

/// `"754"` -> `"rwxr-xr--"`. Returns `None` unless given exactly three digits 0-7.
pub fn octal_to_symbolic(octal: &str) -> Option<String> {
    if octal.chars().count() != 3 {
        return None;
    }
    octal
        .chars()
        .map(|c| c.to_digit(8).map(|d| TRIPLETS[d as usize]))
        .collect()
}

/// `"rwxr-xr--"` -> `"754"`. Returns `None` unless given nine chars of `rwx-`.
pub fn symbolic_to_octal(symbolic: &str) -> Option<String> {
    let chars: Vec<char> = symbolic.chars().collect();
    if chars.len() != 9 || !chars.iter().all(|c| matches!(c, 'r' | 'w' | 'x' | '-')) {
        return None;
    }
    Some(
        chars
            .chunks(3)
            .map(|chunk| {
                let mut value = 0;
                if chunk[0] == 'r' {
                    value |= 4;
                }
                if chunk[1] == 'w' {
                    value |= 2;
                }
                if chunk[2] == 'x' {
                    value |= 1;
                }
                char::from(b'0' + value)
            })
            .collect(),
    )
}

#[derive(Debug, Clone)]
pub struct PermissionLock {
    target_octal: &'static str,
    target_symbolic: &'static str,
}

impl PermissionLock {
    pub fn validate(&self, input: &str) -> PuzzleOutcome {
        let input = input.trim();

        if input.len() == 3 && input.chars().all(|c| c.is_ascii_digit()) {
            if input == self.target_octal {
                return PuzzleOutcome::solved(
                    "Permissions set! The file is now accessible.",
                    -3,
                    Item::Chmod,
                );
            }
            return match octal_to_symbolic(input) {
                Some(symbolic) => PuzzleOutcome::failed(
                    format!("Permissions set to {symbolic}, but the file remains locked."),
                    1,
                ),
                None => PuzzleOutcome::failed(
                    "Invalid octal notation. Use values 0-7 for each digit.",
                    2,
                ),
            };
        }

        if let Some(octal) = symbolic_to_octal(input) {
            if input == self.target_symbolic {
                return PuzzleOutcome::solved(
                    "Permissions matched! The file is now accessible.",
                    -3,
                    Item::Chmod,
                );
            }
            return PuzzleOutcome::failed(
                format!(
                    "Permissions {} ({}) don't match the required pattern.",
                    octal, input
                ),
                1,
            );
        }

        PuzzleOutcome::failed(
            "Invalid permission format. Use octal (e.g., 755) or symbolic (e.g., rwxr-xr-x).",
            2,
        )
    }
}

pub fn access_denied() -> Puzzle {
    Puzzle {
        id: "binary-permission-1",
        name: "Access Denied",
        description: "Set permissions to rwxr-xr-- to unlock the escape script",
        difficulty: Difficulty::Easy,
        corruption_modifier: 3,
        hints: vec![
            Hint::free(2, "chmod uses octal notation: r=4, w=2, x=1"),
            Hint::free(
                4,
                "Owner needs all permissions (7), group needs read+execute (5)",
            ),
            Hint::costly(6, "Others need read only (4)", 3),
            Hint::costly(8, "The answer is 754", 8),
        ],
        rule: PuzzleRule::Permission(PermissionLock {
            target_octal: "754",
            target_symbolic: "rwxr-xr--",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(octal_to_symbolic("754").as_deref(), Some("rwxr-xr--"));
        assert_eq!(octal_to_symbolic("000").as_deref(), Some("---------"));
        assert_eq!(octal_to_symbolic("777").as_deref(), Some("rwxrwxrwx"));
        assert_eq!(octal_to_symbolic("758"), None);
        assert_eq!(octal_to_symbolic("75"), None);
        assert_eq!(symbolic_to_octal("rw-r--r--").as_deref(), Some("644"));
        assert_eq!(symbolic_to_octal("rwxr-xr-"), None);
        assert_eq!(symbolic_to_octal("rwxr-xr-z"), None);
    }

    #[test]
    fn round_trip_every_mode() {
        for mode in 0..0o1000u32 {
            let octal = format!("{:03o}", mode);
            let symbolic = octal_to_symbolic(&octal).expect("valid octal");
            let back = symbolic_to_octal(&symbolic);
            assert_eq!(back.as_deref(), Some(octal.as_str()));
        }
    }

    #[test]
    fn both_notations_solve() {
        let puzzle = access_denied();
        for input in ["754", "rwxr-xr--", "  754  "] {
            let outcome = puzzle.validate(input);
            assert!(outcome.success, "{input}");
            assert_eq!(outcome.reward, Some(Item::Chmod));
            assert!(outcome.corruption_delta < 0);
        }
    }

    #[test]
    fn wrong_octal_is_echoed_as_symbolic() {
        let outcome = access_denied().validate("755");
        assert!(!outcome.success);
        assert!(outcome.message.contains("rwxr-xr-x"), "{}", outcome.message);
        assert_eq!(outcome.corruption_delta, 1);
    }

    #[test]
    fn wrong_symbolic_is_echoed_as_octal() {
        let outcome = access_denied().validate("rwxrwxrwx");
        assert!(!outcome.success);
        assert!(outcome.message.contains("777"), "{}", outcome.message);
    }

    #[test]
    fn malformed_input_is_invalid() {
        for input in ["999", "75", "rwxr-xr-?", "open sesame", ""] {
            let outcome = access_denied().validate(input);
            assert!(!outcome.success);
            let message = &outcome.message;
            assert!(message.contains("Invalid"), "{input}: {message}");
            assert_eq!(outcome.corruption_delta, 2);
        }
    }
}
