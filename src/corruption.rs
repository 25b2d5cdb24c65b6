//! Corruption meter and the distortions it unlocks.
//!
//! The level is the only real input. Everything in [`CorruptionState`] is
//! recomputed from it on every write; nothing here is settable on its own.
//! Randomness is always supplied by the caller so tests can seed it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const MAX_LEVEL: u8 = 100;

const SCRAMBLE_GLYPHS: &[char] = &[
    '░', '▒', '▓', '█', '▀', '▄', '▌', '▐', '│', '┤', '┬', '┴', '├', '┼', '╬', '═', '║', '╔', '╗',
    '╚', '╝',
];
const GLITCH_GLYPHS: &[char] = &['▓', '▒', '░', '█', '▄', '▀', '▌', '▐'];

/// Interceptions unlock in this order, one per 20 levels.
const INTERCEPTIONS: [(&str, &str); 5] = [
    ("help", "hinder"),
    ("save", "corrupt"),
    ("north", "south"),
    ("take", "drop"),
    ("exit", "enter"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    TextScramble,
    VisualGlitch,
    CommandIntercept,
    MemoryShuffle,
    TimeDilation,
    FalseRooms,
    InputLag,
    EchoLoop,
}

impl Effect {
    pub const ALL: [Effect; 8] = [
        Effect::TextScramble,
        Effect::VisualGlitch,
        Effect::CommandIntercept,
        Effect::MemoryShuffle,
        Effect::TimeDilation,
        Effect::FalseRooms,
        Effect::InputLag,
        Effect::EchoLoop,
    ];

    pub fn threshold(&self) -> u8 {
        match self {
            Effect::TextScramble => 15,
            Effect::VisualGlitch => 25,
            Effect::CommandIntercept => 30,
            Effect::MemoryShuffle => 40,
            Effect::TimeDilation => 50,
            Effect::FalseRooms => 60,
            Effect::InputLag => 70,
            Effect::EchoLoop => 80,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::TextScramble => "text-scramble",
            Effect::VisualGlitch => "visual-glitch",
            Effect::CommandIntercept => "command-intercept",
            Effect::MemoryShuffle => "memory-shuffle",
            Effect::TimeDilation => "time-dilation",
            Effect::FalseRooms => "false-rooms",
            Effect::InputLag => "input-lag",
            Effect::EchoLoop => "echo-loop",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorruptionState {
    pub level: u8,
    pub active_effects: BTreeSet<Effect>,
    pub intercepted_commands: BTreeMap<String, String>,
    pub false_room_active: bool,
}

impl CorruptionState {
    fn derive(level: u8, rng: &mut impl Rng) -> Self {
        let active_effects: BTreeSet<Effect> = Effect::ALL
            .iter()
            .copied()
            .filter(|e| level >= e.threshold())
            .collect();

        let intercepted_commands = if active_effects.contains(&Effect::CommandIntercept) {
            let count = usize::from(level / 20).min(INTERCEPTIONS.len());
            INTERCEPTIONS[..count]
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect()
        } else {
            BTreeMap::new()
        };

        // First of the two false-room draws; the accessor rolls the second.
        let false_room_active = level >= 60 && rng.gen_bool(0.3);

        CorruptionState {
            level,
            active_effects,
            intercepted_commands,
            false_room_active,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorruptionSimulator {
    state: CorruptionState,
}

impl CorruptionSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CorruptionState {
        &self.state
    }

    pub fn level(&self) -> u8 {
        self.state.level
    }

    pub fn is_active(&self, effect: Effect) -> bool {
        self.state.active_effects.contains(&effect)
    }

    /// Clamp to 0..=100 and rederive every effect from scratch.
    pub fn set_level(&mut self, level: i32, rng: &mut impl Rng) {
        let clamped = level.clamp(0, i32::from(MAX_LEVEL)) as u8;
        self.state = CorruptionState::derive(clamped, rng);
        log::debug!(
            "corruption level {} -> effects [{}]",
            clamped,
            self.state
                .active_effects
                .iter()
                .map(Effect::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    pub fn increase(&mut self, amount: i32, rng: &mut impl Rng) {
        self.set_level(i32::from(self.state.level) + amount, rng);
    }

    pub fn decrease(&mut self, amount: i32, rng: &mut impl Rng) {
        self.set_level(i32::from(self.state.level) - amount, rng);
    }

    /// Scramble text in place of display. Spaces and newlines always survive.
    pub fn corrupt_text(&self, text: &str, rng: &mut impl Rng) -> String {
        if !self.is_active(Effect::TextScramble) {
            return text.to_string();
        }

        let chance = f64::from(self.state.level) / 300.0;
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch == ' ' || ch == '\n' || !rng.gen_bool(chance) {
                out.push(ch);
                continue;
            }
            if rng.gen_bool(0.7) {
                out.push(*SCRAMBLE_GLYPHS.choose(rng).unwrap_or(&'░'));
            } else if rng.gen_bool(0.2) {
                out.push(ch);
                out.push(ch);
            }
            // otherwise the character is dropped
        }
        out
    }

    /// Swap the leading verb according to the interception table.
    pub fn intercept_command(&self, command: &str, rng: &mut impl Rng) -> String {
        if !self.is_active(Effect::CommandIntercept) {
            return command.to_string();
        }

        let (first, rest) = match command.split_once(' ') {
            Some((first, rest)) => (first, Some(rest)),
            None => (command, None),
        };
        if let Some(replacement) = self.state.intercepted_commands.get(&first.to_lowercase()) {
            return match rest {
                Some(rest) => format!("{} {}", replacement, rest),
                None => replacement.clone(),
            };
        }

        if self.state.level > 80 && rng.gen_bool(0.1) {
            return "segfault".to_string();
        }

        command.to_string()
    }

    pub fn shuffle<T: Clone>(&self, items: &[T], rng: &mut impl Rng) -> Vec<T> {
        let mut out = items.to_vec();
        if self.is_active(Effect::MemoryShuffle)
            && rng.gen_bool(f64::from(self.state.level) / 100.0)
        {
            out.shuffle(rng);
        }
        out
    }

    /// Milliseconds the front end should hold output back.
    pub fn input_delay_ms(&self) -> u64 {
        if !self.is_active(Effect::InputLag) {
            return 0;
        }
        u64::from(self.state.level - 70) * 66
    }

    pub fn should_echo(&self, rng: &mut impl Rng) -> bool {
        if !self.is_active(Effect::EchoLoop) {
            return false;
        }
        rng.gen_bool(f64::from(self.state.level - 80) / 40.0)
    }

    pub fn generate_glitch(&self, width: usize, height: usize, rng: &mut impl Rng) -> String {
        if !self.is_active(Effect::VisualGlitch) {
            return String::new();
        }

        let chance = f64::from(self.state.level) / 200.0;
        (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| {
                        if rng.gen_bool(chance) {
                            *GLITCH_GLYPHS.choose(rng).unwrap_or(&'▓')
                        } else {
                            ' '
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Independent 50% draw, gated on the flag rolled at the last level change.
    pub fn should_show_false_room(&self, rng: &mut impl Rng) -> bool {
        self.state.false_room_active && rng.gen_bool(0.5)
    }

    pub fn time_dilation(&self, rng: &mut impl Rng) -> f64 {
        if !self.is_active(Effect::TimeDilation) {
            return 1.0;
        }
        rng.gen_range(0.5..=1.5)
    }
}
