//! Property tests for the corruption meter, puzzles and the state store.

use paradox::corruption::{CorruptionSimulator, Effect};
use paradox::puzzle::PuzzleEngine;
use paradox::state::{GameStateStore, CORRUPTION_WARNING};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn count_layout(text: &str) -> (usize, usize) {
    (
        text.chars().filter(|c| *c == ' ').count(),
        text.chars().filter(|c| *c == '\n').count(),
    )
}

#[derive(Debug, Clone)]
enum MeterOp {
    Up(u32),
    Down(u32),
}

fn meter_op() -> impl Strategy<Value = MeterOp> {
    prop_oneof![
        (0..60u32).prop_map(MeterOp::Up),
        (0..60u32).prop_map(MeterOp::Down),
    ]
}

proptest! {
    #[test]
    fn level_clamps_and_effects_match(level in -500i32..500, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sim = CorruptionSimulator::new();
        sim.set_level(level, &mut rng);

        let clamped = level.clamp(0, 100) as u8;
        prop_assert_eq!(sim.level(), clamped);
        for effect in Effect::ALL {
            prop_assert_eq!(sim.is_active(effect), clamped >= effect.threshold());
        }
    }

    #[test]
    fn corrupt_text_keeps_spaces_and_newlines(
        text in "[a-z \\n]{0,200}",
        level in 0i32..=100,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sim = CorruptionSimulator::new();
        sim.set_level(level, &mut rng);
        let out = sim.corrupt_text(&text, &mut rng);
        prop_assert_eq!(count_layout(&out), count_layout(&text));
    }

    #[test]
    fn intercept_table_is_deterministic(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sim = CorruptionSimulator::new();
        sim.set_level(35, &mut rng);
        prop_assert_eq!(sim.intercept_command("help", &mut rng), "hinder");
        sim.set_level(60, &mut rng);
        prop_assert_eq!(sim.intercept_command("north test", &mut rng), "south test");
    }

    #[test]
    fn prompts_keep_their_length(corruption in 0u8..=100, seed in any::<u64>()) {
        let engine = PuzzleEngine::new();
        let mut rng = StdRng::seed_from_u64(seed);
        for id in ["binary-permission-1", "regex-escape-1", "process-tree-1"] {
            let puzzle = engine.get(id).unwrap();
            let prompt = puzzle.prompt(corruption, &mut rng);
            prop_assert_eq!(prompt.chars().count(), puzzle.description.chars().count());
            if corruption < 25 {
                prop_assert_eq!(prompt.as_str(), puzzle.description);
            }
        }
    }

    #[test]
    fn store_meter_stays_in_range(ops in prop::collection::vec(meter_op(), 0..40)) {
        let mut store = GameStateStore::in_memory();
        let mut expected_warnings = 0;
        for op in &ops {
            match op {
                MeterOp::Up(n) => {
                    store.increase_corruption(*n);
                    if store.state().corruption > 50 {
                        expected_warnings += 1;
                    }
                }
                MeterOp::Down(n) => store.decrease_corruption(*n),
            }
            prop_assert!(store.state().corruption <= 100);
        }
        let warnings = store
            .state()
            .history
            .iter()
            .filter(|l| l.ends_with(CORRUPTION_WARNING))
            .count();
        prop_assert_eq!(warnings, expected_warnings);
    }
}
