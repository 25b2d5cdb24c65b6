//! One play session: owns every component and turns a line of player input
//! into output lines plus the state changes it implies.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::command::help::{command_help, quick_help, GENERAL_HELP};
use crate::command::{parse, shell, CombinationCatalog, ComboId, CommandCombo, CommandType};
use crate::corruption::CorruptionSimulator;
use crate::error::{ParadoxError, Result};
use crate::puzzle::{PuzzleEngine, PuzzleKind, PuzzleOutcome};
use crate::room::{Direction, Item, Room, RoomGraph, RoomId};
use crate::state::{GameState, GameStateStore};

const MOVE_CORRUPTION_CHANCE: f64 = 0.2;
const MOVE_CORRUPTION: i32 = 5;
const SHIELD_TURNS: u32 = 10;
const MEMORY_LEAK_SLOTS: usize = 3;
const GLITCH_LEVEL: u8 = 50;

const GLITCH_ERRORS: [&str; 4] = [
    "ERROR: Command not recognized.",
    "SEGMENTATION FAULT",
    "ERROR: Corrupted command.",
    "????: ???????? ??? ?????",
];

pub const BANNER: [&str; 4] = [
    "TERMINAL PARADOX v0.0.1",
    "========================",
    "You are trapped in a corrupted terminal system.",
    "Type \"help\" for commands.",
];

/// Everything the front end needs to show for one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnOutput {
    pub lines: Vec<String>,
    /// Hold the lines back this long before displaying them.
    pub delay_ms: u64,
    /// A line to repeat later, unprompted.
    pub echo: Option<String>,
    pub quit: bool,
    pub escaped: bool,
}

/// Read-only copies for drawing a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub state: GameState,
    pub room: Room,
    pub glitch: String,
    pub elapsed: String,
}

#[derive(Debug)]
pub struct Game {
    graph: RoomGraph,
    store: GameStateStore,
    puzzles: PuzzleEngine,
    combos: CombinationCatalog,
    corruption: CorruptionSimulator,
    /// Working copies of every room; item lists change as the player takes
    /// and drops things. Holds every [`RoomId`], checked in [`Game::new`].
    rooms: BTreeMap<RoomId, Room>,
    shield_turns: u32,
    escaped: bool,
    rng: StdRng,
}

impl Game {
    pub fn new(graph: RoomGraph, store: GameStateStore, rng: StdRng) -> Result<Self> {
        let mut rooms = fresh_rooms(&graph)?;
        restore_floors(&mut rooms, &store.state().floors);
        let mut game = Game {
            graph,
            store,
            puzzles: PuzzleEngine::new(),
            combos: CombinationCatalog::new(),
            corruption: CorruptionSimulator::new(),
            rooms,
            shield_turns: 0,
            escaped: false,
            rng,
        };
        game.sync_corruption();
        Ok(game)
    }

    /// Session over the room catalog compiled into the binary.
    pub fn builtin(store: GameStateStore, rng: StdRng) -> Result<Self> {
        Self::new(RoomGraph::builtin()?, store, rng)
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GameStateStore {
        &mut self.store
    }

    pub fn puzzles(&self) -> &PuzzleEngine {
        &self.puzzles
    }

    pub fn combos(&self) -> &CombinationCatalog {
        &self.combos
    }

    pub fn corruption(&self) -> &CorruptionSimulator {
        &self.corruption
    }

    pub fn room(&self) -> &Room {
        &self.rooms[&self.store.state().current_room]
    }

    pub fn shield_turns(&self) -> u32 {
        self.shield_turns
    }

    pub fn escaped(&self) -> bool {
        self.escaped
    }

    /// Opening text: banner plus the current room.
    pub fn intro(&mut self) -> Vec<String> {
        let mut lines: Vec<String> = BANNER.iter().map(|s| s.to_string()).collect();
        lines.push(String::new());
        let room = self.store.state().current_room;
        lines.extend(self.describe(room));
        lines
    }

    pub fn render(&mut self, width: usize, height: usize) -> RenderSnapshot {
        let glitch = self
            .corruption
            .generate_glitch(width, height, &mut self.rng);
        RenderSnapshot {
            state: self.store.snapshot(),
            room: self.room().clone(),
            glitch,
            elapsed: self.store.format_elapsed(),
        }
    }

    /// Process one line of input.
    pub fn turn(&mut self, input: &str) -> TurnOutput {
        let input = input.trim();
        if input.is_empty() {
            return TurnOutput {
                escaped: self.escaped,
                ..TurnOutput::default()
            };
        }

        self.sync_corruption();
        let mut lines = Vec::new();
        if self.shield_turns > 0 {
            self.shield_turns -= 1;
            if self.shield_turns == 0 {
                lines.push("[!] Corruption shield expired.".to_string());
            }
        }

        let command_text = self.corruption.intercept_command(input, &mut self.rng);
        let command = parse(&command_text);
        log::debug!("turn {:?} -> {:?} {:?}", input, command_text, command.kind);

        // Everything after the verb, with the player's casing intact.
        let raw_tokens: Vec<&str> = command_text.split_whitespace().skip(1).collect();
        let mut quit = false;

        match command.kind {
            CommandType::Move => lines.extend(self.do_move(command.direction)),
            CommandType::Take => {
                lines.extend(self.do_take(command.target.as_deref(), command.item))
            }
            CommandType::Drop => {
                lines.extend(self.do_drop(command.target.as_deref(), command.item))
            }
            CommandType::Use => {
                let tokens = raw_tokens.get(1..).unwrap_or_default();
                lines.extend(self.do_use(command.target.as_deref(), command.item, tokens));
            }
            CommandType::Combine => lines.extend(self.do_combine(&command.args)),
            CommandType::Look => {
                let room = self.store.state().current_room;
                lines.push(String::new());
                lines.extend(self.describe(room));
            }
            CommandType::Examine => lines.extend(self.do_examine(command.target.as_deref())),
            CommandType::Inventory => lines.extend(self.inventory_lines()),
            CommandType::Help => match command.args.first().and_then(|t| Item::from_str(t).ok()) {
                Some(item) => lines.extend(command_help(item)),
                None => lines.extend(GENERAL_HELP.lines().map(str::to_string)),
            },
            CommandType::Manual => match command.item {
                Some(item) => lines.extend(command_help(item)),
                None => lines.push("What manual page do you want?".to_string()),
            },
            CommandType::Save => match self.store.save() {
                Ok(()) => lines.push("Game saved.".to_string()),
                Err(err) => {
                    log::warn!("save command failed: {}", err);
                    lines.push(format!("ERROR: Save failed: {}", err));
                }
            },
            CommandType::Load => lines.extend(self.do_load()),
            CommandType::Reset => lines.extend(self.reset()),
            CommandType::Quit => {
                quit = true;
                lines.push("Connection closed.".to_string());
            }
            CommandType::Solve => lines.extend(self.do_solve(command.target.as_deref())),
            CommandType::Hint => lines.extend(self.do_hint()),
            CommandType::Status => lines.extend(self.status_lines()),
            CommandType::Combos => lines.extend(self.combo_lines()),
            CommandType::Unknown => {
                let verb = command.verb();
                lines.extend(self.do_unknown(&verb, &raw_tokens));
            }
        }

        if !self.escaped && self.store.get_flag("has_root") && self.store.get_flag("found_escape") {
            self.escaped = true;
            log::info!("player escaped after {} moves", self.store.state().moves);
            lines.extend([
                String::new(),
                "=================================".to_string(),
                "CONGRATULATIONS!".to_string(),
                "You have escaped the Terminal Paradox!".to_string(),
                format!("Time: {}", self.store.format_elapsed()),
                format!("Moves: {}", self.store.state().moves),
                "=================================".to_string(),
            ]);
        }

        let mut out_lines = vec![format!("> {}", input)];
        out_lines.extend(
            lines
                .iter()
                .map(|line| self.corruption.corrupt_text(line, &mut self.rng)),
        );

        let dilation = self.corruption.time_dilation(&mut self.rng);
        let delay_ms = (self.corruption.input_delay_ms() as f64 * dilation).round() as u64;
        let echo = self
            .corruption
            .should_echo(&mut self.rng)
            .then(|| format!("> {}", input));

        TurnOutput {
            lines: out_lines,
            delay_ms,
            echo,
            quit,
            escaped: self.escaped,
        }
    }

    /// Fresh state, puzzles, combos and rooms.
    pub fn reset(&mut self) -> Vec<String> {
        self.store.reset();
        self.puzzles = PuzzleEngine::new();
        self.combos = CombinationCatalog::new();
        self.rooms = room_copies(&self.graph);
        self.shield_turns = 0;
        self.escaped = false;
        self.sync_corruption();

        let mut lines = vec!["Game reset.".to_string(), String::new()];
        lines.extend(self.describe(self.graph.start()));
        lines
    }

    fn sync_corruption(&mut self) {
        let level = self.store.state().corruption;
        if level != self.corruption.level() {
            self.corruption.set_level(i32::from(level), &mut self.rng);
        }
    }

    /// Apply a signed corruption change. Increases are swallowed while the
    /// shield is up; returns whether anything was applied.
    fn adjust_corruption(&mut self, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }
        if delta > 0 {
            if self.shield_turns > 0 {
                log::debug!("shield absorbed +{} corruption", delta);
                return false;
            }
            self.store.increase_corruption(delta.unsigned_abs());
        } else {
            self.store.decrease_corruption(delta.unsigned_abs());
        }
        self.sync_corruption();
        true
    }

    fn current_id(&self) -> RoomId {
        self.store.state().current_room
    }

    fn record_floor(&mut self, id: RoomId) {
        let items = self.rooms[&id].items.clone();
        self.store.set_room_items(id, items);
    }

    fn active_puzzle(&self) -> Option<&'static str> {
        self.puzzles
            .unsolved_for_room(self.current_id())
            .first()
            .map(|p| p.id)
    }

    fn unsolved_of_kind(&self, kind: PuzzleKind) -> Option<&'static str> {
        self.puzzles
            .unsolved_for_room(self.current_id())
            .into_iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.id)
    }

    fn describe(&mut self, id: RoomId) -> Vec<String> {
        let shown = if self.corruption.should_show_false_room(&mut self.rng) {
            let others: Vec<RoomId> = RoomId::ALL.iter().copied().filter(|r| *r != id).collect();
            let fake = others.choose(&mut self.rng).copied().unwrap_or(id);
            log::debug!("false room: showing {} instead of {}", fake, id);
            fake
        } else {
            id
        };

        let room = &self.rooms[&shown];
        let mut lines = vec![format!("== {} ==", room.name)];
        if let Some(ascii) = &room.ascii {
            lines.extend(ascii.lines().map(str::to_string));
        }
        lines.push(room.description.clone());

        let level = self.corruption.level();
        for puzzle in self.puzzles.unsolved_for_room(shown) {
            lines.push(String::new());
            lines.push(format!("[PUZZLE] {}", puzzle.name));
            lines.push(puzzle.prompt(level, &mut self.rng));
            if let Some(table) = self.puzzles.process_table(puzzle.id) {
                lines.extend(table.lines().map(str::to_string));
            }
        }

        let items = self.corruption.shuffle(&room.items, &mut self.rng);
        if !items.is_empty() {
            let names: Vec<&str> = items.iter().map(Item::as_str).collect();
            lines.push(format!("Items here: {}", names.join(", ")));
        }
        let exits = room.exit_names();
        let exits = if exits.is_empty() {
            "none".to_string()
        } else {
            exits.join(", ")
        };
        lines.push(format!("Exits: {}", exits));
        lines
    }

    fn do_move(&mut self, direction: Option<Direction>) -> Vec<String> {
        let Some(direction) = direction else {
            return vec!["ERROR: Move where? Specify a direction.".to_string()];
        };
        let Some(destination) = self.graph.destination(self.room(), direction) else {
            return vec![format!("ERROR: Cannot move {}. Path blocked.", direction)];
        };

        self.store.move_to_room(destination);
        let mut lines = vec![format!("You move {}...", direction)];
        if self.rng.gen_bool(MOVE_CORRUPTION_CHANCE) {
            if self.adjust_corruption(MOVE_CORRUPTION) {
                lines.push("WARNING: Memory corruption detected!".to_string());
            } else {
                lines.push("[!] The shield deflects a burst of corruption.".to_string());
            }
        }
        lines.push(String::new());
        lines.extend(self.describe(destination));
        lines
    }

    fn do_take(&mut self, target: Option<&str>, item: Option<Item>) -> Vec<String> {
        let Some(target) = target else {
            return vec!["ERROR: Take what?".to_string()];
        };
        let here = self.current_id();
        let wanted = item.or_else(|| Item::from_str(target).ok());
        let Some(item) = wanted.filter(|i| self.rooms[&here].items.contains(i)) else {
            return vec![format!("ERROR: No such item: {}", target)];
        };
        if !self.store.add_item(item) {
            return vec!["ERROR: Inventory full. Drop something first.".to_string()];
        }
        if let Some(room) = self.rooms.get_mut(&here) {
            room.take_item(item);
        }
        self.record_floor(here);

        let mut lines = vec![format!("Acquired command: {}", item)];
        let inventory = &self.store.state().inventory;
        if let Some(hint) = self.combos.hint_for_partial_set(inventory) {
            lines.push(hint);
        }
        lines
    }

    fn do_drop(&mut self, target: Option<&str>, item: Option<Item>) -> Vec<String> {
        let Some(target) = target else {
            return vec!["ERROR: Drop what?".to_string()];
        };
        let held = item
            .or_else(|| Item::from_str(target).ok())
            .filter(|i| self.store.has_item(*i));
        let Some(item) = held else {
            return vec![format!("ERROR: You don't have: {}", target)];
        };
        self.store.remove_item(item);
        let here = self.current_id();
        if let Some(room) = self.rooms.get_mut(&here) {
            room.items.push(item);
        }
        self.record_floor(here);
        vec![format!("Dropped: {}", item)]
    }

    fn do_use(&mut self, target: Option<&str>, item: Option<Item>, tokens: &[&str]) -> Vec<String> {
        let Some(target) = target else {
            return vec!["ERROR: Use what?".to_string()];
        };
        match item.or_else(|| Item::from_str(target).ok()) {
            Some(item) if self.store.has_item(item) => self.run_command(item, tokens),
            _ => vec![format!("ERROR: Command not found: {}", target)],
        }
    }

    fn do_unknown(&mut self, verb: &str, tokens: &[&str]) -> Vec<String> {
        if let Ok(item) = Item::from_str(verb) {
            if self.store.has_item(item) {
                return self.run_command(item, tokens);
            }
            return vec![format!("{}: command not found. You don't have it yet.", verb)];
        }
        if self.store.state().corruption > GLITCH_LEVEL {
            let message = GLITCH_ERRORS
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(GLITCH_ERRORS[0]);
            return vec![message.to_string()];
        }
        vec!["ERROR: Unknown command. Type \"help\" for commands.".to_string()]
    }

    /// Run a carried command. `kill` and `chmod` feed the room's puzzle when
    /// it is waiting for exactly that kind of input.
    fn run_command(&mut self, item: Item, tokens: &[&str]) -> Vec<String> {
        let parsed = shell::parse_flags(tokens);

        if item == Item::Kill {
            let pids: Vec<&str> = parsed
                .args
                .iter()
                .map(String::as_str)
                .filter(|a| a.parse::<u32>().is_ok())
                .collect();
            if let Some(id) = self.unsolved_of_kind(PuzzleKind::ProcessTree) {
                if !pids.is_empty() {
                    let input = format!("kill {}", pids.join(" "));
                    let outcome = self.puzzles.attempt(id, &input);
                    return self.apply_outcome(id, outcome);
                }
            }
        }

        if item == Item::Chmod {
            let puzzle = self.unsolved_of_kind(PuzzleKind::BinaryPermission);
            if let (Some(id), Some(mode)) = (puzzle, parsed.args.first()) {
                let outcome = self.puzzles.attempt(id, mode);
                return self.apply_outcome(id, outcome);
            }
        }

        let puzzle_active = self.active_puzzle().is_some();
        let output = shell::execute(item, tokens, self.current_id(), puzzle_active);
        for (flag, value) in &output.effects.flags_to_set {
            self.store.set_flag(flag, *value);
        }
        let mut lines = output.lines;
        let change = output.effects.corruption_change;
        if change > 0 && !self.adjust_corruption(change) {
            lines.push("[!] The shield absorbs the backlash.".to_string());
        } else if change < 0 {
            self.adjust_corruption(change);
        }
        lines
    }

    fn apply_outcome(&mut self, id: &str, outcome: PuzzleOutcome) -> Vec<String> {
        let mut lines = vec![outcome.message.clone()];
        self.adjust_corruption(outcome.corruption_delta);

        if !outcome.success {
            if !self.puzzles.hints(id).is_empty() {
                lines.push("(A hint is available. Type 'hint'.)".to_string());
            }
            return lines;
        }

        if let Some(puzzle) = self.puzzles.get(id) {
            log::info!("puzzle solved: {}", puzzle.name);
            lines.push(format!("[PUZZLE SOLVED] {}", puzzle.name));
        }
        if let Some(reward) = outcome.reward {
            if self.store.has_item(reward) {
                lines.push(format!("You already carry {}.", reward));
            } else if self.store.add_item(reward) {
                lines.push(format!("Reward: {} added to inventory.", reward));
            } else {
                let here = self.current_id();
                if let Some(room) = self.rooms.get_mut(&here) {
                    room.items.push(reward);
                }
                self.record_floor(here);
                lines.push(format!("Reward: {} dropped to the floor. Inventory full.", reward));
            }
        }
        lines
    }

    fn do_solve(&mut self, answer: Option<&str>) -> Vec<String> {
        let Some(id) = self.active_puzzle() else {
            return vec!["There is no active puzzle here.".to_string()];
        };
        let Some(answer) = answer else {
            return vec!["ERROR: Solve what? Usage: solve <answer>".to_string()];
        };
        let outcome = self.puzzles.attempt(id, answer);
        self.apply_outcome(id, outcome)
    }

    fn do_hint(&mut self) -> Vec<String> {
        let Some(id) = self.active_puzzle() else {
            return vec!["No puzzle here to hint at.".to_string()];
        };
        let Some(hint) = self.puzzles.reveal_next_hint(id) else {
            return vec!["No hints available yet. Keep trying.".to_string()];
        };
        let mut lines = vec![format!("HINT: {}", hint.text)];
        if let Some(cost) = hint.cost {
            if self.adjust_corruption(i32::from(cost)) {
                lines.push(format!("(Hint cost: +{} corruption)", cost));
            }
        }
        lines
    }

    fn do_examine(&mut self, target: Option<&str>) -> Vec<String> {
        let Some(target) = target else {
            return vec!["ERROR: Examine what?".to_string()];
        };
        let here = self.current_id();

        if let Ok(item) = Item::from_str(target) {
            if self.store.has_item(item) || self.rooms[&here].items.contains(&item) {
                return vec![format!("{}: {}", item, quick_help(item))];
            }
        }

        if target == "puzzle" || target == "terminal" {
            let level = self.corruption.level();
            let Some(puzzle) = self.puzzles.unsolved_for_room(here).into_iter().next() else {
                return vec!["The terminal hums quietly. Nothing to solve here.".to_string()];
            };
            let mut lines = vec![
                format!("[PUZZLE] {}", puzzle.name),
                puzzle.prompt(level, &mut self.rng),
            ];
            if let Some(state) = self.puzzles.state(puzzle.id) {
                lines.push(format!("Attempts: {}", state.attempts));
            }
            return lines;
        }

        vec![format!("You see nothing special about {}.", target)]
    }

    fn do_load(&mut self) -> Vec<String> {
        if !self.store.reload() {
            return vec!["ERROR: No saved game to load.".to_string()];
        }
        self.rooms = room_copies(&self.graph);
        restore_floors(&mut self.rooms, &self.store.state().floors);
        self.sync_corruption();
        let mut lines = vec!["Game loaded.".to_string(), String::new()];
        lines.extend(self.describe(self.current_id()));
        lines
    }

    fn inventory_lines(&self) -> Vec<String> {
        let state = self.store.state();
        let mut lines = vec![String::new(), "COMMAND INVENTORY:".to_string()];
        if state.inventory.is_empty() {
            lines.push("  [empty]".to_string());
        } else {
            lines.extend(
                state
                    .inventory
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("  {}. {}", i + 1, item)),
            );
        }
        lines.push(format!("Memory: {}/{}", state.inventory.len(), state.max_inventory));
        lines
    }

    fn status_lines(&self) -> Vec<String> {
        let progress = self.puzzles.progress();
        let mut lines = vec![format!(
            "Puzzles solved: {}/{} ({}%)",
            progress.solved, progress.total, progress.percentage
        )];
        for room in RoomId::ALL {
            for puzzle in self.puzzles.list_for_room(room) {
                let state = self.puzzles.state(puzzle.id);
                let solved = state.is_some_and(|s| s.solved);
                let attempts = state.map_or(0, |s| s.attempts);
                let mark = if solved { "x" } else { " " };
                lines.push(format!(
                    "  [{}] {} ({}) - {} attempts",
                    mark, puzzle.name, room, attempts
                ));
            }
        }
        lines.push(format!("Corruption: {}%", self.store.state().corruption));
        lines
    }

    fn combo_lines(&self) -> Vec<String> {
        let discovered = self.combos.discovered();
        let total = self.combos.all_combos().len();
        let mut lines = vec!["DISCOVERED COMBINATIONS:".to_string()];
        if discovered.is_empty() {
            lines.push("  [none]".to_string());
        }
        for combo in &discovered {
            lines.push(format!(
                "  {} + {} = {} ({})",
                combo.inputs[0], combo.inputs[1], combo.name, combo.output
            ));
        }
        lines.push(format!(
            "{} combinations remain undiscovered.",
            total - discovered.len()
        ));
        lines
    }

    fn do_combine(&mut self, args: &[String]) -> Vec<String> {
        let (Some(first), Some(second)) = (args.first(), args.get(1)) else {
            return vec!["ERROR: Combine what? Usage: combine <X> with <Y>".to_string()];
        };
        let (Ok(a), Ok(b)) = (Item::from_str(first), Item::from_str(second)) else {
            return vec!["ERROR: Those are not commands.".to_string()];
        };
        if !self.store.has_item(a) || !self.store.has_item(b) {
            return vec!["ERROR: You need both commands to combine them.".to_string()];
        }

        let held = self.store.state().inventory.clone();
        let here = self.current_id();
        let combo = match self.combos.special(&[a, b], here) {
            Some(combo) => Some(combo),
            None => self.combos.try_combine(a, b),
        };
        let Some(combo) = combo else {
            let mut lines = vec!["These commands don't combine.".to_string()];
            lines.extend(self.combos.hint_for_partial_set(&held));
            return lines;
        };

        let mut lines: Vec<String> = combo.execution_text().lines().map(str::to_string).collect();
        lines.extend(self.apply_combo(&combo));
        lines
    }

    fn apply_combo(&mut self, combo: &CommandCombo) -> Vec<String> {
        match combo.id {
            ComboId::DeepSearch => {
                self.store.set_flag("found_hidden", true);
                vec!["[!] Hidden files surface from the depths.".to_string()]
            }
            ComboId::ForceKill => {
                self.adjust_corruption(-20);
                vec!["[!] Every rogue process dies at once. Corruption -20.".to_string()]
            }
            ComboId::Duplicate => {
                let Some(first) = self.store.state().inventory.first().copied() else {
                    return vec!["Nothing to duplicate.".to_string()];
                };
                if self.store.add_item(first) {
                    vec![format!("Duplicated: {}", first)]
                } else {
                    vec!["ERROR: Inventory full. The copy evaporates.".to_string()]
                }
            }
            ComboId::GodMode => {
                self.shield_turns = SHIELD_TURNS;
                vec![format!("[!] Corruption shield active for {} turns.", SHIELD_TURNS)]
            }
            ComboId::PipeDream => {
                if self.current_id() == RoomId::RootVault {
                    return vec!["The portal flickers and leads back here.".to_string()];
                }
                self.store.move_to_room(RoomId::RootVault);
                let mut lines = vec![
                    "A portal tears open and pulls you through...".to_string(),
                    String::new(),
                ];
                lines.extend(self.describe(RoomId::RootVault));
                lines
            }
            ComboId::MemoryLeak => {
                self.store.expand_inventory(MEMORY_LEAK_SLOTS);
                vec![format!(
                    "[!] Inventory expanded to {} slots.",
                    self.store.state().max_inventory
                )]
            }
            ComboId::RootReveal => {
                self.store.set_flag("root_revealed", true);
                [
                    "drwxr-xr-x  root root  /bin",
                    "drwxr-xr-x  root root  /dev",
                    "lrwxrwxrwx  root root  /dev/escape -> /freedom",
                    "drwx------  root root  /root",
                    "",
                    "The system was never real. Only the escape route is.",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect()
            }
        }
    }
}

fn room_copies(graph: &RoomGraph) -> BTreeMap<RoomId, Room> {
    graph
        .all_rooms()
        .into_iter()
        .map(|room| (room.id, room))
        .collect()
}

fn fresh_rooms(graph: &RoomGraph) -> Result<BTreeMap<RoomId, Room>> {
    let rooms = room_copies(graph);
    if let Some(missing) = RoomId::ALL.iter().find(|id| !rooms.contains_key(id)) {
        return Err(ParadoxError::RoomNotFound(missing.to_string()));
    }
    Ok(rooms)
}

/// Lay the recorded item lists over fresh catalog rooms.
fn restore_floors(rooms: &mut BTreeMap<RoomId, Room>, floors: &BTreeMap<RoomId, Vec<Item>>) {
    for (id, items) in floors {
        if let Some(room) = rooms.get_mut(id) {
            room.items = items.clone();
        }
    }
}
