use serde::Serialize;

use crate::room::{Direction, Item};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Move,
    Take,
    Use,
    Drop,
    Combine,
    Look,
    Examine,
    Inventory,
    Help,
    Save,
    Load,
    Reset,
    Quit,
    Solve,
    Hint,
    Status,
    Combos,
    Manual,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommand {
    pub kind: CommandType,
    pub direction: Option<Direction>,
    pub target: Option<String>,
    pub item: Option<Item>,
    pub args: Vec<String>,
    pub raw: String,
}

impl ParsedCommand {
    fn new(kind: CommandType, args: Vec<String>, raw: &str) -> Self {
        ParsedCommand {
            kind,
            direction: None,
            target: None,
            item: None,
            args,
            raw: raw.to_string(),
        }
    }

    /// First word of the input, lowercased.
    pub fn verb(&self) -> String {
        self.raw
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

pub fn direction_alias(token: &str) -> Option<Direction> {
    match token {
        "n" | "north" => Some(Direction::North),
        "s" | "south" => Some(Direction::South),
        "e" | "east" => Some(Direction::East),
        "w" | "west" => Some(Direction::West),
        "u" | "up" => Some(Direction::Up),
        "d" | "down" => Some(Direction::Down),
        _ => None,
    }
}

pub fn verb_alias(token: &str) -> Option<CommandType> {
    let kind = match token {
        "go" | "walk" | "move" => CommandType::Move,
        "take" | "get" | "grab" | "pickup" => CommandType::Take,
        "use" | "run" | "execute" | "apply" => CommandType::Use,
        "drop" | "discard" | "remove" => CommandType::Drop,
        "combine" | "merge" | "pipe" => CommandType::Combine,
        "look" | "l" => CommandType::Look,
        "examine" | "inspect" | "check" => CommandType::Examine,
        "inventory" | "i" | "inv" | "items" => CommandType::Inventory,
        "help" | "h" | "?" | "commands" => CommandType::Help,
        "save" => CommandType::Save,
        "load" => CommandType::Load,
        "reset" | "restart" => CommandType::Reset,
        "quit" | "exit" => CommandType::Quit,
        "solve" | "answer" | "submit" => CommandType::Solve,
        "hint" | "hints" | "clue" => CommandType::Hint,
        "puzzles" | "status" | "progress" => CommandType::Status,
        "combos" => CommandType::Combos,
        "man" => CommandType::Manual,
        _ => return None,
    };
    Some(kind)
}

/// Turn a line of player input into a structured command.
pub fn parse(input: &str) -> ParsedCommand {
    let lowered = input.trim().to_lowercase();
    let parts: Vec<String> = lowered.split_whitespace().map(str::to_string).collect();

    let Some((first, rest)) = parts.split_first() else {
        return ParsedCommand::new(CommandType::Unknown, Vec::new(), input);
    };
    let rest = rest.to_vec();

    if let Some(direction) = direction_alias(first) {
        let mut command = ParsedCommand::new(CommandType::Move, rest, input);
        command.direction = Some(direction);
        return command;
    }

    let kind = verb_alias(first).unwrap_or(CommandType::Unknown);
    let mut command = ParsedCommand::new(kind, rest, input);

    match kind {
        CommandType::Move => {
            command.direction = command.args.first().and_then(|t| direction_alias(t));
        }
        CommandType::Take | CommandType::Use | CommandType::Drop | CommandType::Examine => {
            if !command.args.is_empty() {
                command.target = Some(command.args.join(" "));
                command.item = Item::command(&command.args[0]);
            }
        }
        CommandType::Manual => {
            command.item = command.args.first().and_then(|t| Item::command(t));
        }
        CommandType::Combine => {
            if let Some(with) = command.args.iter().position(|t| t == "with") {
                if with > 0 && with < command.args.len() - 1 {
                    command.args = vec![
                        command.args[..with].join(" "),
                        command.args[with + 1..].join(" "),
                    ];
                }
            }
        }
        CommandType::Solve => {
            // Answers keep their original casing; regex answers depend on it.
            let answer = input
                .trim()
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim().to_string())
                .filter(|rest| !rest.is_empty());
            command.target = answer;
        }
        _ => {}
    }

    command
}
