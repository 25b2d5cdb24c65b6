use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomId {
    BootSequence,
    FileMaze,
    ProcessPrison,
    MemoryLeak,
    RootVault,
}

impl RoomId {
    pub const ALL: [RoomId; 5] = [
        RoomId::BootSequence,
        RoomId::FileMaze,
        RoomId::ProcessPrison,
        RoomId::MemoryLeak,
        RoomId::RootVault,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomId::BootSequence => "boot-sequence",
            RoomId::FileMaze => "file-maze",
            RoomId::ProcessPrison => "process-prison",
            RoomId::MemoryLeak => "memory-leak",
            RoomId::RootVault => "root-vault",
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command-name token the player can carry.
///
/// The first eight variants are the command items proper. `Ps`, `Free` and
/// `Malloc` only show up as room clutter and combination inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    Ls,
    Grep,
    Chmod,
    Sudo,
    Cat,
    Echo,
    Pipe,
    Kill,
    Ps,
    Free,
    Malloc,
}

impl Item {
    pub const COMMANDS: [Item; 8] = [
        Item::Ls,
        Item::Grep,
        Item::Chmod,
        Item::Sudo,
        Item::Cat,
        Item::Echo,
        Item::Pipe,
        Item::Kill,
    ];

    pub const ALL: [Item; 11] = [
        Item::Ls,
        Item::Grep,
        Item::Chmod,
        Item::Sudo,
        Item::Cat,
        Item::Echo,
        Item::Pipe,
        Item::Kill,
        Item::Ps,
        Item::Free,
        Item::Malloc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Item::Ls => "ls",
            Item::Grep => "grep",
            Item::Chmod => "chmod",
            Item::Sudo => "sudo",
            Item::Cat => "cat",
            Item::Echo => "echo",
            Item::Pipe => "pipe",
            Item::Kill => "kill",
            Item::Ps => "ps",
            Item::Free => "free",
            Item::Malloc => "malloc",
        }
    }

    /// Parse one of the eight command items; auxiliary tokens yield `None`.
    pub fn command(token: &str) -> Option<Item> {
        Item::COMMANDS.iter().copied().find(|i| i.as_str() == token)
    }

    pub fn is_command(&self) -> bool {
        Item::COMMANDS.contains(self)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Item {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Item::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub ascii: Option<String>,
    #[serde(default)]
    pub exits: BTreeMap<Direction, RoomId>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub puzzles: Vec<String>,
    #[serde(default)]
    pub corrupted: bool,
}

impl Room {
    /// Exit directions in a stable order, for display.
    pub fn exit_names(&self) -> Vec<&'static str> {
        self.exits.keys().map(Direction::as_str).collect()
    }

    /// Remove one occurrence of `item` from the room floor.
    pub fn take_item(&mut self, item: Item) -> bool {
        match self.items.iter().position(|i| *i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogMeta {
    pub start: RoomId,
}

/// On-disk shape of the room catalog.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub meta: CatalogMeta,
    #[serde(rename = "room")]
    pub rooms: Vec<Room>,
}
