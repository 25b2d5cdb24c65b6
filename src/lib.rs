//! Terminal Paradox: a text adventure inside a terminal that is falling apart.
//!
//! The library holds the whole simulation. [`game::Game`] wires the pieces
//! together; the binary only draws what it returns.

pub mod command;
pub mod config;
pub mod corruption;
pub mod error;
pub mod game;
pub mod puzzle;
pub mod room;
pub mod state;

pub use corruption::{CorruptionSimulator, CorruptionState, Effect};
pub use error::{ParadoxError, Result};
pub use game::{Game, RenderSnapshot, TurnOutput};
pub use state::{GameState, GameStateStore};
