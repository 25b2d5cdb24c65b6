pub mod graph;
pub mod loader;
pub mod types;

pub use graph::RoomGraph;
pub use loader::{load_catalog, BUILTIN_CATALOG};
pub use types::{Direction, Item, Room, RoomId};
