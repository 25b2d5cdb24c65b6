pub mod snapshot;
pub mod store;
pub mod types;

pub use snapshot::{FileSnapshot, MemorySnapshot, NoSnapshot, SnapshotStore, SNAPSHOT_VERSION};
pub use store::{GameStateStore, SubscriptionId, CORRUPTION_WARNING};
pub use types::{
    format_duration, GameState, DEFAULT_MAX_INVENTORY, HISTORY_CAPACITY, MAX_CORRUPTION,
};
