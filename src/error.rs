use thiserror::Error;

/// Errors surfaced by the simulation layer.
///
/// Gameplay problems (blocked exits, bad puzzle answers) are never errors;
/// they come back as ordinary output. These variants cover catalog defects
/// and the snapshot store.
#[derive(Debug, Error)]
pub enum ParadoxError {
    /// A room id that is not in the catalog.
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// The embedded room catalog failed to parse.
    #[error("room catalog parse error: {0}")]
    CatalogParse(#[from] toml::de::Error),

    /// The room catalog parsed but violates an invariant (dangling exit, unreachable room).
    #[error("invalid room catalog: {0}")]
    InvalidCatalog(String),

    /// Wrapper around IO errors against the snapshot file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failure.
    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot carried a schema version we do not understand.
    #[error("snapshot version mismatch: expected {expected}, got {found}")]
    VersionMismatch {
        expected: &'static str,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, ParadoxError>;
