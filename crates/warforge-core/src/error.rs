//! Domain-level error taxonomy for Warforge.

use std::path::PathBuf;

/// Warforge domain errors.
#[derive(Debug, thiserror::Error)]
pub enum WarforgeError {
    #[error("storage error: {0}")]
    Storage(#[from] warforge_state::StorageError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk repository at {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("git error: {0}")]
    Git(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Warforge domain operations.
pub type Result<T> = std::result::Result<T, WarforgeError>;
