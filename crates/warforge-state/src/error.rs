//! Error types for warforge-state

use thiserror::Error;

/// Errors raised by the state store and task queue backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key is empty or escapes the store root in a way the backend rejects
    #[error("invalid key: {key:?}")]
    InvalidKey { key: String },

    /// Task id does not exist in the queue's durable records
    #[error("task not found: {task_id}")]
    TaskNotFound { task_id: String },

    /// Filesystem error
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = StorageError::io(
            "/tmp/state/cache.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/state/cache.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_invalid_key_display() {
        let err = StorageError::InvalidKey { key: String::new() };
        assert!(err.to_string().contains("invalid key"));
    }
}
