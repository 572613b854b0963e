//! Storage trait definitions for Warforge
//!
//! These traits define the persistence seams used by the pipeline and CLI:
//! - `StateStore`: key-value bytes (cache marker, checkpoint)
//! - `TaskQueue`: task records plus a FIFO of pending tasks
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module; filesystem backends live in `fs`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A unit of requested work. Created by a `TaskQueue`, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task stamped with the current time.
    ///
    /// Ids are `task-<unix nanos>` so lexicographic order follows creation order.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let created_at = Utc::now();
        let nanos = created_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| created_at.timestamp_micros() * 1_000);
        Self {
            task_id: format!("task-{nanos:020}"),
            title: title.into(),
            description: description.into(),
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// StateStore: key-value persistence
// ---------------------------------------------------------------------------

/// Key-value byte store used for run bookkeeping.
///
/// Guarantees:
/// - `put` overwrites; the last writer wins.
/// - `get` returns `None` for a key never written (or deleted).
/// - No coordination between concurrent writers of the same key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the bytes stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store `data` under `key`, replacing any previous value.
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Remove `key`. No-op if absent.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// TaskQueue: task records and pending FIFO
// ---------------------------------------------------------------------------

/// Task persistence.
///
/// Guarantees:
/// - `add` records the task durably and appends it to the pending queue.
/// - `pop_next` returns the oldest pending task and removes it from the queue,
///   but the record remains available through `get`.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Create and enqueue a new task.
    async fn add(&self, title: &str, description: &str) -> StorageResult<Task>;

    /// Fetch a task record by id.
    async fn get(&self, task_id: &str) -> StorageResult<Option<Task>>;

    /// Dequeue the oldest pending task.
    async fn pop_next(&self) -> StorageResult<Option<Task>>;

    /// Pending tasks, oldest first.
    async fn pending(&self) -> StorageResult<Vec<Task>>;
}

pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}
