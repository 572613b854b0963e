//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryStateStore` and `MemoryTaskQueue` that satisfy the trait
//! contracts without touching the filesystem.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryStateStore
// ---------------------------------------------------------------------------

/// In-memory key-value store backed by a `HashMap<key, bytes>`.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<Vec<String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in the order they were written, including overwrites.
    pub fn write_log(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Stored value decoded as UTF-8, for assertions.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        self.writes.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryTaskQueue
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct QueueState {
    records: BTreeMap<String, Task>,
    pending: VecDeque<String>,
}

/// In-memory task queue.
#[derive(Debug, Default)]
pub struct MemoryTaskQueue {
    state: Mutex<QueueState>,
}

impl MemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for MemoryTaskQueue {
    async fn add(&self, title: &str, description: &str) -> StorageResult<Task> {
        let task = Task::new(title, description);
        let mut state = self.state.lock().unwrap();
        state.records.insert(task.task_id.clone(), task.clone());
        state.pending.push_back(task.task_id.clone());
        Ok(task)
    }

    async fn get(&self, task_id: &str) -> StorageResult<Option<Task>> {
        Ok(self.state.lock().unwrap().records.get(task_id).cloned())
    }

    async fn pop_next(&self) -> StorageResult<Option<Task>> {
        let mut state = self.state.lock().unwrap();
        let Some(task_id) = state.pending.pop_front() else {
            return Ok(None);
        };
        Ok(state.records.get(&task_id).cloned())
    }

    async fn pending(&self) -> StorageResult<Vec<Task>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pending
            .iter()
            .filter_map(|id| state.records.get(id).cloned())
            .collect())
    }
}
