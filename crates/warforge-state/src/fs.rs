//! Filesystem-backed implementations of the storage traits.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::storage_traits::{validate_key, StateStore, StorageResult, Task, TaskQueue};

/// Write `data` to `path` atomically: temp file in the same directory, then rename.
fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StorageError::io(&dir, e))?;
    tmp.write_all(data).map_err(|e| StorageError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}

fn read_optional(path: &Path) -> StorageResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

fn remove_optional(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

// ---------------------------------------------------------------------------
// FsStateStore
// ---------------------------------------------------------------------------

/// Key-value store mapping keys to files.
///
/// Relative keys resolve under `root`; absolute keys are used as-is, so a run
/// directory outside the root can still hold its checkpoint.
#[derive(Debug, Clone)]
pub struct FsStateStore {
    root: PathBuf,
}

impl FsStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl StateStore for FsStateStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        read_optional(&self.path_for(key))
    }

    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        write_atomic(&path, data)?;
        debug!(key = %key, bytes = data.len(), "state written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        remove_optional(&self.path_for(key))
    }
}

// ---------------------------------------------------------------------------
// FsTaskQueue
// ---------------------------------------------------------------------------

/// Task queue stored as JSON files.
///
/// Layout:
/// - `<home>/tasks/<task_id>.json` durable task records
/// - `<home>/queue/<task_id>.json` pending entries, popped oldest-first
#[derive(Debug, Clone)]
pub struct FsTaskQueue {
    tasks_dir: PathBuf,
    queue_dir: PathBuf,
}

impl FsTaskQueue {
    pub fn new(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        Self {
            tasks_dir: home.join("tasks"),
            queue_dir: home.join("queue"),
        }
    }

    fn record_path(&self, task_id: &str) -> PathBuf {
        self.tasks_dir.join(format!("{task_id}.json"))
    }

    fn queue_path(&self, task_id: &str) -> PathBuf {
        self.queue_dir.join(format!("{task_id}.json"))
    }

    fn read_task(path: &Path) -> StorageResult<Option<Task>> {
        match read_optional(path)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn queued_paths(&self) -> StorageResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.queue_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.queue_dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.queue_dir, e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[async_trait]
impl TaskQueue for FsTaskQueue {
    async fn add(&self, title: &str, description: &str) -> StorageResult<Task> {
        let task = Task::new(title, description);
        let bytes = serde_json::to_vec_pretty(&task)?;
        write_atomic(&self.record_path(&task.task_id), &bytes)?;
        write_atomic(&self.queue_path(&task.task_id), &bytes)?;
        debug!(task_id = %task.task_id, "task queued");
        Ok(task)
    }

    async fn get(&self, task_id: &str) -> StorageResult<Option<Task>> {
        Self::read_task(&self.record_path(task_id))
    }

    async fn pop_next(&self) -> StorageResult<Option<Task>> {
        let Some(path) = self.queued_paths()?.into_iter().next() else {
            return Ok(None);
        };
        let task = Self::read_task(&path)?;
        remove_optional(&path)?;
        Ok(task)
    }

    async fn pending(&self) -> StorageResult<Vec<Task>> {
        let mut tasks = Vec::new();
        for path in self.queued_paths()? {
            if let Some(task) = Self::read_task(&path)? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}
