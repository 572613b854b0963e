//! Trait contract tests for StateStore and TaskQueue.
//!
//! Every backend runs the same assertions, so the in-memory fakes used by the
//! engine tests stay faithful to the filesystem implementations.

use warforge_state::fakes::{MemoryStateStore, MemoryTaskQueue};
use warforge_state::storage_traits::*;
use warforge_state::{FsStateStore, FsTaskQueue, StorageError};

// ===========================================================================
// StateStore contract
// ===========================================================================

async fn state_store_contract(store: &dyn StateStore) {
    assert!(store.get("cache/repo_index.json").await.unwrap().is_none());

    store.put("cache/repo_index.json", b"first").await.unwrap();
    assert_eq!(
        store.get("cache/repo_index.json").await.unwrap().unwrap(),
        b"first"
    );

    // Last writer wins
    store.put("cache/repo_index.json", b"second").await.unwrap();
    assert_eq!(
        store.get("cache/repo_index.json").await.unwrap().unwrap(),
        b"second"
    );

    store.delete("cache/repo_index.json").await.unwrap();
    assert!(store.get("cache/repo_index.json").await.unwrap().is_none());

    // Deleting twice is fine
    store.delete("cache/repo_index.json").await.unwrap();

    let err = store.put("", b"x").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey { .. }));
}

#[tokio::test]
async fn memory_state_store_contract() {
    let store = MemoryStateStore::new();
    state_store_contract(&store).await;
}

#[tokio::test]
async fn fs_state_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStateStore::new(dir.path());
    state_store_contract(&store).await;
}

#[tokio::test]
async fn memory_state_store_records_write_order() {
    let store = MemoryStateStore::new();
    store.put("a", b"1").await.unwrap();
    store.put("b", b"2").await.unwrap();
    store.put("a", b"3").await.unwrap();

    assert_eq!(store.write_log(), vec!["a", "b", "a"]);
    assert_eq!(store.get_string("a").as_deref(), Some("3"));
}

// ===========================================================================
// TaskQueue contract
// ===========================================================================

async fn task_queue_contract(queue: &dyn TaskQueue) {
    assert!(queue.pop_next().await.unwrap().is_none());
    assert!(queue.pending().await.unwrap().is_empty());

    let a = queue.add("fix login", "fix the login bug").await.unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = queue.add("add docs", "document the cli").await.unwrap();

    assert_eq!(a.title, "fix login");
    assert_eq!(a.description, "fix the login bug");
    assert_ne!(a.task_id, b.task_id);

    let pending = queue.pending().await.unwrap();
    assert_eq!(pending, vec![a.clone(), b.clone()]);

    assert_eq!(queue.pop_next().await.unwrap(), Some(a.clone()));
    assert_eq!(queue.pop_next().await.unwrap(), Some(b.clone()));
    assert!(queue.pop_next().await.unwrap().is_none());

    // Records outlive the pending queue
    assert_eq!(queue.get(&a.task_id).await.unwrap(), Some(a));
    assert_eq!(queue.get(&b.task_id).await.unwrap(), Some(b));
    assert!(queue.get("task-unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_task_queue_contract() {
    let queue = MemoryTaskQueue::new();
    task_queue_contract(&queue).await;
}

#[tokio::test]
async fn fs_task_queue_contract() {
    let dir = tempfile::tempdir().unwrap();
    let queue = FsTaskQueue::new(dir.path());
    task_queue_contract(&queue).await;
}

#[tokio::test]
async fn fs_task_queue_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let task = FsTaskQueue::new(dir.path())
        .add("persist", "survive a new handle")
        .await
        .unwrap();

    let reopened = FsTaskQueue::new(dir.path());
    assert_eq!(reopened.pending().await.unwrap(), vec![task.clone()]);
    assert_eq!(reopened.get(&task.task_id).await.unwrap(), Some(task));
}
