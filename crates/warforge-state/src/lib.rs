//! Warforge-State: persistence layer for the Warforge pipeline
//!
//! Everything a run keeps between invocations goes through the traits here,
//! so the engine never touches the filesystem directly and tests can swap in
//! the in-memory fakes.
//!
//! ## Key Components
//!
//! - `StateStore`: key-value bytes (cache marker, stage checkpoint)
//! - `TaskQueue`: task records and the pending FIFO
//! - `FsStateStore` / `FsTaskQueue`: JSON-on-disk backends
//! - `fakes`: in-memory implementations for tests

mod error;
pub mod fakes;
pub mod fs;
pub mod storage_traits;

pub use error::StorageError;
pub use fs::{FsStateStore, FsTaskQueue};
pub use storage_traits::{StateStore, StorageResult, Task, TaskQueue};
