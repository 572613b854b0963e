//! Run context and the shared step context.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warforge_state::Task;

use crate::config::WarforgeConfig;

/// Execution mode recorded in run metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Fast,
    Safe,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Fast => "fast",
            ExecutionMode::Safe => "safe",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run configuration. Built once per invocation and only ever borrowed
/// by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub run_id: String,
    pub task: Task,
    pub repo_root: PathBuf,
    /// Directory that receives this run's artifacts and checkpoint.
    pub run_dir: PathBuf,
    pub mode: ExecutionMode,
    pub safe_mode: bool,
    pub fast_mode: bool,
    pub dry_run: bool,
}

impl RunContext {
    /// Build the context for `task`, placing the run directory under `runs_dir`.
    ///
    /// The run id is `run-<task_id>`; mode follows the fast-mode toggle.
    pub fn for_task(
        task: Task,
        repo_root: impl Into<PathBuf>,
        runs_dir: &Path,
        config: &WarforgeConfig,
    ) -> Self {
        let run_id = format!("run-{}", task.task_id);
        let run_dir = runs_dir.join(&run_id);
        let mode = if config.fast_mode {
            ExecutionMode::Fast
        } else {
            ExecutionMode::Safe
        };
        Self {
            run_id,
            task,
            repo_root: repo_root.into(),
            run_dir,
            mode,
            safe_mode: config.safe_mode,
            fast_mode: config.fast_mode,
            dry_run: config.dry_run,
        }
    }

    /// Same context with dry-run forced on.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = self.dry_run || dry_run;
        self
    }
}

/// Key under which a step's payload is published to later steps.
pub fn result_key(step_name: &str) -> String {
    format!("{step_name}_result")
}

/// Seed keys written before any step runs.
pub const SEED_KEYS: [&str; 4] = ["title", "description", "repo_root", "safe_mode"];

/// Mutable mapping threaded through every step of a run.
///
/// Seeded with the task title and description, the repository root and the
/// safe-mode flag. Each step's payload lands under `<step>_result`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedContext {
    values: Map<String, Value>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(ctx: &RunContext) -> Self {
        let mut shared = Self::new();
        shared.insert("title", Value::String(ctx.task.title.clone()));
        shared.insert("description", Value::String(ctx.task.description.clone()));
        shared.insert(
            "repo_root",
            Value::String(ctx.repo_root.to_string_lossy().into_owned()),
        );
        shared.insert("safe_mode", Value::Bool(ctx.safe_mode));
        shared
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Publish a step payload under its result key.
    pub fn insert_result(&mut self, step_name: &str, payload: Value) {
        self.values.insert(result_key(step_name), payload);
    }

    /// Payload published by `step_name`, if that step has run.
    pub fn result(&self, step_name: &str) -> Option<&Value> {
        self.values.get(&result_key(step_name))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Text the risk policy scans after a run: the accumulated context
    /// serialized with sorted keys.
    ///
    /// `repo_root` is the one key left out. It names where the checkout
    /// lives, not what the run produced, and a parent directory such as
    /// `/srv/infra/` or `/home/ci/` would otherwise trip a zone on every run.
    pub fn risk_text(&self) -> serde_json::Result<String> {
        let scanned: Map<String, Value> = self
            .values
            .iter()
            .filter(|(key, _)| key.as_str() != "repo_root")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::to_string(&scanned)
    }
}
