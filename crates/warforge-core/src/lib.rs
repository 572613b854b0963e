//! Warforge core library.
//!
//! Run context, steps, repository fingerprinting, the restricted-zone risk
//! policy and the supporting pieces the pipeline engine is built from.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod git;
pub mod obs;
pub mod policy;
pub mod receipt;
pub mod repo;
pub mod steps;
pub mod telemetry;
pub mod verification;

pub use cache::{CacheMarker, RepoCache, DEFAULT_CACHE_KEY};
pub use config::{parse_toggle, WarforgeConfig, DEFAULT_HOME, DEFAULT_RUNS_DIR};
pub use context::{result_key, ExecutionMode, RunContext, SharedContext};
pub use error::{Result, WarforgeError};
pub use fingerprint::{fingerprint_files, fingerprint_repo, fingerprint_repo_excluding, Fingerprint};
pub use git::{diff_names, diff_text, is_git_repo, working_tree_changes};
pub use policy::{
    detect_restricted_zones, evaluate_policy, PolicyResult, RestrictedZone, ZoneCatalog, ZoneRule,
};
pub use receipt::{render_receipt, write_receipt, ReceiptInput};
pub use repo::{
    build_repo_map, detect_stack, relative_repo_files, repo_files, repo_files_excluding,
    resolve_excluded, RepoMap, DEFAULT_TOOL_DIRS,
};
pub use steps::{BuiltinStep, Step, StepRegistry, StepResult};
pub use verification::{
    detect_verification_commands, display_command, CommandDiscovery, CommandLine,
    ManifestDiscovery, StaticDiscovery,
};

pub use warforge_state::{StateStore, Task, TaskQueue};
