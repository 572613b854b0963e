//! Warforge pipeline engine.
//!
//! - Runs the plan, implementation, verification and review stages in order
//! - Checkpoints each stage and records a repository cache marker
//! - Executes verification commands, sequentially or in parallel
//! - Decides the terminal outcome of a run

pub mod artifacts;
pub mod error;
pub mod gate;
pub mod payload;
pub mod pipeline;
pub mod runner;
pub mod stage;

pub use error::{PipelineError, PipelineResult};
pub use gate::{is_approved, verification_failed, GateVerdict, RunGate, RunOutcome};
pub use payload::{Checkpoint, RunMetrics, RunPayload, StageMetrics, StagePayloads};
pub use pipeline::{Pipeline, PipelineConfig, CHECKPOINT_FILE};
pub use runner::{run_commands, CommandResult, RunnerConfig, VerificationRunner};
pub use stage::{Stage, StageLayout};
