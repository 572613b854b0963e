//! Structured lifecycle events for pipeline runs.
//!
//! Every event carries an `event` field (`run.started`, `stage.finished`, ...)
//! so JSON logs can be filtered by kind. Verbosity follows `WARFORGE_LOG`.

use tracing::{info, warn, Span};

/// Span tagging everything logged during a run with its id.
pub fn run_span(run_id: &str) -> Span {
    tracing::info_span!("warforge.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, mode: &str, dry_run: bool) {
    info!(event = "run.started", run_id = %run_id, mode = %mode, dry_run = dry_run);
}

pub fn emit_cache_checked(run_id: &str, fingerprint: &str, hit: bool) {
    info!(event = "cache.checked", run_id = %run_id, fingerprint = %fingerprint, hit = hit);
}

pub fn emit_stage_finished(run_id: &str, stage: &str, steps: usize, duration_ms: u64) {
    info!(
        event = "stage.finished",
        run_id = %run_id,
        stage = %stage,
        steps = steps,
        duration_ms = duration_ms,
    );
}

pub fn emit_checkpoint_written(run_id: &str, stage: &str) {
    info!(event = "checkpoint.written", run_id = %run_id, stage = %stage);
}

pub fn emit_policy_evaluated(run_id: &str, zones: &[&str], requires_approval: bool) {
    info!(
        event = "policy.evaluated",
        run_id = %run_id,
        zones = ?zones,
        requires_approval = requires_approval,
    );
}

pub fn emit_command_finished(command: &str, exit_code: i32, duration_ms: u64) {
    if exit_code == 0 {
        info!(event = "command.finished", command = %command, exit_code, duration_ms);
    } else {
        warn!(event = "command.finished", command = %command, exit_code, duration_ms);
    }
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, cache_hit: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        cache_hit = cache_hit,
    );
}
