//! Per-run artifact files.
//!
//! Everything lands in the run directory as pretty-printed JSON, except
//! `commands.log` and the receipt. A payload section that is absent (a step
//! removed from the layout) is skipped rather than treated as an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use warforge_core::{PolicyResult, RestrictedZone, Task};

use crate::gate::APPROVAL_FILE;
use crate::payload::RunPayload;
use crate::runner::CommandResult;
use crate::stage::Stage;

pub const TASK_FILE: &str = "task.json";
pub const TEST_REPORT_FILE: &str = "test_report.json";
pub const RISK_REPORT_FILE: &str = "risk_report.json";
pub const COMMANDS_LOG_FILE: &str = "commands.log";
pub const PATCH_SUMMARY_FILE: &str = "patch_summary.json";
pub const APPROVAL_REQUEST_FILE: &str = "approval_request.json";

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    std::fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), "artifact written");
    Ok(())
}

pub fn write_task(run_dir: &Path, task: &Task) -> Result<PathBuf> {
    let path = run_dir.join(TASK_FILE);
    write_json(&path, task)?;
    Ok(path)
}

pub fn write_risk_report(run_dir: &Path, policy: &PolicyResult) -> Result<PathBuf> {
    let path = run_dir.join(RISK_REPORT_FILE);
    write_json(&path, policy)?;
    Ok(path)
}

/// Write the payload-derived reports: plan, repo map, workflow, risk,
/// eval, review and metrics. Returns the files written.
pub fn write_payload_artifacts(run_dir: &Path, payload: &RunPayload) -> Result<Vec<PathBuf>> {
    let sections: [(&str, Option<&Value>); 4] = [
        (
            "repo_map.json",
            payload
                .step(Stage::Plan, "repo_analyst")
                .and_then(|analyst| analyst.get("repo_map")),
        ),
        (
            "workflow.json",
            payload.step(Stage::Plan, "orchestration_architect"),
        ),
        (
            "eval_report.json",
            payload.step(Stage::Verification, "eval_quality"),
        ),
        ("review_report.json", payload.step(Stage::Review, "reviewer")),
    ];

    let mut written = Vec::new();

    let plan = run_dir.join("plan.json");
    write_json(&plan, &payload.plan)?;
    written.push(plan);

    for (file, section) in sections {
        let Some(section) = section else {
            debug!(file, "payload section absent, skipping artifact");
            continue;
        };
        let path = run_dir.join(file);
        write_json(&path, section)?;
        written.push(path);
    }

    written.push(write_risk_report(run_dir, &payload.policy)?);

    let metrics = run_dir.join("metrics.json");
    write_json(&metrics, &payload.metrics)?;
    written.push(metrics);

    Ok(written)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReportEntry {
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

/// Summary of the verification commands a run discovered and executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub commands: Vec<String>,
    pub results: Vec<TestReportEntry>,
    pub status: TestStatus,
}

impl TestReport {
    pub fn new(commands: Vec<String>, results: &[CommandResult]) -> Self {
        let status = if results.iter().all(CommandResult::passed) {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        };
        Self {
            commands,
            results: results
                .iter()
                .map(|result| TestReportEntry {
                    command: result.display_command(),
                    exit_code: result.exit_code,
                    duration_ms: result.duration_ms,
                })
                .collect(),
            status,
        }
    }

    pub fn write(&self, run_dir: &Path) -> Result<PathBuf> {
        let path = run_dir.join(TEST_REPORT_FILE);
        write_json(&path, self)?;
        Ok(path)
    }
}

/// `commands.log`: the invoking command, then each verification command
/// prefixed with `$ ` followed by its output.
pub fn render_commands_log(invocation: &str, results: &[CommandResult]) -> String {
    let mut lines = vec![invocation.to_string()];
    for result in results {
        lines.push(format!("$ {}", result.display_command()));
        lines.push(result.output.clone());
    }
    lines.join("\n")
}

pub fn write_commands_log(
    run_dir: &Path,
    invocation: &str,
    results: &[CommandResult],
) -> Result<PathBuf> {
    let path = run_dir.join(COMMANDS_LOG_FILE);
    std::fs::create_dir_all(run_dir).with_context(|| format!("create {}", run_dir.display()))?;
    std::fs::write(&path, render_commands_log(invocation, results))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub files: Vec<String>,
}

pub fn write_patch_summary(run_dir: &Path, files: &[String]) -> Result<PathBuf> {
    let path = run_dir.join(PATCH_SUMMARY_FILE);
    write_json(
        &path,
        &PatchSummary {
            files: files.to_vec(),
        },
    )?;
    Ok(path)
}

/// Written when a run is held for approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub run_id: String,
    pub restricted_zones: Vec<RestrictedZone>,
    pub status: String,
    pub message: String,
}

impl ApprovalRequest {
    pub fn new(run_id: impl Into<String>, policy: &PolicyResult) -> Self {
        Self {
            run_id: run_id.into(),
            restricted_zones: policy.restricted_zones.clone(),
            status: "required".to_string(),
            message: "Approval required before proceeding with restricted changes.".to_string(),
        }
    }

    pub fn write(&self, run_dir: &Path) -> Result<PathBuf> {
        let path = run_dir.join(APPROVAL_REQUEST_FILE);
        write_json(&path, self)?;
        Ok(path)
    }
}

/// Human sign-off; its presence in the run directory releases the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub run_id: String,
    pub approved_by: String,
    pub reason: String,
    pub approved_at: DateTime<Utc>,
}

impl ApprovalRecord {
    pub fn new(
        run_id: impl Into<String>,
        approved_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            approved_by: approved_by.into(),
            reason: reason.into(),
            approved_at: Utc::now(),
        }
    }

    pub fn write(&self, run_dir: &Path) -> Result<PathBuf> {
        let path = run_dir.join(APPROVAL_FILE);
        write_json(&path, self)?;
        Ok(path)
    }
}
