//! Run gate: turns verification results and policy into a terminal outcome.

use std::path::Path;

use serde::{Deserialize, Serialize};
use warforge_core::PolicyResult;

use crate::runner::CommandResult;

/// File whose presence in a run directory grants approval.
pub const APPROVAL_FILE: &str = "approval.json";

/// Terminal state of a run as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    VerificationFailed,
    ApprovalRequired,
}

impl RunOutcome {
    /// Process exit status: 0, 1 or 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Success => 0,
            RunOutcome::VerificationFailed => 1,
            RunOutcome::ApprovalRequired => 2,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

/// Gate evaluation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub outcome: RunOutcome,

    /// Reasons the run did not succeed (empty on success).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Whether any verification command exited non-zero.
pub fn verification_failed(results: &[CommandResult]) -> bool {
    results.iter().any(|result| !result.passed())
}

/// Whether `run_dir` holds an approval record.
pub fn is_approved(run_dir: &Path) -> bool {
    run_dir.join(APPROVAL_FILE).exists()
}

/// Run gate rules.
pub struct RunGate;

impl RunGate {
    /// Decide the outcome of a run.
    ///
    /// Gate rule:
    /// - Outside dry-run, any non-zero verification exit fails the run.
    /// - Otherwise, a policy requiring approval holds the run unless it has
    ///   already been approved.
    /// - Anything else succeeds.
    pub fn evaluate(
        dry_run: bool,
        results: &[CommandResult],
        policy: &PolicyResult,
        approved: bool,
    ) -> GateVerdict {
        if !dry_run && verification_failed(results) {
            let violations: Vec<String> = results
                .iter()
                .filter(|result| !result.passed())
                .map(|result| {
                    format!(
                        "'{}' exited with code {}",
                        result.display_command(),
                        result.exit_code
                    )
                })
                .collect();
            return GateVerdict {
                outcome: RunOutcome::VerificationFailed,
                message: format!("Verification failed with {} failing command(s)", violations.len()),
                violations,
            };
        }

        if policy.requires_approval && !approved {
            return GateVerdict {
                outcome: RunOutcome::ApprovalRequired,
                violations: policy
                    .zone_names()
                    .into_iter()
                    .map(|zone| format!("restricted zone touched: {zone}"))
                    .collect(),
                message: "Approval required before proceeding with restricted changes".to_string(),
            };
        }

        GateVerdict {
            outcome: RunOutcome::Success,
            violations: Vec::new(),
            message: "Run passed".to_string(),
        }
    }
}
