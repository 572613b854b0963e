//! Plan-stage steps: classify the task, survey the repository, lay out the
//! work.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde_json::json;

use super::{Step, StepResult};
use crate::context::SharedContext;
use crate::policy::detect_restricted_zones;
use crate::repo::{build_repo_map, detect_stack, relative_repo_files};
use crate::verification::{detect_verification_commands, display_command};

/// Number of repository files listed in the analyst payload.
pub const ANALYST_FILE_LIMIT: usize = 50;

/// Classifies the task from its description and picks a workflow template.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterStep;

/// Task category inferred from free-form description text. Later matches win.
pub fn classify_task(description: &str) -> &'static str {
    let description = description.to_lowercase();
    let mut task_type = "feature";
    if description.contains("bug") {
        task_type = "bugfix";
    }
    if description.contains("infra") || description.contains("deploy") {
        task_type = "infra";
    }
    if description.contains("bot") {
        task_type = "bot";
    }
    if description.contains("eval") || description.contains("test") {
        task_type = "eval";
    }
    task_type
}

impl Step for RouterStep {
    fn name(&self) -> &str {
        "router"
    }

    fn run(&self, context: &SharedContext) -> anyhow::Result<StepResult> {
        let task_type = classify_task(context.get_str("description").unwrap_or_default());
        let policy = if context.get_bool("safe_mode").unwrap_or(true) {
            "safe"
        } else {
            "fast"
        };
        let workflow_template = match task_type {
            "bot" | "eval" => "swarm",
            _ => "supervisor",
        };

        Ok(StepResult::new(
            self.name(),
            json!({
                "task_type": task_type,
                "policy": policy,
                "workflow_template": workflow_template,
            }),
        ))
    }
}

/// Surveys the repository: stack, test scripts, files, restricted paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoAnalystStep;

impl Step for RepoAnalystStep {
    fn name(&self) -> &str {
        "repo_analyst"
    }

    fn run(&self, context: &SharedContext) -> anyhow::Result<StepResult> {
        let repo_root = context
            .get_str("repo_root")
            .map(PathBuf::from)
            .context("repo_root missing from shared context")?;
        analyze(&repo_root)
    }
}

fn analyze(repo_root: &Path) -> anyhow::Result<StepResult> {
    let files = relative_repo_files(repo_root)
        .with_context(|| format!("failed to list {}", repo_root.display()))?;
    let scripts: Vec<String> = detect_verification_commands(repo_root)
        .iter()
        .map(|command| display_command(command))
        .collect();
    let restricted = detect_restricted_zones(&files, "");
    let repo_map = build_repo_map(repo_root)?;

    Ok(StepResult::new(
        "repo_analyst",
        json!({
            "stack": detect_stack(repo_root),
            "scripts": scripts,
            "repo_files": files.iter().take(ANALYST_FILE_LIMIT).collect::<Vec<_>>(),
            // Checkout location is left out; only repo-relative paths travel.
            "repo_map": {
                "files": repo_map.files,
                "entry_points": repo_map.entry_points,
                "workflows": repo_map.workflows,
            },
            "restricted_zones": restricted,
        }),
    ))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlannerStep;

impl Step for PlannerStep {
    fn name(&self) -> &str {
        "planner"
    }

    fn run(&self, context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({
                "objective": context.get_str("title"),
                "done_checks": ["demo_pipeline_runs", "receipt_generated", "tests_pass"],
                "milestones": [
                    "analyze repo",
                    "generate workflow",
                    "implement changes",
                    "run verification",
                ],
                "file_targets": ["README.md"],
                "rollback_plan": "Revert the run commit and restore artifacts from the last green run.",
                "speed_plan": {
                    "parallel_steps": ["repo_analysis", "doc_scan"],
                    "cache": ["repo_index", "test_results"],
                },
            }),
        ))
    }
}

/// Describes the supervising workflow and its gates.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestrationArchitectStep;

impl Step for OrchestrationArchitectStep {
    fn name(&self) -> &str {
        "orchestration_architect"
    }

    fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({
                "pattern": "supervisor",
                "agents": [
                    "router",
                    "repo_analyst",
                    "planner",
                    "implementer",
                    "test_engineer",
                    "reviewer",
                ],
                "gates": [
                    "plan_complete",
                    "implementation_complete",
                    "verification_complete",
                ],
                "tools": ["git", "package_manager"],
            }),
        ))
    }
}
