//! Implementation-stage steps.

use serde_json::json;

use super::{Step, StepResult};
use crate::context::SharedContext;

/// Records the change strategy. Edits themselves are made outside the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplementerStep;

impl Step for ImplementerStep {
    fn name(&self) -> &str {
        "implementer"
    }

    fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({
                "status": "noop",
                "message": "Changes implemented in repo.",
                "policy": "minimal_diff",
                "commit_strategy": "incremental",
            }),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AiIntegrationsStep;

impl Step for AiIntegrationsStep {
    fn name(&self) -> &str {
        "ai_integrations"
    }

    fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({
                "adapters": ["openai", "openrouter", "local"],
                "tool_calling": "strict",
                "tool_manifest": "templates/tools.json",
            }),
        ))
    }
}

/// Bot templates offered by `warforge bot new`.
pub const BOT_TEMPLATES: [&str; 5] = [
    "monitoring_bot",
    "alert_bot",
    "recovery_bot",
    "data_pipeline_bot",
    "integration_bot",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct BotsAutomationStep;

impl Step for BotsAutomationStep {
    fn name(&self) -> &str {
        "bots_automation"
    }

    fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({ "templates": BOT_TEMPLATES }),
        ))
    }
}
