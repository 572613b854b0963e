//! Verification-stage steps.

use serde_json::{json, Value};

use super::{Step, StepResult};
use crate::context::SharedContext;

/// Context key holding the discovered verification commands, one string per
/// command.
pub const VERIFICATION_COMMANDS_KEY: &str = "verification_commands";

/// Echoes the queued verification commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestEngineerStep;

impl Step for TestEngineerStep {
    fn name(&self) -> &str {
        "test_engineer"
    }

    fn run(&self, context: &SharedContext) -> anyhow::Result<StepResult> {
        let commands = context
            .get(VERIFICATION_COMMANDS_KEY)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(StepResult::new(
            self.name(),
            json!({
                "status": "pending",
                "commands": commands,
                "notes": "Verification queued.",
            }),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvalQualityStep;

impl Step for EvalQualityStep {
    fn name(&self) -> &str {
        "eval_quality"
    }

    fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({
                "evals": ["smoke", "prompt", "golden"],
                "status": "ready",
            }),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpsObservabilityStep;

impl Step for OpsObservabilityStep {
    fn name(&self) -> &str {
        "ops_observability"
    }

    fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::new(
            self.name(),
            json!({
                "logging": "structured",
                "metrics": "enabled",
                "alerts": "baseline",
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engineer_echoes_commands() {
        let mut context = SharedContext::new();
        context.insert(VERIFICATION_COMMANDS_KEY, json!(["cargo test", "npm test"]));

        let result = TestEngineerStep.run(&context).unwrap();
        assert_eq!(result.payload["commands"], json!(["cargo test", "npm test"]));
        assert_eq!(result.payload["status"], "pending");
    }

    #[test]
    fn test_engineer_without_commands() {
        let result = TestEngineerStep.run(&SharedContext::new()).unwrap();
        assert_eq!(result.payload["commands"], json!([]));
    }
}
