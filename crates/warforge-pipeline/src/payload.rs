//! Run payload: the engine's terminal output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warforge_core::{ExecutionMode, PolicyResult};

use crate::stage::Stage;

/// Step name to payload, for one stage.
pub type StagePayloads = Map<String, Value>;

/// Timing for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMetrics {
    pub duration_ms: u64,
    /// Steps the stage ran, in order.
    pub agents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub stages: BTreeMap<String, StageMetrics>,
    pub cache_hit: bool,
    /// Steps are never retried; always zero.
    pub retries_count: u32,
    pub total_duration_ms: u64,
    pub mode: ExecutionMode,
    pub generated_at: DateTime<Utc>,
}

/// Snapshot of the most recently completed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub stage: Stage,
    pub payload: StagePayloads,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPayload {
    pub plan: StagePayloads,
    pub implementation: StagePayloads,
    pub verification: StagePayloads,
    pub review: StagePayloads,
    pub policy: PolicyResult,
    pub metrics: RunMetrics,
}

impl RunPayload {
    pub fn stage(&self, stage: Stage) -> &StagePayloads {
        match stage {
            Stage::Plan => &self.plan,
            Stage::Implementation => &self.implementation,
            Stage::Verification => &self.verification,
            Stage::Review => &self.review,
        }
    }

    /// Payload of `step` from `stage`, if it ran there.
    pub fn step(&self, stage: Stage, step: &str) -> Option<&Value> {
        self.stage(stage).get(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_json_shape() {
        let mut plan = Map::new();
        plan.insert("router".into(), json!({"task_type": "feature"}));
        let payload = RunPayload {
            plan,
            implementation: Map::new(),
            verification: Map::new(),
            review: Map::new(),
            policy: PolicyResult {
                restricted_zones: vec![],
                requires_approval: false,
                safe_mode: true,
            },
            metrics: RunMetrics {
                stages: BTreeMap::new(),
                cache_hit: false,
                retries_count: 0,
                total_duration_ms: 5,
                mode: ExecutionMode::Fast,
                generated_at: Utc::now(),
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        for key in ["plan", "implementation", "verification", "review", "policy", "metrics"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["policy"], json!({"restricted_zones": [], "requires_approval": false}));
        assert_eq!(value["metrics"]["mode"], "fast");
        assert_eq!(payload.step(Stage::Plan, "router").unwrap()["task_type"], "feature");
    }
}
