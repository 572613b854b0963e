//! Pipeline steps.
//!
//! A step reads the shared context and returns a named payload. The engine
//! publishes that payload under `<name>_result` so every later step, in the
//! same stage or a later one, can read it.
//!
//! Builtin steps are grouped by the stage they run in by default:
//! - `plan`: router, repo_analyst, planner, orchestration_architect
//! - `implementation`: implementer, ai_integrations, bots_automation
//! - `verification`: test_engineer, eval_quality, ops_observability
//! - `review`: reviewer

pub mod implementation;
pub mod plan;
pub mod review;
pub mod verification;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::SharedContext;

/// Payload produced by one step invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub payload: Value,
}

impl StepResult {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// A pluggable unit of pipeline work.
pub trait Step: Send + Sync {
    /// Registry name; also determines the `<name>_result` context key.
    fn name(&self) -> &str;

    fn run(&self, context: &SharedContext) -> anyhow::Result<StepResult>;
}

/// Steps shipped with Warforge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStep {
    Router,
    RepoAnalyst,
    Planner,
    OrchestrationArchitect,
    Implementer,
    AiIntegrations,
    BotsAutomation,
    TestEngineer,
    EvalQuality,
    OpsObservability,
    Reviewer,
}

impl BuiltinStep {
    pub const ALL: [BuiltinStep; 11] = [
        BuiltinStep::Router,
        BuiltinStep::RepoAnalyst,
        BuiltinStep::Planner,
        BuiltinStep::OrchestrationArchitect,
        BuiltinStep::Implementer,
        BuiltinStep::AiIntegrations,
        BuiltinStep::BotsAutomation,
        BuiltinStep::TestEngineer,
        BuiltinStep::EvalQuality,
        BuiltinStep::OpsObservability,
        BuiltinStep::Reviewer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinStep::Router => "router",
            BuiltinStep::RepoAnalyst => "repo_analyst",
            BuiltinStep::Planner => "planner",
            BuiltinStep::OrchestrationArchitect => "orchestration_architect",
            BuiltinStep::Implementer => "implementer",
            BuiltinStep::AiIntegrations => "ai_integrations",
            BuiltinStep::BotsAutomation => "bots_automation",
            BuiltinStep::TestEngineer => "test_engineer",
            BuiltinStep::EvalQuality => "eval_quality",
            BuiltinStep::OpsObservability => "ops_observability",
            BuiltinStep::Reviewer => "reviewer",
        }
    }

    pub fn instantiate(&self) -> Arc<dyn Step> {
        match self {
            BuiltinStep::Router => Arc::new(plan::RouterStep),
            BuiltinStep::RepoAnalyst => Arc::new(plan::RepoAnalystStep),
            BuiltinStep::Planner => Arc::new(plan::PlannerStep),
            BuiltinStep::OrchestrationArchitect => Arc::new(plan::OrchestrationArchitectStep),
            BuiltinStep::Implementer => Arc::new(implementation::ImplementerStep),
            BuiltinStep::AiIntegrations => Arc::new(implementation::AiIntegrationsStep),
            BuiltinStep::BotsAutomation => Arc::new(implementation::BotsAutomationStep),
            BuiltinStep::TestEngineer => Arc::new(verification::TestEngineerStep),
            BuiltinStep::EvalQuality => Arc::new(verification::EvalQualityStep),
            BuiltinStep::OpsObservability => Arc::new(verification::OpsObservabilityStep),
            BuiltinStep::Reviewer => Arc::new(review::ReviewerStep),
        }
    }
}

impl fmt::Display for BuiltinStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name-indexed collection of steps.
#[derive(Clone, Default)]
pub struct StepRegistry {
    steps: BTreeMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every builtin step.
    pub fn builtin() -> Self {
        BuiltinStep::ALL
            .iter()
            .fold(Self::empty(), |registry, step| {
                registry.with_step(step.instantiate())
            })
    }

    /// Register `step` under its own name, replacing any step already there.
    pub fn insert(&mut self, step: Arc<dyn Step>) -> Option<Arc<dyn Step>> {
        self.steps.insert(step.name().to_string(), step)
    }

    pub fn with_step(mut self, step: Arc<dyn Step>) -> Self {
        self.insert(step);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Step>> {
        self.steps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Step for Echo {
        fn name(&self) -> &str {
            "router"
        }

        fn run(&self, _context: &SharedContext) -> anyhow::Result<StepResult> {
            Ok(StepResult::new("router", json!({"echo": true})))
        }
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let registry = StepRegistry::builtin();
        assert_eq!(registry.names().count(), BuiltinStep::ALL.len());
        for step in BuiltinStep::ALL {
            assert!(registry.contains(step.name()), "missing {step}");
        }
    }

    #[test]
    fn test_instantiated_step_reports_its_name() {
        for step in BuiltinStep::ALL {
            assert_eq!(step.instantiate().name(), step.name());
        }
    }

    #[test]
    fn test_insert_replaces_existing_step() {
        let mut registry = StepRegistry::builtin();
        let previous = registry.insert(Arc::new(Echo));
        assert!(previous.is_some());

        let result = registry
            .get("router")
            .unwrap()
            .run(&SharedContext::new())
            .unwrap();
        assert_eq!(result.payload["echo"], true);
    }

    #[test]
    fn test_builtin_payloads_trip_no_zones_on_empty_repo() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = SharedContext::new();
        context.insert("title", json!("Add a button"));
        context.insert("description", json!("Add a button"));
        context.insert("repo_root", json!(dir.path().to_string_lossy()));
        context.insert("safe_mode", json!(true));
        context.insert("verification_commands", json!([]));

        for step in BuiltinStep::ALL {
            let result = step.instantiate().run(&context).unwrap();
            context.insert_result(&result.name, result.payload);
        }

        let paths: [&str; 0] = [];
        let zones = crate::policy::detect_restricted_zones(&paths, &context.risk_text().unwrap());
        assert!(zones.is_empty(), "unexpected zones: {zones:?}");
    }

    #[test]
    fn test_empty_registry() {
        let registry = StepRegistry::empty();
        assert!(!registry.contains("router"));
        assert!(registry.get("router").is_none());
    }
}
