//! Stage definitions and the default step layout.

use std::fmt;

use serde::{Deserialize, Serialize};
use warforge_core::BuiltinStep;

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Plan,
    Implementation,
    Verification,
    Review,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Plan,
        Stage::Implementation,
        Stage::Verification,
        Stage::Review,
    ];

    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Implementation => "implementation",
            Stage::Verification => "verification",
            Stage::Review => "review",
        }
    }

    /// Builtin steps run by this stage by default.
    pub fn default_steps(&self) -> &'static [BuiltinStep] {
        match self {
            Stage::Plan => &[
                BuiltinStep::Router,
                BuiltinStep::RepoAnalyst,
                BuiltinStep::Planner,
                BuiltinStep::OrchestrationArchitect,
            ],
            Stage::Implementation => &[
                BuiltinStep::Implementer,
                BuiltinStep::AiIntegrations,
                BuiltinStep::BotsAutomation,
            ],
            Stage::Verification => &[
                BuiltinStep::TestEngineer,
                BuiltinStep::EvalQuality,
                BuiltinStep::OpsObservability,
            ],
            Stage::Review => &[BuiltinStep::Reviewer],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered step names for each stage.
///
/// Stage order is fixed; only membership varies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLayout {
    plan: Vec<String>,
    implementation: Vec<String>,
    verification: Vec<String>,
    review: Vec<String>,
}

impl StageLayout {
    /// Layout with no steps in any stage.
    pub fn empty() -> Self {
        Self {
            plan: Vec::new(),
            implementation: Vec::new(),
            verification: Vec::new(),
            review: Vec::new(),
        }
    }

    pub fn steps(&self, stage: Stage) -> &[String] {
        match stage {
            Stage::Plan => &self.plan,
            Stage::Implementation => &self.implementation,
            Stage::Verification => &self.verification,
            Stage::Review => &self.review,
        }
    }

    fn steps_mut(&mut self, stage: Stage) -> &mut Vec<String> {
        match stage {
            Stage::Plan => &mut self.plan,
            Stage::Implementation => &mut self.implementation,
            Stage::Verification => &mut self.verification,
            Stage::Review => &mut self.review,
        }
    }

    /// Replace the step list of `stage`.
    pub fn with_stage<I, S>(mut self, stage: Stage, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.steps_mut(stage) = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Drop `step` from whichever stage lists it.
    pub fn without_step(mut self, step: &str) -> Self {
        for stage in Stage::ALL {
            self.steps_mut(stage).retain(|name| name != step);
        }
        self
    }

    /// `(stage, step)` pairs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &str)> {
        Stage::ALL.into_iter().flat_map(move |stage| {
            self.steps(stage)
                .iter()
                .map(move |step| (stage, step.as_str()))
        })
    }
}

impl Default for StageLayout {
    fn default() -> Self {
        Stage::ALL.into_iter().fold(Self::empty(), |layout, stage| {
            layout.with_stage(stage, stage.default_steps().iter().map(|step| step.name()))
        })
    }
}
