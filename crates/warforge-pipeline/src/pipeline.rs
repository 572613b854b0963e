//! Stage sequencing, checkpointing and run payload assembly.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, Instrument};
use warforge_core::steps::verification::VERIFICATION_COMMANDS_KEY;
use warforge_core::{
    display_command, evaluate_policy, fingerprint_repo_excluding, obs, CommandDiscovery, ManifestDiscovery,
    PolicyResult, RepoCache, RunContext, SharedContext, StepRegistry, DEFAULT_CACHE_KEY,
    DEFAULT_TOOL_DIRS,
};
use warforge_state::StateStore;

use crate::error::{PipelineError, PipelineResult};
use crate::payload::{Checkpoint, RunMetrics, RunPayload, StageMetrics, StagePayloads};
use crate::stage::{Stage, StageLayout};

/// Default checkpoint file name inside the run directory.
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Where the engine keeps its persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Store key of the repository cache marker.
    pub cache_key: String,
    /// Checkpoint file name, joined onto the run directory.
    pub checkpoint_file: String,
    /// Tool-owned directories left out of the repository fingerprint.
    /// Relative entries are taken from the repository root.
    pub excluded_dirs: Vec<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            checkpoint_file: CHECKPOINT_FILE.to_string(),
            excluded_dirs: DEFAULT_TOOL_DIRS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl PipelineConfig {
    /// Store key of the checkpoint for a run directory.
    pub fn checkpoint_key(&self, run_dir: &Path) -> String {
        run_dir
            .join(&self.checkpoint_file)
            .to_string_lossy()
            .into_owned()
    }

    /// Directories skipped when fingerprinting `ctx`'s repository: the
    /// configured ones, the cache marker's directory and the runs directory.
    pub fn fingerprint_exclusions(&self, ctx: &RunContext) -> Vec<PathBuf> {
        let mut excluded = self.excluded_dirs.clone();
        let written = [Path::new(&self.cache_key).parent(), ctx.run_dir.parent()];
        excluded.extend(
            written
                .into_iter()
                .flatten()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf),
        );
        excluded
    }
}

/// Pipeline engine.
///
/// Runs the four stages in order, one step at a time, against a shared
/// context. Persisted state (cache marker, checkpoint) goes through the
/// injected store.
pub struct Pipeline {
    registry: StepRegistry,
    layout: StageLayout,
    store: Arc<dyn StateStore>,
    discovery: Arc<dyn CommandDiscovery>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline, rejecting layouts that name unknown steps or list a
    /// step twice.
    pub fn new(
        registry: StepRegistry,
        layout: StageLayout,
        store: Arc<dyn StateStore>,
        discovery: Arc<dyn CommandDiscovery>,
        config: PipelineConfig,
    ) -> PipelineResult<Self> {
        let mut seen = HashSet::new();
        for (stage, step) in layout.iter() {
            if !registry.contains(step) {
                return Err(PipelineError::UnknownStep {
                    stage: stage.name().to_string(),
                    step: step.to_string(),
                });
            }
            if !seen.insert(step) {
                return Err(PipelineError::DuplicateStep {
                    step: step.to_string(),
                });
            }
        }

        Ok(Self {
            registry,
            layout,
            store,
            discovery,
            config,
        })
    }

    /// Builtin steps, default layout, manifest-based command discovery.
    pub fn builtin(store: Arc<dyn StateStore>, config: PipelineConfig) -> PipelineResult<Self> {
        Self::new(
            StepRegistry::builtin(),
            StageLayout::default(),
            store,
            Arc::new(ManifestDiscovery),
            config,
        )
    }

    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute every stage for `ctx` and assemble the run payload.
    pub async fn run(&self, ctx: &RunContext) -> PipelineResult<RunPayload> {
        let span = obs::run_span(&ctx.run_id);
        self.run_stages(ctx).instrument(span).await
    }

    async fn run_stages(&self, ctx: &RunContext) -> PipelineResult<RunPayload> {
        let start = Instant::now();
        obs::emit_run_started(&ctx.run_id, ctx.mode.as_str(), ctx.dry_run);

        let excluded = self.config.fingerprint_exclusions(ctx);
        let fingerprint = fingerprint_repo_excluding(&ctx.repo_root, &excluded)
            .map_err(PipelineError::Fingerprint)?;
        let cache = RepoCache::new(self.store.clone(), self.config.cache_key.clone());
        let cache_hit = cache.check_and_record(&fingerprint).await?;
        obs::emit_cache_checked(&ctx.run_id, fingerprint.short(), cache_hit);

        let mut shared = SharedContext::seeded(ctx);
        let mut results: BTreeMap<Stage, StagePayloads> = BTreeMap::new();
        let mut stage_metrics = BTreeMap::new();

        for stage in Stage::ALL {
            let stage_start = Instant::now();
            let steps = self.layout.steps(stage);
            let payloads = self.run_stage(stage, steps, &mut shared)?;
            let duration_ms = stage_start.elapsed().as_millis() as u64;

            self.write_checkpoint(ctx, stage, &payloads).await?;
            obs::emit_stage_finished(&ctx.run_id, stage.name(), steps.len(), duration_ms);

            stage_metrics.insert(
                stage.name().to_string(),
                StageMetrics {
                    duration_ms,
                    agents: steps.to_vec(),
                },
            );
            results.insert(stage, payloads);

            if stage == Stage::Plan {
                self.inject_verification_commands(ctx, &mut shared);
            }
        }

        let policy = self.evaluate_policy(ctx, &shared)?;
        let total_duration_ms = start.elapsed().as_millis() as u64;
        obs::emit_run_finished(&ctx.run_id, total_duration_ms, cache_hit);

        let mut take = |stage: Stage| results.remove(&stage).unwrap_or_default();
        Ok(RunPayload {
            plan: take(Stage::Plan),
            implementation: take(Stage::Implementation),
            verification: take(Stage::Verification),
            review: take(Stage::Review),
            policy,
            metrics: RunMetrics {
                stages: stage_metrics,
                cache_hit,
                retries_count: 0,
                total_duration_ms,
                mode: ctx.mode,
                generated_at: Utc::now(),
            },
        })
    }

    fn run_stage(
        &self,
        stage: Stage,
        steps: &[String],
        shared: &mut SharedContext,
    ) -> PipelineResult<StagePayloads> {
        let mut payloads = Map::new();
        for name in steps {
            let step = self
                .registry
                .get(name)
                .ok_or_else(|| PipelineError::UnknownStep {
                    stage: stage.name().to_string(),
                    step: name.clone(),
                })?;

            debug!(stage = %stage, step = %name, "running step");
            let result = step.run(shared).map_err(|source| PipelineError::Step {
                step: name.clone(),
                source,
            })?;

            shared.insert_result(name, result.payload.clone());
            payloads.insert(name.clone(), result.payload);
        }
        Ok(payloads)
    }

    async fn write_checkpoint(
        &self,
        ctx: &RunContext,
        stage: Stage,
        payloads: &StagePayloads,
    ) -> PipelineResult<()> {
        let checkpoint = Checkpoint {
            stage,
            payload: payloads.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&checkpoint)?;
        let key = self.config.checkpoint_key(&ctx.run_dir);
        self.store.put(&key, &bytes).await?;
        obs::emit_checkpoint_written(&ctx.run_id, stage.name());
        Ok(())
    }

    fn inject_verification_commands(&self, ctx: &RunContext, shared: &mut SharedContext) {
        let commands: Vec<Value> = self
            .discovery
            .discover(&ctx.repo_root)
            .iter()
            .map(|command| Value::String(display_command(command)))
            .collect();
        info!(count = commands.len(), "verification commands discovered");
        shared.insert(VERIFICATION_COMMANDS_KEY, Value::Array(commands));
    }

    /// Policy over the analyst's file list (empty when absent) and the
    /// serialized shared context.
    fn evaluate_policy(
        &self,
        ctx: &RunContext,
        shared: &SharedContext,
    ) -> PipelineResult<PolicyResult> {
        let paths: Vec<String> = shared
            .result("repo_analyst")
            .and_then(|result| result.get("repo_files"))
            .and_then(Value::as_array)
            .map(|files| {
                files
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let diff_text = shared.risk_text()?;

        let policy = evaluate_policy(&paths, &diff_text, ctx.safe_mode);
        obs::emit_policy_evaluated(&ctx.run_id, &policy.zone_names(), policy.requires_approval);
        Ok(policy)
    }
}
