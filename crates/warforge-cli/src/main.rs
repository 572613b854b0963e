//! Warforge - change, verify, gate and report pipeline for code repositories
//!
//! ## Commands
//!
//! - `queue add` / `queue list`: manage pending tasks
//! - `run`: run the pipeline for a task, verify, gate and write a receipt
//! - `verify`: run the repository's verification commands
//! - `approve`: sign off a run held for approval
//! - `speed` / `safe` / `dry-run`: toggle persisted run modes
//!
//! Exit status: 0 success, 1 verification failure (or no task), 2 approval
//! required.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn, Level};

use warforge_core::steps::implementation::BOT_TEMPLATES;
use warforge_core::{
    build_repo_map, detect_stack, detect_verification_commands, display_command, evaluate_policy,
    is_git_repo, parse_toggle, render_receipt, working_tree_changes, write_receipt, ReceiptInput,
    RunContext, WarforgeConfig, DEFAULT_HOME, DEFAULT_RUNS_DIR,
};
use warforge_pipeline::artifacts::{
    write_commands_log, write_json, write_patch_summary, write_payload_artifacts,
    write_risk_report, write_task, ApprovalRecord, ApprovalRequest, TestReport,
};
use warforge_pipeline::{
    is_approved, Pipeline, PipelineConfig, RunGate, RunOutcome, RunnerConfig, Stage,
    VerificationRunner,
};
use warforge_state::{FsStateStore, FsTaskQueue, Task, TaskQueue};

#[derive(Parser)]
#[command(name = "warforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Change, verify, gate and report pipeline for code repositories", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Warforge state directory (config, queue, cache)
    #[arg(long, global = true, env = "WARFORGE_HOME", default_value = DEFAULT_HOME)]
    home: PathBuf,

    /// Directory receiving per-run artifacts
    #[arg(long, global = true, env = "WARFORGE_RUNS_DIR", default_value = DEFAULT_RUNS_DIR)]
    runs_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify environment and dependencies
    Doctor,

    /// Index a repository: stack, verification commands, repo map
    Ingest {
        /// Repository root (default: current directory)
        #[arg(long)]
        repo: Option<PathBuf>,
    },

    /// Manage the task queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Run a task by id, or the next queued task
    Run {
        /// Task id, or `next`
        #[arg(default_value = "next")]
        task_id: String,

        /// Plan only; skip verification commands
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the verification suite
    Verify {
        /// Repository root (default: current directory)
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Launch all commands concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Toggle fast mode (on|off)
    Speed {
        #[arg(action = ArgAction::Set, value_parser = toggle_arg)]
        state: bool,
    },

    /// Toggle safe mode (on|off)
    Safe {
        #[arg(action = ArgAction::Set, value_parser = toggle_arg)]
        state: bool,
    },

    /// Toggle dry-run mode (on|off)
    DryRun {
        #[arg(action = ArgAction::Set, value_parser = toggle_arg)]
        state: bool,
    },

    /// Approve a run held for restricted changes
    Approve {
        run_id: String,

        /// Who approves
        #[arg(long)]
        by: String,

        /// Why the change is acceptable
        #[arg(long)]
        reason: String,
    },

    /// Print the receipt of a run
    Receipt { run_id: String },

    /// Print pull-request title and body for a run
    Pr { run_id: String },

    /// Scaffold a bot template
    Bot {
        #[command(subcommand)]
        action: ScaffoldAction,
    },

    /// Scaffold an agent template
    Agent {
        #[command(subcommand)]
        action: ScaffoldAction,
    },

    /// Scaffold a workflow pattern
    Workflow {
        #[command(subcommand)]
        action: ScaffoldAction,
    },

    /// Ingest the repository, queue a demo task and run it
    RunDemo,
}

#[derive(Subcommand)]
enum QueueAction {
    /// Add a task; the text is both title and description
    Add {
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },

    /// List pending tasks, oldest first
    List,
}

#[derive(Subcommand)]
enum ScaffoldAction {
    New { name: String },
}

fn toggle_arg(state: &str) -> std::result::Result<bool, String> {
    parse_toggle(state).map_err(|e| e.to_string())
}

/// Resolved locations for one invocation. Relative `home` and `runs_dir`
/// are taken relative to the repository root.
struct Workspace {
    root: PathBuf,
    home: PathBuf,
    runs_dir: PathBuf,
}

impl Workspace {
    fn new(root: PathBuf, home: &Path, runs_dir: &Path) -> Self {
        let resolve = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        };
        Self {
            home: resolve(home),
            runs_dir: resolve(runs_dir),
            root,
        }
    }

    fn config(&self) -> Result<WarforgeConfig> {
        WarforgeConfig::load(&self.home).context("Failed to load warforge config")
    }

    fn queue(&self) -> FsTaskQueue {
        FsTaskQueue::new(&self.home)
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(run_id)
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            cache_key: self
                .home
                .join("cache")
                .join("repo_index.json")
                .to_string_lossy()
                .into_owned(),
            excluded_dirs: vec![self.home.clone(), self.runs_dir.clone()],
            ..PipelineConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    warforge_core::telemetry::init_tracing(cli.json, level);

    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let ws = Workspace::new(cwd, &cli.home, &cli.runs_dir);

    match cli.command {
        Commands::Doctor => Ok(exit_status(cmd_doctor(&ws))),
        Commands::Ingest { repo } => {
            cmd_ingest(&ws, repo.as_deref().unwrap_or(&ws.root))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Queue { action } => {
            match action {
                QueueAction::Add { task } => {
                    cmd_queue_add(&ws, &task.join(" ")).await?;
                }
                QueueAction::List => cmd_queue_list(&ws).await?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { task_id, dry_run } => {
            let outcome = cmd_run(&ws, &task_id, dry_run).await?;
            Ok(outcome_status(outcome))
        }
        Commands::Verify { repo, parallel } => {
            let passed = cmd_verify(repo.as_deref().unwrap_or(&ws.root), parallel).await;
            Ok(exit_status(passed))
        }
        Commands::Speed { state } => {
            cmd_toggle(&ws, "Fast mode", state, |config, on| config.fast_mode = on)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Safe { state } => {
            cmd_toggle(&ws, "Safe mode", state, |config, on| config.safe_mode = on)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::DryRun { state } => {
            cmd_toggle(&ws, "Dry-run", state, |config, on| config.dry_run = on)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Approve { run_id, by, reason } => {
            cmd_approve(&ws, &run_id, &by, &reason)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Receipt { run_id } => {
            println!("{}", read_receipt(&ws, &run_id)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Pr { run_id } => {
            println!("{}", serde_json::to_string_pretty(&pr_summary(&ws, &run_id)?)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Bot { action } => scaffold(&ws, "bots", "bot", action),
        Commands::Agent { action } => scaffold(&ws, "agents", "agent", action),
        Commands::Workflow { action } => scaffold(&ws, "workflows", "workflow", action),
        Commands::RunDemo => {
            cmd_ingest(&ws, &ws.root)?;
            let task = ws.queue().add("demo", "demo pipeline run").await?;
            let outcome = cmd_run(&ws, &task.task_id, false).await?;
            Ok(outcome_status(outcome))
        }
    }
}

fn exit_status(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `None` means no task was found.
fn outcome_status(outcome: Option<RunOutcome>) -> ExitCode {
    match outcome {
        Some(outcome) => ExitCode::from(outcome.exit_code()),
        None => ExitCode::FAILURE,
    }
}

fn cmd_doctor(ws: &Workspace) -> bool {
    let mut missing = Vec::new();

    let git_ok = std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !git_ok {
        missing.push("git".to_string());
    }
    if let Err(e) = ws.config() {
        missing.push(format!("readable config ({e:#})"));
    }

    if missing.is_empty() {
        println!("Warforge doctor: ok");
        true
    } else {
        println!("Missing dependencies: {}", missing.join(", "));
        false
    }
}

fn cmd_ingest(ws: &Workspace, repo: &Path) -> Result<()> {
    let repo_map = build_repo_map(repo).context("Failed to index repository")?;
    let commands: Vec<String> = detect_verification_commands(repo)
        .iter()
        .map(|command| display_command(command))
        .collect();
    let index = json!({
        "repo_root": repo.to_string_lossy(),
        "indexed_at": chrono::Utc::now(),
        "stack": detect_stack(repo),
        "verification_commands": commands,
    });

    write_json(&ws.home.join("repo_index.json"), &index)?;
    write_json(&ws.home.join("repo_map.json"), &repo_map)?;
    info!(files = repo_map.files.len(), "repository ingested");
    println!("Repo ingested");
    Ok(())
}

async fn cmd_queue_add(ws: &Workspace, text: &str) -> Result<Task> {
    let task = ws
        .queue()
        .add(text, text)
        .await
        .context("Failed to queue task")?;
    println!("Queued {}", task.task_id);
    Ok(task)
}

async fn cmd_queue_list(ws: &Workspace) -> Result<()> {
    let pending = ws.queue().pending().await?;
    if pending.is_empty() {
        println!("Queue is empty");
        return Ok(());
    }
    for task in pending {
        println!("{}  {}", task.task_id, task.title);
    }
    Ok(())
}

async fn resolve_task(ws: &Workspace, task_id: &str) -> Result<Option<Task>> {
    let queue = ws.queue();
    let task = if task_id == "next" {
        queue.pop_next().await?
    } else {
        queue.get(task_id).await?
    };
    Ok(task)
}

/// Run the pipeline for a task, verify, gate and write every artifact.
async fn cmd_run(ws: &Workspace, task_id: &str, dry_run: bool) -> Result<Option<RunOutcome>> {
    let config = ws.config()?;
    let Some(task) = resolve_task(ws, task_id).await? else {
        println!("No task found");
        return Ok(None);
    };

    let ctx = RunContext::for_task(task, ws.root.clone(), &ws.runs_dir, &config)
        .with_dry_run(dry_run);
    let run_dir = ctx.run_dir.clone();
    write_task(&run_dir, &ctx.task)?;

    let store = Arc::new(FsStateStore::new(&ws.root));
    let pipeline = Pipeline::builtin(store, ws.pipeline_config())?;
    let mut payload = pipeline
        .run(&ctx)
        .await
        .with_context(|| format!("Pipeline failed for run {}", ctx.run_id))?;
    write_payload_artifacts(&run_dir, &payload)?;

    let commands = detect_verification_commands(&ctx.repo_root);
    let results = if ctx.dry_run {
        Vec::new()
    } else {
        VerificationRunner::new(RunnerConfig::in_dir(&ctx.repo_root))
            .run_commands(&commands, ctx.fast_mode)
            .await
    };

    let (diff_paths, diff_text) = working_tree_changes(&ctx.repo_root)?;
    if is_git_repo(&ctx.repo_root) {
        payload.policy = evaluate_policy(&diff_paths, &diff_text, ctx.safe_mode);
    }
    write_risk_report(&run_dir, &payload.policy)?;

    let rendered: Vec<String> = commands.iter().map(|c| display_command(c)).collect();
    let tests = if ctx.dry_run {
        rendered.iter().map(|c| format!("dry-run: {c}")).collect()
    } else {
        results
            .iter()
            .map(|r| format!("{} => {}", r.display_command(), r.exit_code))
            .collect()
    };
    let evals = payload
        .step(Stage::Verification, "eval_quality")
        .map(|eval| vec![eval.to_string()])
        .unwrap_or_default();

    let receipt = render_receipt(&ReceiptInput {
        run_id: ctx.run_id.clone(),
        task_title: ctx.task.title.clone(),
        files_touched: diff_paths.clone(),
        commands: vec!["warforge run".to_string()],
        tests,
        test_outputs: results.iter().map(|r| r.output.clone()).collect(),
        evals,
        risks: payload
            .policy
            .zone_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    });
    write_receipt(&run_dir, &receipt)?;
    write_commands_log(&run_dir, "warforge run", &results)?;
    write_patch_summary(&run_dir, &diff_paths)?;
    TestReport::new(rendered, &results).write(&run_dir)?;

    let verdict = RunGate::evaluate(ctx.dry_run, &results, &payload.policy, is_approved(&run_dir));
    match verdict.outcome {
        RunOutcome::VerificationFailed => {
            for violation in &verdict.violations {
                warn!(run_id = %ctx.run_id, "{violation}");
            }
            println!("Verification failed for run: {}", ctx.run_id);
        }
        RunOutcome::ApprovalRequired => {
            ApprovalRequest::new(&ctx.run_id, &payload.policy).write(&run_dir)?;
            println!("Approval required for run: {}", ctx.run_id);
        }
        RunOutcome::Success => println!("Run complete: {}", ctx.run_id),
    }
    Ok(Some(verdict.outcome))
}

async fn cmd_verify(repo: &Path, parallel: bool) -> bool {
    let commands = detect_verification_commands(repo);
    if commands.is_empty() {
        println!("No verification commands detected");
        return false;
    }

    let results = VerificationRunner::new(RunnerConfig::in_dir(repo))
        .run_commands(&commands, parallel)
        .await;
    for result in &results {
        println!("{} => {}", result.display_command(), result.exit_code);
    }
    results.iter().all(|result| result.passed())
}

fn cmd_toggle(
    ws: &Workspace,
    label: &str,
    on: bool,
    apply: impl FnOnce(&mut WarforgeConfig, bool),
) -> Result<WarforgeConfig> {
    let mut config = ws.config()?;
    apply(&mut config, on);
    config.save(&ws.home).context("Failed to save warforge config")?;
    println!("{label} {}", if on { "enabled" } else { "disabled" });
    Ok(config)
}

fn cmd_approve(ws: &Workspace, run_id: &str, by: &str, reason: &str) -> Result<PathBuf> {
    let run_dir = ws.run_dir(run_id);
    if !run_dir.is_dir() {
        anyhow::bail!("Run not found: {run_id}");
    }
    let path = ApprovalRecord::new(run_id, by, reason).write(&run_dir)?;
    println!("Run {run_id} approved by {by}");
    Ok(path)
}

fn read_receipt(ws: &Workspace, run_id: &str) -> Result<String> {
    let path = ws.run_dir(run_id).join(warforge_core::receipt::RECEIPT_FILE);
    std::fs::read_to_string(&path).with_context(|| format!("No receipt at {}", path.display()))
}

fn pr_summary(ws: &Workspace, run_id: &str) -> Result<serde_json::Value> {
    let body = match read_receipt(ws, run_id) {
        Ok(receipt) => receipt,
        Err(_) if !ws.run_dir(run_id).is_dir() => anyhow::bail!("Run not found: {run_id}"),
        Err(_) => String::new(),
    };
    Ok(json!({
        "title": format!("Warforge run {run_id}"),
        "body": body,
    }))
}

fn scaffold(ws: &Workspace, dir: &str, kind: &str, action: ScaffoldAction) -> Result<ExitCode> {
    let ScaffoldAction::New { name } = action;
    scaffold_template(ws, dir, kind, &name)?;
    Ok(ExitCode::SUCCESS)
}

fn scaffold_template(ws: &Workspace, dir: &str, kind: &str, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        anyhow::bail!("Invalid {kind} name: {name:?}");
    }
    if kind == "bot" && !BOT_TEMPLATES.contains(&name) {
        warn!(template = %name, known = ?BOT_TEMPLATES, "unknown bot template, scaffolding anyway");
    }

    let template_dir = ws.root.join(dir).join(name);
    std::fs::create_dir_all(&template_dir)
        .with_context(|| format!("Failed to create {}", template_dir.display()))?;
    let readme = template_dir.join("README.md");
    std::fs::write(&readme, format!("# {name} {kind}\n"))
        .with_context(|| format!("Failed to write {}", readme.display()))?;

    let mut label = kind.to_string();
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    println!("{label} scaffolded: {name}");
    Ok(readme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(root: &Path) -> Workspace {
        Workspace::new(
            root.to_path_buf(),
            Path::new(DEFAULT_HOME),
            Path::new(DEFAULT_RUNS_DIR),
        )
    }

    #[test]
    fn test_workspace_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert_eq!(ws.home, dir.path().join(".warforge"));
        assert_eq!(ws.runs_dir, dir.path().join("runs"));
        assert!(ws.pipeline_config().cache_key.ends_with("repo_index.json"));

        let absolute = Workspace::new(dir.path().to_path_buf(), Path::new("/tmp/wf"), Path::new("out"));
        assert_eq!(absolute.home, PathBuf::from("/tmp/wf"));
    }

    #[tokio::test]
    async fn test_custom_locations_keep_cache_warm() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().to_path_buf(), Path::new("state"), Path::new("out"));
        std::fs::write(dir.path().join("README.md"), "# demo\n").unwrap();

        let task = cmd_queue_add(&ws, "Add a button").await.unwrap();
        let run_id = format!("run-{}", task.task_id);
        let cache_hit = |ws: &Workspace| -> bool {
            let metrics: serde_json::Value = serde_json::from_str(
                &std::fs::read_to_string(ws.run_dir(&run_id).join("metrics.json")).unwrap(),
            )
            .unwrap();
            metrics["cache_hit"].as_bool().unwrap()
        };

        cmd_run(&ws, &task.task_id, true).await.unwrap();
        assert!(!cache_hit(&ws));
        cmd_run(&ws, &task.task_id, true).await.unwrap();
        assert!(cache_hit(&ws));
        assert!(dir.path().join("state/cache/repo_index.json").exists());
    }

    #[test]
    fn test_toggles_persist() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());

        cmd_toggle(&ws, "Fast mode", false, |c, on| c.fast_mode = on).unwrap();
        cmd_toggle(&ws, "Dry-run", true, |c, on| c.dry_run = on).unwrap();

        let config = ws.config().unwrap();
        assert!(!config.fast_mode);
        assert!(config.safe_mode);
        assert!(config.dry_run);
    }

    #[test]
    fn test_toggle_arg() {
        assert_eq!(toggle_arg("on"), Ok(true));
        assert_eq!(toggle_arg("off"), Ok(false));
        assert!(toggle_arg("maybe").is_err());
    }

    #[tokio::test]
    async fn test_run_without_task() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert_eq!(cmd_run(&ws, "next", true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dry_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        std::fs::write(dir.path().join("README.md"), "# demo\n").unwrap();

        let task = cmd_queue_add(&ws, "Add a button").await.unwrap();
        let outcome = cmd_run(&ws, "next", true).await.unwrap();
        assert_eq!(outcome, Some(RunOutcome::Success));

        let run_dir = ws.run_dir(&format!("run-{}", task.task_id));
        for file in [
            "task.json",
            "plan.json",
            "repo_map.json",
            "workflow.json",
            "risk_report.json",
            "eval_report.json",
            "review_report.json",
            "metrics.json",
            "test_report.json",
            "patch_summary.json",
            "commands.log",
            "receipt.md",
            "checkpoint.json",
        ] {
            assert!(run_dir.join(file).exists(), "missing {file}");
        }
        assert!(!run_dir.join("approval_request.json").exists());
        assert!(dir.path().join(".warforge/cache/repo_index.json").exists());

        let receipt = read_receipt(&ws, &format!("run-{}", task.task_id)).unwrap();
        assert!(receipt.contains("- Add a button"));

        // popped from the queue
        assert_eq!(cmd_run(&ws, "next", true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restricted_run_needs_approval() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        std::fs::create_dir_all(dir.path().join("auth")).unwrap();
        std::fs::write(dir.path().join("auth/login.py"), "pass\n").unwrap();

        let task = cmd_queue_add(&ws, "Tweak the settings page").await.unwrap();
        let run_id = format!("run-{}", task.task_id);

        let held = cmd_run(&ws, &task.task_id, true).await.unwrap();
        assert_eq!(held, Some(RunOutcome::ApprovalRequired));
        assert!(ws.run_dir(&run_id).join("approval_request.json").exists());

        cmd_approve(&ws, &run_id, "alice", "reviewed the login change").unwrap();
        let released = cmd_run(&ws, &task.task_id, true).await.unwrap();
        assert_eq!(released, Some(RunOutcome::Success));
    }

    #[test]
    fn test_approve_unknown_run() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(cmd_approve(&ws, "run-missing", "alice", "ok").is_err());
    }

    #[test]
    fn test_pr_summary_without_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(pr_summary(&ws, "run-x").is_err());

        std::fs::create_dir_all(ws.run_dir("run-x")).unwrap();
        let summary = pr_summary(&ws, "run-x").unwrap();
        assert_eq!(summary["title"], "Warforge run run-x");
        assert_eq!(summary["body"], "");
    }

    #[test]
    fn test_scaffold_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(scaffold_template(&ws, "bots", "bot", "../escape").is_err());

        let readme = scaffold_template(&ws, "bots", "bot", "alert_bot").unwrap();
        assert_eq!(std::fs::read_to_string(readme).unwrap(), "# alert_bot bot\n");
    }

    #[test]
    fn test_ingest_writes_index() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();

        cmd_ingest(&ws, dir.path()).unwrap();
        let index: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(ws.home.join("repo_index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(index["stack"], "rust");
        assert_eq!(index["verification_commands"], json!(["cargo test"]));
        assert!(ws.home.join("repo_map.json").exists());
    }

    #[tokio::test]
    async fn test_verify_without_commands_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!cmd_verify(dir.path(), false).await);
    }
}
