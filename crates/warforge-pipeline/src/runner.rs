//! Verification command execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;
use warforge_core::obs;
use warforge_core::{display_command, CommandLine};

/// Exit code reported when a command cannot be launched (or is empty).
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code reported when a command exceeds the configured timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when a process ends without one (killed by a signal).
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Runner settings. The default runs in the current directory with no
/// timeout and no concurrency cap.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub working_dir: Option<PathBuf>,
    /// Per-command wall-clock limit; the child is killed when it elapses.
    pub timeout: Option<Duration>,
    /// Maximum commands in flight in parallel mode.
    pub max_concurrency: Option<usize>,
}

impl RunnerConfig {
    pub fn in_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(working_dir.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }
}

/// Outcome of one verification command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub command: CommandLine,
    pub exit_code: i32,
    pub duration_ms: u64,
    /// Stdout followed by stderr.
    pub output: String,
}

impl CommandResult {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    pub fn display_command(&self) -> String {
        display_command(&self.command)
    }
}

/// Runs verification commands and collects their results.
#[derive(Debug, Clone, Default)]
pub struct VerificationRunner {
    config: RunnerConfig,
}

impl VerificationRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute `commands`, returning one result per command in input order.
    ///
    /// With `parallel` set and at least two commands, every command is
    /// launched at once (or up to `max_concurrency` at a time) and results
    /// are collected in launch order. Otherwise each command finishes before
    /// the next starts. Failing or unlaunchable commands never stop the rest.
    pub async fn run_commands(&self, commands: &[CommandLine], parallel: bool) -> Vec<CommandResult> {
        if !parallel || commands.len() < 2 {
            let mut results = Vec::with_capacity(commands.len());
            for command in commands {
                results.push(self.run_command(command).await);
            }
            return results;
        }

        let limit = self
            .config
            .max_concurrency
            .unwrap_or(commands.len())
            .max(1);
        debug!(commands = commands.len(), limit, "running verification commands in parallel");

        stream::iter(commands.iter().map(|command| self.run_command(command)))
            .buffered(limit)
            .collect()
            .await
    }

    /// Execute a single command.
    pub async fn run_command(&self, command: &[String]) -> CommandResult {
        let start = Instant::now();
        let (exit_code, output) = self.execute(command).await;
        let result = CommandResult {
            command: command.to_vec(),
            exit_code,
            duration_ms: start.elapsed().as_millis() as u64,
            output,
        };
        obs::emit_command_finished(&result.display_command(), result.exit_code, result.duration_ms);
        result
    }

    async fn execute(&self, command: &[String]) -> (i32, String) {
        let Some((program, args)) = command.split_first() else {
            return (SPAWN_FAILURE_EXIT_CODE, "empty command".to_string());
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return (
                    SPAWN_FAILURE_EXIT_CODE,
                    format!("failed to launch '{program}': {e}"),
                )
            }
        };

        let waited = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                // Dropping the wait future drops the child, which kills it.
                Err(_) => {
                    return (
                        TIMEOUT_EXIT_CODE,
                        format!("'{program}' timed out after {}ms", limit.as_millis()),
                    )
                }
            },
            None => child.wait_with_output().await,
        };

        match waited {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                (output.status.code().unwrap_or(SIGNAL_EXIT_CODE), text)
            }
            Err(e) => (SIGNAL_EXIT_CODE, format!("failed to wait for '{program}': {e}")),
        }
    }
}

/// Run `commands` with a default runner.
pub async fn run_commands(commands: &[CommandLine], parallel: bool) -> Vec<CommandResult> {
    VerificationRunner::default()
        .run_commands(commands, parallel)
        .await
}
