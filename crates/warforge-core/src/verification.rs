//! Verification command discovery.

use std::path::Path;

/// Ordered argument vector for one external command.
pub type CommandLine = Vec<String>;

/// Source of the verification commands for a repository.
///
/// The engine treats the returned list opaquely: it is flattened into the
/// shared context and later handed to the verification runner unchanged.
pub trait CommandDiscovery: Send + Sync {
    fn discover(&self, repo_root: &Path) -> Vec<CommandLine>;
}

/// Discovers test suites from manifests at the repository root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestDiscovery;

impl CommandDiscovery for ManifestDiscovery {
    fn discover(&self, repo_root: &Path) -> Vec<CommandLine> {
        detect_verification_commands(repo_root)
    }
}

/// Fixed command list, regardless of repository.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery(pub Vec<CommandLine>);

impl CommandDiscovery for StaticDiscovery {
    fn discover(&self, _repo_root: &Path) -> Vec<CommandLine> {
        self.0.clone()
    }
}

fn command(args: &[&str]) -> CommandLine {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// `cargo test` for Cargo.toml, `pytest` for pyproject.toml, `npm test` for
/// package.json, in that order.
pub fn detect_verification_commands(repo_root: &Path) -> Vec<CommandLine> {
    let mut commands = Vec::new();
    if repo_root.join("Cargo.toml").exists() {
        commands.push(command(&["cargo", "test"]));
    }
    if repo_root.join("pyproject.toml").exists() {
        commands.push(command(&["pytest"]));
    }
    if repo_root.join("package.json").exists() {
        commands.push(command(&["npm", "test"]));
    }
    commands
}

/// Render a command line for logs and reports.
pub fn display_command(command: &[String]) -> String {
    command.join(" ")
}
