//! Git integration for collecting the working-tree diff a run is judged on.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, WarforgeError};

fn git_stdout(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| WarforgeError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WarforgeError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Paths with unstaged changes, relative to the repository root.
pub fn diff_names(repo_dir: &Path) -> Result<Vec<String>> {
    let stdout = git_stdout(repo_dir, &["diff", "--name-only"])?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Full unstaged diff text.
pub fn diff_text(repo_dir: &Path) -> Result<String> {
    git_stdout(repo_dir, &["diff"])
}

/// Changed paths and diff text, or empty values outside a git work tree.
pub fn working_tree_changes(repo_dir: &Path) -> Result<(Vec<String>, String)> {
    if !is_git_repo(repo_dir) {
        return Ok((Vec::new(), String::new()));
    }
    Ok((diff_names(repo_dir)?, diff_text(repo_dir)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        std::fs::write(dir.path().join("app.txt"), "one\n").unwrap();
        run_git(dir.path(), &["add", "app.txt"]);
        run_git(dir.path(), &["commit", "-m", "initial"]);
        dir
    }

    #[test]
    fn is_git_repo_true_for_repo() {
        let repo = make_git_repo();
        assert!(is_git_repo(repo.path()));
    }

    #[test]
    fn is_git_repo_false_for_non_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_git_repo(dir.path()));
    }

    #[test]
    fn clean_tree_has_no_changes() {
        let repo = make_git_repo();
        let (names, text) = working_tree_changes(repo.path()).unwrap();
        assert!(names.is_empty());
        assert!(text.is_empty());
    }

    #[test]
    fn modified_file_shows_in_diff() {
        let repo = make_git_repo();
        std::fs::write(repo.path().join("app.txt"), "two\n").unwrap();

        assert_eq!(diff_names(repo.path()).unwrap(), vec!["app.txt"]);
        assert!(diff_text(repo.path()).unwrap().contains("+two"));
    }

    #[test]
    fn non_repo_yields_empty_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (names, text) = working_tree_changes(dir.path()).unwrap();
        assert!(names.is_empty());
        assert!(text.is_empty());
    }

    #[test]
    fn diff_outside_repo_is_git_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            diff_names(dir.path()),
            Err(WarforgeError::Git(_))
        ));
    }
}
