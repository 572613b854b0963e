//! Repository walking and lightweight analysis.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Result, WarforgeError};

/// Version control internals, pruned at any depth.
pub const VCS_DIR: &str = ".git";

/// Warforge's own state and run output directories, relative to the
/// repository root, when no other locations are configured.
pub const DEFAULT_TOOL_DIRS: [&str; 2] = [".warforge", "runs"];

/// File name suffixes that mark a repository entry point.
const ENTRY_POINT_NAMES: [&str; 4] = ["pyproject.toml", "package.json", "README.md", "Cargo.toml"];

/// Maximum number of files listed in a repository map.
const REPO_MAP_FILE_LIMIT: usize = 200;

/// Absolute forms of `excluded`; relative entries are taken from `root`.
pub fn resolve_excluded(root: &Path, excluded: &[PathBuf]) -> Vec<PathBuf> {
    excluded
        .iter()
        .map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            }
        })
        .collect()
}

/// All regular files under `root`, sorted by path, skipping `.git` and the
/// default tool directories at the repository root.
pub fn repo_files(root: &Path) -> Result<Vec<PathBuf>> {
    let defaults: Vec<PathBuf> = DEFAULT_TOOL_DIRS.iter().map(PathBuf::from).collect();
    repo_files_excluding(root, &defaults)
}

/// All regular files under `root`, sorted by path.
///
/// `.git` is pruned wherever it appears; each `excluded` directory is pruned
/// only at its exact location. Symlinks are not followed, and any walk error
/// (e.g. an unreadable directory) fails the whole listing.
pub fn repo_files_excluding(root: &Path, excluded: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let excluded = resolve_excluded(root, excluded);
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && (entry.file_name() == VCS_DIR
                        || excluded.iter().any(|dir| entry.path() == dir)))
        });

    for entry in walker {
        let entry = entry.map_err(|source| WarforgeError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Repository files relative to `root`, as strings.
pub fn relative_repo_files(root: &Path) -> Result<Vec<String>> {
    Ok(repo_files(root)?
        .iter()
        .map(|path| relative_display(root, path))
        .collect())
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Overview of the repository handed to planning steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMap {
    pub repo_root: String,
    pub files: Vec<String>,
    pub entry_points: Vec<String>,
    pub workflows: Vec<String>,
}

pub fn build_repo_map(root: &Path) -> Result<RepoMap> {
    let files = relative_repo_files(root)?;
    let entry_points = files
        .iter()
        .filter(|file| {
            ENTRY_POINT_NAMES
                .iter()
                .any(|name| file.ends_with(name))
        })
        .cloned()
        .collect();
    let workflows = files
        .iter()
        .filter(|file| file.starts_with(".github/workflows/"))
        .cloned()
        .collect();

    Ok(RepoMap {
        repo_root: root.to_string_lossy().into_owned(),
        files: files.into_iter().take(REPO_MAP_FILE_LIMIT).collect(),
        entry_points,
        workflows,
    })
}

/// Primary toolchain of the repository, judged by its root manifest.
pub fn detect_stack(root: &Path) -> &'static str {
    if root.join("Cargo.toml").exists() {
        "rust"
    } else if root.join("pyproject.toml").exists() {
        "python"
    } else if root.join("package.json").exists() {
        "node"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_repo_files_sorted_and_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/b.rs", "b");
        touch(root, "src/a.rs", "a");
        touch(root, "README.md", "readme");
        touch(root, ".git/HEAD", "ref");
        touch(root, ".warforge/cache/repo_index.json", "{}");
        touch(root, "runs/run-1/checkpoint.json", "{}");

        let files = relative_repo_files(root).unwrap();
        assert_eq!(files, vec!["README.md", "src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn test_ignored_names_only_pruned_as_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/runs", "a file named runs");
        let files = relative_repo_files(dir.path()).unwrap();
        assert_eq!(files, vec!["docs/runs"]);
    }

    #[test]
    fn test_tool_dir_names_below_root_are_content() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/runs/handler.rs", "fn handle() {}");
        touch(root, "pkg/.warforge/notes.md", "notes");
        touch(root, "vendor/lib/.git/HEAD", "ref");

        let files = relative_repo_files(root).unwrap();
        assert_eq!(files, vec!["pkg/.warforge/notes.md", "src/runs/handler.rs"]);
    }

    #[test]
    fn test_configured_dirs_pruned_at_exact_location() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "state/cache/repo_index.json", "{}");
        touch(root, "out/run-1/receipt.md", "# receipt");
        touch(root, "src/state/mod.rs", "");
        touch(root, "runs/run-1/checkpoint.json", "{}");

        let excluded = vec![PathBuf::from("state"), root.join("out")];
        let files: Vec<String> = repo_files_excluding(root, &excluded)
            .unwrap()
            .iter()
            .map(|path| relative_display(root, path))
            .collect();
        // default tool dirs are content once other locations are configured
        assert_eq!(files, vec!["runs/run-1/checkpoint.json", "src/state/mod.rs"]);
    }

    #[test]
    fn test_empty_repo_has_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(repo_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_build_repo_map() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "pyproject.toml", "[project]");
        touch(root, ".github/workflows/ci.yml", "on: push");
        touch(root, "pkg/module.py", "x = 1");

        let map = build_repo_map(root).unwrap();
        assert_eq!(map.files.len(), 3);
        assert_eq!(map.entry_points, vec!["pyproject.toml"]);
        assert_eq!(map.workflows, vec![".github/workflows/ci.yml"]);
    }

    #[test]
    fn test_detect_stack() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_stack(dir.path()), "unknown");
        touch(dir.path(), "package.json", "{}");
        assert_eq!(detect_stack(dir.path()), "node");
        touch(dir.path(), "Cargo.toml", "[package]");
        assert_eq!(detect_stack(dir.path()), "rust");
    }
}
