//! Repository fingerprinting.
//!
//! A fingerprint is a SHA-256 over every repository file, visited in sorted
//! path order. Each file contributes its root-relative path and its bytes, so
//! content edits, renames, additions and removals all change the digest while
//! directory-listing order never does.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, WarforgeError};
use crate::repo::{repo_files, repo_files_excluding};

/// Hex-encoded SHA-256 repository digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint every file under `root` except `.git` and the default tool
/// directories.
///
/// Unreadable files fail the computation rather than being skipped.
pub fn fingerprint_repo(root: &Path) -> Result<Fingerprint> {
    let fingerprint = fingerprint_files(root, repo_files(root)?)?;
    debug!(root = %root.display(), fingerprint = %fingerprint.short(), "repository fingerprinted");
    Ok(fingerprint)
}

/// Fingerprint every file under `root` except `.git` and the `excluded`
/// directories (relative entries are taken from `root`).
pub fn fingerprint_repo_excluding(root: &Path, excluded: &[PathBuf]) -> Result<Fingerprint> {
    let fingerprint = fingerprint_files(root, repo_files_excluding(root, excluded)?)?;
    debug!(
        root = %root.display(),
        excluded = excluded.len(),
        fingerprint = %fingerprint.short(),
        "repository fingerprinted"
    );
    Ok(fingerprint)
}

/// Fingerprint an explicit file set. Input order is irrelevant; files are
/// sorted before hashing.
pub fn fingerprint_files(
    root: &Path,
    files: impl IntoIterator<Item = PathBuf>,
) -> Result<Fingerprint> {
    let mut files: Vec<PathBuf> = files.into_iter().collect();
    files.sort();
    files.dedup();

    let mut hasher = Sha256::new();
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(b"\0");

        let content = std::fs::read(&path).map_err(|source| WarforgeError::Read {
            path: path.clone(),
            source,
        })?;
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(&content);
    }

    Ok(Fingerprint(hex::encode(hasher.finalize())))
}
