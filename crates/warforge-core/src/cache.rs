//! Advisory repository cache marker.
//!
//! The marker records the last fingerprint seen for a repository. It only
//! feeds the `cache_hit` metric; no stage is ever skipped because of it.
//!
//! On-disk format: one JSON line `{"repo_hash": .., "cached_at": ..}` followed
//! by the raw fingerprint on a trailing line.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warforge_state::StateStore;

use crate::error::Result;
use crate::fingerprint::Fingerprint;

/// Default store key for the marker.
pub const DEFAULT_CACHE_KEY: &str = ".warforge/cache/repo_index.json";

/// Fingerprint plus the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMarker {
    pub repo_hash: String,
    pub cached_at: DateTime<Utc>,
}

impl CacheMarker {
    pub fn new(fingerprint: &Fingerprint) -> Self {
        Self {
            repo_hash: fingerprint.as_str().to_string(),
            cached_at: Utc::now(),
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(format!("{}\n{}", serde_json::to_string(self)?, self.repo_hash))
    }

    /// Whether a previously stored marker's trailing line equals `fingerprint`.
    pub fn matches(stored: &str, fingerprint: &Fingerprint) -> bool {
        stored
            .trim_end()
            .lines()
            .last()
            .map(|line| line.trim() == fingerprint.as_str())
            .unwrap_or(false)
    }
}

/// Marker persistence over an injected store.
#[derive(Clone)]
pub struct RepoCache {
    store: Arc<dyn StateStore>,
    key: String,
}

impl RepoCache {
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Compare `fingerprint` with the stored marker, then overwrite the marker
    /// unconditionally. Returns whether it was a hit.
    ///
    /// Read and write are not atomic; concurrent runs sharing a key race and
    /// the last writer wins.
    pub async fn check_and_record(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let hit = match self.store.get(&self.key).await? {
            Some(bytes) => CacheMarker::matches(&String::from_utf8_lossy(&bytes), fingerprint),
            None => false,
        };

        let marker = CacheMarker::new(fingerprint).encode()?;
        self.store.put(&self.key, marker.as_bytes()).await?;
        Ok(hit)
    }
}
