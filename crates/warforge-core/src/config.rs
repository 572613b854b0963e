//! Persisted user toggles (`<home>/config.json`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WarforgeError};

/// Default state directory, relative to the working directory.
pub const DEFAULT_HOME: &str = ".warforge";

/// Default directory for per-run artifacts.
pub const DEFAULT_RUNS_DIR: &str = "runs";

const CONFIG_FILE: &str = "config.json";

/// Toggles read at the start of every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarforgeConfig {
    /// Run verification commands in parallel.
    pub fast_mode: bool,
    /// Require approval when restricted zones are touched.
    pub safe_mode: bool,
    /// Plan only; skip verification commands.
    pub dry_run: bool,
}

impl Default for WarforgeConfig {
    fn default() -> Self {
        Self {
            fast_mode: true,
            safe_mode: true,
            dry_run: false,
        }
    }
}

impl WarforgeConfig {
    pub fn path(home: &Path) -> PathBuf {
        home.join(CONFIG_FILE)
    }

    /// Load from `<home>/config.json`; missing file or missing fields take defaults.
    pub fn load(home: &Path) -> Result<Self> {
        let path = Self::path(home);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(WarforgeError::Read { path, source }),
        };
        serde_json::from_str(&content)
            .map_err(|e| WarforgeError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        std::fs::create_dir_all(home)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(home), content)?;
        Ok(())
    }
}

/// Parse an `on`/`off` toggle argument.
pub fn parse_toggle(state: &str) -> Result<bool> {
    match state.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(WarforgeError::Config(format!(
            "expected on|off, got {other:?}"
        ))),
    }
}
