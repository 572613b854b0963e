//! Engine error taxonomy.

use warforge_core::WarforgeError;
use warforge_state::StorageError;

/// Failures that abort a pipeline run.
///
/// Non-zero verification exits are not errors; they are reported as data in
/// `CommandResult` and judged by the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A stage layout names a step the registry does not hold.
    #[error("stage '{stage}' references unknown step '{step}'")]
    UnknownStep { stage: String, step: String },

    #[error("step '{step}' is listed more than once in the stage layout")]
    DuplicateStep { step: String },

    #[error("step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to fingerprint repository: {0}")]
    Fingerprint(#[source] WarforgeError),

    #[error(transparent)]
    Core(#[from] WarforgeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_step_message() {
        let err = PipelineError::UnknownStep {
            stage: "plan".into(),
            step: "ghost".into(),
        };
        assert_eq!(
            err.to_string(),
            "stage 'plan' references unknown step 'ghost'"
        );
    }

    #[test]
    fn test_step_error_keeps_source() {
        let err = PipelineError::Step {
            step: "router".into(),
            source: anyhow::anyhow!("boom"),
        };
        assert!(err.to_string().contains("router"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
