//! Error types for chronics generation.
//!
//! [`GenerationError`] is what a run returns to its caller. Stage backends
//! report failures as [`StageError`], which the orchestrator wraps together
//! with the stage and scenario it came from, leaving the original error
//! reachable through [`std::error::Error::source`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::chronics::TableError;
use crate::generator::mode::Stage;
use crate::params::ParameterError;

/// Errors surfaced by a generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A required input is missing or unreadable.
    #[error("configuration error in {domain}: {message}")]
    Configuration { domain: String, message: String },

    /// Bad combination of scenario count and scenario identifier.
    #[error(
        "invalid scenario count {n_scenarios} with scenario id {scenario_id:?}: \
         the count must be >= 1 and an explicit scenario id requires exactly one scenario"
    )]
    InvalidScenarioCount {
        n_scenarios: usize,
        scenario_id: Option<String>,
    },

    /// The mode string contains a letter that names no stage.
    #[error("invalid mode \"{mode}\": unknown flag '{flag}' (expected letters from L, R, D, T, K)")]
    InvalidMode { mode: String, flag: char },

    /// A stage was requested but its upstream tables are neither computed
    /// in this run nor persisted in the scenario folder.
    #[error("{stage} stage of {scenario} needs {} which was not generated in this run", .path.display())]
    MissingUpstream {
        stage: Stage,
        scenario: String,
        path: PathBuf,
    },

    /// A stage backend failed.
    #[error("{stage} stage failed for {scenario}")]
    Stage {
        stage: Stage,
        scenario: String,
        #[source]
        source: StageError,
    },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerationError {
    pub(crate) fn configuration(domain: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            domain: domain.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised inside a stage backend.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// A configuration manager used by the stage itself failed.
    #[error(transparent)]
    Configuration(Box<GenerationError>),

    #[error("{0}")]
    Other(String),
}

impl From<GenerationError> for StageError {
    fn from(err: GenerationError) -> Self {
        Self::Configuration(Box::new(err))
    }
}

/// Convenience alias for results carrying a [`GenerationError`].
pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn scenario_count_message_mentions_id() {
        let err = GenerationError::InvalidScenarioCount {
            n_scenarios: 3,
            scenario_id: Some("myscenario".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("3"));
        assert!(msg.contains("myscenario"));
    }

    #[test]
    fn scenario_count_message_without_id() {
        let err = GenerationError::InvalidScenarioCount {
            n_scenarios: 0,
            scenario_id: None,
        };
        assert!(err.to_string().contains(">= 1"));
    }

    #[test]
    fn stage_error_is_kept_as_source() {
        let err = GenerationError::Stage {
            stage: Stage::Load,
            scenario: "Scenario_0".into(),
            source: StageError::Other("solver diverged".into()),
        };
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("solver diverged"));
    }
}
