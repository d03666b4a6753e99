//! Error types for the velo lifecycle engine.
//!
//! Failures are typed all the way up the chain: a script failure carries the
//! failing script's identity and exit code, a stage failure wraps that with
//! the stage's name, and a lifecycle failure is either a stage failure or a
//! rejected-before-start condition. Nothing in the engine swallows or
//! retries a failure.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for velo operations.
#[derive(Debug, Error)]
pub enum VeloError {
    /// A configuration could not be discovered or parsed.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A lifecycle run failed.
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Error produced by a lifecycle run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The requested stop stage is not part of the lifecycle.
    ///
    /// Detected before any task is executed, so a typo in the requested
    /// stop point never triggers partial execution.
    #[error("{name}: lifecycle stage not found")]
    StageNotFound {
        /// The requested stage name.
        name: String,
    },

    /// A foreground stage reported failure; no further stages were started.
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Aggregate failure of a stage, wrapping the triggering task failure.
#[derive(Debug, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct StageError {
    /// The name of the failed stage.
    pub stage: String,
    /// The task failure that caused it.
    #[source]
    pub source: TaskError,
}

impl StageError {
    /// Wraps a task failure with the owning stage's name.
    #[must_use]
    pub fn new(stage: impl Into<String>, source: TaskError) -> Self {
        Self {
            stage: stage.into(),
            source,
        }
    }
}

/// Failure of a single task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The script ran to completion but terminated unsuccessfully.
    #[error("script '{script}' failed with {}", exit_label(.code))]
    ScriptFailed {
        /// The failing script's identifier.
        script: String,
        /// The process exit code, or `None` for signal termination.
        code: Option<i32>,
    },

    /// The script could not be invoked at all.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

impl TaskError {
    /// Returns the identifier of the script involved in the failure.
    #[must_use]
    pub fn script(&self) -> &str {
        match self {
            Self::ScriptFailed { script, .. } => script,
            Self::Script(error) => error.script().unwrap_or_default(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "an abnormal termination".to_string(),
    }
}

/// Errors surfaced by the script-invocation boundary.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script is not defined in the project manifest.
    #[error("script '{script}' is not defined in {}", .manifest.display())]
    NotFound {
        /// The requested script.
        script: String,
        /// The manifest that was searched.
        manifest: PathBuf,
    },

    /// The project manifest could not be read.
    #[error("failed to read {}: {source}", .manifest.display())]
    ManifestRead {
        /// The manifest path.
        manifest: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The project manifest is not valid JSON.
    #[error("failed to parse {}: {source}", .manifest.display())]
    ManifestParse {
        /// The manifest path.
        manifest: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The child process could not be spawned.
    #[error("failed to spawn script '{script}': {source}")]
    Spawn {
        /// The script being invoked.
        script: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O failed while the script was running.
    #[error("i/o error while running script '{script}': {source}")]
    Io {
        /// The script being invoked.
        script: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    /// Returns the identifier of the script involved in the error, when
    /// the error concerns a specific script rather than the manifest.
    #[must_use]
    pub fn script(&self) -> Option<&str> {
        match self {
            Self::NotFound { script, .. }
            | Self::Spawn { script, .. }
            | Self::Io { script, .. } => Some(script),
            Self::ManifestRead { .. } | Self::ManifestParse { .. } => None,
        }
    }
}

/// Errors produced by configuration discovery and parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration was found searching upward from the given root.
    #[error("no velo configuration found from {}", .root.display())]
    NotFound {
        /// The directory the search started from.
        root: PathBuf,
    },

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file does not match the expected schema.
    #[error("invalid configuration in {}: {source}", .path.display())]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_not_found_display() {
        let error = LifecycleError::StageNotFound {
            name: "whoops".to_string(),
        };
        assert_eq!(error.to_string(), "whoops: lifecycle stage not found");
    }

    #[test]
    fn test_task_failure_display() {
        let error = TaskError::ScriptFailed {
            script: "test".to_string(),
            code: Some(2),
        };
        assert_eq!(error.to_string(), "script 'test' failed with exit code 2");

        let error = TaskError::ScriptFailed {
            script: "test".to_string(),
            code: None,
        };
        assert_eq!(
            error.to_string(),
            "script 'test' failed with an abnormal termination"
        );
    }

    #[test]
    fn test_stage_error_wraps_task_failure() {
        let error = StageError::new(
            "verify",
            TaskError::ScriptFailed {
                script: "lint".to_string(),
                code: Some(1),
            },
        );

        assert_eq!(error.stage, "verify");
        assert_eq!(error.source.script(), "lint");
        assert_eq!(
            error.to_string(),
            "stage 'verify' failed: script 'lint' failed with exit code 1"
        );
    }

    #[test]
    fn test_lifecycle_error_from_stage_error() {
        let stage_error = StageError::new(
            "verify",
            TaskError::ScriptFailed {
                script: "lint".to_string(),
                code: Some(1),
            },
        );
        let error: LifecycleError = stage_error.into();

        assert!(matches!(error, LifecycleError::Stage(_)));
    }

    #[test]
    fn test_script_not_found_display() {
        let error = ScriptError::NotFound {
            script: "compile".to_string(),
            manifest: PathBuf::from("/proj/package.json"),
        };
        assert_eq!(
            error.to_string(),
            "script 'compile' is not defined in /proj/package.json"
        );
    }
}
