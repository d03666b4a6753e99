//! The script-invocation boundary.
//!
//! The engine treats a script as an opaque invocable key; everything about
//! how it is resolved and executed lives behind [`ScriptRunner`]. The
//! runner must support piping live output, capturing output for a later
//! atomic flush, and discarding output, and it must surface the exit code
//! in every one of those modes - including for failed scripts, whose
//! captured output stays retrievable.

use crate::errors::ScriptError;
use crate::output::OutputSink;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// How a launched script's stdout/stderr are handled by the runner.
pub enum StdioPolicy {
    /// Forward both streams live to the given sinks as bytes arrive.
    Stream {
        /// Sink receiving the child's stdout.
        stdout: Arc<dyn OutputSink>,
        /// Sink receiving the child's stderr.
        stderr: Arc<dyn OutputSink>,
    },
    /// Capture both streams fully in memory; they are returned in the
    /// [`ScriptOutput`] even when the script fails.
    Capture,
    /// Read nothing from the child; output is discarded.
    Discard,
}

impl std::fmt::Debug for StdioPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream { .. } => write!(f, "Stream"),
            Self::Capture => write!(f, "Capture"),
            Self::Discard => write!(f, "Discard"),
        }
    }
}

/// The terminal state of a completed script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// The process exit code; `None` when the process was killed by a
    /// signal or otherwise terminated abnormally.
    pub code: Option<i32>,
    /// Captured stdout. Populated only under [`StdioPolicy::Capture`].
    pub stdout: Vec<u8>,
    /// Captured stderr. Populated only under [`StdioPolicy::Capture`].
    pub stderr: Vec<u8>,
}

impl ScriptOutput {
    /// Creates an output carrying only an exit code.
    #[must_use]
    pub fn from_code(code: Option<i32>) -> Self {
        Self {
            code,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    /// Returns true if the script exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a named script in a directory with a chosen stdio strategy.
///
/// This is the sole boundary to the host's process-execution facility;
/// tests substitute a scripted implementation.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Invokes `script` with `dir` as the working directory.
    ///
    /// Returns `Ok` whenever the process ran to completion, whatever its
    /// exit code; `Err` only when the script could not be invoked at all.
    async fn run(
        &self,
        script: &str,
        dir: &Path,
        stdio: StdioPolicy,
    ) -> Result<ScriptOutput, ScriptError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_output_success() {
        assert!(ScriptOutput::from_code(Some(0)).success());
        assert!(!ScriptOutput::from_code(Some(1)).success());
        assert!(!ScriptOutput::from_code(None).success());
    }

    #[test]
    fn test_stdio_policy_debug() {
        assert_eq!(format!("{:?}", StdioPolicy::Capture), "Capture");
        assert_eq!(format!("{:?}", StdioPolicy::Discard), "Discard");
    }
}
