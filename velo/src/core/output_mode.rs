//! Output routing modes for lifecycle tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a task's stdout/stderr are routed to the shared sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Child output is forwarded live to the shared sinks as it arrives.
    ///
    /// In a parallel stage this interleaves concurrently-running tasks'
    /// output at arbitrary byte boundaries.
    Stream,
    /// Child output is captured in full, then flushed to the shared sinks
    /// as one atomic write per stream once the task terminates.
    Batch,
    /// Child output is discarded; nothing reaches the shared sinks.
    Ignore,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::Stream
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::Batch => write!(f, "batch"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}
