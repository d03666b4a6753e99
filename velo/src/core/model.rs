//! Canonical lifecycle model consumed by the execution engine.
//!
//! These values are built once by the configuration layer and are read-only
//! throughout orchestration.

use super::OutputMode;
use serde::{Deserialize, Serialize};

/// An ordered list of stages representing a full build/test sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lifecycle {
    /// The stages, in declaration order.
    pub stages: Vec<Stage>,
}

impl Lifecycle {
    /// Creates a lifecycle from a list of stages.
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Returns true if a stage with the given name exists.
    ///
    /// Stage names are not required to be unique; the first match wins
    /// wherever a lookup by name is performed.
    #[must_use]
    pub fn contains_stage(&self, name: &str) -> bool {
        self.stages.iter().any(|stage| stage.name == name)
    }
}

/// A named unit of work within a lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// The stage name, used for terminal-stage lookup and diagnostics.
    pub name: String,
    /// The tasks to run, in declaration order.
    pub tasks: Vec<Task>,
    /// When true, all tasks are launched concurrently and the stage waits
    /// for every one of them to settle. When false, tasks run strictly in
    /// declaration order, stopping at the first failure.
    #[serde(default)]
    pub parallel: bool,
    /// When true, the stage is fire-and-forget: the orchestrator launches
    /// it without awaiting completion, unless it is the run's terminal
    /// stage.
    #[serde(default)]
    pub background: bool,
}

impl Stage {
    /// Creates a sequential, foreground stage.
    #[must_use]
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: name.into(),
            tasks,
            parallel: false,
            background: false,
        }
    }

    /// Sets the concurrency mode.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the background designation.
    #[must_use]
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }
}

/// A single named script invocation within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// The script identifier, resolved by the host environment.
    pub script: String,
    /// How this task's output is routed.
    #[serde(rename = "outputMode", default)]
    pub output_mode: OutputMode,
}

impl Task {
    /// Creates a task with the given script and output mode.
    #[must_use]
    pub fn new(script: impl Into<String>, output_mode: OutputMode) -> Self {
        Self {
            script: script.into(),
            output_mode,
        }
    }
}
