//! User-authored configuration declarations.
//!
//! Lifecycles, stages, and tasks may each be written in a string shorthand
//! or an expanded object form; normalization turns them into the canonical
//! model the engine consumes.

use crate::core::OutputMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The root configuration: named lifecycles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Declared lifecycles by name.
    #[serde(default)]
    pub lifecycles: HashMap<String, LifecycleDecl>,
}

/// A lifecycle as authored: a bare stage list, or wrapped in `stages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LifecycleDecl {
    /// `"build": ["compile", "test"]`
    List(Vec<StageDecl>),
    /// `"build": { "stages": [...] }`
    Config {
        /// The stage declarations, in order.
        stages: Vec<StageDecl>,
    },
}

impl LifecycleDecl {
    /// Returns the declared stages, whichever form was used.
    #[must_use]
    pub fn stages(&self) -> &[StageDecl] {
        match self {
            Self::List(stages) | Self::Config { stages } => stages,
        }
    }
}

/// A stage as authored: a bare name, or an expanded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageDecl {
    /// Shorthand: the stage name doubles as its single task's script.
    Name(String),
    /// Expanded form with explicit tasks and modes.
    Config(StageConfig),
}

/// The expanded stage declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    /// The stage name.
    pub name: String,
    /// Task declarations; when omitted, a single task named after the
    /// stage is assumed.
    #[serde(default)]
    pub tasks: Option<Vec<TaskDecl>>,
    /// Concurrency mode; defaults to sequential.
    #[serde(default)]
    pub parallel: bool,
    /// Background designation; defaults to foreground.
    #[serde(default)]
    pub background: bool,
    /// Default output mode for this stage's tasks.
    #[serde(default)]
    pub output_mode: Option<OutputMode>,
}

/// A task as authored: a bare script name, or an expanded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskDecl {
    /// Shorthand: the script, inheriting the stage's default output mode.
    Script(String),
    /// Expanded form with an explicit output mode.
    Config(TaskConfig),
}

/// The expanded task declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    /// The script to run.
    pub script: String,
    /// Output mode override for this task.
    #[serde(default)]
    pub output_mode: Option<OutputMode>,
}
