//! Normalization of authored shorthand into the canonical model.

use super::model::{Config, LifecycleDecl, StageConfig, StageDecl, TaskConfig, TaskDecl};
use crate::core::{Lifecycle, OutputMode, Stage, Task};

impl Config {
    /// Resolves a named lifecycle into its canonical form.
    #[must_use]
    pub fn lifecycle(&self, name: &str) -> Option<Lifecycle> {
        self.lifecycles.get(name).map(normalize_lifecycle)
    }

    /// Normalizes every declared lifecycle, sorted by name.
    #[must_use]
    pub fn all_lifecycles(&self) -> Vec<(String, Lifecycle)> {
        let mut entries: Vec<_> = self
            .lifecycles
            .iter()
            .map(|(name, decl)| (name.clone(), normalize_lifecycle(decl)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

fn normalize_lifecycle(decl: &LifecycleDecl) -> Lifecycle {
    Lifecycle::new(decl.stages().iter().map(normalize_stage).collect())
}

fn normalize_stage(decl: &StageDecl) -> Stage {
    match decl {
        StageDecl::Name(name) => Stage::new(
            name.clone(),
            vec![Task::new(name.clone(), OutputMode::Stream)],
        ),
        StageDecl::Config(config) => {
            let default_mode = default_output_mode(config);
            let tasks = match &config.tasks {
                Some(tasks) => tasks
                    .iter()
                    .map(|task| normalize_task(task, default_mode))
                    .collect(),
                // No tasks declared: a single task named after the stage.
                None => vec![Task::new(config.name.clone(), default_mode)],
            };

            Stage::new(config.name.clone(), tasks)
                .with_parallel(config.parallel)
                .with_background(config.background)
        }
    }
}

/// The default mode for a stage's tasks: the stage's explicit mode when
/// set, otherwise `batch` for parallel stages and `stream` for sequential
/// ones.
fn default_output_mode(config: &StageConfig) -> OutputMode {
    config.output_mode.unwrap_or(if config.parallel {
        OutputMode::Batch
    } else {
        OutputMode::Stream
    })
}

fn normalize_task(decl: &TaskDecl, default_mode: OutputMode) -> Task {
    match decl {
        TaskDecl::Script(script) => Task::new(script.clone(), default_mode),
        TaskDecl::Config(TaskConfig {
            script,
            output_mode,
        }) => Task::new(script.clone(), output_mode.unwrap_or(default_mode)),
    }
}
