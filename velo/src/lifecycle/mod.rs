//! Lifecycle orchestration.
//!
//! The orchestrator iterates a lifecycle's stages in declaration order up
//! to a requested stopping point, awaiting foreground stages and launching
//! background stages fire-and-forget. A foreground failure halts the run
//! immediately; a background stage is only awaited when it is the run's
//! terminal stage.

use crate::core::{Lifecycle, Stage};
use crate::errors::LifecycleError;
use crate::stages::{execute_stage, StageContext};
use serde_json::json;
use std::path::{Path, PathBuf};


/// Parameters for one lifecycle run.
#[derive(Debug, Clone)]
pub struct LifecycleRun {
    /// The lifecycle to execute.
    pub lifecycle: Lifecycle,
    /// The stage to stop at, inclusive. When unset the run ends after the
    /// lifecycle's last stage.
    pub last_stage: Option<String>,
    /// The working directory scripts are invoked in.
    pub dir: PathBuf,
}

impl LifecycleRun {
    /// Creates a run over the whole lifecycle.
    #[must_use]
    pub fn new(lifecycle: Lifecycle, dir: impl Into<PathBuf>) -> Self {
        Self {
            lifecycle,
            last_stage: None,
            dir: dir.into(),
        }
    }

    /// Sets the stage to stop at.
    #[must_use]
    pub fn with_last_stage(mut self, name: impl Into<String>) -> Self {
        self.last_stage = Some(name.into());
        self
    }
}

/// Runs stages in order up to and including the run's terminal stage.
///
/// An unknown `last_stage` is rejected before any task executes. A failing
/// foreground stage halts orchestration; no further stages, foreground or
/// background, are started. Background stages still running when this
/// returns are neither joined nor cancelled; their later outcome is
/// unobserved by this run and their fate at process exit is the host's
/// concern.
pub async fn execute_lifecycle(
    run: &LifecycleRun,
    ctx: &StageContext,
) -> Result<(), LifecycleError> {
    if let Some(name) = &run.last_stage {
        if !run.lifecycle.contains_stage(name) {
            return Err(LifecycleError::StageNotFound { name: name.clone() });
        }
    }

    let stage_count = run.lifecycle.stages.len();
    for (index, stage) in run.lifecycle.stages.iter().enumerate() {
        let terminal = match &run.last_stage {
            Some(name) => stage.name == *name,
            None => index + 1 == stage_count,
        };

        // "Background" only suppresses awaiting when the run continues
        // past the stage; a background terminal stage runs like any
        // foreground stage.
        if stage.background && !terminal {
            spawn_background_stage(stage, &run.dir, ctx);
            continue;
        }

        ctx.events
            .try_emit("stage.started", Some(json!({ "stage": stage.name })));

        match execute_stage(stage, &run.dir, ctx).await {
            Ok(()) => {
                ctx.events
                    .try_emit("stage.completed", Some(json!({ "stage": stage.name })));
            }
            Err(error) => {
                ctx.events.try_emit(
                    "stage.failed",
                    Some(json!({
                        "stage": stage.name,
                        "error": error.to_string(),
                    })),
                );
                return Err(error.into());
            }
        }

        if terminal {
            break;
        }
    }

    Ok(())
}

/// Launches a stage detached, with its output suppressed.
///
/// The handle is dropped: the stage's completion time is unbounded and
/// unordered relative to subsequent stages, and a later failure is
/// reported through the event sink only.
fn spawn_background_stage(stage: &Stage, dir: &Path, ctx: &StageContext) {
    ctx.events
        .try_emit("stage.background", Some(json!({ "stage": stage.name })));

    let stage = stage.clone();
    let dir = dir.to_path_buf();
    let background_ctx = ctx.suppressed();

    tokio::spawn(async move {
        if let Err(error) = execute_stage(&stage, &dir, &background_ctx).await {
            background_ctx.events.try_emit(
                "stage.failed",
                Some(json!({
                    "stage": stage.name,
                    "error": error.to_string(),
                    "background": true,
                })),
            );
        }
    });
}
