//! Stage execution.
//!
//! The stage executor runs the tasks of a single stage against a working
//! directory: sequentially (stopping at the first failure) or concurrently
//! (every task launched before any completes, every launched task allowed
//! to settle), routing each task's output according to its mode.

mod context;

pub use context::StageContext;

use crate::core::{OutputMode, Stage, Task};
use crate::errors::{StageError, TaskError};
use crate::script::StdioPolicy;
use futures::future;
use serde_json::json;
use std::path::Path;

/// Executes a single stage's tasks in `dir`.
///
/// A stage with no tasks trivially succeeds. On failure the returned
/// [`StageError`] names the stage and carries the triggering task failure.
pub async fn execute_stage(
    stage: &Stage,
    dir: &Path,
    ctx: &StageContext,
) -> Result<(), StageError> {
    if stage.parallel {
        run_parallel_tasks(stage, dir, ctx).await
    } else {
        run_sequential_tasks(stage, dir, ctx).await
    }
}

/// Runs tasks strictly in declaration order.
///
/// A failing task stops the loop at the point of failure; later tasks are
/// never started.
async fn run_sequential_tasks(
    stage: &Stage,
    dir: &Path,
    ctx: &StageContext,
) -> Result<(), StageError> {
    for task in &stage.tasks {
        run_task(task, dir, ctx)
            .await
            .map_err(|source| StageError::new(&stage.name, source))?;
    }
    Ok(())
}

/// Launches every task concurrently and waits for all of them to settle.
///
/// Sibling tasks are not cancelled when one fails; once all have settled,
/// the first failure in declaration order is reported for the stage.
async fn run_parallel_tasks(
    stage: &Stage,
    dir: &Path,
    ctx: &StageContext,
) -> Result<(), StageError> {
    let executions = stage.tasks.iter().map(|task| run_task(task, dir, ctx));
    let results = future::join_all(executions).await;

    for result in results {
        result.map_err(|source| StageError::new(&stage.name, source))?;
    }
    Ok(())
}

/// Runs one task, routing its output per the task's mode.
async fn run_task(task: &Task, dir: &Path, ctx: &StageContext) -> Result<(), TaskError> {
    ctx.events.try_emit(
        "task.started",
        Some(json!({
            "script": task.script,
            "output_mode": task.output_mode.to_string(),
        })),
    );

    let output = match task.output_mode {
        OutputMode::Stream => {
            ctx.runner
                .run(
                    &task.script,
                    dir,
                    StdioPolicy::Stream {
                        stdout: ctx.stdout.clone(),
                        stderr: ctx.stderr.clone(),
                    },
                )
                .await?
        }
        OutputMode::Batch => {
            let output = ctx.runner.run(&task.script, dir, StdioPolicy::Capture).await?;
            // Captured output stays observable even when the task failed.
            // stdout first, then stderr, each as one atomic write.
            if !output.stdout.is_empty() {
                ctx.stdout.write(&output.stdout).await;
            }
            if !output.stderr.is_empty() {
                ctx.stderr.write(&output.stderr).await;
            }
            output
        }
        OutputMode::Ignore => ctx.runner.run(&task.script, dir, StdioPolicy::Discard).await?,
    };

    if output.success() {
        ctx.events
            .try_emit("task.completed", Some(json!({ "script": task.script })));
        Ok(())
    } else {
        ctx.events.try_emit(
            "task.failed",
            Some(json!({
                "script": task.script,
                "code": output.code,
            })),
        );
        Err(TaskError::ScriptFailed {
            script: task.script.clone(),
            code: output.code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferSink;
    use crate::testing::{ScriptBehavior, ScriptedRunner};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_context(runner: ScriptedRunner) -> (StageContext, Arc<BufferSink>, Arc<BufferSink>) {
        let stdout = Arc::new(BufferSink::new());
        let stderr = Arc::new(BufferSink::new());
        let ctx = StageContext::new(Arc::new(runner), stdout.clone(), stderr.clone());
        (ctx, stdout, stderr)
    }

    fn dir() -> PathBuf {
        PathBuf::from("/mock/cwd")
    }

    #[tokio::test]
    async fn test_empty_stage_succeeds() {
        let (ctx, _, _) = test_context(ScriptedRunner::new());
        let stage = Stage::new("empty", Vec::new());

        execute_stage(&stage, &dir(), &ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_sequential_tasks_run_in_order() {
        let runner = ScriptedRunner::new()
            .with_script("one", ScriptBehavior::success().with_stdout("one\n"))
            .with_script("two", ScriptBehavior::success().with_stdout("two\n"))
            .with_script("three", ScriptBehavior::success().with_stdout("three\n"));
        let recorder = runner.recorder();
        let (ctx, stdout, _) = test_context(runner);

        let stage = Stage::new(
            "sequence",
            vec![
                Task::new("one", OutputMode::Stream),
                Task::new("two", OutputMode::Stream),
                Task::new("three", OutputMode::Stream),
            ],
        );

        execute_stage(&stage, &dir(), &ctx).await.unwrap();

        assert_eq!(recorder.scripts(), vec!["one", "two", "three"]);
        assert_eq!(stdout.contents_string(), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_sequential_stage_stops_at_failure() {
        let runner = ScriptedRunner::new()
            .with_script("a", ScriptBehavior::success())
            .with_script("b", ScriptBehavior::exit(2))
            .with_script("c", ScriptBehavior::success());
        let recorder = runner.recorder();
        let (ctx, _, _) = test_context(runner);

        let stage = Stage::new(
            "checks",
            vec![
                Task::new("a", OutputMode::Ignore),
                Task::new("b", OutputMode::Ignore),
                Task::new("c", OutputMode::Ignore),
            ],
        );

        let error = execute_stage(&stage, &dir(), &ctx).await.unwrap_err();

        assert_eq!(error.stage, "checks");
        assert_eq!(error.source.script(), "b");
        assert!(matches!(
            error.source,
            TaskError::ScriptFailed { code: Some(2), .. }
        ));
        // c was never started
        assert_eq!(recorder.scripts(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_parallel_stage_launches_all_tasks_despite_failure() {
        let runner = ScriptedRunner::new()
            .with_script("lint", ScriptBehavior::exit(1))
            .with_script("unit", ScriptBehavior::success().with_start_delay(Duration::from_millis(20)))
            .with_script("docs", ScriptBehavior::success().with_start_delay(Duration::from_millis(20)));
        let recorder = runner.recorder();
        let (ctx, _, _) = test_context(runner);

        let stage = Stage::new(
            "verify",
            vec![
                Task::new("lint", OutputMode::Ignore),
                Task::new("unit", OutputMode::Ignore),
                Task::new("docs", OutputMode::Ignore),
            ],
        )
        .with_parallel(true);

        let error = execute_stage(&stage, &dir(), &ctx).await.unwrap_err();

        assert_eq!(error.source.script(), "lint");
        // Every sibling was launched and ran to completion
        let mut scripts = recorder.scripts();
        scripts.sort_unstable();
        assert_eq!(scripts, vec!["docs", "lint", "unit"]);
    }

    #[tokio::test]
    async fn test_parallel_batch_output_is_contiguous_per_task() {
        let runner = ScriptedRunner::new()
            .with_script(
                "fast-beeps",
                ScriptBehavior::success()
                    .with_stdout("beep\n")
                    .with_stdout("beep\n"),
            )
            .with_script(
                "slow-boops",
                ScriptBehavior::success()
                    .with_stdout("boop\n")
                    .with_stdout("boop\n")
                    .with_start_delay(Duration::from_millis(100)),
            );
        let (ctx, stdout, _) = test_context(runner);

        let stage = Stage::new(
            "multiple",
            vec![
                Task::new("fast-beeps", OutputMode::Batch),
                Task::new("slow-boops", OutputMode::Batch),
            ],
        )
        .with_parallel(true);

        execute_stage(&stage, &dir(), &ctx).await.unwrap();

        // First to finish flushes first; each block is uninterrupted.
        assert_eq!(stdout.contents_string(), "beep\nbeep\nboop\nboop\n");
    }

    #[tokio::test]
    async fn test_parallel_stream_output_interleaves_by_timing() {
        let runner = ScriptedRunner::new()
            .with_script(
                "fast",
                ScriptBehavior::success().with_stdout("fast\n"),
            )
            .with_script(
                "slow",
                ScriptBehavior::success()
                    .with_stdout("slow\n")
                    .with_start_delay(Duration::from_millis(100)),
            );
        let (ctx, stdout, _) = test_context(runner);

        let stage = Stage::new(
            "multiple",
            vec![
                Task::new("slow", OutputMode::Stream),
                Task::new("fast", OutputMode::Stream),
            ],
        )
        .with_parallel(true);

        execute_stage(&stage, &dir(), &ctx).await.unwrap();

        // Completion timing, not declaration order, decides the order.
        assert_eq!(stdout.contents_string(), "fast\nslow\n");
    }

    #[tokio::test]
    async fn test_batch_flushes_captured_output_on_failure() {
        let runner = ScriptedRunner::new().with_script(
            "flaky",
            ScriptBehavior::exit(1)
                .with_stdout("partial result\n")
                .with_stderr("boom\n"),
        );
        let (ctx, stdout, stderr) = test_context(runner);

        let stage = Stage::new("build", vec![Task::new("flaky", OutputMode::Batch)]);

        let error = execute_stage(&stage, &dir(), &ctx).await.unwrap_err();

        assert_eq!(error.source.script(), "flaky");
        assert_eq!(stdout.contents_string(), "partial result\n");
        assert_eq!(stderr.contents_string(), "boom\n");
    }

    #[tokio::test]
    async fn test_ignore_mode_writes_nothing() {
        let runner = ScriptedRunner::new().with_script(
            "chatty",
            ScriptBehavior::success()
                .with_stdout("noise\n")
                .with_stderr("more noise\n"),
        );
        let (ctx, stdout, stderr) = test_context(runner);

        let stage = Stage::new("quiet", vec![Task::new("chatty", OutputMode::Ignore)]);

        execute_stage(&stage, &dir(), &ctx).await.unwrap();

        assert!(stdout.is_empty());
        assert!(stderr.is_empty());
    }

    #[tokio::test]
    async fn test_stream_routes_stderr_to_stderr_sink() {
        let runner = ScriptedRunner::new().with_script(
            "warns",
            ScriptBehavior::success().with_stderr("warning\n"),
        );
        let (ctx, stdout, stderr) = test_context(runner);

        let stage = Stage::new("warnings", vec![Task::new("warns", OutputMode::Stream)]);

        execute_stage(&stage, &dir(), &ctx).await.unwrap();

        assert!(stdout.is_empty());
        assert_eq!(stderr.contents_string(), "warning\n");
    }

    #[tokio::test]
    async fn test_working_directory_is_passed_through() {
        let runner = ScriptedRunner::new();
        let recorder = runner.recorder();
        let (ctx, _, _) = test_context(runner);

        let stage = Stage::new("build", vec![Task::new("build", OutputMode::Ignore)]);
        execute_stage(&stage, &dir(), &ctx).await.unwrap();

        assert_eq!(recorder.invocations(), vec![("build".to_string(), dir())]);
    }
}
