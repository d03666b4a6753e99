//! Mock script runners for testing.

use crate::errors::ScriptError;
use crate::script::{ScriptOutput, ScriptRunner, StdioPolicy};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A scripted outcome for one named script.
#[derive(Debug, Clone)]
pub struct ScriptBehavior {
    code: Option<i32>,
    stdout_chunks: Vec<Vec<u8>>,
    stderr_chunks: Vec<Vec<u8>>,
    start_delay: Duration,
    chunk_delay: Duration,
    pending: bool,
}

impl ScriptBehavior {
    /// A script that exits with code zero.
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stdout_chunks: Vec::new(),
            stderr_chunks: Vec::new(),
            start_delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
            pending: false,
        }
    }

    /// A script that exits with the given non-zero code.
    #[must_use]
    pub fn exit(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::success()
        }
    }

    /// A script terminated abnormally, with no exit code.
    #[must_use]
    pub fn killed() -> Self {
        Self {
            code: None,
            ..Self::success()
        }
    }

    /// A script that never reaches a terminal state.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            pending: true,
            ..Self::success()
        }
    }

    /// Appends a chunk of stdout the script produces.
    #[must_use]
    pub fn with_stdout(mut self, chunk: impl AsRef<[u8]>) -> Self {
        self.stdout_chunks.push(chunk.as_ref().to_vec());
        self
    }

    /// Appends a chunk of stderr the script produces.
    #[must_use]
    pub fn with_stderr(mut self, chunk: impl AsRef<[u8]>) -> Self {
        self.stderr_chunks.push(chunk.as_ref().to_vec());
        self
    }

    /// Delays the script's start (and so its whole execution).
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Delays each output chunk when streaming.
    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    fn stdout(&self) -> Vec<u8> {
        self.stdout_chunks.concat()
    }

    fn stderr(&self) -> Vec<u8> {
        self.stderr_chunks.concat()
    }
}

/// A handle onto a [`ScriptedRunner`]'s recorded invocations.
///
/// Stays usable after the runner has been moved into an `Arc<dyn
/// ScriptRunner>` and handed to the engine.
#[derive(Debug, Clone, Default)]
pub struct InvocationRecorder {
    records: Arc<Mutex<Vec<(String, PathBuf)>>>,
}

impl InvocationRecorder {
    /// Returns the recorded (script, directory) pairs in start order.
    #[must_use]
    pub fn invocations(&self) -> Vec<(String, PathBuf)> {
        self.records.lock().clone()
    }

    /// Returns the recorded script names in start order.
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|(script, _)| script.clone())
            .collect()
    }

    /// Returns the number of recorded invocations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was invoked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// A mock script runner that records invocations and plays back
/// configured behaviors.
///
/// Unconfigured scripts succeed silently.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    behaviors: HashMap<String, ScriptBehavior>,
    recorder: InvocationRecorder,
}

impl ScriptedRunner {
    /// Creates a runner with no configured scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the behavior of a named script.
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>, behavior: ScriptBehavior) -> Self {
        self.behaviors.insert(script.into(), behavior);
        self
    }

    /// Returns a recorder handle that outlives the runner value.
    #[must_use]
    pub fn recorder(&self) -> InvocationRecorder {
        self.recorder.clone()
    }
}

#[async_trait]
impl ScriptRunner for ScriptedRunner {
    async fn run(
        &self,
        script: &str,
        dir: &Path,
        stdio: StdioPolicy,
    ) -> Result<ScriptOutput, ScriptError> {
        self.recorder
            .records
            .lock()
            .push((script.to_string(), dir.to_path_buf()));

        let behavior = self
            .behaviors
            .get(script)
            .cloned()
            .unwrap_or_else(ScriptBehavior::success);

        if behavior.pending {
            std::future::pending::<()>().await;
        }
        if !behavior.start_delay.is_zero() {
            tokio::time::sleep(behavior.start_delay).await;
        }

        match stdio {
            StdioPolicy::Stream { stdout, stderr } => {
                for chunk in &behavior.stdout_chunks {
                    if !behavior.chunk_delay.is_zero() {
                        tokio::time::sleep(behavior.chunk_delay).await;
                    }
                    stdout.write(chunk).await;
                }
                for chunk in &behavior.stderr_chunks {
                    if !behavior.chunk_delay.is_zero() {
                        tokio::time::sleep(behavior.chunk_delay).await;
                    }
                    stderr.write(chunk).await;
                }
                Ok(ScriptOutput::from_code(behavior.code))
            }
            StdioPolicy::Capture => Ok(ScriptOutput {
                code: behavior.code,
                stdout: behavior.stdout(),
                stderr: behavior.stderr(),
            }),
            StdioPolicy::Discard => Ok(ScriptOutput::from_code(behavior.code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferSink;

    #[tokio::test]
    async fn test_scripted_runner_records_invocations() {
        let runner = ScriptedRunner::new();
        let recorder = runner.recorder();

        runner
            .run("build", Path::new("/proj"), StdioPolicy::Discard)
            .await
            .unwrap();

        assert_eq!(
            recorder.invocations(),
            vec![("build".to_string(), PathBuf::from("/proj"))]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_script_succeeds() {
        let runner = ScriptedRunner::new();
        let output = runner
            .run("anything", Path::new("/proj"), StdioPolicy::Capture)
            .await
            .unwrap();

        assert!(output.success());
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_behavior_playback_in_capture_mode() {
        let runner = ScriptedRunner::new().with_script(
            "build",
            ScriptBehavior::exit(7)
                .with_stdout("part one\n")
                .with_stdout("part two\n")
                .with_stderr("warning\n"),
        );

        let output = runner
            .run("build", Path::new("/proj"), StdioPolicy::Capture)
            .await
            .unwrap();

        assert_eq!(output.code, Some(7));
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "part one\npart two\n"
        );
        assert_eq!(String::from_utf8_lossy(&output.stderr), "warning\n");
    }

    #[tokio::test]
    async fn test_behavior_playback_in_stream_mode() {
        let runner = ScriptedRunner::new()
            .with_script("chatty", ScriptBehavior::success().with_stdout("hi\n"));
        let stdout = Arc::new(BufferSink::new());
        let stderr = Arc::new(BufferSink::new());

        runner
            .run(
                "chatty",
                Path::new("/proj"),
                StdioPolicy::Stream {
                    stdout: stdout.clone(),
                    stderr,
                },
            )
            .await
            .unwrap();

        assert_eq!(stdout.contents_string(), "hi\n");
    }

    #[tokio::test]
    async fn test_pending_script_never_settles() {
        let runner = ScriptedRunner::new().with_script("hang", ScriptBehavior::pending());

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            runner.run("hang", Path::new("/proj"), StdioPolicy::Discard),
        )
        .await;

        assert!(result.is_err(), "pending script must not settle");
    }
}
