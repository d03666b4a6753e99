//! Output sink trait and implementations.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A shared, append-only write target for task output.
///
/// The two sinks of an execution context (stdout and stderr) are shared by
/// every task in a stage. One `write` call is one atomic write: concurrent
/// batch flushes from sibling tasks may land in either order, but their
/// bytes are never interleaved.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Writes the given bytes as a single atomic operation.
    ///
    /// Write errors are swallowed, matching console-write semantics; a sink
    /// is an observation channel, not a failure source for the engine.
    async fn write(&self, bytes: &[u8]);
}

/// A sink that discards everything written to it.
///
/// Used for `ignore`-mode routing and for the suppressed output of
/// background stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl OutputSink for NullSink {
    async fn write(&self, _bytes: &[u8]) {
        // Intentionally empty - discards all output
    }
}

/// A sink over any async writer, serialized by an internal lock.
///
/// The lock is what makes each `write` call atomic with respect to sibling
/// tasks flushing concurrently.
pub struct StandardSink<W> {
    writer: tokio::sync::Mutex<W>,
}

impl StandardSink<tokio::io::Stdout> {
    /// Creates a sink over the process's stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl StandardSink<tokio::io::Stderr> {
    /// Creates a sink over the process's stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(tokio::io::stderr())
    }
}

impl<W: AsyncWrite + Unpin + Send> StandardSink<W> {
    /// Creates a sink over the given writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
        }
    }
}

impl<W> std::fmt::Debug for StandardSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardSink").finish_non_exhaustive()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> OutputSink for StandardSink<W> {
    async fn write(&self, bytes: &[u8]) {
        let mut writer = self.writer.lock().await;
        if writer.write_all(bytes).await.is_ok() {
            let _ = writer.flush().await;
        }
    }
}

/// An in-memory capturing sink for testing purposes.
#[derive(Debug, Default)]
pub struct BufferSink {
    data: parking_lot::Mutex<Vec<u8>>,
}

impl BufferSink {
    /// Creates a new empty buffer sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    /// Returns the captured bytes as a lossy UTF-8 string.
    #[must_use]
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.data.lock()).into_owned()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Clears the captured bytes.
    pub fn clear(&self) {
        self.data.lock().clear();
    }
}

#[async_trait]
impl OutputSink for BufferSink {
    async fn write(&self, bytes: &[u8]) {
        self.data.lock().extend_from_slice(bytes);
    }
}
