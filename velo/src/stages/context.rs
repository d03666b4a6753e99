//! Collaborators injected into the stage executor.

use crate::events::{EventSink, NoOpEventSink};
use crate::output::{NullSink, OutputSink};
use crate::script::ScriptRunner;
use std::sync::Arc;

/// The execution context shared by every task of a stage.
///
/// Holds the script-invocation primitive, the pair of shared output sinks,
/// and the injected logging capability. The context owns no cross-stage
/// state; cloning it is cheap and shares the same collaborators.
#[derive(Clone)]
pub struct StageContext {
    /// The script-invocation primitive.
    pub runner: Arc<dyn ScriptRunner>,
    /// Shared sink for task stdout.
    pub stdout: Arc<dyn OutputSink>,
    /// Shared sink for task stderr.
    pub stderr: Arc<dyn OutputSink>,
    /// Injected logging capability.
    pub events: Arc<dyn EventSink>,
}

impl StageContext {
    /// Creates a context with a no-op event sink.
    #[must_use]
    pub fn new(
        runner: Arc<dyn ScriptRunner>,
        stdout: Arc<dyn OutputSink>,
        stderr: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            runner,
            stdout,
            stderr,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns a context whose output sinks discard everything.
    ///
    /// Background stages run with a suppressed context so their output
    /// never interleaves into the observed stream.
    #[must_use]
    pub fn suppressed(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            stdout: Arc::new(NullSink),
            stderr: Arc::new(NullSink),
            events: self.events.clone(),
        }
    }
}

impl std::fmt::Debug for StageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext").finish_non_exhaustive()
    }
}
