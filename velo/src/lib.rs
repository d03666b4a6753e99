//! # Velo
//!
//! A project lifecycle runner.
//!
//! Velo executes a named, ordered sequence of build/test stages, each
//! composed of one or more package scripts, with support for:
//!
//! - **Ordered stage execution**: run a lifecycle up to a chosen stage
//! - **Per-stage concurrency**: sequential or parallel task execution
//! - **Output routing**: stream live, batch atomically, or ignore
//! - **Background stages**: fire-and-forget work the run does not await
//! - **Typed failures**: the failing stage, script, and exit code are
//!   never lost on the way up
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use velo::prelude::*;
//! use std::sync::Arc;
//!
//! // Discover and normalize the project configuration
//! let config = Config::discover(&project_dir).await?;
//! let lifecycle = config.lifecycle("build").unwrap();
//!
//! // Wire the engine to the real process runner and the console
//! let ctx = StageContext::new(
//!     Arc::new(PackageScriptRunner::new()),
//!     Arc::new(StandardSink::stdout()),
//!     Arc::new(StandardSink::stderr()),
//! );
//!
//! // Run it up to and including the "test" stage
//! let run = LifecycleRun::new(lifecycle, project_dir).with_last_stage("test");
//! execute_lifecycle(&run, &ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod output;
pub mod script;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::core::{Lifecycle, OutputMode, Stage, Task};
    pub use crate::errors::{
        ConfigError, LifecycleError, ScriptError, StageError, TaskError, VeloError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::lifecycle::{execute_lifecycle, LifecycleRun};
    pub use crate::output::{NullSink, OutputSink, StandardSink};
    pub use crate::script::{PackageScriptRunner, ScriptOutput, ScriptRunner, StdioPolicy};
    pub use crate::stages::{execute_stage, StageContext};
}
