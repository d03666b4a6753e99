//! Testing utilities for the velo engine.
//!
//! This module provides:
//! - A programmable mock script runner with recorded invocations
//! - Re-exported capturing sinks for observing task output

mod mocks;

pub use crate::output::BufferSink;
pub use mocks::{InvocationRecorder, ScriptBehavior, ScriptedRunner};
