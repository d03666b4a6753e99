//! Core domain model types for velo.
//!
//! This module contains the fundamental types consumed by the execution
//! engine:
//! - The canonical `Lifecycle` / `Stage` / `Task` model
//! - The task output-routing mode enum

mod model;
mod output_mode;

pub use model::{Lifecycle, Stage, Task};
pub use output_mode::OutputMode;
