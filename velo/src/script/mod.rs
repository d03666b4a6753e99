//! Script invocation.
//!
//! This module provides:
//! - The [`ScriptRunner`] boundary trait and its stdio strategies
//! - The production [`PackageScriptRunner`] over `package.json` scripts

mod process;
mod runner;

pub use process::PackageScriptRunner;
pub use runner::{ScriptOutput, ScriptRunner, StdioPolicy};
