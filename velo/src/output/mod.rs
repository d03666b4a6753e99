//! Shared output sinks for task stdout/stderr.
//!
//! Every task within one stage execution writes into the same pair of
//! sinks, directly (`stream`), via a post-hoc atomic flush (`batch`), or
//! not at all (`ignore`).

mod sink;

pub use sink::{BufferSink, NullSink, OutputSink, StandardSink};
