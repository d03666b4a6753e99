//! Event emission for observability.
//!
//! Both engine components receive an [`EventSink`] instead of writing to a
//! global logger, so tests can substitute a capturing sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
