//! Trace export functionality
//!
//! The event model and its serialization to Chrome Trace Event Format, for
//! visualization in Perfetto or chrome://tracing.

pub mod chrome_trace;

pub use chrome_trace::{Event, EventArgs, Phase, TraceEvents};
