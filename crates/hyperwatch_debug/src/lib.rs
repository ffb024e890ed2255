//! Monitor tracing for Hyperwatch.
//!
//! This crate provides:
//! - [`Tracer`] - Records monitor events with zero overhead when disabled
//! - [`TraceBuffer`] - Bounded, cycle-indexed record storage
//! - [`HumanFormatter`] / [`JsonFormatter`] - Record rendering

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod trace;

pub use trace::{
    HumanFormatter, JsonFormatter, Sample, TraceBuffer, TraceBufferStats, TraceEvent,
    TraceFormatter, TraceOutput, TraceRecord, Tracer, TracerConfig,
};
