//! Tracing of monitor activity.
//!
//! A [`Tracer`] records [`TraceEvent`]s into a bounded [`TraceBuffer`],
//! stamping each with the monitor's current cycle. Recording is a single
//! branch when tracing is disabled.
//!
//! # Example
//!
//! ```
//! use hyperwatch_debug::{Tracer, TracerConfig};
//!
//! let mut tracer = Tracer::new(TracerConfig::new().enabled());
//! tracer.cycle_start(0);
//! tracer.verdict_changed("obs", true, 0, true);
//! tracer.cycle_end(0, 1);
//!
//! assert_eq!(tracer.buffer().records_for_cycle(0).count(), 3);
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{Sample, TraceEvent, TraceRecord};

use std::io::{self, Write};
use std::time::Instant;

use hyperwatch_foundation::{Cycle, SignalRef, VarRegistry};

// =============================================================================
// Trace Output
// =============================================================================

/// Where records are echoed as they are recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// Buffer only.
    #[default]
    None,
    /// Also write each record to stderr.
    Stderr,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for a [`Tracer`].
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records kept in the buffer.
    pub buffer_size: usize,
    /// Echo target.
    pub output: TraceOutput,
    /// Whether echoed and formatted records use JSON.
    pub json_format: bool,
    /// Event types to record; empty records everything.
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a disabled configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Sets the buffer capacity.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Echoes records to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Uses JSON formatting.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Records only the given event types (see [`TraceEvent::event_type`]).
    #[must_use]
    pub fn filter_events<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_filter = types.into_iter().map(Into::into).collect();
        self
    }

    fn accepts(&self, event: &TraceEvent) -> bool {
        self.event_filter.is_empty()
            || self
                .event_filter
                .iter()
                .any(|t| t == event.event_type())
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records monitor events.
#[derive(Debug)]
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    current_cycle: Cycle,
    start_time: Instant,
    registry: Option<VarRegistry>,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl Tracer {
    /// Creates a tracer.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer = TraceBuffer::new(config.buffer_size);
        Self {
            config,
            buffer,
            current_cycle: 0,
            start_time: Instant::now(),
            registry: None,
            human_formatter: HumanFormatter::new().with_timestamps(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a disabled tracer.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that echoes to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing. Buffered records are kept.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Sets the cycle stamped on subsequent records.
    pub fn set_cycle(&mut self, cycle: Cycle) {
        self.current_cycle = cycle;
    }

    /// Returns the cycle stamped on new records.
    #[must_use]
    pub fn current_cycle(&self) -> Cycle {
        self.current_cycle
    }

    /// Sets the registry used to name signals in formatted output.
    pub fn set_registry(&mut self, registry: VarRegistry) {
        self.registry = Some(registry);
    }

    /// Sets whether formatted output is JSON.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Sets the echo target.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Records an event.
    #[inline]
    pub fn record(&mut self, event: TraceEvent) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(event);
    }

    fn record_internal(&mut self, event: TraceEvent) {
        if !self.config.accepts(&event) {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;

        let cycle = self.current_cycle;
        if self.config.output == TraceOutput::Stderr {
            let echo = event.clone();
            let id = self.buffer.push(cycle, timestamp_ns, event);
            let line = self.format_record(&TraceRecord::new(id, cycle, timestamp_ns, echo));
            let _ = writeln!(io::stderr(), "{line}");
        } else {
            self.buffer.push(cycle, timestamp_ns, event);
        }
    }

    /// Formats a record with the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord) -> String {
        let registry = self.registry.as_ref();
        if self.config.json_format {
            self.json_formatter.format(record, registry)
        } else {
            self.human_formatter.format(record, registry)
        }
    }

    /// Formats several records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord]) -> String {
        let registry = self.registry.as_ref();
        if self.config.json_format {
            self.json_formatter.format_many(records, registry)
        } else {
            self.human_formatter.format_many(records, registry)
        }
    }

    /// Returns the buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Drops all buffered records.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }

    // -------------------------------------------------------------------------
    // Convenience methods for common events
    // -------------------------------------------------------------------------

    /// Records the start of a cycle and makes it the current cycle.
    #[inline]
    pub fn cycle_start(&mut self, cycle: Cycle) {
        self.current_cycle = cycle;
        self.record(TraceEvent::CycleStart { cycle });
    }

    /// Records the end of a cycle.
    #[inline]
    pub fn cycle_end(&mut self, cycle: Cycle, properties: usize) {
        self.record(TraceEvent::CycleEnd { cycle, properties });
    }

    /// Records a write to a trace signal.
    #[inline]
    pub fn trace_updated(&mut self, slot: usize, signal: SignalRef, cycle: Cycle, value: Sample) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(TraceEvent::TraceUpdated {
            slot,
            signal,
            cycle,
            value,
        });
    }

    /// Records a horizon extension.
    #[inline]
    pub fn trace_extended(&mut self, slot: usize, cycle: Cycle) {
        self.record(TraceEvent::TraceExtended { slot, cycle });
    }

    /// Records a new property.
    #[inline]
    pub fn property_added(&mut self, property: &str, formula: impl FnOnce() -> String) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(TraceEvent::PropertyAdded {
            property: property.to_string(),
            formula: formula(),
        });
    }

    /// Records a verdict change.
    #[inline]
    pub fn verdict_changed(&mut self, property: &str, holds: bool, horizon: Cycle, provisional: bool) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(TraceEvent::VerdictChanged {
            property: property.to_string(),
            holds,
            horizon,
            provisional,
        });
    }

    /// Records a provisional verdict overturned at `horizon`.
    #[inline]
    pub fn provisional_invalidated(&mut self, property: &str, horizon: Cycle) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(TraceEvent::ProvisionalInvalidated {
            property: property.to_string(),
            horizon,
        });
    }

    /// Records a batch cross-check result.
    #[inline]
    pub fn batch_checked(&mut self, property: &str, agrees: bool) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(TraceEvent::BatchChecked {
            property: property.to_string(),
            agrees,
        });
    }

    /// Records the end of the session.
    #[inline]
    pub fn session_closed(&mut self, horizon: Cycle, properties: usize) {
        self.record(TraceEvent::SessionClosed {
            horizon,
            properties,
        });
    }

    /// Records a caller-defined event.
    #[inline]
    pub fn custom(&mut self, name: impl Into<String>, data: impl Into<String>) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(TraceEvent::Custom {
            name: name.into(),
            data: data.into(),
        });
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}
