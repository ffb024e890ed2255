//! Trace records and events.

use std::fmt;

use hyperwatch_foundation::{Cycle, SignalRef, Value};

/// A value written to a trace signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sample {
    /// A proposition's truth value.
    Prop(bool),
    /// A term variable's value.
    Term(Value),
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prop(v) => write!(f, "{v}"),
            Self::Term(v) => write!(f, "{v}"),
        }
    }
}

/// Something the monitor did.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    // --- Cycle lifecycle ---
    /// The monitor began processing a cycle.
    CycleStart {
        /// The cycle being processed.
        cycle: Cycle,
    },
    /// The monitor finished processing a cycle.
    CycleEnd {
        /// The cycle processed.
        cycle: Cycle,
        /// Number of properties re-evaluated.
        properties: usize,
    },

    // --- Trace data ---
    /// A signal of one trace was written.
    TraceUpdated {
        /// The trace slot.
        slot: usize,
        /// The signal written.
        signal: SignalRef,
        /// The cycle of the write.
        cycle: Cycle,
        /// The value written.
        value: Sample,
    },
    /// A trace's horizon was extended without a write.
    TraceExtended {
        /// The trace slot.
        slot: usize,
        /// The new last cycle.
        cycle: Cycle,
    },

    // --- Properties ---
    /// A property was registered with the monitor.
    PropertyAdded {
        /// Property name.
        property: String,
        /// Rendered formula.
        formula: String,
    },
    /// A property's verdict differs from its previous one.
    VerdictChanged {
        /// Property name.
        property: String,
        /// Whether the property holds at cycle 0.
        holds: bool,
        /// The horizon the verdict was computed at.
        horizon: Cycle,
        /// True if later cycles may still change the verdict.
        provisional: bool,
    },
    /// A provisional "holds" verdict was overturned by later data.
    ProvisionalInvalidated {
        /// Property name.
        property: String,
        /// The horizon at which the verdict flipped.
        horizon: Cycle,
    },
    /// The incremental verdict was compared with a full re-evaluation.
    BatchChecked {
        /// Property name.
        property: String,
        /// True if both agreed.
        agrees: bool,
    },

    // --- Session ---
    /// The session ended and every verdict became final.
    SessionClosed {
        /// The final horizon.
        horizon: Cycle,
        /// Number of properties closed.
        properties: usize,
    },

    // --- User ---
    /// Caller-defined event.
    Custom {
        /// Event name.
        name: String,
        /// Free-form payload.
        data: String,
    },
}

impl TraceEvent {
    /// Returns the event type name used for filtering.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CycleStart { .. } => "cycle-start",
            Self::CycleEnd { .. } => "cycle-end",
            Self::TraceUpdated { .. } => "trace-updated",
            Self::TraceExtended { .. } => "trace-extended",
            Self::PropertyAdded { .. } => "property-added",
            Self::VerdictChanged { .. } => "verdict-changed",
            Self::ProvisionalInvalidated { .. } => "provisional-invalidated",
            Self::BatchChecked { .. } => "batch-checked",
            Self::SessionClosed { .. } => "session-closed",
            Self::Custom { .. } => "custom",
        }
    }

    /// Returns true for cycle lifecycle events.
    #[must_use]
    pub fn is_cycle_event(&self) -> bool {
        matches!(self, Self::CycleStart { .. } | Self::CycleEnd { .. })
    }

    /// Returns true for trace data events.
    #[must_use]
    pub fn is_data_event(&self) -> bool {
        matches!(self, Self::TraceUpdated { .. } | Self::TraceExtended { .. })
    }

    /// Returns true for events about a named property.
    #[must_use]
    pub fn is_property_event(&self) -> bool {
        self.property().is_some()
    }

    /// Returns the property this event concerns, if any.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::PropertyAdded { property, .. }
            | Self::VerdictChanged { property, .. }
            | Self::ProvisionalInvalidated { property, .. }
            | Self::BatchChecked { property, .. } => Some(property),
            _ => None,
        }
    }
}

/// A recorded event with its cycle and timestamp.
#[derive(Clone, Debug)]
pub struct TraceRecord {
    /// Sequence number, unique within a tracer.
    pub id: u64,
    /// Cycle the monitor was at when the event was recorded.
    pub cycle: Cycle,
    /// Nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(id: u64, cycle: Cycle, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            cycle,
            timestamp_ns,
            event,
        }
    }
}
