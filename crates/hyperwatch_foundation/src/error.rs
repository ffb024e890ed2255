//! Error types for the Hyperwatch system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::Cycle;
use crate::registry::{PropId, VarId};
use crate::types::ValueKind;

/// Result type used throughout Hyperwatch.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Hyperwatch operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an ordering error for a write or extension at `cycle`.
    ///
    /// `last` is the most recent cycle already recorded, or `None` when the
    /// signal has never been written.
    #[must_use]
    pub fn ordering(signal: SignalRef, cycle: Cycle, last: Option<Cycle>) -> Self {
        Self::new(ErrorKind::Ordering {
            signal,
            cycle,
            last,
        })
    }

    /// Creates an index error for an out-of-range signal or slot.
    #[must_use]
    pub fn index_out_of_bounds(signal: SignalRef, length: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds { signal, length })
    }

    /// Creates a value-kind mismatch error.
    #[must_use]
    pub fn type_mismatch(signal: SignalRef, expected: ValueKind, actual: ValueKind) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            signal,
            expected,
            actual,
        })
    }

    /// Creates a formula configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Creates an error for a query before the signal's first write.
    #[must_use]
    pub fn missing_value(signal: SignalRef, cycle: Cycle) -> Self {
        Self::new(ErrorKind::MissingValue { signal, cycle })
    }

    /// Creates an error for a cycle past the data every trace covers.
    #[must_use]
    pub fn beyond_horizon(cycle: Cycle, horizon: Cycle) -> Self {
        Self::new(ErrorKind::BeyondHorizon { cycle, horizon })
    }

    /// Returns true if this is an ordering error.
    #[must_use]
    pub fn is_ordering(&self) -> bool {
        matches!(self.kind, ErrorKind::Ordering { .. })
    }

    /// Returns true if this is an index error.
    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(self.kind, ErrorKind::IndexOutOfBounds { .. })
    }

    /// Returns true if this is a value-kind mismatch.
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration(_))
    }
}

/// Identifies the signal (or trace slot) an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalRef {
    /// A proposition.
    Prop(PropId),
    /// A term variable.
    Term(VarId),
    /// A trace slot in an assignment.
    Slot(usize),
    /// A trace's horizon.
    Horizon,
}

impl fmt::Display for SignalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prop(id) => write!(f, "proposition #{}", id.index()),
            Self::Term(id) => write!(f, "term #{}", id.index()),
            Self::Slot(slot) => write!(f, "trace slot {slot}"),
            Self::Horizon => write!(f, "horizon"),
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A cycle was not strictly after the last recorded one.
    #[error("{}", ordering_message(.signal, .cycle, .last))]
    Ordering {
        /// The signal that was written.
        signal: SignalRef,
        /// The rejected cycle.
        cycle: Cycle,
        /// The last cycle already recorded, if any.
        last: Option<Cycle>,
    },

    /// A proposition, term, or slot id is outside the declared range.
    #[error("{signal} out of bounds (length {length})")]
    IndexOutOfBounds {
        /// The signal that was addressed.
        signal: SignalRef,
        /// The number of declared entries.
        length: usize,
    },

    /// A value's kind conflicts with the kind fixed for its variable.
    #[error("type mismatch on {signal}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The variable that was written or compared.
        signal: SignalRef,
        /// The kind fixed for the variable.
        expected: ValueKind,
        /// The kind that was supplied.
        actual: ValueKind,
    },

    /// A formula refers to ids, slots, or kinds the evaluation scope cannot satisfy.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A signal was read before its first recorded value.
    #[error("no value recorded for {signal} at cycle {cycle}")]
    MissingValue {
        /// The signal that was read.
        signal: SignalRef,
        /// The queried cycle.
        cycle: Cycle,
    },

    /// An incremental step asked for a cycle no trace has reached yet.
    #[error("cycle {cycle} is beyond the available horizon {horizon}")]
    BeyondHorizon {
        /// The requested cycle.
        cycle: Cycle,
        /// The highest cycle every trace covers.
        horizon: Cycle,
    },

    /// The evaluation session has been closed.
    #[error("session is closed")]
    SessionClosed,

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn ordering_message(signal: &SignalRef, cycle: &Cycle, last: &Option<Cycle>) -> String {
    match last {
        Some(last) => {
            format!("out-of-order cycle for {signal}: {cycle} is not after {last}")
        }
        None => format!("first write to {signal} must be at cycle 0, got {cycle}"),
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file, property name, or other origin.
    pub source: Option<String>,
    /// Stack of enclosing operations, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
