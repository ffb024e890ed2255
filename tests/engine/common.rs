//! Trace builders shared by the engine tests

use hyperwatch_engine::TraceAssignment;
use hyperwatch_foundation::{PropId, Value, VarId};
use hyperwatch_language::{Formula, FormulaRef};
use hyperwatch_storage::TraceStore;

pub fn x(slot: usize) -> FormulaRef {
    Formula::prop(PropId::new(0), slot)
}

/// A one-proposition trace with one value per cycle.
pub fn prop_trace(values: &[bool]) -> TraceStore {
    let mut trace = TraceStore::new(1, 0);
    for (cycle, value) in values.iter().enumerate() {
        trace
            .update_prop(PropId::new(0), cycle as u32, *value)
            .unwrap();
    }
    trace
}

/// A one-term trace with one scalar per cycle.
pub fn term_trace(values: &[u32]) -> TraceStore {
    let mut trace = TraceStore::new(0, 1);
    for (cycle, value) in values.iter().enumerate() {
        trace
            .update_term(VarId::new(0), cycle as u32, Value::from(*value))
            .unwrap();
    }
    trace
}

pub fn props(traces: &[&[bool]]) -> TraceAssignment {
    TraceAssignment::from_stores(traces.iter().map(|t| prop_trace(t)))
}

pub fn terms(traces: &[&[u32]]) -> TraceAssignment {
    TraceAssignment::from_stores(traces.iter().map(|t| term_trace(t)))
}
