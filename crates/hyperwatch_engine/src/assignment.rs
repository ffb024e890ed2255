//! Trace assignments: the ordered traces a formula is evaluated over.

use std::sync::Arc;

use hyperwatch_foundation::{Cycle, Error, PropId, Result, SignalRef, VarId, VarRegistry};
use hyperwatch_language::Scope;
use hyperwatch_storage::TraceStore;

/// An ordered list of shared traces bound to slots `0..k`.
///
/// Traces are shared read-only. Mutating a slot through
/// [`trace_mut`](Self::trace_mut) copies the trace first if another handle
/// to it exists, so holders of earlier clones keep their snapshot.
#[derive(Clone, Debug, Default)]
pub struct TraceAssignment {
    traces: Vec<Arc<TraceStore>>,
}

impl TraceAssignment {
    /// Creates an assignment from shared traces.
    #[must_use]
    pub fn new(traces: Vec<Arc<TraceStore>>) -> Self {
        Self { traces }
    }

    /// Creates an assignment that takes ownership of `traces`.
    pub fn from_stores(traces: impl IntoIterator<Item = TraceStore>) -> Self {
        Self {
            traces: traces.into_iter().map(Arc::new).collect(),
        }
    }

    /// Binds `trace` to the next free slot and returns that slot.
    pub fn push(&mut self, trace: Arc<TraceStore>) -> usize {
        self.traces.push(trace);
        self.traces.len() - 1
    }

    /// Returns the number of bound traces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Returns true if no trace is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Returns the trace bound to `slot`.
    ///
    /// # Errors
    ///
    /// Returns an index error if `slot` is not bound.
    pub fn get(&self, slot: usize) -> Result<&Arc<TraceStore>> {
        self.traces
            .get(slot)
            .ok_or_else(|| Error::index_out_of_bounds(SignalRef::Slot(slot), self.traces.len()))
    }

    /// Returns a mutable view of the trace bound to `slot`, copying it
    /// first if it is shared.
    ///
    /// # Errors
    ///
    /// Returns an index error if `slot` is not bound.
    pub fn trace_mut(&mut self, slot: usize) -> Result<&mut TraceStore> {
        let len = self.traces.len();
        self.traces
            .get_mut(slot)
            .map(Arc::make_mut)
            .ok_or_else(|| Error::index_out_of_bounds(SignalRef::Slot(slot), len))
    }

    /// Returns all bound traces in slot order.
    #[must_use]
    pub fn traces(&self) -> &[Arc<TraceStore>] {
        &self.traces
    }

    /// Returns the highest cycle every trace covers.
    ///
    /// This is the smallest `last_cycle` among the traces, or 0 for an
    /// empty assignment.
    #[must_use]
    pub fn horizon(&self) -> Cycle {
        self.traces
            .iter()
            .map(|t| t.last_cycle())
            .min()
            .unwrap_or(0)
    }

    /// Reads proposition `id` of the trace in `slot` at `cycle`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unbound slot or unknown proposition,
    /// or a missing value error before the first write.
    pub fn prop_at(&self, slot: usize, id: PropId, cycle: Cycle) -> Result<bool> {
        self.get(slot)?.prop_at(id, cycle)
    }

    /// Returns true if term variable `id` holds structurally equal values
    /// in every trace at `cycle`. Vacuously true for an empty assignment.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown variable, a missing value
    /// error if any trace has no value yet, or a type mismatch if the traces
    /// hold values of different kinds.
    pub fn terms_equal(&self, id: VarId, cycle: Cycle) -> Result<bool> {
        let Some((first, rest)) = self.traces.split_first() else {
            return Ok(true);
        };
        let expected = first.term_at(id, cycle)?;
        let mut equal = true;
        for trace in rest {
            let actual = trace.term_at(id, cycle)?;
            if actual.kind() != expected.kind() {
                return Err(Error::type_mismatch(
                    SignalRef::Term(id),
                    expected.kind(),
                    actual.kind(),
                ));
            }
            equal = equal && actual == expected;
        }
        Ok(equal)
    }

    /// Returns the checking scope of this assignment: its arity and every
    /// trace as a declaration source.
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        self.traces
            .iter()
            .enumerate()
            .fold(Scope::new(self.traces.len()), |scope, (slot, trace)| {
                scope.with_trace(slot, trace)
            })
    }

    /// Like [`scope`](Self::scope), with `registry` as an additional
    /// declaration source.
    #[must_use]
    pub fn scope_with_registry<'a>(&'a self, registry: &'a VarRegistry) -> Scope<'a> {
        self.traces
            .iter()
            .enumerate()
            .fold(
                Scope::new(self.traces.len()).with_registry(registry),
                |scope, (slot, trace)| scope.with_trace(slot, trace),
            )
    }
}

impl From<Vec<Arc<TraceStore>>> for TraceAssignment {
    fn from(traces: Vec<Arc<TraceStore>>) -> Self {
        Self::new(traces)
    }
}
