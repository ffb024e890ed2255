//! Per-execution trace storage.
//!
//! A [`TraceStore`] holds the change-point histories of every proposition
//! and term variable of one recorded (or streaming) execution, together
//! with the trace's horizon: the highest cycle populated so far.

use std::sync::Arc;

use hyperwatch_foundation::{
    Cycle, Error, PropId, Result, SignalRef, Value, ValueKind, VarId, VarRegistry,
};

use crate::history::{History, PointsDefect};

// =============================================================================
// Term History
// =============================================================================

/// The history of a term variable.
///
/// A term variable holds values of a single kind for its lifetime, so the
/// history is one of two homogeneous histories once written. Before the
/// first write it may carry a declared kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TermHistory {
    /// Nothing written yet, optionally with a pinned kind.
    Unwritten(Option<ValueKind>),
    /// Scalar change points.
    Scalar(History<u32>),
    /// Vector change points.
    Vector(History<Arc<[u32]>>),
}

impl TermHistory {
    /// Returns the kind fixed for this variable, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Unwritten(kind) => *kind,
            Self::Scalar(_) => Some(ValueKind::Scalar),
            Self::Vector(_) => Some(ValueKind::Vector),
        }
    }

    /// Returns the value in effect at `cycle`.
    #[must_use]
    pub fn value_at(&self, cycle: Cycle) -> Option<Value> {
        match self {
            Self::Unwritten(_) => None,
            Self::Scalar(h) => h.value_at(cycle).map(|n| Value::Scalar(*n)),
            Self::Vector(h) => h.value_at(cycle).map(|v| Value::Vector(Arc::clone(v))),
        }
    }

    /// Returns true if a write at `cycle` respects the ordering contract.
    #[must_use]
    pub fn accepts(&self, cycle: Cycle) -> bool {
        match self {
            Self::Unwritten(_) => cycle == 0,
            Self::Scalar(h) => h.accepts(cycle),
            Self::Vector(h) => h.accepts(cycle),
        }
    }

    /// Returns the cycle of the last accepted write.
    #[must_use]
    pub fn last_written(&self) -> Option<Cycle> {
        match self {
            Self::Unwritten(_) => None,
            Self::Scalar(h) => h.last_written(),
            Self::Vector(h) => h.last_written(),
        }
    }

    /// Returns the number of stored change points.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Unwritten(_) => 0,
            Self::Scalar(h) => h.len(),
            Self::Vector(h) => h.len(),
        }
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cycle of the last stored change point.
    #[must_use]
    pub fn last_change(&self) -> Option<Cycle> {
        match self {
            Self::Unwritten(_) => None,
            Self::Scalar(h) => h.last_change(),
            Self::Vector(h) => h.last_change(),
        }
    }

    /// Records `value` at `cycle`. Kind and ordering are checked by the caller.
    fn record(&mut self, cycle: Cycle, value: Value) -> bool {
        if let Self::Unwritten(_) = self {
            *self = match value.kind() {
                ValueKind::Scalar => Self::Scalar(History::new()),
                ValueKind::Vector => Self::Vector(History::new()),
            };
        }
        match (self, value) {
            (Self::Scalar(h), Value::Scalar(n)) => h.record(cycle, n),
            (Self::Vector(h), Value::Vector(v)) => h.record(cycle, v),
            _ => unreachable!("kind checked before record"),
        }
    }

    fn seal(&mut self, cycle: Cycle) {
        match self {
            Self::Unwritten(_) => {}
            Self::Scalar(h) => h.seal(cycle),
            Self::Vector(h) => h.seal(cycle),
        }
    }
}

// =============================================================================
// Trace Store
// =============================================================================

/// The compressed, cycle-indexed history of one execution.
///
/// Dimensions (number of propositions and term variables) are fixed at
/// construction. The horizon (`last_cycle`) only grows, and only through
/// the update and extend operations.
///
/// Equality is structural: dimensions, length, and every history's change
/// points.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceStore {
    /// Proposition histories, indexed by `PropId`.
    props: Vec<History<bool>>,
    /// Term histories, indexed by `VarId`.
    terms: Vec<TermHistory>,
    /// The last valid cycle in this trace.
    last_cycle: Cycle,
}

impl TraceStore {
    /// Creates a trace with `num_props` propositions and `num_vars` term
    /// variables. Each term variable's kind is fixed by its first write.
    #[must_use]
    pub fn new(num_props: usize, num_vars: usize) -> Self {
        Self {
            props: vec![History::new(); num_props],
            terms: vec![TermHistory::Unwritten(None); num_vars],
            last_cycle: 0,
        }
    }

    /// Creates a trace whose term variables have pinned kinds.
    #[must_use]
    pub fn with_term_kinds(num_props: usize, kinds: &[ValueKind]) -> Self {
        Self {
            props: vec![History::new(); num_props],
            terms: kinds
                .iter()
                .map(|k| TermHistory::Unwritten(Some(*k)))
                .collect(),
            last_cycle: 0,
        }
    }

    /// Creates a trace sized and typed after a registry's declarations.
    #[must_use]
    pub fn for_registry(registry: &VarRegistry) -> Self {
        Self::with_term_kinds(registry.prop_count(), &registry.term_kinds())
    }

    /// Reassembles a trace from restored histories.
    ///
    /// Each history must already satisfy the change-point invariants; this
    /// additionally checks that no change point lies past `last_cycle`.
    /// Restored histories accept further writes only after `last_cycle`.
    ///
    /// # Errors
    ///
    /// Returns the defect if a change point lies past `last_cycle`.
    pub fn from_parts(
        props: Vec<History<bool>>,
        terms: Vec<TermHistory>,
        last_cycle: Cycle,
    ) -> std::result::Result<Self, PointsDefect> {
        let last_changes = props
            .iter()
            .map(History::last_change)
            .chain(terms.iter().map(TermHistory::last_change));
        for cycle in last_changes.flatten() {
            if cycle > last_cycle {
                return Err(PointsDefect::BeyondLastCycle { cycle, last_cycle });
            }
        }

        let mut store = Self {
            props,
            terms,
            last_cycle,
        };
        store.seal_all(last_cycle);
        Ok(store)
    }

    /// Returns the number of propositions.
    #[must_use]
    pub fn num_props(&self) -> usize {
        self.props.len()
    }

    /// Returns the number of term variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.terms.len()
    }

    /// Returns the last valid cycle (the horizon).
    #[must_use]
    pub fn last_cycle(&self) -> Cycle {
        self.last_cycle
    }

    /// Returns the uncompressed trace length, `last_cycle + 1`.
    #[must_use]
    pub fn length(&self) -> usize {
        self.last_cycle as usize + 1
    }

    /// Returns the total number of stored change points.
    #[must_use]
    pub fn change_point_count(&self) -> usize {
        self.props.iter().map(History::len).sum::<usize>()
            + self.terms.iter().map(TermHistory::len).sum::<usize>()
    }

    /// Updates proposition `id` at `cycle`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown proposition, or an ordering
    /// error if `cycle` does not follow the proposition's last write. The
    /// trace is unchanged on error.
    pub fn update_prop(&mut self, id: PropId, cycle: Cycle, value: bool) -> Result<()> {
        let len = self.props.len();
        let history = self
            .props
            .get_mut(id.index() as usize)
            .ok_or_else(|| Error::index_out_of_bounds(SignalRef::Prop(id), len))?;

        if !history.accepts(cycle) {
            return Err(Error::ordering(
                SignalRef::Prop(id),
                cycle,
                history.last_written(),
            ));
        }

        history.record(cycle, value);
        self.raise_horizon(cycle);
        Ok(())
    }

    /// Updates term variable `id` at `cycle`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown variable, an ordering error if
    /// `cycle` does not follow the variable's last write, or a type mismatch
    /// if the value's kind differs from the kind fixed for the variable. The
    /// trace is unchanged on error.
    pub fn update_term(&mut self, id: VarId, cycle: Cycle, value: Value) -> Result<()> {
        let len = self.terms.len();
        let history = self
            .terms
            .get_mut(id.index() as usize)
            .ok_or_else(|| Error::index_out_of_bounds(SignalRef::Term(id), len))?;

        if !history.accepts(cycle) {
            return Err(Error::ordering(
                SignalRef::Term(id),
                cycle,
                history.last_written(),
            ));
        }
        if let Some(expected) = history.kind() {
            if expected != value.kind() {
                return Err(Error::type_mismatch(
                    SignalRef::Term(id),
                    expected,
                    value.kind(),
                ));
            }
        }

        history.record(cycle, value);
        self.raise_horizon(cycle);
        Ok(())
    }

    /// Extends the trace to `cycle` without recording new values.
    ///
    /// Every written signal keeps its last value through the extension and
    /// counts as written up to `cycle`, so later writes must come after it.
    /// Extending to the current last cycle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an ordering error if `cycle` is before the last cycle.
    pub fn extend_to(&mut self, cycle: Cycle) -> Result<()> {
        if cycle < self.last_cycle {
            return Err(Error::ordering(
                SignalRef::Horizon,
                cycle,
                Some(self.last_cycle),
            ));
        }
        self.last_cycle = cycle;
        self.seal_all(cycle);
        Ok(())
    }

    /// Returns the value of proposition `id` at `cycle`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown proposition, or a missing
    /// value error if `cycle` precedes the first write.
    pub fn prop_at(&self, id: PropId, cycle: Cycle) -> Result<bool> {
        self.prop_history(id)?
            .value_at(cycle)
            .copied()
            .ok_or_else(|| Error::missing_value(SignalRef::Prop(id), cycle))
    }

    /// Returns the value of term variable `id` at `cycle`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown variable, or a missing value
    /// error if `cycle` precedes the first write.
    pub fn term_at(&self, id: VarId, cycle: Cycle) -> Result<Value> {
        self.term_history(id)?
            .value_at(cycle)
            .ok_or_else(|| Error::missing_value(SignalRef::Term(id), cycle))
    }

    /// Returns the kind fixed for term variable `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown variable.
    pub fn term_kind(&self, id: VarId) -> Result<Option<ValueKind>> {
        Ok(self.term_history(id)?.kind())
    }

    /// Returns the history of proposition `id`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown proposition.
    pub fn prop_history(&self, id: PropId) -> Result<&History<bool>> {
        self.props
            .get(id.index() as usize)
            .ok_or_else(|| Error::index_out_of_bounds(SignalRef::Prop(id), self.props.len()))
    }

    /// Returns the history of term variable `id`.
    ///
    /// # Errors
    ///
    /// Returns an index error for an unknown variable.
    pub fn term_history(&self, id: VarId) -> Result<&TermHistory> {
        self.terms
            .get(id.index() as usize)
            .ok_or_else(|| Error::index_out_of_bounds(SignalRef::Term(id), self.terms.len()))
    }

    /// Iterates over all proposition histories in id order.
    pub fn prop_histories(&self) -> impl Iterator<Item = &History<bool>> {
        self.props.iter()
    }

    /// Iterates over all term histories in id order.
    pub fn term_histories(&self) -> impl Iterator<Item = &TermHistory> {
        self.terms.iter()
    }

    fn seal_all(&mut self, cycle: Cycle) {
        for history in &mut self.props {
            history.seal(cycle);
        }
        for history in &mut self.terms {
            history.seal(cycle);
        }
    }

    fn raise_horizon(&mut self, cycle: Cycle) {
        if cycle > self.last_cycle {
            self.last_cycle = cycle;
        }
    }
}
