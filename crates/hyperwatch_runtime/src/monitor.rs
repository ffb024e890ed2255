//! Streaming monitor sessions.
//!
//! A [`Monitor`] owns `k` traces built from one [`VarRegistry`], a set of
//! named properties and a [`Tracer`]. Producers write signal values into
//! the traces by slot; [`Monitor::step`] then declares a cycle complete,
//! extends every trace to it and advances each property's incremental
//! evaluator.
//!
//! Completed cycles are final: writes at or before the last stepped cycle
//! are rejected, so incremental verdicts never go stale.

use hyperwatch_debug::{Sample, Tracer};
use hyperwatch_engine::{BatchEvaluator, IncrementalEvaluator, TraceAssignment, Verdict};
use hyperwatch_foundation::{
    Cycle, Error, ErrorContext, ErrorKind, PropId, Result, SignalRef, Value, VarId, VarRegistry,
};
use hyperwatch_language::{FormulaRef, render_with_registry};
use hyperwatch_storage::TraceStore;
use log::{debug, warn};

use crate::config::MonitorConfig;

#[derive(Clone, Debug)]
struct Property {
    name: String,
    evaluator: IncrementalEvaluator,
    verdict: Option<Verdict>,
}

/// A streaming verification session over a fixed set of traces.
#[derive(Debug)]
pub struct Monitor {
    config: MonitorConfig,
    registry: VarRegistry,
    assignment: TraceAssignment,
    properties: Vec<Property>,
    tracer: Tracer,
    /// The last stepped cycle.
    horizon: Option<Cycle>,
    closed: bool,
}

impl Monitor {
    /// Creates a monitor with `arity` empty traces shaped by `registry`.
    #[must_use]
    pub fn new(registry: VarRegistry, arity: usize) -> Self {
        Self::with_config(registry, arity, MonitorConfig::default())
    }

    /// Creates a monitor with `arity` empty traces and the given config.
    #[must_use]
    pub fn with_config(registry: VarRegistry, arity: usize, config: MonitorConfig) -> Self {
        let traces: Vec<TraceStore> = (0..arity)
            .map(|_| TraceStore::for_registry(&registry))
            .collect();
        Self::from_traces(registry, traces, config)
    }

    /// Creates a monitor over existing traces, for example ones loaded from
    /// disk. Nothing is stepped yet.
    pub fn from_traces(
        registry: VarRegistry,
        traces: impl IntoIterator<Item = TraceStore>,
        config: MonitorConfig,
    ) -> Self {
        let mut tracer = Tracer::new(config.tracer.clone());
        tracer.set_registry(registry.clone());
        Self {
            config,
            registry,
            assignment: TraceAssignment::from_stores(traces),
            properties: Vec::new(),
            tracer,
            horizon: None,
            closed: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the registry the traces were built from.
    #[must_use]
    pub fn registry(&self) -> &VarRegistry {
        &self.registry
    }

    /// Returns the number of traces.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.assignment.len()
    }

    /// Returns a shared snapshot of the traces. Later writes to the
    /// monitor do not affect it.
    #[must_use]
    pub fn assignment(&self) -> TraceAssignment {
        self.assignment.clone()
    }

    /// Returns the last stepped cycle.
    #[must_use]
    pub fn horizon(&self) -> Option<Cycle> {
        self.horizon
    }

    /// Returns true once [`close`](Self::close) has succeeded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the tracer.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Returns the tracer for reconfiguration.
    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    /// Returns the property names in registration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Returns the latest verdict of `name`, if it has been evaluated.
    #[must_use]
    pub fn verdict(&self, name: &str) -> Option<Verdict> {
        self.property(name).and_then(|p| p.verdict)
    }

    /// Returns the latest verdict of every evaluated property.
    #[must_use]
    pub fn verdicts(&self) -> Vec<(String, Verdict)> {
        self.properties
            .iter()
            .filter_map(|p| p.verdict.map(|v| (p.name.clone(), v)))
            .collect()
    }

    fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Registers `formula` under `name`.
    ///
    /// The formula is checked against the traces (and the registry, if the
    /// config requires it) immediately. If cycles have already been
    /// stepped, the property catches up to the current horizon.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` after [`close`](Self::close);
    /// - a configuration error for a duplicate name or a formula that does
    ///   not fit the traces;
    /// - a missing value error if catching up reads an unwritten signal.
    pub fn add_property(&mut self, name: impl Into<String>, formula: &FormulaRef) -> Result<()> {
        if self.closed {
            return Err(Error::new(ErrorKind::SessionClosed));
        }
        let name = name.into();
        if self.property(&name).is_some() {
            return Err(Error::configuration(format!(
                "property '{name}' is already defined"
            )));
        }

        let registry = self.config.require_registry.then_some(&self.registry);
        let in_property = |e: Error| {
            e.with_context(ErrorContext::new().with_source(format!("property '{name}'")))
        };
        let mut evaluator =
            IncrementalEvaluator::prepare(formula, &self.assignment, registry).map_err(in_property)?;
        let verdict = match self.horizon {
            Some(horizon) => {
                evaluator
                    .check_advance(&self.assignment, horizon)
                    .map_err(in_property)?;
                Some(evaluator.advance(&self.assignment, horizon)?)
            }
            None => None,
        };

        debug!("added property '{name}': {formula}");
        let registry = &self.registry;
        self.tracer
            .property_added(&name, || render_with_registry(formula, registry));
        if let Some(v) = verdict {
            self.tracer
                .verdict_changed(&name, v.holds, v.horizon, v.provisional);
        }
        self.properties.push(Property {
            name,
            evaluator,
            verdict,
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    fn check_writable(&self, signal: SignalRef, cycle: Cycle) -> Result<()> {
        if self.closed {
            return Err(Error::new(ErrorKind::SessionClosed));
        }
        match self.horizon {
            Some(horizon) if cycle <= horizon => {
                Err(Error::ordering(signal, cycle, Some(horizon)))
            }
            _ => Ok(()),
        }
    }

    /// Writes proposition `id` of the trace in `slot` at `cycle`.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` after [`close`](Self::close);
    /// - an ordering error if `cycle` is not after the last stepped cycle
    ///   or the proposition's last write;
    /// - an index error for an unknown slot or proposition.
    pub fn update_prop(&mut self, slot: usize, id: PropId, cycle: Cycle, value: bool) -> Result<()> {
        let signal = SignalRef::Prop(id);
        self.check_writable(signal, cycle)?;
        self.assignment
            .trace_mut(slot)?
            .update_prop(id, cycle, value)?;
        self.tracer
            .trace_updated(slot, signal, cycle, Sample::Prop(value));
        Ok(())
    }

    /// Writes term variable `id` of the trace in `slot` at `cycle`.
    ///
    /// # Errors
    ///
    /// As [`update_prop`](Self::update_prop), plus a type mismatch if the
    /// value's kind differs from the variable's.
    pub fn update_term(&mut self, slot: usize, id: VarId, cycle: Cycle, value: Value) -> Result<()> {
        let signal = SignalRef::Term(id);
        self.check_writable(signal, cycle)?;
        self.assignment
            .trace_mut(slot)?
            .update_term(id, cycle, value.clone())?;
        self.tracer
            .trace_updated(slot, signal, cycle, Sample::Term(value));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Declares every cycle up to `cycle` complete and returns each
    /// property's verdict, in registration order.
    ///
    /// Every trace is extended to `cycle` first. Stepping to the last
    /// stepped cycle again returns the current verdicts. On error nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` after [`close`](Self::close);
    /// - an ordering error if `cycle` precedes the last stepped cycle;
    /// - a missing value error if a property reads a signal that was never
    ///   written;
    /// - a type mismatch if a compared term holds values of different kinds
    ///   in different traces.
    pub fn step(&mut self, cycle: Cycle) -> Result<Vec<(String, Verdict)>> {
        if self.closed {
            return Err(Error::new(ErrorKind::SessionClosed));
        }
        match self.horizon {
            Some(horizon) if cycle < horizon => {
                return Err(Error::ordering(SignalRef::Horizon, cycle, Some(horizon)));
            }
            Some(horizon) if cycle == horizon => return Ok(self.verdicts()),
            _ => {}
        }

        let mut next = self.assignment.clone();
        let mut extended = Vec::new();
        for slot in 0..next.len() {
            let trace = next.trace_mut(slot)?;
            if trace.last_cycle() < cycle {
                trace.extend_to(cycle)?;
                extended.push(slot);
            }
        }
        for property in &self.properties {
            property
                .evaluator
                .check_advance(&next, cycle)
                .map_err(|e| {
                    e.with_context(
                        ErrorContext::new().with_source(format!("property '{}'", property.name)),
                    )
                })?;
        }

        self.assignment = next;
        self.horizon = Some(cycle);
        self.tracer.cycle_start(cycle);
        for slot in extended {
            self.tracer.trace_extended(slot, cycle);
        }
        for index in 0..self.properties.len() {
            let verdict = self.properties[index]
                .evaluator
                .advance(&self.assignment, cycle)?;
            self.record_verdict(index, verdict);
        }
        self.tracer.cycle_end(cycle, self.properties.len());

        Ok(self.verdicts())
    }

    fn record_verdict(&mut self, index: usize, verdict: Verdict) {
        let property = &mut self.properties[index];
        let previous = property.verdict.replace(verdict);
        if previous.is_some_and(|p| p.holds == verdict.holds) {
            return;
        }
        if previous.is_some_and(|p| p.holds && p.provisional) {
            debug!(
                "provisional verdict of '{}' invalidated at cycle {}",
                property.name, verdict.horizon
            );
            self.tracer
                .provisional_invalidated(&property.name, verdict.horizon);
        }
        self.tracer.verdict_changed(
            &property.name,
            verdict.holds,
            verdict.horizon,
            verdict.provisional,
        );
    }

    /// Ends the session: every property is evaluated up to the traces'
    /// common horizon and its verdict becomes final.
    ///
    /// With [`MonitorConfig::cross_check_on_close`], each final verdict is
    /// compared with a batch evaluation over the same traces.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if already closed;
    /// - a missing value error if a property reads a signal that was never
    ///   written;
    /// - an internal error if a cross-check disagrees. The session is
    ///   closed in that case.
    pub fn close(&mut self) -> Result<Vec<(String, Verdict)>> {
        if self.closed {
            return Err(Error::new(ErrorKind::SessionClosed));
        }
        let horizon = self.assignment.horizon();
        for property in &self.properties {
            if property.evaluator.horizon().is_none_or(|h| h < horizon) {
                property.evaluator.check_advance(&self.assignment, horizon)?;
            }
        }

        let expected = if self.config.cross_check_on_close {
            self.properties
                .iter()
                .map(|p| BatchEvaluator::new(p.evaluator.plan()).evaluate(&self.assignment))
                .collect::<Result<Vec<bool>>>()?
        } else {
            Vec::new()
        };

        self.tracer.set_cycle(horizon);
        for index in 0..self.properties.len() {
            let verdict = self.properties[index].evaluator.close(&self.assignment)?;
            self.record_verdict(index, verdict);
        }
        self.closed = true;
        self.horizon = Some(horizon);
        self.tracer.session_closed(horizon, self.properties.len());

        let mut disagreements = Vec::new();
        for (property, batch) in self.properties.iter().zip(expected) {
            let agrees = property.verdict.is_some_and(|v| v.holds == batch);
            self.tracer.batch_checked(&property.name, agrees);
            if !agrees {
                warn!(
                    "incremental and batch verdicts of '{}' disagree",
                    property.name
                );
                disagreements.push(property.name.clone());
            }
        }
        if !disagreements.is_empty() {
            return Err(Error::new(ErrorKind::Internal(format!(
                "incremental and batch verdicts disagree for {}",
                disagreements.join(", ")
            ))));
        }

        Ok(self.verdicts())
    }
}
