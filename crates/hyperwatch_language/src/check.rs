//! Scope checks run when a formula is bound to an evaluation context.
//!
//! A [`Scope`] lists the number of trace slots and every declaration
//! source (a registry, and each trace of the assignment). Checking a
//! formula against it rejects, with [`ErrorKind::Configuration`]:
//!
//! - a `Prop` whose slot is not below the number of traces;
//! - an id missing from any declaration source;
//! - a `TermEq` whose variable has different kinds in different sources.
//!
//! [`ErrorKind::Configuration`]: hyperwatch_foundation::ErrorKind::Configuration

use hyperwatch_foundation::{
    Error, ErrorContext, PropId, Result, ValueKind, VarId, VarRegistry,
};
use hyperwatch_storage::TraceStore;

use crate::formula::Formula;
use crate::pretty::render;
use crate::visitor::{FormulaVisitor, walk_formula};

/// A source of proposition and term declarations.
pub trait Signature {
    /// Returns true if proposition `id` is declared.
    fn has_prop(&self, id: PropId) -> bool;

    /// Returns true if term variable `id` is declared.
    fn has_term(&self, id: VarId) -> bool;

    /// Returns the kind fixed for term variable `id`, if one is known.
    fn term_kind(&self, id: VarId) -> Option<ValueKind>;
}

impl Signature for VarRegistry {
    fn has_prop(&self, id: PropId) -> bool {
        self.contains_prop(id)
    }

    fn has_term(&self, id: VarId) -> bool {
        self.contains_term(id)
    }

    fn term_kind(&self, id: VarId) -> Option<ValueKind> {
        VarRegistry::term_kind(self, id)
    }
}

impl Signature for TraceStore {
    fn has_prop(&self, id: PropId) -> bool {
        (id.index() as usize) < self.num_props()
    }

    fn has_term(&self, id: VarId) -> bool {
        (id.index() as usize) < self.num_vars()
    }

    fn term_kind(&self, id: VarId) -> Option<ValueKind> {
        TraceStore::term_kind(self, id).ok().flatten()
    }
}

/// The declarations and slot count a formula is checked against.
pub struct Scope<'a> {
    arity: usize,
    sources: Vec<(String, &'a dyn Signature)>,
}

impl<'a> Scope<'a> {
    /// Creates a scope for an assignment of `arity` traces with no
    /// declaration sources yet.
    #[must_use]
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            sources: Vec::new(),
        }
    }

    /// Adds the registry as a declaration source.
    #[must_use]
    pub fn with_registry(mut self, registry: &'a VarRegistry) -> Self {
        self.sources.push(("registry".to_string(), registry as &dyn Signature));
        self
    }

    /// Adds the trace bound to `slot` as a declaration source.
    #[must_use]
    pub fn with_trace(mut self, slot: usize, trace: &'a TraceStore) -> Self {
        self.sources.push((format!("trace slot {slot}"), trace as &dyn Signature));
        self
    }

    /// Adds an arbitrary declaration source under `label`.
    #[must_use]
    pub fn with_source(mut self, label: impl Into<String>, source: &'a dyn Signature) -> Self {
        self.sources.push((label.into(), source));
        self
    }

    /// Returns the number of trace slots.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Checks every atom of `formula` against this scope.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for the first offending atom, with the
    /// atom's rendering as context.
    pub fn check(&self, formula: &Formula) -> Result<()> {
        let mut checker = Checker {
            scope: self,
            error: None,
        };
        walk_formula(&mut checker, formula);
        match checker.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_prop(&self, id: PropId, slot: usize) -> Result<()> {
        if slot >= self.arity {
            return Err(Error::configuration(format!(
                "proposition #{} reads slot {slot}, but only {} trace(s) are bound",
                id.index(),
                self.arity
            )));
        }
        for (label, source) in &self.sources {
            if !source.has_prop(id) {
                return Err(Error::configuration(format!(
                    "proposition #{} is not declared in {label}",
                    id.index()
                )));
            }
        }
        Ok(())
    }

    fn check_term(&self, id: VarId) -> Result<()> {
        let mut fixed: Option<(ValueKind, &str)> = None;
        for (label, source) in &self.sources {
            if !source.has_term(id) {
                return Err(Error::configuration(format!(
                    "term #{} is not declared in {label}",
                    id.index()
                )));
            }
            let Some(kind) = source.term_kind(id) else {
                continue;
            };
            match fixed {
                None => fixed = Some((kind, label.as_str())),
                Some((first, first_label)) if first != kind => {
                    return Err(Error::configuration(format!(
                        "term #{} compared across traces has conflicting kinds: \
                         {first} in {first_label}, {kind} in {label}",
                        id.index()
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

struct Checker<'s, 'a> {
    scope: &'s Scope<'a>,
    error: Option<Error>,
}

impl Checker<'_, '_> {
    fn record(&mut self, result: Result<()>, atom: &Formula) {
        if self.error.is_none() {
            if let Err(err) = result {
                self.error = Some(err.with_context(ErrorContext::new().with_frame(render(atom))));
            }
        }
    }
}

impl FormulaVisitor for Checker<'_, '_> {
    fn visit_prop(&mut self, id: PropId, slot: usize) {
        let result = self.scope.check_prop(id, slot);
        self.record(result, &Formula::Prop { id, slot });
    }

    fn visit_term_eq(&mut self, id: VarId) {
        let result = self.scope.check_term(id);
        self.record(result, &Formula::TermEq(id));
    }
}
