//! Name/id tables for propositions and term variables.
//!
//! The registry is append-only: ids are dense, assigned in declaration
//! order, and never reused, so an id handed out once stays valid for the
//! registry's lifetime. Propositions and term variables live in separate
//! namespaces; the same name may be declared in both.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, SignalRef};
use crate::types::ValueKind;

/// Identifier of a propositional (boolean) variable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropId(u32);

impl PropId {
    /// Creates an id from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this proposition.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropId({})", self.0)
    }
}

/// Identifier of a term variable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarId(u32);

impl VarId {
    /// Creates an id from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this variable.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

/// A declared term variable.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct TermEntry {
    name: Arc<str>,
    kind: ValueKind,
}

/// Bidirectional name/id registry for propositions and term variables.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarRegistry {
    /// Proposition names, indexed by `PropId`.
    props: Vec<Arc<str>>,
    /// Map from proposition name to `PropId`.
    prop_map: HashMap<Arc<str>, PropId>,
    /// Term variables, indexed by `VarId`.
    terms: Vec<TermEntry>,
    /// Map from term name to `VarId`.
    term_map: HashMap<Arc<str>, VarId>,
}

impl VarRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a proposition, returning its [`PropId`].
    ///
    /// Declaring an existing name returns the id it already has.
    ///
    /// # Panics
    ///
    /// Panics if the number of propositions exceeds `u32::MAX`.
    pub fn add_prop(&mut self, name: &str) -> PropId {
        if let Some(&id) = self.prop_map.get(name) {
            return id;
        }

        let id = PropId(u32::try_from(self.props.len()).expect("too many propositions"));
        let arc: Arc<str> = name.into();
        self.props.push(arc.clone());
        self.prop_map.insert(arc, id);
        id
    }

    /// Declares a term variable of the given kind, returning its [`VarId`].
    ///
    /// Declaring an existing name with the same kind returns the id it
    /// already has.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the name is already declared with a
    /// different kind.
    ///
    /// # Panics
    ///
    /// Panics if the number of term variables exceeds `u32::MAX`.
    pub fn add_term(&mut self, name: &str, kind: ValueKind) -> Result<VarId> {
        if let Some(&id) = self.term_map.get(name) {
            let declared = self.terms[id.0 as usize].kind;
            if declared != kind {
                return Err(Error::type_mismatch(SignalRef::Term(id), declared, kind));
            }
            return Ok(id);
        }

        let id = VarId(u32::try_from(self.terms.len()).expect("too many term variables"));
        let arc: Arc<str> = name.into();
        self.terms.push(TermEntry {
            name: arc.clone(),
            kind,
        });
        self.term_map.insert(arc, id);
        Ok(id)
    }

    /// Looks up a proposition by name.
    #[must_use]
    pub fn prop_id(&self, name: &str) -> Option<PropId> {
        self.prop_map.get(name).copied()
    }

    /// Looks up a term variable by name.
    #[must_use]
    pub fn term_id(&self, name: &str) -> Option<VarId> {
        self.term_map.get(name).copied()
    }

    /// Gets the name of a proposition.
    #[must_use]
    pub fn prop_name(&self, id: PropId) -> Option<&str> {
        self.props.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Gets the name of a term variable.
    #[must_use]
    pub fn term_name(&self, id: VarId) -> Option<&str> {
        self.terms.get(id.0 as usize).map(|t| t.name.as_ref())
    }

    /// Gets the declared kind of a term variable.
    #[must_use]
    pub fn term_kind(&self, id: VarId) -> Option<ValueKind> {
        self.terms.get(id.0 as usize).map(|t| t.kind)
    }

    /// Returns true if the proposition id was handed out by this registry.
    #[must_use]
    pub fn contains_prop(&self, id: PropId) -> bool {
        (id.0 as usize) < self.props.len()
    }

    /// Returns true if the term id was handed out by this registry.
    #[must_use]
    pub fn contains_term(&self, id: VarId) -> bool {
        (id.0 as usize) < self.terms.len()
    }

    /// Returns the number of declared propositions.
    #[must_use]
    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    /// Returns the number of declared term variables.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Iterates over propositions in id order.
    pub fn props(&self) -> impl Iterator<Item = (PropId, &str)> {
        self.props
            .iter()
            .zip(0u32..)
            .map(|(name, i)| (PropId(i), name.as_ref()))
    }

    /// Iterates over term variables in id order.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, &str, ValueKind)> {
        self.terms
            .iter()
            .zip(0u32..)
            .map(|(t, i)| (VarId(i), t.name.as_ref(), t.kind))
    }

    /// Returns the declared kinds of all term variables in id order.
    #[must_use]
    pub fn term_kinds(&self) -> Vec<ValueKind> {
        self.terms.iter().map(|t| t.kind).collect()
    }
}
