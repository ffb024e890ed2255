//! Hyperproperty formulas for Hyperwatch.
//!
//! This crate provides:
//! - [`Formula`] - Immutable formula trees with shared sub-formulas
//! - [`visitor`] - Read-only traversal and [`FormulaStats`]
//! - [`pretty`] - S-expression rendering
//! - [`check`] - Scope checks run before any evaluation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod check;
pub mod formula;
pub mod pretty;
pub mod visitor;

pub use check::{Scope, Signature};
pub use formula::{Formula, FormulaRef};
pub use pretty::{render, render_with_registry};
pub use visitor::{FormulaStats, FormulaVisitor, walk_formula};
