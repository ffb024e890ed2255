//! Batch and incremental hyperproperty evaluation for Hyperwatch.
//!
//! This crate provides:
//! - [`TraceAssignment`] - The ordered traces a formula is evaluated over
//! - [`FormulaPlan`] - Formulas compiled to operand-first node lists
//! - [`BatchEvaluator`] - Full-horizon evaluation
//! - [`IncrementalEvaluator`] - Cycle-by-cycle evaluation
//! - [`Verdict`] - Outcome at cycle 0, with horizon and provisional flag
//!
//! Both modes compute the same per-node [`TruthTables`]; on any shared
//! prefix they agree cell for cell.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assignment;
pub mod batch;
pub mod incremental;
pub mod plan;
pub mod table;
pub mod verdict;

pub use assignment::TraceAssignment;
pub use batch::{BatchEvaluator, evaluate_batch};
pub use incremental::{IncrementalEvaluator, eval_incremental};
pub use plan::{FormulaPlan, NodeId, PlanNode};
pub use table::TruthTables;
pub use verdict::Verdict;
