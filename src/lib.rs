//! Hyperwatch - hyperproperty checking over cycle-indexed execution traces
//!
//! This crate re-exports all layers of the Hyperwatch system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: hyperwatch_runtime    - Monitor sessions, trace persistence
//!          hyperwatch_debug      - Tracing of monitor activity
//! Layer 3: hyperwatch_engine     - Batch and incremental evaluation
//! Layer 2: hyperwatch_language   - Formula AST, checks, printer
//! Layer 1: hyperwatch_storage    - Change-point trace storage
//! Layer 0: hyperwatch_foundation - Values, registry, errors
//! ```
//!
//! # Example
//!
//! ```
//! use hyperwatch::engine::{TraceAssignment, evaluate_batch};
//! use hyperwatch::foundation::{Value, VarId};
//! use hyperwatch::language::Formula;
//! use hyperwatch::storage::TraceStore;
//!
//! let x = VarId::new(0);
//! let mut a = TraceStore::new(0, 1);
//! let mut b = TraceStore::new(0, 1);
//! for cycle in 0..10 {
//!     a.update_term(x, cycle, Value::from(cycle)).unwrap();
//!     b.update_term(x, cycle, Value::from(cycle)).unwrap();
//! }
//!
//! let same_x = Formula::always_future(Formula::term_eq(x));
//! let traces = TraceAssignment::from_stores([a, b]);
//! assert!(evaluate_batch(&same_x, &traces).unwrap());
//! ```

pub use hyperwatch_debug as debug;
pub use hyperwatch_engine as engine;
pub use hyperwatch_foundation as foundation;
pub use hyperwatch_language as language;
pub use hyperwatch_runtime as runtime;
pub use hyperwatch_storage as storage;
