//! Core values, variable registry, and error types for Hyperwatch.
//!
//! This crate provides:
//! - [`Value`] - Tagged scalar/vector signal value
//! - [`ValueKind`] - The tag of a [`Value`], fixed per term variable
//! - [`VarRegistry`] - Append-only name/id tables for propositions and terms
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result, SignalRef};
pub use registry::{PropId, VarId, VarRegistry};
pub use types::ValueKind;
pub use value::Value;

/// A discrete time index into a trace.
pub type Cycle = u32;
