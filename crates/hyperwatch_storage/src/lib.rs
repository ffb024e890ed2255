//! Compressed cycle-indexed trace storage for Hyperwatch.
//!
//! This crate provides:
//! - [`History`] - Change-point encoded history of one signal
//! - [`TermHistory`] - A term variable's history, homogeneous in kind
//! - [`TraceStore`] - All proposition and term histories of one execution

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod history;
pub mod trace;

pub use history::{History, PointsDefect};
pub use trace::{TermHistory, TraceStore};
