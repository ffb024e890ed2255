//! Monitor sessions and trace persistence for Hyperwatch.
//!
//! This crate provides:
//! - [`Monitor`] - Streaming verification over `k` traces with named properties
//! - [`MonitorConfig`] - Tracing, registry and cross-check settings
//! - Trace serialization (`MessagePack`) to bytes and files

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod monitor;
pub mod serialize;

pub use config::MonitorConfig;
pub use monitor::Monitor;
pub use serialize::{decode, encode, load_from_file, save_to_file};
