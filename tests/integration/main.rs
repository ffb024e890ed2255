//! Cross-layer integration tests
//!
//! End-to-end scenarios: traces recorded through a monitor, evaluated in
//! both modes, persisted and reloaded.

mod persistence;
mod randomized;
mod scenarios;
