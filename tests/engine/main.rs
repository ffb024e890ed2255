//! Integration tests for Layer 3: Engine
//!
//! Tests for batch and incremental evaluation over trace assignments.

mod common;
