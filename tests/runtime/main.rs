//! Integration tests for Layer 4: Runtime
//!
//! Tests for monitor sessions and trace persistence.

mod monitor;
