//! Monitor configuration.

use hyperwatch_debug::TracerConfig;

/// Configuration for a [`Monitor`](crate::Monitor).
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Tracer settings.
    pub tracer: TracerConfig,

    /// Whether `close()` re-evaluates every property in batch and compares
    /// the result with the incremental verdict.
    pub cross_check_on_close: bool,

    /// Whether property atoms must be declared in the monitor's registry,
    /// in addition to fitting the bound traces.
    pub require_registry: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tracer: TracerConfig::default(),
            cross_check_on_close: false,
            require_registry: true,
        }
    }
}

impl MonitorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracing into the buffer and batch cross-checks on close.
    #[must_use]
    pub fn development() -> Self {
        Self {
            tracer: TracerConfig::new().enabled(),
            cross_check_on_close: true,
            require_registry: true,
        }
    }

    /// Cross-checks on close with tracing off.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            tracer: TracerConfig::default(),
            cross_check_on_close: true,
            require_registry: true,
        }
    }

    /// Builder method to set the tracer configuration.
    #[must_use]
    pub fn with_tracer(mut self, tracer: TracerConfig) -> Self {
        self.tracer = tracer;
        self
    }

    /// Builder method to enable/disable the close-time cross-check.
    #[must_use]
    pub fn with_cross_check(mut self, enabled: bool) -> Self {
        self.cross_check_on_close = enabled;
        self
    }

    /// Builder method to require/relax registry declarations.
    #[must_use]
    pub fn with_registry_required(mut self, required: bool) -> Self {
        self.require_registry = required;
        self
    }
}
