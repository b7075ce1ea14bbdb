//! Probe construction settings.

use std::fmt;

/// Which backend a [`CpuProbe`](crate::probe::CpuProbe) should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendSelection {
    /// Native backend for the compiled architecture, portable otherwise.
    #[default]
    Auto,
    /// Force the portable backend regardless of architecture.
    Portable,
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSelection::Auto => f.write_str("auto"),
            BackendSelection::Portable => f.write_str("portable"),
        }
    }
}

/// Settings applied when a probe is built.
#[derive(Debug, Clone, Default)]
pub struct ProbeConfig {
    /// Backend selection strategy.
    pub backend: BackendSelection,
    /// Whether MSR and PMC reads may be attempted.
    pub allow_privileged: bool,
}

/// Builder for [`ProbeConfig`].
#[derive(Debug, Default)]
pub struct ProbeConfigBuilder {
    config: ProbeConfig,
}

impl ProbeConfigBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend selection strategy.
    pub fn backend(mut self, backend: BackendSelection) -> Self {
        self.config.backend = backend;
        self
    }

    /// Allow or forbid privileged register reads.
    pub fn allow_privileged(mut self, allow: bool) -> Self {
        self.config.allow_privileged = allow;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProbeConfig {
        self.config
    }
}
