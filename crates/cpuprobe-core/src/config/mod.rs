//! Configuration utilities for the probe.

pub mod features;
pub mod probe;

// Re-export key items
pub use features::{
    cpu_features, simd_config, CapabilitySet, SimdConfig, SimdConfigBuilder, VectorWidth,
};
pub use probe::{BackendSelection, ProbeConfig, ProbeConfigBuilder};
