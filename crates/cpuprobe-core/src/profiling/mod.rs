//! Cycle-level profiling helpers.

pub mod metrics;

// Re-export commonly used types
pub use metrics::{CycleCollector, CycleGuard, CycleStats, Measurement};
