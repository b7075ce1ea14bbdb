//! Host processor introspection.
//!
//! This crate answers a small set of questions about the CPU the process is
//! running on: who made it, how many cycles have elapsed, and which SIMD
//! extensions it supports. It also exposes the spin-wait hint and the full
//! memory fence, plus optional privileged register reads.
//!
//! # Modules
//!
//! - [`arch`]: Per-architecture backends behind the [`arch::ProbeBackend`] trait
//! - [`compute`]: Portable vector kernels selected from the capability set
//! - [`config`]: Capability set, SIMD settings and probe configuration
//! - [`error`]: Error type shared by every fallible query
//! - [`probe`]: The [`CpuProbe`] query surface and process-wide free functions
//! - [`profiling`]: Cycle measurement collection
//! - [`report`]: The diagnostic report printed by the command-line tool
//! - [`types`]: Vendor string, cycle count and architecture tags

pub mod arch;
pub mod compute;
pub mod config;
pub mod error;
pub mod probe;
pub mod profiling;
pub mod report;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{ProbeError, Result};
pub use probe::CpuProbe;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use cpuprobe_core::prelude::*;
///
/// let probe = CpuProbe::new();
/// let _caps: &CapabilitySet = probe.detect_vector_capability();
/// ```
pub mod prelude {
    pub use crate::arch::{PortableBackend, ProbeBackend};
    pub use crate::compute::{get_dispatcher, KernelDispatcher, VectorKernels};
    pub use crate::config::features::{CapabilitySet, SimdConfig, VectorWidth};
    pub use crate::config::probe::{BackendSelection, ProbeConfig, ProbeConfigBuilder};
    pub use crate::error::{ProbeError, Result};
    pub use crate::probe::{
        default_probe, detect_vector_capability, get_vendor_id, memory_fence, pause_hint,
        read_cycle_counter, CpuProbe,
    };
    pub use crate::profiling::{CycleCollector, CycleGuard};
    pub use crate::report::DiagnosticReport;
    pub use crate::types::{CycleCount, HostArch, VendorString};
}
