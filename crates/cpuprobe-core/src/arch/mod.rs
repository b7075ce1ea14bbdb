//! Architecture-specific probe backends.
//!
//! Each backend answers the same questions through a different mechanism:
//!
//! - `x86_64`: CPUID, RDTSC, `/dev/cpu/*/msr`, RDPMC
//! - `aarch64`: MIDR implementer, `CNTVCT_EL0`
//! - `portable`: no hardware access; capability-negative answers
//!
//! The native backend is chosen at compile time from `target_arch`.

use crate::config::features::CapabilitySet;
use crate::error::{ProbeError, Result};
use crate::types::{CycleCount, VendorString};

pub mod portable;

#[cfg_attr(not(target_arch = "aarch64"), allow(dead_code))]
mod midr;

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "aarch64")]
pub mod aarch64;

pub use portable::PortableBackend;

#[cfg(target_arch = "x86_64")]
pub use x86_64::X86Backend;

#[cfg(target_arch = "aarch64")]
pub use aarch64::Aarch64Backend;

/// Trait implemented by every hardware backend.
pub trait ProbeBackend: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Manufacturer identifier; `VendorString::UNIDENTIFIED` when unknown.
    fn vendor_id(&self) -> VendorString;

    /// Read the free-running cycle counter.
    fn read_cycle_counter(&self) -> Result<CycleCount>;

    /// Interrogate the feature registers. Not cached here.
    fn detect_capabilities(&self) -> CapabilitySet;

    /// Whether the cycle counter ticks at a constant rate across frequency
    /// changes. `None` when the backend has no counter.
    fn has_invariant_counter(&self) -> Option<bool> {
        None
    }

    /// Spin-wait hint.
    #[inline]
    fn pause_hint(&self) {
        std::hint::spin_loop();
    }

    /// Full sequentially-consistent memory barrier.
    #[inline]
    fn memory_fence(&self) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
    }

    /// Read a model-specific register on the given logical CPU.
    fn read_msr(&self, _cpu: usize, _register: u32) -> Result<u64> {
        Err(ProbeError::unsupported("model-specific registers", self.name()))
    }

    /// Read a user-space performance-monitoring counter.
    fn read_pmc(&self, _counter: u32) -> Result<u64> {
        Err(ProbeError::unsupported("performance counters", self.name()))
    }
}

/// The backend matching the compiled architecture.
pub fn native_backend() -> Box<dyn ProbeBackend> {
    crate::arch_specific!(
        x86_64: Box::new(X86Backend::new()) as Box<dyn ProbeBackend>,
        aarch64: Box::new(Aarch64Backend::new()) as Box<dyn ProbeBackend>,
        default: Box::new(PortableBackend::new()) as Box<dyn ProbeBackend>
    )
}
