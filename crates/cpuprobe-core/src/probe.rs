//! Architecture-neutral query interface.
//!
//! [`CpuProbe`] owns one [`ProbeBackend`] selected from a [`ProbeConfig`]
//! and caches its capability set on first use. The free functions at the
//! bottom of this module operate on a process-wide default probe.
//!
//! # Example
//!
//! ```rust
//! use cpuprobe_core::probe;
//!
//! let vendor = probe::get_vendor_id();
//! assert_eq!(vendor.as_str().len(), 12);
//!
//! let caps = probe::detect_vector_capability();
//! println!("{vendor}: {caps}");
//! ```

use once_cell::sync::{Lazy, OnceCell};
use tracing::debug;

use crate::arch::{native_backend, PortableBackend, ProbeBackend};
use crate::config::features::CapabilitySet;
use crate::config::probe::{BackendSelection, ProbeConfig};
use crate::error::{ProbeError, Result};
use crate::types::{CycleCount, HostArch, VendorString};

/// Probe that dispatches every query to the selected backend.
pub struct CpuProbe {
    backend: Box<dyn ProbeBackend>,
    allow_privileged: bool,
    capabilities: OnceCell<CapabilitySet>,
}

impl CpuProbe {
    /// Create a probe with automatic backend selection.
    pub fn new() -> Self {
        Self::with_config(&ProbeConfig::default())
    }

    /// Create a probe from explicit settings.
    pub fn with_config(config: &ProbeConfig) -> Self {
        let backend: Box<dyn ProbeBackend> = match config.backend {
            BackendSelection::Auto => native_backend(),
            BackendSelection::Portable => Box::new(PortableBackend::new()),
        };
        debug!(
            backend = backend.name(),
            selection = %config.backend,
            allow_privileged = config.allow_privileged,
            "selected probe backend"
        );
        Self {
            backend,
            allow_privileged: config.allow_privileged,
            capabilities: OnceCell::new(),
        }
    }

    /// Create a probe around a specific backend.
    pub fn with_backend(backend: Box<dyn ProbeBackend>) -> Self {
        Self {
            backend,
            allow_privileged: false,
            capabilities: OnceCell::new(),
        }
    }

    /// Get the underlying backend.
    pub fn backend(&self) -> &dyn ProbeBackend {
        &*self.backend
    }

    /// Manufacturer identifier, or the `Unidentified` placeholder.
    pub fn get_vendor_id(&self) -> VendorString {
        self.backend.vendor_id()
    }

    /// Current value of the free-running cycle counter.
    #[inline]
    pub fn read_cycle_counter(&self) -> Result<CycleCount> {
        self.backend.read_cycle_counter()
    }

    /// Supported vector extensions, interrogated once per probe.
    pub fn detect_vector_capability(&self) -> &CapabilitySet {
        self.capabilities.get_or_init(|| {
            let caps = self.backend.detect_capabilities();
            debug!(backend = self.backend.name(), %caps, "cached capability set");
            caps
        })
    }

    /// Spin-wait hint.
    #[inline]
    pub fn pause_hint(&self) {
        self.backend.pause_hint()
    }

    /// Full memory barrier.
    #[inline]
    pub fn memory_fence(&self) {
        self.backend.memory_fence()
    }

    /// Read a model-specific register; requires `allow_privileged`.
    pub fn read_msr(&self, cpu: usize, register: u32) -> Result<u64> {
        self.require_privileged("model-specific registers")?;
        self.backend.read_msr(cpu, register)
    }

    /// Read a performance-monitoring counter; requires `allow_privileged`.
    pub fn read_pmc(&self, counter: u32) -> Result<u64> {
        self.require_privileged("performance counters")?;
        self.backend.read_pmc(counter)
    }

    /// Run `f` between two fenced counter reads and return its elapsed cycles.
    pub fn measure_cycles<R, F: FnOnce() -> R>(&self, f: F) -> Result<(R, u64)> {
        self.memory_fence();
        let start = self.read_cycle_counter()?;
        let result = f();
        self.memory_fence();
        let end = self.read_cycle_counter()?;
        Ok((result, end.elapsed_since(start)))
    }

    fn require_privileged(&self, feature: &str) -> Result<()> {
        if self.allow_privileged {
            Ok(())
        } else {
            Err(ProbeError::permission_denied(format!(
                "{feature} (privileged reads are disabled in the probe configuration)"
            )))
        }
    }
}

impl Default for CpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuProbe")
            .field("backend", &self.backend.name())
            .field("allow_privileged", &self.allow_privileged)
            .field("capabilities", &self.capabilities.get())
            .finish()
    }
}

/// Global probe using the native backend.
static DEFAULT_PROBE: Lazy<CpuProbe> = Lazy::new(CpuProbe::new);

/// Get the process-wide default probe.
pub fn default_probe() -> &'static CpuProbe {
    &DEFAULT_PROBE
}

/// Manufacturer identifier of the host processor.
pub fn get_vendor_id() -> VendorString {
    default_probe().get_vendor_id()
}

/// Current cycle counter reading; fails with `UnsupportedFeature` on hosts
/// without an accessible counter.
#[inline]
pub fn read_cycle_counter() -> Result<CycleCount> {
    default_probe().read_cycle_counter()
}

/// Host capability set, detected on the first call and cached.
pub fn detect_vector_capability() -> &'static CapabilitySet {
    default_probe().detect_vector_capability()
}

/// Spin-wait hint for caller-implemented busy loops.
#[inline]
pub fn pause_hint() {
    default_probe().pause_hint()
}

/// Sequentially-consistent memory barrier.
#[inline]
pub fn memory_fence() {
    default_probe().memory_fence()
}

/// Architecture the probe was compiled for.
pub fn host_arch() -> HostArch {
    HostArch::current()
}
