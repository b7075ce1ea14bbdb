//! aarch64 backend: MIDR implementer codes and the virtual counter.

use tracing::{debug, trace};

use crate::config::features::CapabilitySet;
use crate::error::Result;
use crate::types::{CycleCount, VendorString};

use super::midr::{implementer_name, parse_cpuinfo_implementer};
use super::ProbeBackend;

/// Backend for 64-bit ARM processors.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aarch64Backend;

impl Aarch64Backend {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "linux")]
    fn implementer_code(&self) -> Option<u32> {
        let cpuinfo = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        parse_cpuinfo_implementer(&cpuinfo)
    }

    #[cfg(target_os = "macos")]
    fn implementer_code(&self) -> Option<u32> {
        Some(0x61)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn implementer_code(&self) -> Option<u32> {
        None
    }
}

impl ProbeBackend for Aarch64Backend {
    fn name(&self) -> &'static str {
        "aarch64"
    }

    fn vendor_id(&self) -> VendorString {
        let code = self.implementer_code();
        debug!(implementer = ?code, "resolved MIDR implementer");
        code.and_then(implementer_name)
            .map(VendorString::from_name)
            .unwrap_or(VendorString::UNIDENTIFIED)
    }

    #[inline]
    fn read_cycle_counter(&self) -> Result<CycleCount> {
        let value: u64;
        // SAFETY: CNTVCT_EL0 is readable from EL0 on every supported OS.
        unsafe {
            core::arch::asm!(
                "isb",
                "mrs {}, cntvct_el0",
                out(reg) value,
                options(nomem, nostack, preserves_flags),
            );
        }
        trace!(value, "cntvct_el0");
        Ok(CycleCount(value))
    }

    /// The generic timer runs at the fixed `CNTFRQ_EL0` rate.
    fn has_invariant_counter(&self) -> Option<bool> {
        Some(true)
    }

    fn detect_capabilities(&self) -> CapabilitySet {
        let caps = CapabilitySet {
            neon: std::arch::is_aarch64_feature_detected!("neon"),
            sve: std::arch::is_aarch64_feature_detected!("sve"),
            ..CapabilitySet::NONE
        };
        debug!(features = ?caps.feature_names(), "detected aarch64 capabilities");
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_advances() {
        let backend = Aarch64Backend::new();
        let first = backend.read_cycle_counter().unwrap();
        let second = backend.read_cycle_counter().unwrap();
        assert!(second >= first);
        assert_eq!(backend.has_invariant_counter(), Some(true));
    }

    #[test]
    fn test_neon_present() {
        assert!(Aarch64Backend::new().detect_capabilities().neon);
    }
}
