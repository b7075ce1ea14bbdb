//! x86_64 backend: CPUID, RDTSC, RDMSR (through the OS) and RDPMC.

use raw_cpuid::CpuId;
use tracing::{debug, trace, warn};

use crate::config::features::CapabilitySet;
use crate::error::{ProbeError, Result};
use crate::types::{CycleCount, VendorString};

use super::ProbeBackend;

/// Kernel switch controlling user-space RDPMC on Linux.
#[cfg(target_os = "linux")]
const RDPMC_POLICY: &str = "/sys/bus/event_source/devices/cpu/rdpmc";

/// Per-CPU sysfs directories; present for every CPU the kernel knows,
/// regardless of the process affinity mask or cgroup quota.
#[cfg(target_os = "linux")]
const SYSFS_CPU_ROOT: &str = "/sys/devices/system/cpu";

/// Bit selecting the fixed-function counter bank in the RDPMC index.
const FIXED_COUNTER_BIT: u32 = 1 << 30;

/// Legacy general-purpose counters on AMD, which lacks CPUID leaf 0xA.
const AMD_LEGACY_COUNTERS: u32 = 4;

/// Counter layout read once from CPUID.
#[derive(Debug, Clone, Copy, Default)]
struct PmuLayout {
    general: u32,
    fixed: u32,
}

/// Backend for 64-bit x86 processors.
#[derive(Debug)]
pub struct X86Backend {
    has_tsc: bool,
    invariant_tsc: bool,
    pmu: PmuLayout,
}

impl X86Backend {
    pub fn new() -> Self {
        let cpuid = CpuId::new();

        let has_tsc = cpuid
            .get_feature_info()
            .is_some_and(|fi| fi.has_tsc());
        let invariant_tsc = cpuid
            .get_advanced_power_mgmt_info()
            .is_some_and(|apm| apm.has_invariant_tsc());

        let pmu = match cpuid.get_performance_monitoring_info() {
            Some(info) if info.version_id() > 0 => PmuLayout {
                general: u32::from(info.number_of_counters()),
                fixed: u32::from(info.fixed_function_counters()),
            },
            _ => {
                let is_amd = cpuid
                    .get_vendor_info()
                    .is_some_and(|vi| vi.as_str() == "AuthenticAMD");
                PmuLayout {
                    general: if is_amd { AMD_LEGACY_COUNTERS } else { 0 },
                    fixed: 0,
                }
            }
        };

        debug!(
            has_tsc,
            invariant_tsc,
            general_counters = pmu.general,
            fixed_counters = pmu.fixed,
            "initialized x86_64 backend"
        );

        Self {
            has_tsc,
            invariant_tsc,
            pmu,
        }
    }

    fn validate_pmc_index(&self, counter: u32) -> Result<()> {
        let (bank, index, limit) = if counter & FIXED_COUNTER_BIT != 0 {
            ("fixed", counter & !FIXED_COUNTER_BIT, self.pmu.fixed)
        } else {
            ("general-purpose", counter, self.pmu.general)
        };
        if index >= limit {
            return Err(ProbeError::invalid_argument(
                "counter",
                format!("{counter:#x}"),
                format!("{bank} counter index out of range (host has {limit})"),
            ));
        }
        Ok(())
    }
}

/// MSR device node for `cpu`, or `InvalidArgument` when `sysfs_root` has
/// no entry for that logical processor.
#[cfg(target_os = "linux")]
fn msr_device(sysfs_root: &std::path::Path, cpu: usize) -> Result<std::path::PathBuf> {
    if !sysfs_root.join(format!("cpu{cpu}")).is_dir() {
        return Err(ProbeError::invalid_argument(
            "cpu",
            cpu,
            format!("no such logical processor under {}", sysfs_root.display()),
        ));
    }
    Ok(std::path::PathBuf::from(format!("/dev/cpu/{cpu}/msr")))
}

impl Default for X86Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeBackend for X86Backend {
    fn name(&self) -> &'static str {
        "x86_64"
    }

    fn vendor_id(&self) -> VendorString {
        CpuId::new()
            .get_vendor_info()
            .map(|vi| VendorString::from_name(vi.as_str()))
            .unwrap_or(VendorString::UNIDENTIFIED)
    }

    #[inline]
    fn read_cycle_counter(&self) -> Result<CycleCount> {
        if !self.has_tsc {
            return Err(ProbeError::unsupported("time-stamp counter", self.name()));
        }
        // SAFETY: RDTSC is available (CPUID.01H:EDX.TSC) and has no side effects.
        #[allow(unused_unsafe)]
        let value = unsafe { core::arch::x86_64::_rdtsc() };
        trace!(value, "rdtsc");
        Ok(CycleCount(value))
    }

    fn has_invariant_counter(&self) -> Option<bool> {
        self.has_tsc.then_some(self.invariant_tsc)
    }

    fn detect_capabilities(&self) -> CapabilitySet {
        let caps = CapabilitySet {
            sse: is_x86_feature_detected!("sse"),
            sse2: is_x86_feature_detected!("sse2"),
            sse3: is_x86_feature_detected!("sse3"),
            ssse3: is_x86_feature_detected!("ssse3"),
            sse4_1: is_x86_feature_detected!("sse4.1"),
            sse4_2: is_x86_feature_detected!("sse4.2"),
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
            fma: is_x86_feature_detected!("fma"),
            avx512f: is_x86_feature_detected!("avx512f"),
            bmi1: is_x86_feature_detected!("bmi1"),
            bmi2: is_x86_feature_detected!("bmi2"),
            neon: false,
            sve: false,
        };
        debug!(features = ?caps.feature_names(), "detected x86_64 capabilities");
        caps
    }

    #[cfg(target_os = "linux")]
    fn read_msr(&self, cpu: usize, register: u32) -> Result<u64> {
        use std::fs::File;
        use std::os::unix::fs::FileExt;
        use std::path::Path;

        let path = msr_device(Path::new(SYSFS_CPU_ROOT), cpu)?;
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::unsupported(
                    format!("{} (msr module not loaded)", path.display()),
                    self.name(),
                )
            } else {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    warn!(path = %path.display(), "MSR device requires elevated privileges");
                }
                ProbeError::io(path.display().to_string(), e)
            }
        })?;

        let mut buf = [0u8; 8];
        file.read_exact_at(&mut buf, u64::from(register))
            .map_err(|e| ProbeError::io(format!("reading MSR {register:#x} on cpu {cpu}"), e))?;
        Ok(u64::from_le_bytes(buf))
    }

    #[cfg(target_os = "linux")]
    fn read_pmc(&self, counter: u32) -> Result<u64> {
        let policy = std::fs::read_to_string(RDPMC_POLICY)
            .map_err(|e| ProbeError::io(format!("reading {RDPMC_POLICY}"), e))?;
        // 2 = unconditional user access; 1 only covers mmap'd perf events.
        if policy.trim() != "2" {
            return Err(ProbeError::unsupported(
                format!("user-space rdpmc (policy {})", policy.trim()),
                self.name(),
            ));
        }
        self.validate_pmc_index(counter)?;

        let (low, high): (u32, u32);
        // SAFETY: CR4.PCE is set (policy 2) and the index was range-checked
        // against the PMU layout, so RDPMC cannot fault.
        unsafe {
            core::arch::asm!(
                "rdpmc",
                in("ecx") counter,
                out("eax") low,
                out("edx") high,
                options(nomem, nostack, preserves_flags),
            );
        }
        Ok((u64::from(high) << 32) | u64::from(low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x86_vendor_is_twelve_chars() {
        let vendor = X86Backend::new().vendor_id();
        assert_eq!(vendor.as_str().len(), 12);
        assert!(!vendor.as_str().trim().is_empty());
    }

    #[test]
    fn test_x86_baseline_features() {
        let caps = X86Backend::new().detect_capabilities();
        assert!(caps.sse && caps.sse2);
        assert!(!caps.neon && !caps.sve);
    }

    #[test]
    fn test_rdtsc_advances() {
        let backend = X86Backend::new();
        let first = backend.read_cycle_counter().unwrap();
        let second = backend.read_cycle_counter().unwrap();
        assert!(second >= first);
        assert!(backend.has_invariant_counter().is_some());
    }

    #[test]
    fn test_pmc_index_validation() {
        let backend = X86Backend {
            has_tsc: true,
            invariant_tsc: true,
            pmu: PmuLayout { general: 4, fixed: 3 },
        };
        assert!(backend.validate_pmc_index(0).is_ok());
        assert!(backend.validate_pmc_index(3).is_ok());
        assert!(backend.validate_pmc_index(4).is_err());
        assert!(backend.validate_pmc_index(FIXED_COUNTER_BIT | 2).is_ok());
        assert!(backend.validate_pmc_index(FIXED_COUNTER_BIT | 3).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_msr_rejects_unknown_cpu() {
        let backend = X86Backend::new();
        let err = backend.read_msr(usize::MAX, 0x10).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidArgument { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_msr_device_follows_sysfs_not_affinity() {
        // A CPU index beyond the schedulable set that the kernel still lists.
        let root = std::env::temp_dir().join(format!("cpuprobe-sysfs-{}", std::process::id()));
        std::fs::create_dir_all(root.join("cpu0")).unwrap();
        std::fs::create_dir_all(root.join("cpu63")).unwrap();

        let path = msr_device(&root, 63).unwrap();
        assert_eq!(path, std::path::PathBuf::from("/dev/cpu/63/msr"));
        assert!(msr_device(&root, 0).is_ok());

        let err = msr_device(&root, 64).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidArgument { .. }));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_msr_cpu0_is_not_rejected_as_invalid() {
        let backend = X86Backend::new();
        if let Err(err) = backend.read_msr(0, 0x10) {
            assert!(!matches!(err, ProbeError::InvalidArgument { .. }));
        }
    }
}
