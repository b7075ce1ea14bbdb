//! Vector capability detection and runtime SIMD configuration.
//!
//! The capability set is read from the hardware feature registers once per
//! process and cached; feature sets do not change while a process runs, so
//! the cached value is shared read-only by every thread.

use once_cell::sync::Lazy;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// SIMD register widths a processor can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum VectorWidth {
    /// 128-bit vectors (SSE family, NEON, SVE minimum)
    W128,
    /// 256-bit vectors (AVX, AVX2)
    W256,
    /// 512-bit vectors (AVX-512F)
    W512,
}

impl VectorWidth {
    /// Width in bits.
    pub const fn bits(self) -> usize {
        match self {
            VectorWidth::W128 => 128,
            VectorWidth::W256 => 256,
            VectorWidth::W512 => 512,
        }
    }
}

impl fmt::Display for VectorWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Optional instruction-set extensions detected on the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CapabilitySet {
    /// SSE support
    pub sse: bool,
    /// SSE2 support
    pub sse2: bool,
    /// SSE3 support
    pub sse3: bool,
    /// SSSE3 support
    pub ssse3: bool,
    /// SSE4.1 support
    pub sse4_1: bool,
    /// SSE4.2 support
    pub sse4_2: bool,
    /// AVX support (256-bit float)
    pub avx: bool,
    /// AVX2 support (256-bit integer)
    pub avx2: bool,
    /// FMA (Fused Multiply-Add) support
    pub fma: bool,
    /// AVX-512 foundation (512-bit SIMD)
    pub avx512f: bool,
    /// BMI1 bit manipulation
    pub bmi1: bool,
    /// BMI2 bit manipulation (pdep/pext)
    pub bmi2: bool,
    /// NEON support (ARM)
    pub neon: bool,
    /// SVE support (ARM scalable vectors)
    pub sve: bool,
}

impl CapabilitySet {
    /// The empty set: no optional extensions.
    pub const NONE: CapabilitySet = CapabilitySet {
        sse: false,
        sse2: false,
        sse3: false,
        ssse3: false,
        sse4_1: false,
        sse4_2: false,
        avx: false,
        avx2: false,
        fma: false,
        avx512f: false,
        bmi1: false,
        bmi2: false,
        neon: false,
        sve: false,
    };

    /// Supported SIMD widths, narrowest first. Empty means "none".
    pub fn widths(&self) -> Vec<VectorWidth> {
        let mut widths = Vec::with_capacity(3);
        if self.sse
            || self.sse2
            || self.sse3
            || self.ssse3
            || self.sse4_1
            || self.sse4_2
            || self.neon
            || self.sve
        {
            widths.push(VectorWidth::W128);
        }
        if self.avx || self.avx2 {
            widths.push(VectorWidth::W256);
        }
        if self.avx512f {
            widths.push(VectorWidth::W512);
        }
        widths
    }

    /// Check if any SIMD support is available.
    pub fn has_simd(&self) -> bool {
        !self.widths().is_empty()
    }

    /// Maximum vector width in bits, 64 for a scalar-only host.
    pub fn max_vector_width(&self) -> usize {
        self.widths()
            .last()
            .map(|w| w.bits())
            .unwrap_or(64)
    }

    /// Names of the detected extensions in a stable order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        let flags = [
            (self.sse, "sse"),
            (self.sse2, "sse2"),
            (self.sse3, "sse3"),
            (self.ssse3, "ssse3"),
            (self.sse4_1, "sse4.1"),
            (self.sse4_2, "sse4.2"),
            (self.avx, "avx"),
            (self.avx2, "avx2"),
            (self.fma, "fma"),
            (self.avx512f, "avx512f"),
            (self.bmi1, "bmi1"),
            (self.bmi2, "bmi2"),
            (self.neon, "neon"),
            (self.sve, "sve"),
        ];
        flags
            .iter()
            .filter(|(present, _)| *present)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        if widths.is_empty() {
            return f.write_str("none");
        }
        let widths: Vec<String> = widths.iter().map(|w| w.to_string()).collect();
        write!(f, "{} ({})", widths.join(", "), self.feature_names().join(", "))
    }
}

/// Get the capability set of the host, detected on first use.
pub fn cpu_features() -> &'static CapabilitySet {
    crate::probe::default_probe().detect_vector_capability()
}

/// Configuration for the portable vector kernels.
#[derive(Debug, Clone)]
pub struct SimdConfig {
    /// Whether to use the lane-based kernels at all.
    pub enabled: bool,
    /// Minimum slice length to use the lane kernels (below this, use scalar).
    pub min_vector_length: usize,
}

impl SimdConfig {
    /// Derive a configuration from a capability set.
    pub fn for_capabilities(features: &CapabilitySet) -> Self {
        Self {
            enabled: features.has_simd(),
            min_vector_length: 16,
        }
    }
}

impl Default for SimdConfig {
    fn default() -> Self {
        Self::for_capabilities(cpu_features())
    }
}

/// Global SIMD configuration.
pub static SIMD_CONFIG: Lazy<SimdConfig> = Lazy::new(SimdConfig::default);

/// Get the current SIMD configuration.
pub fn simd_config() -> &'static SimdConfig {
    &SIMD_CONFIG
}

/// Builder for creating a custom SIMD configuration.
pub struct SimdConfigBuilder {
    config: SimdConfig,
}

impl SimdConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: SimdConfig::default(),
        }
    }

    /// Enable or disable the lane kernels.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the minimum slice length for lane kernels.
    pub fn min_vector_length(mut self, length: usize) -> Self {
        self.config.min_vector_length = length;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SimdConfig {
        self.config
    }
}

impl Default for SimdConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Conditionally evaluate an expression based on target architecture.
#[macro_export]
macro_rules! arch_specific {
    (x86_64: $x86_64:expr, aarch64: $aarch64:expr, default: $default:expr) => {{
        #[cfg(target_arch = "x86_64")]
        {
            $x86_64
        }

        #[cfg(target_arch = "aarch64")]
        {
            $aarch64
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            $default
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_from_flags() {
        assert!(CapabilitySet::NONE.widths().is_empty());
        assert_eq!(CapabilitySet::NONE.max_vector_width(), 64);
        assert_eq!(CapabilitySet::NONE.to_string(), "none");

        let sse_only = CapabilitySet {
            sse: true,
            sse2: true,
            ..CapabilitySet::NONE
        };
        assert_eq!(sse_only.widths(), vec![VectorWidth::W128]);

        let avx512 = CapabilitySet {
            sse2: true,
            avx2: true,
            avx512f: true,
            ..CapabilitySet::NONE
        };
        assert_eq!(
            avx512.widths(),
            vec![VectorWidth::W128, VectorWidth::W256, VectorWidth::W512]
        );
        assert_eq!(avx512.max_vector_width(), 512);

        let arm = CapabilitySet {
            neon: true,
            ..CapabilitySet::NONE
        };
        assert_eq!(arm.widths(), vec![VectorWidth::W128]);
    }

    #[test]
    fn test_display_lists_features() {
        let caps = CapabilitySet {
            sse2: true,
            avx2: true,
            fma: true,
            ..CapabilitySet::NONE
        };
        assert_eq!(caps.to_string(), "128, 256 (sse2, avx2, fma)");
    }

    #[test]
    fn test_cpu_feature_detection() {
        let features = cpu_features();
        assert!(features.max_vector_width() >= 64);

        #[cfg(target_arch = "x86_64")]
        assert!(features.sse2, "SSE2 is part of the x86_64 baseline");
    }

    #[test]
    fn test_global_cpu_features() {
        let features1 = cpu_features();
        let features2 = cpu_features();

        // Should return the same instance
        assert!(std::ptr::eq(features1, features2));
    }

    #[test]
    fn test_simd_config_builder() {
        let config = SimdConfigBuilder::new()
            .enabled(true)
            .min_vector_length(32)
            .build();

        assert!(config.enabled);
        assert_eq!(config.min_vector_length, 32);
    }

    #[test]
    fn test_simd_config_disabled_without_simd() {
        let config = SimdConfig::for_capabilities(&CapabilitySet::NONE);
        assert!(!config.enabled);
        assert_eq!(config.min_vector_length, 16);
    }

    #[test]
    fn test_arch_specific_macro() {
        let result = arch_specific!(
            x86_64: "x86_64",
            aarch64: "aarch64",
            default: "other"
        );

        #[cfg(target_arch = "x86_64")]
        assert_eq!(result, "x86_64");

        #[cfg(target_arch = "aarch64")]
        assert_eq!(result, "aarch64");

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        assert_eq!(result, "other");
    }
}
