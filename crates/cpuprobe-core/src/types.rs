//! Value types produced by the probe.
//!
//! Both types are small `Copy` scalars: they are computed, consumed and
//! discarded by the caller and never mutated after construction.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// Number of characters in a vendor identifier.
pub const VENDOR_LEN: usize = 12;

/// Fixed 12-character processor vendor identifier plus a NUL terminator.
///
/// Names shorter than 12 characters are right-padded with spaces, longer
/// ones are truncated, and non-ASCII bytes are replaced by `?`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorString {
    bytes: [u8; VENDOR_LEN + 1],
}

impl VendorString {
    /// Placeholder returned when the host cannot identify its vendor.
    pub const UNIDENTIFIED: VendorString = VendorString {
        bytes: *b"Unidentified\0",
    };

    /// Build from the raw CPUID register layout (EBX, EDX, ECX).
    pub fn from_registers(ebx: u32, edx: u32, ecx: u32) -> Self {
        let mut raw = [0u8; VENDOR_LEN];
        raw[0..4].copy_from_slice(&ebx.to_le_bytes());
        raw[4..8].copy_from_slice(&edx.to_le_bytes());
        raw[8..12].copy_from_slice(&ecx.to_le_bytes());
        Self::from_bytes(&raw)
    }

    /// Build from an arbitrary name, padding or truncating to 12 characters.
    pub fn from_name(name: &str) -> Self {
        Self::from_bytes(name.as_bytes())
    }

    fn from_bytes(raw: &[u8]) -> Self {
        let mut bytes = [b' '; VENDOR_LEN + 1];
        bytes[VENDOR_LEN] = 0;
        for (dst, &src) in bytes.iter_mut().zip(raw.iter().take(VENDOR_LEN)) {
            *dst = if src.is_ascii_graphic() || src == b' ' {
                src
            } else {
                b'?'
            };
        }
        Self { bytes }
    }

    /// The 12 identifier characters, without the terminator.
    pub fn as_str(&self) -> &str {
        // Construction only admits printable ASCII.
        std::str::from_utf8(&self.bytes[..VENDOR_LEN]).unwrap_or("????????????")
    }

    /// The identifier including its trailing NUL.
    pub fn as_bytes_with_nul(&self) -> &[u8; VENDOR_LEN + 1] {
        &self.bytes
    }

    /// Whether this is the placeholder for an unidentified vendor.
    pub fn is_unidentified(&self) -> bool {
        *self == Self::UNIDENTIFIED
    }
}

impl fmt::Display for VendorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for VendorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VendorString({:?})", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl Serialize for VendorString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A raw reading of the free-running cycle counter.
///
/// A single reading carries no absolute meaning; subtract two readings
/// taken on the same core to obtain elapsed cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CycleCount(pub u64);

impl CycleCount {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Cycles elapsed since `earlier`, saturating at zero if the thread
    /// migrated to a core whose counter lags behind.
    pub fn elapsed_since(self, earlier: CycleCount) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for CycleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Architecture the probe was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum HostArch {
    /// 64-bit x86 (Intel, AMD, Zhaoxin, ...)
    X86_64,
    /// 64-bit ARM (Graviton, Apple Silicon, Ampere, ...)
    Aarch64,
    /// Anything else; the probe falls back to its portable backend.
    Other(&'static str),
}

impl HostArch {
    /// Architecture of the running binary.
    pub const fn current() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            HostArch::X86_64
        }
        #[cfg(target_arch = "aarch64")]
        {
            HostArch::Aarch64
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            HostArch::Other(std::env::consts::ARCH)
        }
    }

    /// Conventional short name (`x86_64`, `arm64`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            HostArch::X86_64 => "x86_64",
            HostArch::Aarch64 => "arm64",
            HostArch::Other(name) => name,
        }
    }
}

impl fmt::Display for HostArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
