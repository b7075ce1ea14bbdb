//! The diagnostic sequence printed by the `cpuprobe` binary.

use std::fmt;

use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::config::features::{CapabilitySet, VectorWidth};
use crate::error::Result;
use crate::probe::CpuProbe;
use crate::types::{CycleCount, HostArch, VendorString};

/// Outcome of an optional register read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegisterReading {
    /// Human-readable register name, e.g. `MSR 0x10 (cpu 0)`.
    pub label: String,
    /// Value when the read succeeded.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub value: Option<u64>,
    /// Error text when it failed.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl RegisterReading {
    fn from_result(label: String, result: Result<u64>) -> Self {
        match result {
            Ok(value) => Self {
                label,
                value: Some(value),
                error: None,
            },
            Err(err) => {
                warn!(%label, error = %err, "register read failed");
                Self {
                    label,
                    value: None,
                    error: Some(if err.is_unsupported() {
                        "unsupported".to_string()
                    } else {
                        err.to_string()
                    }),
                }
            }
        }
    }
}

impl fmt::Display for RegisterReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, &self.error) {
            (Some(value), _) => write!(f, "{}: {:#018x}", self.label, value),
            (None, Some(error)) => write!(f, "{}: {}", self.label, error),
            (None, None) => write!(f, "{}: unavailable", self.label),
        }
    }
}

/// Results of one full diagnostic pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DiagnosticReport {
    /// Architecture the binary was built for
    pub arch: HostArch,
    /// Backend that answered the queries
    pub backend: &'static str,
    /// Processor vendor
    pub vendor: VendorString,
    /// Counter reading, `None` when the host has no usable counter
    pub cycle_counter: Option<CycleCount>,
    /// Whether the counter rate survives frequency scaling
    pub invariant_counter: Option<bool>,
    /// Supported SIMD widths
    pub widths: Vec<VectorWidth>,
    /// Detected extensions
    pub capabilities: CapabilitySet,
    /// Optional MSR/PMC readings
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub registers: Vec<RegisterReading>,
}

impl DiagnosticReport {
    /// Run vendor, counter and capability queries on `probe`.
    pub fn collect(probe: &CpuProbe) -> Self {
        let vendor = probe.get_vendor_id();
        let cycle_counter = match probe.read_cycle_counter() {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(error = %err, "cycle counter unavailable");
                None
            }
        };
        let invariant_counter = probe.backend().has_invariant_counter();
        if invariant_counter == Some(false) {
            warn!("cycle counter rate follows frequency scaling");
        }
        let capabilities = *probe.detect_vector_capability();

        info!(
            backend = probe.backend().name(),
            %vendor,
            counter = ?cycle_counter,
            invariant = ?invariant_counter,
            "collected diagnostics"
        );

        Self {
            arch: HostArch::current(),
            backend: probe.backend().name(),
            vendor,
            cycle_counter,
            invariant_counter,
            widths: capabilities.widths(),
            capabilities,
            registers: Vec::new(),
        }
    }

    /// Append a model-specific register reading.
    pub fn read_msr(&mut self, probe: &CpuProbe, cpu: usize, register: u32) {
        let label = format!("MSR {register:#x} (cpu {cpu})");
        self.registers
            .push(RegisterReading::from_result(label, probe.read_msr(cpu, register)));
    }

    /// Append a performance-counter reading.
    pub fn read_pmc(&mut self, probe: &CpuProbe, counter: u32) {
        let label = format!("PMC {counter:#x}");
        self.registers
            .push(RegisterReading::from_result(label, probe.read_pmc(counter)));
    }

    /// The printed lines: vendor, counter, capabilities, then any registers.
    pub fn lines(&self) -> Vec<String> {
        let counter = self
            .cycle_counter
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unsupported".to_string());

        let mut lines = vec![
            format!("CPU Vendor: {}", self.vendor),
            format!("Cycle Counter: {counter}"),
            format!("Vector Capabilities: {}", self.capabilities),
        ];
        lines.extend(self.registers.iter().map(|r| r.to_string()));
        lines
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
