//! Portable backend for hosts without a native implementation.
//!
//! Nothing here touches the hardware: the vendor is the `Unidentified`
//! placeholder, the capability set is empty, and the cycle counter is
//! reported as unsupported instead of being synthesized from a clock.

use crate::config::features::CapabilitySet;
use crate::error::{ProbeError, Result};
use crate::types::{CycleCount, VendorString};

use super::ProbeBackend;

/// Backend that answers every query without hardware access.
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableBackend;

impl PortableBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProbeBackend for PortableBackend {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn vendor_id(&self) -> VendorString {
        VendorString::UNIDENTIFIED
    }

    fn read_cycle_counter(&self) -> Result<CycleCount> {
        Err(ProbeError::unsupported("cycle counter", self.name()))
    }

    fn detect_capabilities(&self) -> CapabilitySet {
        CapabilitySet::NONE
    }
}
