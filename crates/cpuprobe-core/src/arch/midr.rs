//! MIDR_EL1 implementer decoding.

/// Map a MIDR_EL1 implementer code to a manufacturer name.
pub fn implementer_name(code: u32) -> Option<&'static str> {
    let name = match code {
        0x41 => "ARM Limited",
        0x42 => "Broadcom",
        0x43 => "Cavium",
        0x46 => "Fujitsu",
        0x48 => "HiSilicon",
        0x4e => "NVIDIA",
        0x50 => "AppliedMicro",
        0x51 => "Qualcomm",
        0x53 => "Samsung",
        0x56 => "Marvell",
        0x61 => "Apple",
        0x69 => "Intel",
        0xc0 => "Ampere",
        _ => return None,
    };
    Some(name)
}

/// Extract the `CPU implementer` field from `/proc/cpuinfo` text.
pub fn parse_cpuinfo_implementer(cpuinfo: &str) -> Option<u32> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "CPU implementer" {
            return None;
        }
        let value = value.trim();
        let hex = value.strip_prefix("0x").unwrap_or(value);
        u32::from_str_radix(hex, 16).ok()
    })
}
