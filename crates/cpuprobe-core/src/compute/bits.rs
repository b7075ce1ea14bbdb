//! Software parallel bit deposit and extract.
//!
//! Same results as the BMI2 `pdep`/`pext` instructions on every target.
//! The loops walk the set bits of the mask, so cost is proportional to
//! `mask.count_ones()`.

/// Scatter the low bits of `value` into the set bit positions of `mask`.
///
/// ```rust
/// use cpuprobe_core::compute::bits::deposit;
///
/// assert_eq!(deposit(0b1011, 0b1111_0000), 0b1011_0000);
/// assert_eq!(deposit(0b11, 0b1010), 0b1010);
/// ```
#[inline]
pub fn deposit(value: u64, mut mask: u64) -> u64 {
    let mut result = 0u64;
    let mut bit = 1u64;
    while mask != 0 {
        let lowest = mask & mask.wrapping_neg();
        if value & bit != 0 {
            result |= lowest;
        }
        mask ^= lowest;
        bit <<= 1;
    }
    result
}

/// Gather the bits of `value` at the set positions of `mask` into the low
/// bits of the result.
#[inline]
pub fn extract(value: u64, mut mask: u64) -> u64 {
    let mut result = 0u64;
    let mut bit = 1u64;
    while mask != 0 {
        let lowest = mask & mask.wrapping_neg();
        if value & lowest != 0 {
            result |= bit;
        }
        mask ^= lowest;
        bit <<= 1;
    }
    result
}
