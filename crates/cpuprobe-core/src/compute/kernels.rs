//! Kernel interface and the scalar reference implementation.

use num_traits::{Num, WrappingAdd};

use crate::error::{ProbeError, Result};

/// Width in bytes of one XOR-fold block.
pub const FOLD_BLOCK: usize = 16;

/// Element-wise numeric kernels with interchangeable implementations.
///
/// All implementations must produce bit-identical results.
pub trait VectorKernels: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// `out[i] = a[i] + b[i]`
    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()>;

    /// `out[i] = a[i] * b[i]`
    fn mul_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()>;

    /// `out[i] = a[i] / b[i]`
    fn div_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()>;

    /// `out[i] = a[i] + b[i]`, wrapping on overflow.
    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> Result<()>;

    /// XOR of all 16-byte blocks of `data`; a short final block is
    /// zero-padded.
    fn xor_fold(&self, data: &[u8]) -> [u8; FOLD_BLOCK];

    /// Check if this implementation handles the given length efficiently.
    fn is_efficient_for_size(&self, size: usize) -> bool;
}

/// Verify that all three slices have the same length.
pub(crate) fn check_lengths(a: usize, b: usize, out: usize) -> Result<()> {
    if a != b {
        return Err(ProbeError::dimension_mismatch(a, b));
    }
    if a != out {
        return Err(ProbeError::dimension_mismatch(a, out));
    }
    Ok(())
}

fn zip_map<T: Copy>(a: &[T], b: &[T], out: &mut [T], f: impl Fn(T, T) -> T) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = f(x, y);
    }
}

fn add<T: Num + Copy>(x: T, y: T) -> T {
    x + y
}

/// Scalar (non-SIMD) kernels; the reference every other backend must match.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarKernels;

impl ScalarKernels {
    pub fn new() -> Self {
        Self
    }
}

impl VectorKernels for ScalarKernels {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_lengths(a.len(), b.len(), out.len())?;
        zip_map(a, b, out, add);
        Ok(())
    }

    fn mul_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_lengths(a.len(), b.len(), out.len())?;
        zip_map(a, b, out, |x, y| x * y);
        Ok(())
    }

    fn div_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_lengths(a.len(), b.len(), out.len())?;
        zip_map(a, b, out, |x, y| x / y);
        Ok(())
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> Result<()> {
        check_lengths(a.len(), b.len(), out.len())?;
        zip_map(a, b, out, |x, y| WrappingAdd::wrapping_add(&x, &y));
        Ok(())
    }

    fn xor_fold(&self, data: &[u8]) -> [u8; FOLD_BLOCK] {
        let mut state = [0u8; FOLD_BLOCK];
        for block in data.chunks(FOLD_BLOCK) {
            for (s, &byte) in state.iter_mut().zip(block) {
                *s ^= byte;
            }
        }
        state
    }

    fn is_efficient_for_size(&self, _size: usize) -> bool {
        true // Scalar kernels work for any size
    }
}
