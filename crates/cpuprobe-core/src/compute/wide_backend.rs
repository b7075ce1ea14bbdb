//! Kernels using the `wide` crate for portable SIMD lanes.
//!
//! Each kernel processes full 8-lane chunks with `wide` types and finishes
//! the remainder with scalar code, so the compiler picks the instruction
//! width for the target rather than hard-coded intrinsics.

use wide::{f32x8, i32x8, u64x4};

use super::kernels::{check_lengths, ScalarKernels, VectorKernels, FOLD_BLOCK};
use crate::error::Result;

const LANES: usize = 8;

#[inline]
fn load<T: Copy + Default>(chunk: &[T]) -> [T; LANES] {
    let mut arr = [T::default(); LANES];
    arr.copy_from_slice(chunk);
    arr
}

macro_rules! lanewise {
    ($self:ident, $a:ident, $b:ident, $out:ident, $simd:ty, $op:tt, $tail:ident) => {{
        check_lengths($a.len(), $b.len(), $out.len())?;
        let simd_end = $a.len() - ($a.len() % LANES);
        let (a_head, a_tail) = $a.split_at(simd_end);
        let (b_head, b_tail) = $b.split_at(simd_end);
        let (out_head, out_tail) = $out.split_at_mut(simd_end);

        for ((va, vb), vo) in a_head
            .chunks_exact(LANES)
            .zip(b_head.chunks_exact(LANES))
            .zip(out_head.chunks_exact_mut(LANES))
        {
            let x = <$simd>::from(load(va));
            let y = <$simd>::from(load(vb));
            let r: $simd = x $op y;
            vo.copy_from_slice(&r.to_array());
        }

        // Scalar remainder
        $self.scalar.$tail(a_tail, b_tail, out_tail)
    }};
}

/// Kernels backed by `wide` 256-bit lane types.
#[derive(Debug, Default, Clone, Copy)]
pub struct WideKernels {
    scalar: ScalarKernels,
}

impl WideKernels {
    pub fn new() -> Self {
        Self {
            scalar: ScalarKernels::new(),
        }
    }
}

impl VectorKernels for WideKernels {
    fn name(&self) -> &'static str {
        "wide"
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        lanewise!(self, a, b, out, f32x8, +, add_f32)
    }

    fn mul_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        lanewise!(self, a, b, out, f32x8, *, mul_f32)
    }

    fn div_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        lanewise!(self, a, b, out, f32x8, /, div_f32)
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> Result<()> {
        lanewise!(self, a, b, out, i32x8, +, add_i32)
    }

    fn xor_fold(&self, data: &[u8]) -> [u8; FOLD_BLOCK] {
        // Two 16-byte blocks per 256-bit step.
        const STEP: usize = 2 * FOLD_BLOCK;
        let simd_end = data.len() - (data.len() % STEP);
        let (head, tail) = data.split_at(simd_end);

        let mut acc = u64x4::splat(0);
        for chunk in head.chunks_exact(STEP) {
            let mut words = [0u64; 4];
            for (word, bytes) in words.iter_mut().zip(chunk.chunks_exact(8)) {
                *word = u64::from_le_bytes(load8(bytes));
            }
            acc = acc ^ u64x4::from(words);
        }

        let lanes = acc.to_array();
        let mut state = [0u8; FOLD_BLOCK];
        state[..8].copy_from_slice(&(lanes[0] ^ lanes[2]).to_le_bytes());
        state[8..].copy_from_slice(&(lanes[1] ^ lanes[3]).to_le_bytes());

        let rest = self.scalar.xor_fold(tail);
        for (s, r) in state.iter_mut().zip(rest) {
            *s ^= r;
        }
        state
    }

    fn is_efficient_for_size(&self, size: usize) -> bool {
        size >= LANES * 2
    }
}

#[inline]
fn load8(bytes: &[u8]) -> [u8; 8] {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(bytes);
    arr
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wide_kernels_operations() {
        let kernels = WideKernels::new();

        let a = vec![1.0_f32; 100];
        let b = vec![2.0_f32; 100];
        let mut out = vec![0.0_f32; 100];

        kernels.add_f32(&a, &b, &mut out).unwrap();
        assert!(out.iter().all(|&v| v == 3.0));

        kernels.mul_f32(&a, &b, &mut out).unwrap();
        assert!(out.iter().all(|&v| v == 2.0));

        kernels.div_f32(&a, &b, &mut out).unwrap();
        for v in &out {
            assert_relative_eq!(*v, 0.5, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_wide_int_add() {
        let kernels = WideKernels::new();
        let a = vec![42; 19];
        let b = vec![24; 19];
        let mut out = vec![0; 19];
        kernels.add_i32(&a, &b, &mut out).unwrap();
        assert!(out.iter().all(|&v| v == 66));
    }

    #[test]
    fn test_wide_xor_fold_matches_scalar() {
        let data: Vec<u8> = (0..77u32).map(|i| (i * 37 % 251) as u8).collect();
        let scalar = ScalarKernels::new();
        let wide = WideKernels::new();
        for len in [0, 15, 16, 31, 32, 33, 64, 77] {
            assert_eq!(wide.xor_fold(&data[..len]), scalar.xor_fold(&data[..len]), "len={len}");
        }
    }

    #[test]
    fn test_efficiency_check() {
        let kernels = WideKernels::new();

        // Should be inefficient for small sizes
        assert!(!kernels.is_efficient_for_size(3));

        // Should be efficient for larger sizes
        assert!(kernels.is_efficient_for_size(100));
    }
}
