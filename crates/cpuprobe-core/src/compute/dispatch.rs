//! Runtime kernel dispatch based on the cached capability set.
//!
//! Hosts with any SIMD width get the `wide` lane kernels; scalar-only hosts
//! and short inputs go through the scalar reference kernels.

use once_cell::sync::Lazy;
use tracing::debug;

use super::kernels::{ScalarKernels, VectorKernels, FOLD_BLOCK};
use super::wide_backend::WideKernels;
use crate::config::features::{simd_config, SimdConfig};
use crate::error::Result;

/// Kernel dispatcher that selects the best implementation at runtime.
pub struct KernelDispatcher {
    kernels: Box<dyn VectorKernels>,
    scalar: ScalarKernels,
    min_len: usize,
}

impl KernelDispatcher {
    /// Create a dispatcher from the global SIMD configuration.
    pub fn new() -> Self {
        Self::with_config(simd_config())
    }

    /// Create a dispatcher from an explicit configuration.
    pub fn with_config(config: &SimdConfig) -> Self {
        let kernels: Box<dyn VectorKernels> = if config.enabled {
            Box::new(WideKernels::new())
        } else {
            Box::new(ScalarKernels::new())
        };
        debug!(
            kernels = kernels.name(),
            min_len = config.min_vector_length,
            "selected vector kernels"
        );
        Self {
            kernels,
            scalar: ScalarKernels::new(),
            min_len: config.min_vector_length,
        }
    }

    /// Create a dispatcher with a specific implementation.
    pub fn with_kernels(kernels: Box<dyn VectorKernels>) -> Self {
        Self {
            kernels,
            scalar: ScalarKernels::new(),
            min_len: 0,
        }
    }

    /// Get the selected implementation.
    pub fn kernels(&self) -> &dyn VectorKernels {
        &*self.kernels
    }

    #[inline]
    fn pick(&self, len: usize) -> &dyn VectorKernels {
        if len < self.min_len || !self.kernels.is_efficient_for_size(len) {
            &self.scalar
        } else {
            &*self.kernels
        }
    }
}

impl Default for KernelDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorKernels for KernelDispatcher {
    fn name(&self) -> &'static str {
        self.kernels.name()
    }

    #[inline]
    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        self.pick(a.len()).add_f32(a, b, out)
    }

    #[inline]
    fn mul_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        self.pick(a.len()).mul_f32(a, b, out)
    }

    #[inline]
    fn div_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        self.pick(a.len()).div_f32(a, b, out)
    }

    #[inline]
    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> Result<()> {
        self.pick(a.len()).add_i32(a, b, out)
    }

    #[inline]
    fn xor_fold(&self, data: &[u8]) -> [u8; FOLD_BLOCK] {
        self.pick(data.len()).xor_fold(data)
    }

    #[inline]
    fn is_efficient_for_size(&self, size: usize) -> bool {
        self.kernels.is_efficient_for_size(size)
    }
}

/// Global kernel dispatcher.
static DISPATCHER: Lazy<KernelDispatcher> = Lazy::new(KernelDispatcher::new);

/// Get the global kernel dispatcher.
pub fn get_dispatcher() -> &'static KernelDispatcher {
    &DISPATCHER
}
