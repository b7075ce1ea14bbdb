//! Portable numeric kernels.
//!
//! Replaces hand-written SSE/AVX/BMI2 intrinsics with lane-based code that
//! compiles on every target.

pub mod bits;
pub mod dispatch;
pub mod kernels;
pub mod wide_backend;

// Re-export kernel entry points
pub use dispatch::{get_dispatcher, KernelDispatcher};
pub use kernels::{ScalarKernels, VectorKernels, FOLD_BLOCK};
pub use wide_backend::WideKernels;
