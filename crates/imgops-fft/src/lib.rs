//! FFT ops for imgops
//!
//! Sizing helpers (`fft.next_smooth`, `fft.size`) and full complex
//! forward/inverse transforms (`fft.forward`, `fft.inverse`) on n-dimensional
//! images, computed with RustFFT one axis at a time.
//!
//! ```rust
//! use imgops_core::{args, OpRegistry, OpService, Value};
//!
//! let mut registry = OpRegistry::new();
//! imgops_fft::register(&mut registry);
//! let ops = OpService::new(registry)?;
//! assert_eq!(ops.run("fft.next_smooth", &args![121])?, Value::Int(125));
//! # Ok::<(), imgops_core::Error>(())
//! ```

pub mod ops;
pub mod smooth;
pub mod transform;

pub use ops::{FftForward, FftInverse, FftSize, NextSmooth};
pub use smooth::{is_smooth, next_smooth, real_to_complex_sizes};

use imgops_core::OpRegistry;

/// Register every `fft.*` op
pub fn register(registry: &mut OpRegistry) {
    registry.extend(ops::descriptors());
}
