//! Kernel creation ops for imgops
//!
//! `gauss` has two variants under one name: a float variant that ranks
//! higher and only conforms for floating point output types, and a scaled
//! byte variant that conforms only for `uint8`. The output type decides
//! which one runs. `log` creates Laplacian-of-Gaussian blob kernels for
//! floating point output types.

pub mod gauss;
pub mod laplacian;
pub mod params;

pub use gauss::{CreateGaussianKernel, CreateScaledGaussianKernel};
pub use laplacian::CreateLogKernel;
pub use params::KernelParams;

use imgops_core::OpRegistry;

/// Register `gauss` and `log`
pub fn register(registry: &mut OpRegistry) {
    registry.extend(gauss::descriptors());
    registry.extend(laplacian::descriptors());
}
