//! imgops: runtime op resolution with a bundled image op library
//!
//! This crate re-exports the engine from `imgops-core` and the op crates
//! built on it, and wires them into a ready-to-use registry.
//!
//! ```
//! use imgops::prelude::*;
//!
//! let ops = imgops::default_service()?;
//! assert_eq!(ops.run("add", &args![5, 7])?, Value::Int(12));
//!
//! let kernel = ops.run("gauss", &args![2, 5.0, SampleType::Float32, Value::Null])?;
//! assert_eq!(kernel.as_img().map(|k| k.dims()), Some(vec![31, 31]));
//! # Ok::<(), imgops::Error>(())
//! ```

pub use imgops_core::*;

pub use imgops_arith as arith;
pub use imgops_fft as fft;
pub use imgops_kernel as kernel;
pub use imgops_stats as stats;

use tracing::debug;

/// Registry holding every op of the bundled crates
pub fn default_registry() -> OpRegistry {
    let mut registry = OpRegistry::new();
    arith::register(&mut registry);
    kernel::register(&mut registry);
    stats::register(&mut registry);
    fft::register(&mut registry);
    debug!(ops = registry.len(), names = registry.names().len(), "default registry");
    registry
}

/// Engine over [`default_registry`] with the default configuration
pub fn default_service() -> Result<OpService> {
    OpService::new(default_registry())
}

/// Engine over [`default_registry`] with the given configuration
pub fn service_with_config(config: OpsConfig) -> Result<OpService> {
    OpService::builder()
        .with_registry(default_registry())
        .with_config(config)
        .build()
}
