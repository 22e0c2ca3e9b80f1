//! Statistics and image moment ops for imgops
//!
//! Plain reductions (`stats.sum`, `moments.moment10`, ...) read every pixel
//! of a real image and produce one float. Composed ops (`stats.mean`,
//! `stats.moment4_about_mean`, `moments.normalized_central*`,
//! `moments.centroid`) declare the `Ops` service and obtain their building
//! blocks through nested `run` calls on the engine.
//!
//! ```
//! use imgops_core::prelude::*;
//!
//! let mut registry = OpRegistry::new();
//! imgops_stats::register(&mut registry);
//! let ops = OpService::new(registry)?;
//!
//! let img = ArrayImg::from_data(&[4], ImgData::Float64(vec![1.0, 2.0, 3.0, 6.0]))?;
//! let mean = ops.run(imgops_stats::stats::MEAN, &args![img])?;
//! assert_eq!(mean, Value::Float(3.0));
//! # Ok::<(), imgops_core::Error>(())
//! ```

pub mod moments;
pub mod reduce;
pub mod stats;

pub use reduce::{ReduceImage, Reduction};

use imgops_core::OpRegistry;

/// Register all `stats.*` and `moments.*` ops
pub fn register(registry: &mut OpRegistry) {
    registry.extend(stats::descriptors());
    registry.extend(moments::descriptors());
}
