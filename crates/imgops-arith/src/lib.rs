//! Arithmetic ops for imgops

pub mod add;

pub use add::{AddConstantToByteImage, AddConstantToByteImageParallel, AddNumbers};

use imgops_core::OpRegistry;

/// Register every arithmetic op
pub fn register(registry: &mut OpRegistry) {
    registry.extend(add::descriptors());
}
