//! Op registry, resolution and invocation engine
//!
//! Callers invoke an op by name with a positional argument list. The engine
//! picks the implementation at runtime:
//!
//! 1. candidates registered under the name are walked in priority order;
//! 2. each is screened for arity and argument convertibility;
//! 3. the first survivor is constructed, injected with its services and bound;
//! 4. an op exposing [`Contingent`] may still veto itself;
//! 5. the accepted op runs and its declared outputs are collected.
//!
//! # Example
//!
//! ```rust
//! use imgops_core::{args, Error, Op, OpDescriptor, OpRegistry, OpService, Result, TypeDesc, Value};
//!
//! #[derive(Default)]
//! struct Double {
//!     x: i64,
//! }
//!
//! impl Op for Double {
//!     fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
//!         self.x = value.as_int().ok_or_else(|| Error::wrong_value(name, "int", &value))?;
//!         Ok(())
//!     }
//!
//!     fn run(&mut self) -> Result<()> {
//!         self.x *= 2;
//!         Ok(())
//!     }
//!
//!     fn output(&self, _name: &str) -> Option<Value> {
//!         Some(Value::Int(self.x))
//!     }
//! }
//!
//! let registry = OpRegistry::new().with(
//!     OpDescriptor::builder::<Double>("double")
//!         .input("x", TypeDesc::int())
//!         .output("out", TypeDesc::int())
//!         .build(),
//! );
//! let ops = OpService::new(registry)?;
//! assert_eq!(ops.run("double", &args![21])?, Value::Int(42));
//! # Ok::<(), imgops_core::Error>(())
//! ```

pub mod binder;
pub mod builder;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod execution;
pub mod image;
pub mod inject;
pub mod matcher;
pub mod module;
pub mod op;
pub mod registry;
pub mod service;
pub mod types;
pub mod value;

pub use error::{Error, Result};

pub use builder::{BuilderState, NeedsRegistry, OpServiceBuilder, Ready};
pub use config::OpsConfig;
pub use convert::{Converter, DefaultConverter};
pub use descriptor::{priority, OpDescriptor, OpDescriptorBuilder, Priority};
pub use execution::{Chunk, ChunkExecutor, ChunkPlan, ChunkReport, ExecutionStrategy};
pub use image::{ArrayImg, ImgData, ImgHandle, SampleType};
pub use inject::{Injector, ServiceInjector};
pub use matcher::Rejection;
pub use module::BoundInvocation;
pub use op::{Contingent, ItemIo, Op, ParamSpec, Service, ServiceHandle};
pub use registry::OpRegistry;
pub use service::OpService;
pub use types::{Kind, TypeDesc};
pub use value::Value;

/// Common imports for op implementations
pub mod prelude {
    pub use crate::descriptor::priority;
    pub use crate::{
        args, ArrayImg, ChunkExecutor, Contingent, Error, ImgData, ImgHandle, Op, OpDescriptor,
        OpRegistry, OpService, Priority, Result, SampleType, Service, ServiceHandle, TypeDesc,
        Value,
    };
}
