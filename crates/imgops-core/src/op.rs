//! The op implementation contract
//!
//! An op is a plain struct holding its parameter slots. The engine assigns
//! converted inputs through [`Op::set_input`], runs it, and reads declared
//! outputs back through [`Op::output`]. Ops that need engine services declare
//! them on their descriptor and receive them through [`Op::provide`].

use std::any::Any;

use crate::execution::ChunkExecutor;
use crate::service::OpService;
use crate::types::TypeDesc;
use crate::{Error, Result, Value};

/// Direction of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemIo {
    Input,
    Output,
    /// Read as an input and reported as an output (in-place ops)
    Both,
}

impl ItemIo {
    pub fn is_input(self) -> bool {
        matches!(self, ItemIo::Input | ItemIo::Both)
    }

    pub fn is_output(self) -> bool {
        matches!(self, ItemIo::Output | ItemIo::Both)
    }
}

/// Declared parameter of an op
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: TypeDesc,
    pub required: bool,
    pub io: ItemIo,
}

impl ParamSpec {
    pub fn input(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            name,
            ty,
            required: true,
            io: ItemIo::Input,
        }
    }

    pub fn optional(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            required: false,
            ..Self::input(name, ty)
        }
    }

    pub fn output(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            io: ItemIo::Output,
            ..Self::input(name, ty)
        }
    }

    pub fn both(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            io: ItemIo::Both,
            ..Self::input(name, ty)
        }
    }
}

/// Services an op can ask the injector for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Handle to the engine itself, for nested resolve/invoke calls
    Ops,
    /// The configured chunk executor
    Threads,
}

/// A service instance handed to an op during injection
#[derive(Clone)]
pub enum ServiceHandle {
    Ops(OpService),
    Threads(ChunkExecutor),
}

impl ServiceHandle {
    pub fn kind(&self) -> Service {
        match self {
            ServiceHandle::Ops(_) => Service::Ops,
            ServiceHandle::Threads(_) => Service::Threads,
        }
    }
}

/// Runtime self-check an op may expose to veto a type-compatible match
pub trait Contingent {
    /// Evaluated after binding; `false` rejects this candidate
    fn conforms(&self) -> bool;
}

/// Object-safe access to the concrete type behind a `dyn Op`
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn op_type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn op_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A unit of computation with declared, typed inputs and outputs
pub trait Op: AsAny + Send {
    /// Assign a converted value to the named input slot
    fn set_input(&mut self, name: &str, value: Value) -> Result<()>;

    /// Perform the computation
    fn run(&mut self) -> Result<()>;

    /// Read the named output slot; `None` reads as [`Value::Null`]
    fn output(&self, name: &str) -> Option<Value>;

    /// Receive an injected service
    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        Err(Error::InvalidParameter(format!(
            "{} does not accept service {:?}",
            std::any::type_name::<Self>(),
            service.kind()
        )))
    }

    /// Conformance capability query
    fn as_contingent(&self) -> Option<&dyn Contingent> {
        None
    }
}

impl dyn Op {
    pub fn downcast_ref<T: Op>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Op>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Op>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
