//! Op descriptors: name, priority, parameters, services and factory

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::op::{Op, ParamSpec, Service};
use crate::Result;

/// Candidate ordering weight; higher runs first
pub type Priority = OrderedFloat<f64>;

/// Standard priority levels
pub mod priority {
    use super::Priority;
    use ordered_float::OrderedFloat;

    pub const FIRST: Priority = OrderedFloat(1e300);
    pub const VERY_HIGH: Priority = OrderedFloat(10000.0);
    pub const HIGH: Priority = OrderedFloat(100.0);
    pub const NORMAL: Priority = OrderedFloat(0.0);
    pub const LOW: Priority = OrderedFloat(-100.0);
    pub const VERY_LOW: Priority = OrderedFloat(-10000.0);
    pub const LAST: Priority = OrderedFloat(-1e300);
}

type Factory = Arc<dyn Fn() -> Result<Box<dyn Op>> + Send + Sync>;

/// Immutable description of one op implementation
#[derive(Clone)]
pub struct OpDescriptor {
    name: String,
    priority: Priority,
    params: Vec<ParamSpec>,
    services: Vec<Service>,
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
}

impl OpDescriptor {
    /// Start describing implementation `T` under `name`, built with `T::default()`
    pub fn builder<T: Op + Default>(name: impl Into<String>) -> OpDescriptorBuilder {
        OpDescriptorBuilder::new::<T>(name, Arc::new(|| Ok(Box::new(T::default()) as Box<dyn Op>)))
    }

    /// Start describing implementation `T` with a custom factory
    pub fn builder_with<T, F>(name: impl Into<String>, factory: F) -> OpDescriptorBuilder
    where
        T: Op,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        OpDescriptorBuilder::new::<T>(
            name,
            Arc::new(move || factory().map(|op| Box::new(op) as Box<dyn Op>)),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Input parameters in declaration order
    pub fn inputs(&self) -> impl Iterator<Item = &ParamSpec> + '_ {
        self.params.iter().filter(|p| p.io.is_input())
    }

    /// Output parameters in declaration order
    pub fn outputs(&self) -> impl Iterator<Item = &ParamSpec> + '_ {
        self.params.iter().filter(|p| p.io.is_output())
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Implementation identity
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Short implementation name (last path segment)
    pub fn short_type_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Construct a fresh, unpopulated instance
    pub fn instantiate(&self) -> Result<Box<dyn Op>> {
        (self.factory)()
    }
}

impl fmt::Debug for OpDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority.0)
            .field("type", &self.type_name)
            .field("params", &self.params)
            .field("services", &self.services)
            .finish()
    }
}

/// Builder for [`OpDescriptor`]
pub struct OpDescriptorBuilder {
    name: String,
    priority: Priority,
    params: Vec<ParamSpec>,
    services: Vec<Service>,
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
}

impl OpDescriptorBuilder {
    fn new<T: Op>(name: impl Into<String>, factory: Factory) -> Self {
        Self {
            name: name.into(),
            priority: priority::NORMAL,
            params: Vec::new(),
            services: Vec::new(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            factory,
        }
    }

    pub fn priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn input(self, name: &'static str, ty: crate::TypeDesc) -> Self {
        self.param(ParamSpec::input(name, ty))
    }

    pub fn optional(self, name: &'static str, ty: crate::TypeDesc) -> Self {
        self.param(ParamSpec::optional(name, ty))
    }

    pub fn output(self, name: &'static str, ty: crate::TypeDesc) -> Self {
        self.param(ParamSpec::output(name, ty))
    }

    pub fn both(self, name: &'static str, ty: crate::TypeDesc) -> Self {
        self.param(ParamSpec::both(name, ty))
    }

    pub fn requires(mut self, service: Service) -> Self {
        if !self.services.contains(&service) {
            self.services.push(service);
        }
        self
    }

    pub fn build(self) -> OpDescriptor {
        OpDescriptor {
            name: self.name,
            priority: self.priority,
            params: self.params,
            services: self.services,
            type_id: self.type_id,
            type_name: self.type_name,
            factory: self.factory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TypeDesc, Value};

    #[derive(Default)]
    struct Scale {
        factor: f64,
        out: f64,
    }

    impl Op for Scale {
        fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
            match (name, value.as_float()) {
                ("factor", Some(f)) => self.factor = f,
                _ => return Err(Error::unknown_param("scale", name)),
            }
            Ok(())
        }

        fn run(&mut self) -> Result<()> {
            self.out = self.factor * 2.0;
            Ok(())
        }

        fn output(&self, name: &str) -> Option<Value> {
            (name == "out").then_some(Value::Float(self.out))
        }
    }

    #[test]
    fn test_inputs_and_outputs_follow_declaration_order() {
        let desc = OpDescriptor::builder::<Scale>("scale")
            .both("image", TypeDesc::any())
            .input("factor", TypeDesc::float())
            .output("out", TypeDesc::float())
            .optional("note", TypeDesc::string())
            .build();

        let inputs: Vec<_> = desc.inputs().map(|p| p.name).collect();
        let outputs: Vec<_> = desc.outputs().map(|p| p.name).collect();
        assert_eq!(inputs, vec!["image", "factor", "note"]);
        assert_eq!(outputs, vec!["image", "out"]);
        assert_eq!(desc.priority(), priority::NORMAL);
    }

    #[test]
    fn test_identity_and_factory() {
        let desc = OpDescriptor::builder::<Scale>("scale")
            .priority(priority::HIGH)
            .requires(Service::Threads)
            .requires(Service::Threads)
            .build();
        assert_eq!(desc.type_id(), TypeId::of::<Scale>());
        assert_eq!(desc.short_type_name(), "Scale");
        assert_eq!(desc.services(), &[Service::Threads]);

        let op = desc.instantiate().unwrap();
        assert!(op.is::<Scale>());
    }

    #[test]
    fn test_custom_factory_failure() {
        let desc = OpDescriptor::builder_with::<Scale, _>("scale", || {
            Err(Error::InvalidParameter("no factor source".into()))
        })
        .build();
        assert!(desc.instantiate().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(priority::FIRST > priority::VERY_HIGH);
        assert!(priority::HIGH > priority::NORMAL);
        assert!(priority::LOW > priority::LAST);
        let p: Priority = OrderedFloat(10.0);
        assert!(p > priority::NORMAL);
    }
}
