//! Registry of op descriptors
//!
//! Candidates under one name are kept sorted by descending priority; ties
//! keep registration order, which makes resolution deterministic. The engine
//! never mutates a registry it is resolving against: [`crate::OpService`]
//! holds an `Arc<OpRegistry>` snapshot and swaps in an extended copy on
//! registration.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::OpDescriptor;
use crate::op::Op;

#[derive(Clone, Default, Debug)]
pub struct OpRegistry {
    by_name: HashMap<String, Vec<Arc<OpDescriptor>>>,
    by_type: HashMap<TypeId, Arc<OpDescriptor>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    ///
    /// Registering an implementation type that is already present replaces the
    /// previous descriptor, which is returned.
    pub fn register(&mut self, descriptor: OpDescriptor) -> Option<Arc<OpDescriptor>> {
        let descriptor = Arc::new(descriptor);
        let replaced = self.by_type.insert(descriptor.type_id(), Arc::clone(&descriptor));

        if let Some(old) = &replaced {
            debug!(
                op = old.name(),
                implementation = old.type_name(),
                "replacing registered op"
            );
            if let Some(list) = self.by_name.get_mut(old.name()) {
                list.retain(|d| d.type_id() != old.type_id());
                if list.is_empty() {
                    self.by_name.remove(old.name());
                }
            }
        }

        let list = self.by_name.entry(descriptor.name().to_string()).or_default();
        list.push(descriptor);
        // stable: equal priorities keep registration order
        list.sort_by(|a, b| b.priority().cmp(&a.priority()));

        replaced
    }

    /// Builder-style registration
    pub fn with(mut self, descriptor: OpDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Candidates for `name`, highest priority first
    pub fn candidates_named(&self, name: &str) -> &[Arc<OpDescriptor>] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Descriptor registered for an implementation type
    pub fn descriptor_for(&self, type_id: TypeId) -> Option<&Arc<OpDescriptor>> {
        self.by_type.get(&type_id)
    }

    /// Descriptor registered for the concrete type of `op`
    pub fn descriptor_of(&self, op: &dyn Op) -> Option<&Arc<OpDescriptor>> {
        self.descriptor_for(op.as_any().type_id())
    }

    /// Registered op names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl Extend<OpDescriptor> for OpRegistry {
    fn extend<I: IntoIterator<Item = OpDescriptor>>(&mut self, iter: I) {
        for descriptor in iter {
            self.register(descriptor);
        }
    }
}

impl FromIterator<OpDescriptor> for OpRegistry {
    fn from_iter<I: IntoIterator<Item = OpDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::priority;
    use crate::{Result, Value};

    macro_rules! unit_op {
        ($name:ident) => {
            #[derive(Default)]
            struct $name;

            impl Op for $name {
                fn set_input(&mut self, _: &str, _: Value) -> Result<()> {
                    Ok(())
                }
                fn run(&mut self) -> Result<()> {
                    Ok(())
                }
                fn output(&self, _: &str) -> Option<Value> {
                    None
                }
            }
        };
    }

    unit_op!(A);
    unit_op!(B);
    unit_op!(C);

    fn order(registry: &OpRegistry, name: &str) -> Vec<&'static str> {
        registry
            .candidates_named(name)
            .iter()
            .map(|d| d.short_type_name())
            .collect()
    }

    #[test]
    fn test_priority_then_registration_order() {
        let registry: OpRegistry = [
            OpDescriptor::builder::<A>("x").build(),
            OpDescriptor::builder::<B>("x").priority(priority::HIGH).build(),
            OpDescriptor::builder::<C>("x").build(),
        ]
        .into_iter()
        .collect();

        assert_eq!(order(&registry, "x"), vec!["B", "A", "C"]);
        assert!(registry.candidates_named("missing").is_empty());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = OpRegistry::new()
            .with(OpDescriptor::builder::<A>("x").priority(priority::HIGH).build())
            .with(OpDescriptor::builder::<B>("x").build());

        let replaced = registry.register(OpDescriptor::builder::<A>("y").build());
        assert!(replaced.is_some());
        assert_eq!(order(&registry, "x"), vec!["B"]);
        assert_eq!(order(&registry, "y"), vec!["A"]);
        assert_eq!(registry.names(), vec!["x", "y"]);
        assert_eq!(registry.descriptor_for(TypeId::of::<A>()).unwrap().name(), "y");
    }

    #[test]
    fn test_descriptor_of_instance() {
        let registry = OpRegistry::new().with(OpDescriptor::builder::<C>("c").build());
        let op: Box<dyn Op> = Box::new(C);
        assert_eq!(registry.descriptor_of(op.as_ref()).unwrap().name(), "c");
        assert!(registry.descriptor_of(&A).is_none());
    }
}
