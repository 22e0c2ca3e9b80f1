//! Bound invocations: an op instance with its inputs assigned

use std::fmt;
use std::sync::Arc;

use crate::descriptor::OpDescriptor;
use crate::op::Op;

/// A constructed op plus the resolution state of each declared input
pub struct BoundInvocation {
    descriptor: Arc<OpDescriptor>,
    op: Box<dyn Op>,
    resolved: Vec<bool>,
}

impl BoundInvocation {
    /// Wrap an instance with no inputs resolved yet
    pub fn unbound(descriptor: Arc<OpDescriptor>, op: Box<dyn Op>) -> Self {
        let inputs = descriptor.inputs().count();
        Self {
            descriptor,
            op,
            resolved: vec![false; inputs],
        }
    }

    pub fn descriptor(&self) -> &Arc<OpDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn op(&self) -> &dyn Op {
        self.op.as_ref()
    }

    pub fn op_mut(&mut self) -> &mut dyn Op {
        self.op.as_mut()
    }

    /// Give up the binding state and keep the instance
    pub fn into_op(self) -> Box<dyn Op> {
        self.op
    }

    /// Whether the named input has been assigned (or accepted as absent)
    pub fn is_resolved(&self, name: &str) -> bool {
        self.descriptor
            .inputs()
            .position(|p| p.name == name)
            .map_or(false, |i| self.resolved[i])
    }

    /// Names of resolved inputs in declaration order
    pub fn resolved_inputs(&self) -> Vec<&'static str> {
        self.descriptor
            .inputs()
            .zip(&self.resolved)
            .filter(|(_, &r)| r)
            .map(|(p, _)| p.name)
            .collect()
    }

    pub(crate) fn mark_resolved(&mut self, index: usize) {
        self.resolved[index] = true;
    }

    /// Run the op's conformance check; ops without one always conform
    pub fn conforms(&self) -> bool {
        self.op.as_contingent().map_or(true, |c| c.conforms())
    }
}

impl fmt::Debug for BoundInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundInvocation")
            .field("name", &self.descriptor.name())
            .field("implementation", &self.descriptor.type_name())
            .field("resolved", &self.resolved_inputs())
            .finish()
    }
}
