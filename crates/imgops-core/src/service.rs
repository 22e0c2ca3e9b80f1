//! The engine facade: resolve, bind and invoke ops by name or instance

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, instrument};

use crate::binder::assign_inputs;
use crate::config::OpsConfig;
use crate::convert::Converter;
use crate::descriptor::OpDescriptor;
use crate::execution::ChunkExecutor;
use crate::inject::Injector;
use crate::matcher::{construct, Matcher};
use crate::module::BoundInvocation;
use crate::op::Op;
use crate::registry::OpRegistry;
use crate::{Error, Result, Value};

struct Inner {
    registry: RwLock<Arc<OpRegistry>>,
    converter: Arc<dyn Converter>,
    injector: Arc<dyn Injector>,
    config: OpsConfig,
    executor: ChunkExecutor,
}

/// Cheap, cloneable handle to the op engine
///
/// Every resolution works against one registry snapshot. Registration
/// clones the current snapshot, extends it and swaps it in, so in-flight
/// resolutions never see a half-updated registry.
#[derive(Clone)]
pub struct OpService {
    inner: Arc<Inner>,
}

impl OpService {
    pub(crate) fn from_parts(
        registry: OpRegistry,
        converter: Arc<dyn Converter>,
        injector: Arc<dyn Injector>,
        config: OpsConfig,
        executor: ChunkExecutor,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Arc::new(registry)),
                converter,
                injector,
                config,
                executor,
            }),
        }
    }

    /// Start building a service
    pub fn builder() -> crate::builder::OpServiceBuilder<crate::builder::NeedsRegistry> {
        crate::builder::OpServiceBuilder::new()
    }

    /// Service with default collaborators over `registry`
    pub fn new(registry: OpRegistry) -> Result<Self> {
        Self::builder().with_registry(registry).build()
    }

    /// Current registry snapshot
    pub fn registry(&self) -> Arc<OpRegistry> {
        let guard = self
            .inner
            .registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Add a descriptor, replacing any previous one for the same implementation
    pub fn register(&self, descriptor: OpDescriptor) -> Option<Arc<OpDescriptor>> {
        let mut guard = self
            .inner
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = OpRegistry::clone(&guard);
        let replaced = next.register(descriptor);
        *guard = Arc::new(next);
        replaced
    }

    pub fn config(&self) -> &OpsConfig {
        &self.inner.config
    }

    pub fn chunk_executor(&self) -> &ChunkExecutor {
        &self.inner.executor
    }

    pub fn converter(&self) -> &dyn Converter {
        self.inner.converter.as_ref()
    }

    /// Find, construct and bind the first acceptable candidate for `name`
    #[instrument(skip(self, args), fields(args = args.len()))]
    pub fn resolve_strict(&self, name: &str, args: &[Value]) -> Result<BoundInvocation> {
        let registry = self.registry();
        Matcher::new(
            &registry,
            self.inner.converter.as_ref(),
            self.inner.injector.as_ref(),
            self,
        )
        .find(name, args)
    }

    /// Like [`resolve_strict`](Self::resolve_strict), with "no candidate" as `None`
    ///
    /// Construction and binding failures are still errors.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<Option<BoundInvocation>> {
        match self.resolve_strict(name, args) {
            Ok(invocation) => Ok(Some(invocation)),
            Err(Error::NoMatchingOp(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve without invoking and hand back the bound instance
    pub fn op(&self, name: &str, args: &[Value]) -> Result<Option<Box<dyn Op>>> {
        Ok(self.resolve(name, args)?.map(BoundInvocation::into_op))
    }

    /// Resolve `name` against `args` and invoke the match
    pub fn run(&self, name: &str, args: &[Value]) -> Result<Value> {
        let invocation = self.resolve_strict(name, args)?;
        self.invoke(invocation)
    }

    /// Fresh, service-populated and unbound instance of `descriptor`
    pub fn create(&self, descriptor: &Arc<OpDescriptor>) -> Result<BoundInvocation> {
        construct(descriptor, self.inner.injector.as_ref(), self)
    }

    /// Bind `args` into a candidate the caller already holds
    ///
    /// No screen and no conformance check is applied.
    pub fn bind(&self, mut invocation: BoundInvocation, args: &[Value]) -> Result<BoundInvocation> {
        assign_inputs(&mut invocation, args, self.inner.converter.as_ref())?;
        Ok(invocation)
    }

    /// Wrap a known instance: descriptor lookup by type, then injection
    pub fn bind_instance(&self, mut op: Box<dyn Op>, args: &[Value]) -> Result<BoundInvocation> {
        let descriptor = self
            .registry()
            .descriptor_of(op.as_ref())
            .cloned()
            .ok_or_else(|| Error::UnregisteredOp(op.as_ref().op_type_name().to_string()))?;
        self.inner
            .injector
            .populate(op.as_mut(), descriptor.services(), self)
            .map_err(|e| Error::Construction {
                op: descriptor.name().to_string(),
                reason: e.to_string(),
            })?;
        self.bind(BoundInvocation::unbound(descriptor, op), args)
    }

    /// Bind `args` into a known instance and invoke it
    pub fn run_op(&self, op: Box<dyn Op>, args: &[Value]) -> Result<Value> {
        let invocation = self.bind_instance(op, args)?;
        self.invoke(invocation)
    }

    /// Run a bound op and collect its declared outputs
    ///
    /// A single declared output is returned bare; any other count comes back
    /// as a [`Value::List`] in declaration order.
    pub fn invoke(&self, mut invocation: BoundInvocation) -> Result<Value> {
        let descriptor = Arc::clone(invocation.descriptor());
        invocation
            .op_mut()
            .run()
            .map_err(|source| Error::Execution {
                op: descriptor.name().to_string(),
                source: Box::new(source),
            })?;

        let op = invocation.op();
        let mut outputs: Vec<Value> = descriptor
            .outputs()
            .map(|p| op.output(p.name).unwrap_or(Value::Null))
            .collect();
        debug!(op = descriptor.name(), outputs = outputs.len(), "invoked");

        if outputs.len() == 1 {
            Ok(outputs.remove(0))
        } else {
            Ok(Value::List(outputs))
        }
    }
}

impl fmt::Debug for OpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpService")
            .field("ops", &self.registry().len())
            .field("config", &self.inner.config)
            .finish()
    }
}
