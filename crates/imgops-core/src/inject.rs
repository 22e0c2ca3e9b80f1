//! Service injection into freshly constructed ops

use crate::op::{Op, Service, ServiceHandle};
use crate::service::OpService;
use crate::Result;

/// Fills an op's declared services from the engine context
pub trait Injector: Send + Sync {
    /// Provide every service in `services` to `op`
    fn populate(&self, op: &mut dyn Op, services: &[Service], ops: &OpService) -> Result<()>;
}

/// Provides the engine handle and its chunk executor
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceInjector;

impl Injector for ServiceInjector {
    fn populate(&self, op: &mut dyn Op, services: &[Service], ops: &OpService) -> Result<()> {
        for service in services {
            let handle = match service {
                Service::Ops => ServiceHandle::Ops(ops.clone()),
                Service::Threads => ServiceHandle::Threads(ops.chunk_executor().clone()),
            };
            op.provide(handle)?;
        }
        Ok(())
    }
}
