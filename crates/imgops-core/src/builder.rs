//! Type-state builder for [`OpService`]
//!
//! A service needs a registry before it can be built; converter, injector
//! and configuration fall back to defaults.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::OpsConfig;
use crate::convert::{Converter, DefaultConverter};
use crate::execution::ChunkExecutor;
use crate::inject::{Injector, ServiceInjector};
use crate::registry::OpRegistry;
use crate::service::OpService;
use crate::Result;

/// Type-state markers for builder pattern
pub mod state {
    /// Marker for builder that needs a registry
    pub struct NeedsRegistry;

    /// Marker for builder that is ready to build
    pub struct Ready;
}

pub use state::{NeedsRegistry, Ready};

/// Builder state trait
pub trait BuilderState {}

impl BuilderState for NeedsRegistry {}
impl BuilderState for Ready {}

pub struct OpServiceBuilder<State: BuilderState> {
    registry: Option<OpRegistry>,
    converter: Arc<dyn Converter>,
    injector: Arc<dyn Injector>,
    config: OpsConfig,
    _state: PhantomData<State>,
}

impl OpServiceBuilder<NeedsRegistry> {
    pub fn new() -> Self {
        Self {
            registry: None,
            converter: Arc::new(DefaultConverter),
            injector: Arc::new(ServiceInjector),
            config: OpsConfig::default(),
            _state: PhantomData,
        }
    }

    /// Set the initial registry snapshot
    pub fn with_registry(self, registry: OpRegistry) -> OpServiceBuilder<Ready> {
        OpServiceBuilder {
            registry: Some(registry),
            converter: self.converter,
            injector: self.injector,
            config: self.config,
            _state: PhantomData,
        }
    }
}

impl Default for OpServiceBuilder<NeedsRegistry> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State: BuilderState> OpServiceBuilder<State> {
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    pub fn with_injector(mut self, injector: impl Injector + 'static) -> Self {
        self.injector = Arc::new(injector);
        self
    }

    pub fn with_config(mut self, config: OpsConfig) -> Self {
        self.config = config;
        self
    }
}

impl OpServiceBuilder<Ready> {
    /// Validate the configuration, create the chunk executor and build
    pub fn build(self) -> Result<OpService> {
        let executor = ChunkExecutor::from_config(&self.config)?;
        Ok(OpService::from_parts(
            self.registry.unwrap_or_default(),
            self.converter,
            self.injector,
            self.config,
            executor,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStrategy;
    use crate::Error;

    #[test]
    fn test_builder_type_safety() {
        // This should not compile:
        // let bad = OpServiceBuilder::new().build();
        let ops = OpServiceBuilder::new()
            .with_config(OpsConfig::sequential())
            .with_registry(OpRegistry::new())
            .build()
            .unwrap();
        assert_eq!(ops.chunk_executor().strategy(), ExecutionStrategy::Sequential);
        assert_eq!(ops.chunk_executor().num_threads(), 1);
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let config = OpsConfig {
            num_threads: Some(0),
            ..OpsConfig::default()
        };
        let err = OpService::builder()
            .with_registry(OpRegistry::new())
            .with_config(config)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
