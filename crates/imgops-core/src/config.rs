//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::execution::ExecutionStrategy;
use crate::{Error, Result};

/// Default element count at which `Auto` switches to parallel chunks
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;

/// Configuration applied by [`crate::OpServiceBuilder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    /// How chunked op work is executed
    pub execution: ExecutionStrategy,
    /// Dedicated worker count; `None` uses rayon's global pool
    pub num_threads: Option<usize>,
    /// Minimum number of elements for `Auto` to go parallel
    pub parallel_threshold: usize,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionStrategy::Auto,
            num_threads: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl OpsConfig {
    /// Sequential execution everywhere
    pub fn sequential() -> Self {
        Self {
            execution: ExecutionStrategy::Sequential,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_threads == Some(0) {
            return Err(Error::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OpsConfig::default();
        assert_eq!(config.execution, ExecutionStrategy::Auto);
        assert_eq!(config.num_threads, None);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "execution": "parallel", "num_threads": 2 }"#;
        let config = OpsConfig::from_json(json).unwrap();
        assert_eq!(config.execution, ExecutionStrategy::Parallel);
        assert_eq!(config.num_threads, Some(2));
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = OpsConfig {
            execution: ExecutionStrategy::Sequential,
            num_threads: Some(3),
            parallel_threshold: 10,
        };
        let json = config.to_json().unwrap();
        assert_eq!(OpsConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_threads() {
        assert!(matches!(
            OpsConfig::from_json(r#"{ "num_threads": 0 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(OpsConfig::from_json("{ not json"), Err(Error::Json(_))));
    }
}
