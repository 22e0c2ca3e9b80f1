//! Error types for op resolution and execution
//!
//! Provides a unified error type for all imgops crates.

use thiserror::Error;

/// Core error type for op resolution, binding and execution
#[derive(Error, Debug)]
pub enum Error {
    /// No registered candidate survived arity, type and conformance screening
    #[error("No matching op: {0}")]
    NoMatchingOp(String),

    /// An op instance was passed in whose implementation is not registered
    #[error("Unregistered op: {0}")]
    UnregisteredOp(String),

    /// A value accepted by the screen failed actual conversion or assignment
    #[error("Binding error in {op}.{param}: {reason}")]
    Binding {
        op: String,
        param: String,
        reason: String,
    },

    /// Instantiation or service injection failed for a matching candidate
    #[error("Construction error for {op}: {reason}")]
    Construction { op: String, reason: String },

    /// The invoked op itself failed
    #[error("Execution of {op} failed: {source}")]
    Execution {
        op: String,
        #[source]
        source: Box<Error>,
    },

    /// A chunked computation was cancelled by a failing worker
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Invalid parameter provided to an op
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for an input slot the op does not declare
    pub fn unknown_param(op: &str, param: &str) -> Self {
        Self::InvalidParameter(format!("{op} has no parameter named '{param}'"))
    }

    /// Create an error for an input that was expected but never bound
    pub fn missing_input(op: &str, param: &str) -> Self {
        Self::InvalidInput(format!("{op} requires input '{param}'"))
    }

    /// Create an error for a value of the wrong shape reaching an op
    pub fn wrong_value(param: &str, expected: &str, actual: &crate::Value) -> Self {
        Self::InvalidInput(format!(
            "'{param}' expected {expected}, got {}",
            actual.describe()
        ))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for empty input
    pub fn empty_input(context: &str) -> Self {
        Self::InvalidInput(format!("{context} requires at least one element"))
    }

    /// Whether this error (or the op failure it wraps) is a resolution miss
    pub fn is_no_match(&self) -> bool {
        match self {
            Self::NoMatchingOp(_) => true,
            Self::Execution { source, .. } => source.is_no_match(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoMatchingOp("add".to_string());
        assert_eq!(err.to_string(), "No matching op: add");

        let err = Error::Binding {
            op: "add".to_string(),
            param: "b".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Binding error in add.b: not a number");

        let err = Error::Construction {
            op: "gauss".to_string(),
            reason: "service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Construction error for gauss: service unavailable");

        let err = Error::Cancelled("worker 3 failed".to_string());
        assert_eq!(err.to_string(), "Cancelled: worker 3 failed");
    }

    #[test]
    fn test_execution_wraps_source() {
        let err = Error::Execution {
            op: "stats.mean".to_string(),
            source: Box::new(Error::empty_input("stats.sum")),
        };
        assert!(err.to_string().contains("stats.mean"));
        assert!(err.to_string().contains("at least one element"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_is_no_match() {
        assert!(Error::NoMatchingOp("x".into()).is_no_match());
        let nested = Error::Execution {
            op: "outer".into(),
            source: Box::new(Error::NoMatchingOp("inner".into())),
        };
        assert!(nested.is_no_match());
        assert!(!Error::Cancelled("x".into()).is_no_match());
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::size_mismatch(4, 3, "calibration");
        assert_eq!(
            err.to_string(),
            "Invalid input: Size mismatch in calibration: expected 4, got 3"
        );

        let err = Error::unknown_param("add", "c");
        assert_eq!(err.to_string(), "Invalid parameter: add has no parameter named 'c'");
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: Error = anyhow::anyhow!("custom error message").into();
        match err {
            Error::Other(_) => assert!(err.to_string().contains("custom error message")),
            _ => panic!("Wrong error type"),
        }
    }
}
