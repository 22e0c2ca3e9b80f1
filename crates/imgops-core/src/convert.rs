//! Value conversion against declared parameter types
//!
//! `can_convert` must be conservative: it may only return `true` when
//! `convert` is guaranteed to succeed for the same value and type.

use crate::types::{Kind, TypeDesc};
use crate::{Error, Result, Value};

/// Converts runtime values into the declared type of a parameter
pub trait Converter: Send + Sync {
    /// Whether `value` can be converted to `target`
    fn can_convert(&self, value: &Value, target: &TypeDesc) -> bool;

    /// Convert `value` to `target`
    fn convert(&self, value: &Value, target: &TypeDesc) -> Result<Value>;
}

/// Structural assignability plus lossless numeric widening
///
/// Widening conversions: `Byte → Int`, `Byte → Float`, `Int → Float` and
/// `Array<Int> → Array<Float>`. Nothing narrows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl DefaultConverter {
    pub fn new() -> Self {
        Self
    }

    fn widen(value: &Value, target: &TypeDesc) -> Option<Value> {
        let kind = match target.kind() {
            Kind::Var(_) => return target.bound().and_then(|b| Self::widen(value, b)),
            kind => kind,
        };
        match (value, kind) {
            (Value::Byte(b), Kind::Int) => Some(Value::Int(i64::from(*b))),
            (Value::Byte(b), Kind::Float) => Some(Value::Float(f64::from(*b))),
            (Value::Int(i), Kind::Float) => Some(Value::Float(*i as f64)),
            (Value::Ints(v), Kind::Array)
                if target
                    .args()
                    .first()
                    .map_or(false, |e| e.kind() == Kind::Float) =>
            {
                Some(Value::Floats(v.iter().map(|&i| i as f64).collect()))
            }
            _ => None,
        }
    }
}

impl Converter for DefaultConverter {
    fn can_convert(&self, value: &Value, target: &TypeDesc) -> bool {
        match value.type_desc() {
            None => true,
            Some(actual) => {
                target.is_assignable_from(&actual) || Self::widen(value, target).is_some()
            }
        }
    }

    fn convert(&self, value: &Value, target: &TypeDesc) -> Result<Value> {
        let Some(actual) = value.type_desc() else {
            return Ok(Value::Null);
        };
        if target.is_assignable_from(&actual) {
            return Ok(value.clone());
        }
        Self::widen(value, target).ok_or_else(|| {
            Error::InvalidInput(format!("cannot convert {actual} to {target}"))
        })
    }
}
