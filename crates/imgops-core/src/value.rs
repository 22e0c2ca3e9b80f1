//! Dynamic argument and result values
//!
//! Ops receive their inputs and report their outputs as [`Value`]s. The
//! runtime type of a value is a structural [`TypeDesc`], which is what the
//! matcher screens against each candidate's declared parameter types.

use crate::image::{ArrayImg, ImgHandle, SampleType};
use crate::types::TypeDesc;

/// Dynamic value passed to and returned from ops
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent argument or unset output
    Null,
    Bool(bool),
    Byte(u8),
    Int(i64),
    Float(f64),
    Str(String),
    Floats(Vec<f64>),
    Ints(Vec<i64>),
    /// Pixel type token, e.g. the requested output type of a kernel
    Sample(SampleType),
    Img(ImgHandle),
    /// Ordered results of a multi-output op
    List(Vec<Value>),
}

impl Value {
    /// Runtime type, `None` for [`Value::Null`]
    pub fn type_desc(&self) -> Option<TypeDesc> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => TypeDesc::bool(),
            Value::Byte(_) => TypeDesc::byte(),
            Value::Int(_) => TypeDesc::int(),
            Value::Float(_) => TypeDesc::float(),
            Value::Str(_) => TypeDesc::string(),
            Value::Floats(_) => TypeDesc::array(TypeDesc::float()),
            Value::Ints(_) => TypeDesc::array(TypeDesc::int()),
            Value::Sample(sample) => sample.type_desc(),
            Value::Img(img) => img.type_desc(),
            Value::List(_) => TypeDesc::list(TypeDesc::any()),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self.type_desc() {
            Some(t) => t.to_string(),
            None => "null".to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Value::Byte(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Byte(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Byte(b) => Some(f64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Value::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Value::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sample(&self) -> Option<SampleType> {
        match self {
            Value::Sample(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_img(&self) -> Option<&ImgHandle> {
        match self {
            Value::Img(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Byte(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Floats(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Ints(v)
    }
}

impl From<SampleType> for Value {
    fn from(v: SampleType) -> Self {
        Value::Sample(v)
    }
}

impl From<ImgHandle> for Value {
    fn from(v: ImgHandle) -> Self {
        Value::Img(v)
    }
}

impl From<ArrayImg> for Value {
    fn from(v: ArrayImg) -> Self {
        Value::Img(v.into_handle())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a positional argument vector
///
/// ```rust
/// use imgops_core::{args, Value};
///
/// let a = args![5, 7.5, "label"];
/// assert_eq!(a, vec![Value::Int(5), Value::Float(7.5), Value::Str("label".into())]);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::Value::from($arg)),+]
    };
}
