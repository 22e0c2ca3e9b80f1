//! Structural type descriptors
//!
//! A [`TypeDesc`] is a kind plus ordered type arguments, so a parameter can
//! declare `ArrayImg<uint8>` or `Img<T: RealSample>` and have the generic
//! shape checked at runtime.
//!
//! # Assignability
//!
//! - `Any` accepts every type; a type variable accepts whatever its bound accepts.
//! - Kinds are related by a fixed parent chain (see [`Kind::parent`]).
//! - A declared type without arguments accepts any arguments.
//! - Declared arguments that are `Any` or variables are checked against their
//!   bound; concrete declared arguments must match exactly.

use std::fmt;

/// Nominal part of a type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Any,
    /// Type variable; its bound is the single type argument
    Var(&'static str),
    Bool,
    Number,
    Byte,
    Int,
    Float,
    Str,
    Array,
    List,
    ComplexSample,
    RealSample,
    UInt8Sample,
    Float32Sample,
    Float64Sample,
    ComplexFloat32Sample,
    ComplexFloat64Sample,
    Img,
    ArrayImg,
}

impl Kind {
    /// Direct supertype of this kind
    pub fn parent(self) -> Option<Kind> {
        match self {
            Kind::Byte | Kind::Int | Kind::Float => Some(Kind::Number),
            Kind::UInt8Sample | Kind::Float32Sample | Kind::Float64Sample => Some(Kind::RealSample),
            Kind::RealSample | Kind::ComplexFloat32Sample | Kind::ComplexFloat64Sample => {
                Some(Kind::ComplexSample)
            }
            Kind::ArrayImg => Some(Kind::Img),
            _ => None,
        }
    }

    /// Whether `self` equals `other` or has it as an ancestor
    pub fn is_a(self, other: Kind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Any => "Any",
            Kind::Var(name) => name,
            Kind::Bool => "Bool",
            Kind::Number => "Number",
            Kind::Byte => "Byte",
            Kind::Int => "Int",
            Kind::Float => "Float",
            Kind::Str => "Str",
            Kind::Array => "Array",
            Kind::List => "List",
            Kind::ComplexSample => "ComplexSample",
            Kind::RealSample => "RealSample",
            Kind::UInt8Sample => "uint8",
            Kind::Float32Sample => "float32",
            Kind::Float64Sample => "float64",
            Kind::ComplexFloat32Sample => "complex_float32",
            Kind::ComplexFloat64Sample => "complex_float64",
            Kind::Img => "Img",
            Kind::ArrayImg => "ArrayImg",
        }
    }
}

/// Structural type: kind plus ordered type arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    kind: Kind,
    args: Vec<TypeDesc>,
}

impl TypeDesc {
    pub fn new(kind: Kind, args: Vec<TypeDesc>) -> Self {
        Self { kind, args }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn args(&self) -> &[TypeDesc] {
        &self.args
    }

    /// Bound of a type variable
    pub fn bound(&self) -> Option<&TypeDesc> {
        match self.kind {
            Kind::Var(_) => self.args.first(),
            _ => None,
        }
    }

    pub fn any() -> Self {
        Self::new(Kind::Any, Vec::new())
    }

    pub fn var(name: &'static str, bound: TypeDesc) -> Self {
        Self::new(Kind::Var(name), vec![bound])
    }

    pub fn bool() -> Self {
        Self::new(Kind::Bool, Vec::new())
    }

    pub fn number() -> Self {
        Self::new(Kind::Number, Vec::new())
    }

    pub fn byte() -> Self {
        Self::new(Kind::Byte, Vec::new())
    }

    pub fn int() -> Self {
        Self::new(Kind::Int, Vec::new())
    }

    pub fn float() -> Self {
        Self::new(Kind::Float, Vec::new())
    }

    pub fn string() -> Self {
        Self::new(Kind::Str, Vec::new())
    }

    pub fn array(element: TypeDesc) -> Self {
        Self::new(Kind::Array, vec![element])
    }

    pub fn list(element: TypeDesc) -> Self {
        Self::new(Kind::List, vec![element])
    }

    pub fn complex_sample() -> Self {
        Self::new(Kind::ComplexSample, Vec::new())
    }

    pub fn real_sample() -> Self {
        Self::new(Kind::RealSample, Vec::new())
    }

    pub fn uint8_sample() -> Self {
        Self::new(Kind::UInt8Sample, Vec::new())
    }

    pub fn float32_sample() -> Self {
        Self::new(Kind::Float32Sample, Vec::new())
    }

    pub fn float64_sample() -> Self {
        Self::new(Kind::Float64Sample, Vec::new())
    }

    pub fn complex_float32_sample() -> Self {
        Self::new(Kind::ComplexFloat32Sample, Vec::new())
    }

    pub fn complex_float64_sample() -> Self {
        Self::new(Kind::ComplexFloat64Sample, Vec::new())
    }

    pub fn img(element: TypeDesc) -> Self {
        Self::new(Kind::Img, vec![element])
    }

    pub fn array_img(element: TypeDesc) -> Self {
        Self::new(Kind::ArrayImg, vec![element])
    }

    /// Whether a value of type `actual` may be assigned to a slot of this type
    pub fn is_assignable_from(&self, actual: &TypeDesc) -> bool {
        match self.kind {
            Kind::Any => true,
            Kind::Var(_) => self
                .bound()
                .map_or(true, |bound| bound.is_assignable_from(actual)),
            declared => {
                if !actual.kind.is_a(declared) {
                    return false;
                }
                if self.args.is_empty() {
                    return true;
                }
                self.args.len() == actual.args.len()
                    && self
                        .args
                        .iter()
                        .zip(&actual.args)
                        .all(|(d, a)| d.accepts_argument(a))
            }
        }
    }

    fn accepts_argument(&self, actual: &TypeDesc) -> bool {
        match self.kind {
            Kind::Any | Kind::Var(_) => self.is_assignable_from(actual),
            _ => self == actual,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Kind::Var(name) = self.kind {
            return match self.bound() {
                Some(bound) => write!(f, "{name}: {bound}"),
                None => f.write_str(name),
            };
        }
        f.write_str(self.kind.label())?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}
