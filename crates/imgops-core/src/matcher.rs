//! Candidate matching: screen, construct, bind, conformance
//!
//! Candidates for a name are walked in priority order. The first one that
//! passes the arity/type screen, constructs, binds and conforms wins.
//! Screen and conformance rejections fall through to the next candidate;
//! construction and binding failures abort the whole resolution.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::binder::assign_inputs;
use crate::convert::Converter;
use crate::descriptor::OpDescriptor;
use crate::inject::Injector;
use crate::module::BoundInvocation;
use crate::registry::OpRegistry;
use crate::service::OpService;
use crate::{Error, Result, Value};

/// Why a candidate was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooFewArguments,
    TooManyArguments,
    NullForRequired(&'static str),
    IncompatibleType(&'static str),
    ConformanceVeto,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooFewArguments => write!(f, "too few arguments"),
            Rejection::TooManyArguments => write!(f, "too many arguments"),
            Rejection::NullForRequired(p) => write!(f, "null for required param '{p}'"),
            Rejection::IncompatibleType(p) => write!(f, "incompatible type for '{p}'"),
            Rejection::ConformanceVeto => write!(f, "conformance veto"),
        }
    }
}

/// Arity and type screen; never instantiates anything
pub fn screen(
    descriptor: &OpDescriptor,
    args: &[Value],
    converter: &dyn Converter,
) -> std::result::Result<(), Rejection> {
    let mut consumed = 0;
    for param in descriptor.inputs() {
        let arg = args.get(consumed).ok_or(Rejection::TooFewArguments)?;
        consumed += 1;
        if arg.is_null() {
            if param.required {
                return Err(Rejection::NullForRequired(param.name));
            }
        } else if !converter.can_convert(arg, &param.ty) {
            return Err(Rejection::IncompatibleType(param.name));
        }
    }
    if consumed < args.len() {
        return Err(Rejection::TooManyArguments);
    }
    Ok(())
}

/// Build a fresh instance of `descriptor` with its services injected
pub fn construct(
    descriptor: &Arc<OpDescriptor>,
    injector: &dyn Injector,
    ops: &OpService,
) -> Result<BoundInvocation> {
    let construction_error = |e: Error| Error::Construction {
        op: descriptor.name().to_string(),
        reason: e.to_string(),
    };
    let mut op = descriptor.instantiate().map_err(construction_error)?;
    injector
        .populate(op.as_mut(), descriptor.services(), ops)
        .map_err(construction_error)?;
    Ok(BoundInvocation::unbound(Arc::clone(descriptor), op))
}

/// Walks the candidates of one registry snapshot
pub struct Matcher<'a> {
    registry: &'a OpRegistry,
    converter: &'a dyn Converter,
    injector: &'a dyn Injector,
    ops: &'a OpService,
}

impl<'a> Matcher<'a> {
    pub fn new(
        registry: &'a OpRegistry,
        converter: &'a dyn Converter,
        injector: &'a dyn Injector,
        ops: &'a OpService,
    ) -> Self {
        Self {
            registry,
            converter,
            injector,
            ops,
        }
    }

    /// First acceptable candidate for `name`, or [`Error::NoMatchingOp`]
    pub fn find(&self, name: &str, args: &[Value]) -> Result<BoundInvocation> {
        let candidates = self.registry.candidates_named(name);
        if candidates.is_empty() {
            debug!(op = name, "no ops registered under name");
        }

        for descriptor in candidates {
            if let Err(reason) = screen(descriptor, args, self.converter) {
                trace!(op = name, candidate = descriptor.short_type_name(), %reason, "rejected");
                continue;
            }

            let mut invocation = construct(descriptor, self.injector, self.ops)?;
            assign_inputs(&mut invocation, args, self.converter)?;

            if !invocation.conforms() {
                trace!(
                    op = name,
                    candidate = descriptor.short_type_name(),
                    reason = %Rejection::ConformanceVeto,
                    "rejected"
                );
                continue;
            }

            debug!(
                op = name,
                implementation = descriptor.type_name(),
                priority = descriptor.priority().0,
                "matched"
            );
            return Ok(invocation);
        }

        Err(Error::NoMatchingOp(describe_request(name, args)))
    }
}

/// `name(arg types)` for error messages
fn describe_request(name: &str, args: &[Value]) -> String {
    let types: Vec<String> = args.iter().map(Value::describe).collect();
    format!("{}({})", name, types.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DefaultConverter;
    use crate::{Op, TypeDesc};

    #[derive(Default)]
    struct Pair;

    impl Op for Pair {
        fn set_input(&mut self, _name: &str, _value: Value) -> Result<()> {
            Ok(())
        }

        fn run(&mut self) -> Result<()> {
            Ok(())
        }

        fn output(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    fn pair_descriptor() -> OpDescriptor {
        OpDescriptor::builder::<Pair>("pair")
            .input("a", TypeDesc::int())
            .optional("b", TypeDesc::float())
            .output("out", TypeDesc::float())
            .build()
    }

    #[test]
    fn test_screen_arity() {
        let desc = pair_descriptor();
        let conv = DefaultConverter;
        assert_eq!(screen(&desc, &[Value::Int(1)], &conv), Err(Rejection::TooFewArguments));
        assert_eq!(
            screen(&desc, &[Value::Int(1), Value::Float(2.0), Value::Int(3)], &conv),
            Err(Rejection::TooManyArguments)
        );
        assert_eq!(screen(&desc, &[Value::Int(1), Value::Float(2.0)], &conv), Ok(()));
    }

    #[test]
    fn test_screen_null_rules() {
        let desc = pair_descriptor();
        let conv = DefaultConverter;
        assert_eq!(screen(&desc, &[Value::Int(1), Value::Null], &conv), Ok(()));
        assert_eq!(
            screen(&desc, &[Value::Null, Value::Null], &conv),
            Err(Rejection::NullForRequired("a"))
        );
    }

    #[test]
    fn test_screen_types_with_widening() {
        let desc = pair_descriptor();
        let conv = DefaultConverter;
        assert_eq!(screen(&desc, &[Value::Byte(1), Value::Int(2)], &conv), Ok(()));
        assert_eq!(
            screen(&desc, &[Value::Float(1.0), Value::Int(2)], &conv),
            Err(Rejection::IncompatibleType("a"))
        );
    }

    #[test]
    fn test_request_description() {
        let text = describe_request("add", &[Value::Int(1), Value::Null]);
        assert!(text.starts_with("add("));
        assert!(text.contains(", "));
    }
}
