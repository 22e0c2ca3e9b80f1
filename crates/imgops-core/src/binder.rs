//! Assignment of positional arguments into an op's input slots

use std::sync::Arc;

use tracing::trace;

use crate::convert::Converter;
use crate::module::BoundInvocation;
use crate::{Error, Result, Value};

/// Convert and assign `args` to the declared inputs of `invocation`
///
/// Arguments are matched to inputs by position. An absent (`Null`) argument
/// for an optional input is marked resolved without touching the slot.
/// Missing trailing arguments are allowed for optional inputs only. Any
/// conversion or assignment failure is a hard [`Error::Binding`].
pub fn assign_inputs(
    invocation: &mut BoundInvocation,
    args: &[Value],
    converter: &dyn Converter,
) -> Result<()> {
    let descriptor = Arc::clone(invocation.descriptor());
    let op_name = descriptor.name();
    let input_count = descriptor.inputs().count();

    if args.len() > input_count {
        return Err(Error::Binding {
            op: op_name.to_string(),
            param: format!("#{}", input_count),
            reason: format!("expected at most {input_count} arguments, got {}", args.len()),
        });
    }

    for (index, param) in descriptor.inputs().enumerate() {
        let binding_error = |reason: String| Error::Binding {
            op: op_name.to_string(),
            param: param.name.to_string(),
            reason,
        };

        match args.get(index) {
            None if param.required => {
                return Err(binding_error("missing required argument".into()));
            }
            None => continue,
            Some(Value::Null) if param.required => {
                return Err(binding_error("null for required parameter".into()));
            }
            Some(Value::Null) => {}
            Some(arg) => {
                let value = converter
                    .convert(arg, &param.ty)
                    .map_err(|e| binding_error(e.to_string()))?;
                invocation
                    .op_mut()
                    .set_input(param.name, value)
                    .map_err(|e| binding_error(e.to_string()))?;
            }
        }
        trace!(op = op_name, param = param.name, "input resolved");
        invocation.mark_resolved(index);
    }
    Ok(())
}
