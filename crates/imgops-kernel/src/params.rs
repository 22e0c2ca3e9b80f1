//! Parameter slots shared by the kernel creation ops

use imgops_core::prelude::*;
use imgops_core::OpDescriptorBuilder;

/// `(num_dimensions, <scale>, out_type, calibration?)`
///
/// `scale` is the sigma of a Gaussian or the blob radius of a LoG kernel.
#[derive(Debug, Clone, Default)]
pub struct KernelParams {
    pub num_dimensions: usize,
    pub scale: f64,
    pub out_type: Option<SampleType>,
    pub calibration: Option<Vec<f64>>,
}

impl KernelParams {
    /// Assign one input; `scale_name` is the op's name for the scale slot
    pub fn set(&mut self, op: &str, scale_name: &str, name: &str, value: Value) -> Result<()> {
        match name {
            "num_dimensions" => {
                let n = value
                    .as_int()
                    .ok_or_else(|| Error::wrong_value(name, "int", &value))?;
                self.num_dimensions = usize::try_from(n)
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| {
                        Error::InvalidParameter(format!("num_dimensions must be positive, got {n}"))
                    })?;
            }
            "out_type" => {
                self.out_type = Some(
                    value
                        .as_sample()
                        .ok_or_else(|| Error::wrong_value(name, "sample type", &value))?,
                )
            }
            "calibration" => {
                let cal = value
                    .as_floats()
                    .ok_or_else(|| Error::wrong_value(name, "float array", &value))?;
                if cal.iter().any(|&c| !(c > 0.0)) {
                    return Err(Error::InvalidParameter(format!(
                        "calibration must be positive, got {cal:?}"
                    )));
                }
                self.calibration = Some(cal.to_vec());
            }
            n if n == scale_name => {
                let scale = value
                    .as_float()
                    .ok_or_else(|| Error::wrong_value(name, "float", &value))?;
                if !(scale > 0.0) {
                    return Err(Error::InvalidParameter(format!(
                        "{scale_name} must be positive, got {scale}"
                    )));
                }
                self.scale = scale;
            }
            _ => return Err(Error::unknown_param(op, name)),
        }
        Ok(())
    }

    /// Per-axis calibration, all ones when absent
    pub fn calibration(&self) -> Result<Vec<f64>> {
        match &self.calibration {
            None => Ok(vec![1.0; self.num_dimensions]),
            Some(cal) if cal.len() == self.num_dimensions => Ok(cal.clone()),
            Some(cal) => Err(Error::size_mismatch(
                self.num_dimensions,
                cal.len(),
                "kernel calibration",
            )),
        }
    }

    pub fn out_type(&self, op: &str) -> Result<SampleType> {
        self.out_type.ok_or_else(|| Error::missing_input(op, "out_type"))
    }

    /// Whether the requested output type is a floating point sample type
    pub fn wants_floating(&self) -> bool {
        self.out_type.map_or(false, |t| t.is_floating())
    }
}

/// Element count of a kernel with per-axis `sizes`
///
/// Fails when an axis size is missing or the product overflows.
pub fn checked_len(op: &str, scale: f64, sizes: &[Option<usize>]) -> Result<usize> {
    sizes
        .iter()
        .try_fold(1usize, |acc, &size| acc.checked_mul(size?))
        .ok_or_else(|| {
            Error::InvalidParameter(format!("{op} kernel for scale {scale} is too large"))
        })
}

/// Parameters of a kernel creation op, in declaration order
pub fn declare(builder: OpDescriptorBuilder, scale_name: &'static str) -> OpDescriptorBuilder {
    builder
        .input("num_dimensions", TypeDesc::int())
        .input(scale_name, TypeDesc::float())
        .input("out_type", TypeDesc::var("T", TypeDesc::complex_sample()))
        .optional("calibration", TypeDesc::array(TypeDesc::float()))
        .output("output", TypeDesc::img(TypeDesc::var("T", TypeDesc::complex_sample())))
}
