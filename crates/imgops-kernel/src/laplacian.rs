//! Laplacian-of-Gaussian blob kernels (`log`)

use std::f64::consts::PI;

use imgops_core::prelude::*;
use tracing::debug;

use crate::params::{checked_len, declare, KernelParams};

pub const NAME: &str = "log";

/// Half size: three standard deviations, at least 2
pub fn half_size(sigma_pixels: f64) -> usize {
    ((3.0 * sigma_pixels + 0.5) as usize).saturating_add(1).max(2)
}

/// LoG kernel for a blob of `radius`, as real values in storage order
///
/// The optimal sigma for a blob in `n` dimensions is `radius / sqrt(n)`.
/// Each axis gets three extra border samples around `2 * half_size`.
pub fn log_nd(params: &KernelParams) -> Result<(Vec<usize>, Vec<f64>)> {
    let calibration = params.calibration()?;
    let n = params.num_dimensions;
    let sigma = params.scale / (n as f64).sqrt();

    let halves: Vec<usize> = calibration.iter().map(|&cal| half_size(sigma / cal)).collect();
    let sizes: Vec<Option<usize>> = halves
        .iter()
        .map(|&h| h.checked_mul(2)?.checked_add(3))
        .collect();
    let total = checked_len(NAME, params.scale, &sizes)?;
    let dims: Vec<usize> = sizes.into_iter().flatten().collect();
    let middle: Vec<f64> = halves.iter().map(|&h| (1 + h) as f64).collect();

    // Gaussian normalization over a constant, putting responses near the
    // peak of a blob of optimal radius
    let c = 1.0 / 20.0 * (1.0 / sigma / (2.0 * PI).sqrt()).powi(n as i32);
    let sigma_sq = sigma * sigma;

    let mut pos = vec![0usize; n];
    let mut values = Vec::with_capacity(total);
    for _ in 0..total {
        let mut mantissa = 0.0;
        let mut exponent = 0.0;
        for d in 0..n {
            let x = calibration[d] * (pos[d] as f64 - middle[d]);
            mantissa += -c * (x * x / sigma_sq - 1.0);
            exponent += -x * x / 2.0 / sigma_sq;
        }
        values.push(mantissa * exponent.exp());

        for (p, &d) in pos.iter_mut().zip(&dims) {
            *p += 1;
            if *p < d {
                break;
            }
            *p = 0;
        }
    }
    Ok((dims, values))
}

#[derive(Default)]
pub struct CreateLogKernel {
    params: KernelParams,
    output: Option<ImgHandle>,
}

impl Op for CreateLogKernel {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        self.params.set(NAME, "radius", name, value)
    }

    fn run(&mut self) -> Result<()> {
        let (dims, values) = log_nd(&self.params)?;
        debug!(?dims, radius = self.params.scale, "log kernel");
        let mut img = ArrayImg::new(&dims, self.params.out_type(NAME)?)?;
        for (i, v) in values.into_iter().enumerate() {
            img.data_mut().set_real(i, v);
        }
        self.output = Some(img.into_handle());
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "output" => self.output.clone().map(Value::Img),
            _ => None,
        }
    }

    fn as_contingent(&self) -> Option<&dyn Contingent> {
        Some(self)
    }
}

impl Contingent for CreateLogKernel {
    fn conforms(&self) -> bool {
        self.params.wants_floating()
    }
}

pub fn descriptors() -> Vec<OpDescriptor> {
    vec![declare(OpDescriptor::builder::<CreateLogKernel>(NAME), "radius").build()]
}
