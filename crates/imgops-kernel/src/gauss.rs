//! Separable Gaussian kernels (`gauss`)

use imgops_core::prelude::*;
use tracing::debug;

use crate::params::{checked_len, declare, KernelParams};

pub const NAME: &str = "gauss";

/// Number of samples covering three standard deviations either side
///
/// `None` when the size does not fit a `usize`.
pub fn kernel_size(sigma_pixels: f64) -> Option<usize> {
    let half = (3.0 * sigma_pixels + 0.5) as usize;
    Some(half.checked_mul(2)?.checked_add(1)?.max(3))
}

/// Normalized, symmetric 1-D Gaussian of `size` samples
pub fn gaussian_1d(sigma_pixels: f64, size: usize) -> Vec<f64> {
    let center = size / 2;
    let two_sigma_sq = 2.0 * sigma_pixels * sigma_pixels;
    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i.abs_diff(center) as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Product of per-axis 1-D Gaussians, as real values in storage order
pub fn gaussian_nd(params: &KernelParams) -> Result<(Vec<usize>, Vec<f64>)> {
    let calibration = params.calibration()?;
    let sizes: Vec<Option<usize>> = calibration
        .iter()
        .map(|&cal| kernel_size(params.scale / cal))
        .collect();
    let total = checked_len(NAME, params.scale, &sizes)?;
    let dims: Vec<usize> = sizes.into_iter().flatten().collect();
    let axes: Vec<Vec<f64>> = calibration
        .iter()
        .zip(&dims)
        .map(|(&cal, &size)| gaussian_1d(params.scale / cal, size))
        .collect();

    let mut pos = vec![0usize; dims.len()];
    let mut values = Vec::with_capacity(total);
    for _ in 0..total {
        values.push(axes.iter().zip(&pos).map(|(k, &p)| k[p]).product());
        // advance, first axis fastest
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

fn to_image(dims: &[usize], values: &[f64], sample: SampleType) -> Result<ImgHandle> {
    let mut img = ArrayImg::new(dims, sample)?;
    for (i, &v) in values.iter().enumerate() {
        img.data_mut().set_real(i, v);
    }
    Ok(img.into_handle())
}

/// Gaussian kernel for floating point (real or complex) output types
#[derive(Default)]
pub struct CreateGaussianKernel {
    params: KernelParams,
    output: Option<ImgHandle>,
}

impl Op for CreateGaussianKernel {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        self.params.set(NAME, "sigma", name, value)
    }

    fn run(&mut self) -> Result<()> {
        let (dims, values) = gaussian_nd(&self.params)?;
        debug!(?dims, sigma = self.params.scale, "gaussian kernel");
        self.output = Some(to_image(&dims, &values, self.params.out_type(NAME)?)?);
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

impl Contingent for CreateGaussianKernel {
    fn conforms(&self) -> bool {
        self.params.wants_floating()
    }
}

/// Gaussian kernel for byte output, scaled so the peak is 255
#[derive(Default)]
pub struct CreateScaledGaussianKernel {
    params: KernelParams,
    output: Option<ImgHandle>,
}

impl Op for CreateScaledGaussianKernel {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        self.params.set(NAME, "sigma", name, value)
    }

    fn run(&mut self) -> Result<()> {
        let (dims, mut values) = gaussian_nd(&self.params)?;
        let peak = values.iter().copied().fold(0.0, f64::max);
        if peak > 0.0 {
            for v in &mut values {
                *v *= 255.0 / peak;
            }
        }
        debug!(?dims, sigma = self.params.scale, peak, "scaled gaussian kernel");
        self.output = Some(to_image(&dims, &values, SampleType::UInt8)?);
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

impl Contingent for CreateScaledGaussianKernel {
    fn conforms(&self) -> bool {
        self.params.out_type == Some(SampleType::UInt8)
    }
}

pub fn descriptors() -> Vec<OpDescriptor> {
    vec![
        declare(
            OpDescriptor::builder::<CreateGaussianKernel>(NAME).priority(priority::HIGH),
            "sigma",
        )
        .build(),
        declare(OpDescriptor::builder::<CreateScaledGaussianKernel>(NAME), "sigma").build(),
    ]
}
