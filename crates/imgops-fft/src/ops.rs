//! `fft.*` ops

use imgops_core::prelude::*;
use tracing::debug;

use crate::smooth::{next_smooth, no_smooth_number, real_to_complex_sizes};
use crate::transform::{forward_real, inverse_to_real};

pub const NEXT_SMOOTH: &str = "fft.next_smooth";
pub const SIZE: &str = "fft.size";
pub const FORWARD: &str = "fft.forward";
pub const INVERSE: &str = "fft.inverse";

fn to_usize(param: &str, v: i64) -> Result<usize> {
    usize::try_from(v)
        .map_err(|_| Error::InvalidParameter(format!("'{param}' must not be negative, got {v}")))
}

/// Least 7-smooth integer at or above `n`
#[derive(Default)]
pub struct NextSmooth {
    n: i64,
    result: i64,
}

impl Op for NextSmooth {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "n" => {
                self.n = value
                    .as_int()
                    .ok_or_else(|| Error::wrong_value(name, "int", &value))?
            }
            _ => return Err(Error::unknown_param(NEXT_SMOOTH, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let smooth =
            next_smooth(to_usize("n", self.n)?).ok_or_else(|| no_smooth_number(self.n))?;
        self.result = i64::try_from(smooth).map_err(|_| no_smooth_number(self.n))?;
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        (name == "result").then_some(Value::Int(self.result))
    }
}

/// Padded and complex FFT sizes for an input of the given dimensions
#[derive(Default)]
pub struct FftSize {
    dims: Vec<i64>,
    fast: bool,
    padded: Option<Vec<i64>>,
    fft_size: Option<Vec<i64>>,
}

impl Op for FftSize {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "dims" => {
                self.dims = value
                    .as_ints()
                    .ok_or_else(|| Error::wrong_value(name, "int array", &value))?
                    .to_vec()
            }
            "fast" => {
                self.fast = value
                    .as_bool()
                    .ok_or_else(|| Error::wrong_value(name, "bool", &value))?
            }
            _ => return Err(Error::unknown_param(SIZE, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let dims = self
            .dims
            .iter()
            .map(|&d| to_usize("dims", d))
            .collect::<Result<Vec<_>>>()?;
        let (padded, fft_size) = real_to_complex_sizes(&dims, self.fast)?;
        let to_i64 = |v: Vec<usize>| -> Result<Vec<i64>> {
            v.into_iter()
                .map(|d| i64::try_from(d).map_err(|_| no_smooth_number(d)))
                .collect()
        };
        self.padded = Some(to_i64(padded)?);
        self.fft_size = Some(to_i64(fft_size)?);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "padded_size" => self.padded.clone().map(Value::Ints),
            "fft_size" => self.fft_size.clone().map(Value::Ints),
            _ => None,
        }
    }
}

/// Full complex spectrum of a real image
#[derive(Default)]
pub struct FftForward {
    image: Option<ImgHandle>,
    output: Option<ImgHandle>,
}

impl Op for FftForward {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => {
                let image = value.as_img().cloned();
                self.image = Some(image.ok_or_else(|| Error::wrong_value(name, "image", &value))?)
            }
            _ => return Err(Error::unknown_param(FORWARD, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::missing_input(FORWARD, "image"))?;
        let img = image.read();
        if !img.sample_type().is_real() {
            return Err(Error::InvalidInput(format!(
                "forward FFT needs a real image, got {}",
                img.sample_type()
            )));
        }
        debug!(dims = ?img.dims(), "forward fft");
        let spectrum = forward_real(img.real_values(), img.dims())?;
        let out = ArrayImg::from_data(img.dims(), ImgData::ComplexFloat64(spectrum))?;
        self.output = Some(out.into_handle());
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "output" => self.output.clone().map(Value::Img),
            _ => None,
        }
    }
}

/// Real image from a full complex spectrum, normalized by element count
#[derive(Default)]
pub struct FftInverse {
    image: Option<ImgHandle>,
    output: Option<ImgHandle>,
}

impl Op for FftInverse {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => {
                let image = value.as_img().cloned();
                self.image = Some(image.ok_or_else(|| Error::wrong_value(name, "image", &value))?)
            }
            _ => return Err(Error::unknown_param(INVERSE, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::missing_input(INVERSE, "image"))?;
        let img = image.read();
        let spectrum = match img.data() {
            ImgData::ComplexFloat64(v) => v.clone(),
            other => {
                return Err(Error::InvalidInput(format!(
                    "inverse FFT needs a complex_float64 image, got {}",
                    other.sample_type()
                )))
            }
        };
        debug!(dims = ?img.dims(), "inverse fft");
        let values = inverse_to_real(spectrum, img.dims())?;
        let out = ArrayImg::from_data(img.dims(), ImgData::Float64(values))?;
        self.output = Some(out.into_handle());
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "output" => self.output.clone().map(Value::Img),
            _ => None,
        }
    }
}

pub fn descriptors() -> Vec<OpDescriptor> {
    vec![
        OpDescriptor::builder::<NextSmooth>(NEXT_SMOOTH)
            .input("n", TypeDesc::int())
            .output("result", TypeDesc::int())
            .build(),
        OpDescriptor::builder::<FftSize>(SIZE)
            .input("dims", TypeDesc::array(TypeDesc::int()))
            .input("fast", TypeDesc::bool())
            .output("padded_size", TypeDesc::array(TypeDesc::int()))
            .output("fft_size", TypeDesc::array(TypeDesc::int()))
            .build(),
        OpDescriptor::builder::<FftForward>(FORWARD)
            .input("image", TypeDesc::img(TypeDesc::var("T", TypeDesc::real_sample())))
            .output("output", TypeDesc::img(TypeDesc::complex_float64_sample()))
            .build(),
        OpDescriptor::builder::<FftInverse>(INVERSE)
            .input("image", TypeDesc::img(TypeDesc::complex_float64_sample()))
            .output("output", TypeDesc::img(TypeDesc::float64_sample()))
            .build(),
    ]
}
