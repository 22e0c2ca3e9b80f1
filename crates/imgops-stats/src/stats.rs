//! Descriptive statistics over all pixels of a real image (`stats.*`)
//!
//! `stats.mean` and `stats.moment4_about_mean` do not touch the pixels for
//! their building blocks. They ask the engine for `stats.sum`, `stats.size`
//! and `stats.mean` through nested calls, so whichever implementation of those
//! ranks highest is the one they build on.

use imgops_core::prelude::*;
use tracing::debug;

use crate::reduce::{descriptor, ops_service, real_image, scalar, Reduction};

pub const SUM: &str = "stats.sum";
pub const SIZE: &str = "stats.size";
pub const MEAN: &str = "stats.mean";
pub const SUM_OF_SQUARES: &str = "stats.sum_of_squares";
pub const MOMENT4_ABOUT_MEAN: &str = "stats.moment4_about_mean";
pub const MIN_MAX: &str = "stats.min_max";

#[derive(Default)]
pub struct Sum;

impl Reduction for Sum {
    const NAME: &'static str = SUM;

    fn reduce(&self, img: &ArrayImg) -> Result<f64> {
        Ok(img.real_values().sum())
    }
}

/// Number of pixels
#[derive(Default)]
pub struct Size;

impl Reduction for Size {
    const NAME: &'static str = SIZE;

    fn reduce(&self, img: &ArrayImg) -> Result<f64> {
        Ok(img.len() as f64)
    }
}

#[derive(Default)]
pub struct SumOfSquares;

impl Reduction for SumOfSquares {
    const NAME: &'static str = SUM_OF_SQUARES;

    fn reduce(&self, img: &ArrayImg) -> Result<f64> {
        Ok(img.real_values().map(|v| v * v).sum())
    }
}

/// `sum / size`, both resolved through the engine
#[derive(Default)]
pub struct Mean {
    ops: Option<OpService>,
    image: Option<ImgHandle>,
    result: Option<f64>,
}

impl Op for Mean {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(real_image(name, &value)?),
            _ => return Err(Error::unknown_param(MEAN, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let ops = self
            .ops
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("ops service not injected".into()))?;
        let image = self
            .image
            .clone()
            .ok_or_else(|| Error::missing_input(MEAN, "image"))?;
        let args = [Value::Img(image)];
        let sum = scalar(SUM, ops.run(SUM, &args)?)?;
        let size = scalar(SIZE, ops.run(SIZE, &args)?)?;
        if size == 0.0 {
            return Err(Error::empty_input(MEAN));
        }
        self.result = Some(sum / size);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "result" => self.result.map(Value::Float),
            _ => None,
        }
    }

    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        self.ops = Some(ops_service(MEAN, service)?);
        Ok(())
    }
}

/// Fourth central moment: `Σ (v - mean)^4 / size`
#[derive(Default)]
pub struct Moment4AboutMean {
    ops: Option<OpService>,
    image: Option<ImgHandle>,
    result: Option<f64>,
}

impl Op for Moment4AboutMean {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(real_image(name, &value)?),
            _ => return Err(Error::unknown_param(MOMENT4_ABOUT_MEAN, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let ops = self
            .ops
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("ops service not injected".into()))?;
        let image = self
            .image
            .clone()
            .ok_or_else(|| Error::missing_input(MOMENT4_ABOUT_MEAN, "image"))?;
        let args = [Value::Img(image.clone())];
        let mean = scalar(MEAN, ops.run(MEAN, &args)?)?;
        let size = scalar(SIZE, ops.run(SIZE, &args)?)?;

        let img = image.read();
        let total: f64 = img
            .real_values()
            .map(|v| {
                let d = v - mean;
                d * d * d * d
            })
            .sum();
        debug!(mean, size, "fourth moment");
        self.result = Some(total / size);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "result" => self.result.map(Value::Float),
            _ => None,
        }
    }

    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        self.ops = Some(ops_service(MOMENT4_ABOUT_MEAN, service)?);
        Ok(())
    }
}

/// Smallest and largest pixel value, as outputs `min` and `max`
#[derive(Default)]
pub struct MinMax {
    image: Option<ImgHandle>,
    range: Option<(f64, f64)>,
}

impl Op for MinMax {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(real_image(name, &value)?),
            _ => return Err(Error::unknown_param(MIN_MAX, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::missing_input(MIN_MAX, "image"))?;
        let img = image.read();
        self.range = img.real_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        });
        if self.range.is_none() {
            return Err(Error::empty_input(MIN_MAX));
        }
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        let (lo, hi) = self.range?;
        match name {
            "min" => Some(Value::Float(lo)),
            "max" => Some(Value::Float(hi)),
            _ => None,
        }
    }
}

fn real_image_type() -> TypeDesc {
    TypeDesc::img(TypeDesc::var("T", TypeDesc::real_sample()))
}

pub fn descriptors() -> Vec<OpDescriptor> {
    vec![
        descriptor::<Sum>(),
        descriptor::<Size>(),
        descriptor::<SumOfSquares>(),
        OpDescriptor::builder::<Mean>(MEAN)
            .requires(Service::Ops)
            .input("image", real_image_type())
            .output("result", TypeDesc::float())
            .build(),
        OpDescriptor::builder::<Moment4AboutMean>(MOMENT4_ABOUT_MEAN)
            .requires(Service::Ops)
            .input("image", real_image_type())
            .output("result", TypeDesc::float())
            .build(),
        OpDescriptor::builder::<MinMax>(MIN_MAX)
            .input("image", real_image_type())
            .output("min", TypeDesc::float())
            .output("max", TypeDesc::float())
            .build(),
    ]
}
