//! Image moments of 2-D real images (`moments.*`)
//!
//! Pixel `(x, y)` sits at flat index `x + y * width`. Raw moments are
//! `m_pq = Σ x^p y^q v`, central moments are taken about the centroid
//! `(m10 / m00, m01 / m00)` and the normalized central moments divide by
//! `m00^(1 + (p + q) / 2)`.

use imgops_core::prelude::*;
use tracing::debug;

use crate::reduce::{descriptor, ops_service, real_image, scalar, Reduction};

pub const CENTROID: &str = "moments.centroid";

/// Central moment orders with registered ops
pub const CENTRAL_ORDERS: [(u32, u32); 7] =
    [(1, 1), (2, 0), (0, 2), (3, 0), (0, 3), (2, 1), (1, 2)];

pub const fn raw_name(p: u32, q: u32) -> &'static str {
    match (p, q) {
        (0, 0) => "moments.moment00",
        (1, 0) => "moments.moment10",
        (0, 1) => "moments.moment01",
        (1, 1) => "moments.moment11",
        _ => panic!("no raw moment op of this order"),
    }
}

pub const fn central_name(p: u32, q: u32) -> &'static str {
    match (p, q) {
        (1, 1) => "moments.central11",
        (2, 0) => "moments.central20",
        (0, 2) => "moments.central02",
        (3, 0) => "moments.central30",
        (0, 3) => "moments.central03",
        (2, 1) => "moments.central21",
        (1, 2) => "moments.central12",
        _ => panic!("no central moment op of this order"),
    }
}

pub const fn normalized_name(p: u32, q: u32) -> &'static str {
    match (p, q) {
        (1, 1) => "moments.normalized_central11",
        (2, 0) => "moments.normalized_central20",
        (0, 2) => "moments.normalized_central02",
        (3, 0) => "moments.normalized_central30",
        (0, 3) => "moments.normalized_central03",
        (2, 1) => "moments.normalized_central21",
        (1, 2) => "moments.normalized_central12",
        _ => panic!("no normalized central moment op of this order"),
    }
}

fn weighted_sum(img: &ArrayImg, f: impl Fn(f64, f64) -> f64) -> f64 {
    let width = img.dimension(0).max(1);
    img.real_values()
        .enumerate()
        .map(|(i, v)| f((i % width) as f64, (i / width) as f64) * v)
        .sum()
}

/// `Σ x^p y^q v`
pub fn raw_moment(img: &ArrayImg, p: u32, q: u32) -> f64 {
    weighted_sum(img, |x, y| x.powi(p as i32) * y.powi(q as i32))
}

/// Centroid `(m10 / m00, m01 / m00)`; an all-zero image has none
pub fn centroid(img: &ArrayImg) -> Result<(f64, f64)> {
    let m00 = raw_moment(img, 0, 0);
    if m00 == 0.0 {
        return Err(Error::InvalidInput("image has zero total intensity".into()));
    }
    Ok((raw_moment(img, 1, 0) / m00, raw_moment(img, 0, 1) / m00))
}

/// `Σ (x - xc)^p (y - yc)^q v`
pub fn central_moment(img: &ArrayImg, p: u32, q: u32) -> Result<f64> {
    let (xc, yc) = centroid(img)?;
    Ok(weighted_sum(img, |x, y| {
        (x - xc).powi(p as i32) * (y - yc).powi(q as i32)
    }))
}

#[derive(Default)]
pub struct RawMoment<const P: u32, const Q: u32>;

impl<const P: u32, const Q: u32> Reduction for RawMoment<P, Q> {
    const NAME: &'static str = raw_name(P, Q);
    const RANK: Option<usize> = Some(2);

    fn reduce(&self, img: &ArrayImg) -> Result<f64> {
        Ok(raw_moment(img, P, Q))
    }
}

#[derive(Default)]
pub struct CentralMoment<const P: u32, const Q: u32>;

impl<const P: u32, const Q: u32> Reduction for CentralMoment<P, Q> {
    const NAME: &'static str = central_name(P, Q);
    const RANK: Option<usize> = Some(2);

    fn reduce(&self, img: &ArrayImg) -> Result<f64> {
        central_moment(img, P, Q)
    }
}

/// `μpq / μ00^(1 + (p + q) / 2)`, built from nested `moments.*` calls
#[derive(Default)]
pub struct NormalizedCentralMoment<const P: u32, const Q: u32> {
    ops: Option<OpService>,
    image: Option<ImgHandle>,
    result: Option<f64>,
}

impl<const P: u32, const Q: u32> NormalizedCentralMoment<P, Q> {
    const NAME: &'static str = normalized_name(P, Q);
}

impl<const P: u32, const Q: u32> Op for NormalizedCentralMoment<P, Q> {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(real_image(name, &value)?),
            _ => return Err(Error::unknown_param(Self::NAME, name)),
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
            .ok_or_else(|| Error::missing_input(Self::NAME, "image"))?;
        let args = [Value::Img(image)];

        // the zeroth central moment equals m00
        let m00_name = raw_name(0, 0);
        let mu00 = scalar(m00_name, ops.run(m00_name, &args)?)?;
        let mu_name = central_name(P, Q);
        let mu = scalar(mu_name, ops.run(mu_name, &args)?)?;

        let norm = mu00.powf(1.0 + f64::from(P + Q) / 2.0);
        self.result = Some(mu / norm);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "result" => self.result.map(Value::Float),
            _ => None,
        }
    }

    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        self.ops = Some(ops_service(Self::NAME, service)?);
        Ok(())
    }
}

/// Intensity centroid as outputs `x` and `y`, from nested raw moment calls
#[derive(Default)]
pub struct Centroid {
    ops: Option<OpService>,
    image: Option<ImgHandle>,
    center: Option<(f64, f64)>,
}

impl Op for Centroid {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(real_image(name, &value)?),
            _ => return Err(Error::unknown_param(CENTROID, name)),
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
            .ok_or_else(|| Error::missing_input(CENTROID, "image"))?;
        let args = [Value::Img(image)];
        let moment = |p, q| {
            let name = raw_name(p, q);
            scalar(name, ops.run(name, &args)?)
        };

        let m00 = moment(0, 0)?;
        if m00 == 0.0 {
            return Err(Error::InvalidInput("image has zero total intensity".into()));
        }
        let center = (moment(1, 0)? / m00, moment(0, 1)? / m00);
        debug!(?center, "centroid");
        self.center = Some(center);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        let (x, y) = self.center?;
        match name {
            "x" => Some(Value::Float(x)),
            "y" => Some(Value::Float(y)),
            _ => None,
        }
    }

    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        self.ops = Some(ops_service(CENTROID, service)?);
        Ok(())
    }
}

fn real_image_type() -> TypeDesc {
    TypeDesc::img(TypeDesc::var("T", TypeDesc::real_sample()))
}

fn normalized<const P: u32, const Q: u32>() -> OpDescriptor {
    OpDescriptor::builder::<NormalizedCentralMoment<P, Q>>(normalized_name(P, Q))
        .requires(Service::Ops)
        .input("image", real_image_type())
        .output("result", TypeDesc::float())
        .build()
}

pub fn descriptors() -> Vec<OpDescriptor> {
    vec![
        descriptor::<RawMoment<0, 0>>(),
        descriptor::<RawMoment<1, 0>>(),
        descriptor::<RawMoment<0, 1>>(),
        descriptor::<RawMoment<1, 1>>(),
        descriptor::<CentralMoment<1, 1>>(),
        descriptor::<CentralMoment<2, 0>>(),
        descriptor::<CentralMoment<0, 2>>(),
        descriptor::<CentralMoment<3, 0>>(),
        descriptor::<CentralMoment<0, 3>>(),
        descriptor::<CentralMoment<2, 1>>(),
        descriptor::<CentralMoment<1, 2>>(),
        normalized::<1, 1>(),
        normalized::<2, 0>(),
        normalized::<0, 2>(),
        normalized::<3, 0>(),
        normalized::<0, 3>(),
        normalized::<2, 1>(),
        normalized::<1, 2>(),
        OpDescriptor::builder::<Centroid>(CENTROID)
            .requires(Service::Ops)
            .input("image", real_image_type())
            .output("x", TypeDesc::float())
            .output("y", TypeDesc::float())
            .build(),
    ]
}
