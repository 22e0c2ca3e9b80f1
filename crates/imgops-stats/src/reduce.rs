//! Single-image reductions and the op wrapper shared by `stats.*` and `moments.*`

use std::marker::PhantomData;

use imgops_core::prelude::*;
use tracing::trace;

/// A scalar computed from every pixel of a real image
pub trait Reduction: Send + Sync + 'static {
    /// Registered op name
    const NAME: &'static str;

    /// Image rank the reduction is defined for, `None` for any rank
    const RANK: Option<usize> = None;

    fn reduce(&self, img: &ArrayImg) -> Result<f64>;
}

/// Extract a real-valued image argument
pub fn real_image(name: &str, value: &Value) -> Result<ImgHandle> {
    value
        .as_img()
        .filter(|img| img.sample_type().is_real())
        .cloned()
        .ok_or_else(|| Error::wrong_value(name, "real image", value))
}

/// Fail unless `img` has `rank` dimensions
pub fn check_rank(op: &str, img: &ArrayImg, rank: Option<usize>) -> Result<()> {
    match rank {
        Some(r) if img.num_dimensions() != r => Err(Error::InvalidInput(format!(
            "{op} needs a {r}-D image, got {:?}",
            img.dims()
        ))),
        _ => Ok(()),
    }
}

/// Take the engine handle out of an injected service
pub fn ops_service(op: &str, service: ServiceHandle) -> Result<OpService> {
    match service {
        ServiceHandle::Ops(ops) => Ok(ops),
        other => Err(Error::InvalidParameter(format!(
            "{op} does not use service {:?}",
            other.kind()
        ))),
    }
}

/// Read a scalar result of a nested op call
pub fn scalar(op: &str, value: Value) -> Result<f64> {
    value
        .as_float()
        .ok_or_else(|| Error::InvalidInput(format!("{op} returned {}", value.describe())))
}

/// Op wrapping a [`Reduction`]: `(image) -> result`
pub struct ReduceImage<R> {
    image: Option<ImgHandle>,
    result: Option<f64>,
    _reduction: PhantomData<R>,
}

impl<R> Default for ReduceImage<R> {
    fn default() -> Self {
        Self {
            image: None,
            result: None,
            _reduction: PhantomData,
        }
    }
}

impl<R: Reduction + Default> Op for ReduceImage<R> {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        if name != "image" {
            return Err(Error::unknown_param(R::NAME, name));
        }
        self.image = Some(real_image(name, &value)?);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::missing_input(R::NAME, "image"))?;
        let img = image.read();
        check_rank(R::NAME, &img, R::RANK)?;
        let result = R::default().reduce(&img)?;
        trace!(op = R::NAME, result, "reduced");
        self.result = Some(result);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "result" => self.result.map(Value::Float),
            _ => None,
        }
    }
}

/// Descriptor for `ReduceImage<R>`: one real image in, one float out
pub fn descriptor<R: Reduction + Default>() -> OpDescriptor {
    OpDescriptor::builder::<ReduceImage<R>>(R::NAME)
        .input("image", TypeDesc::img(TypeDesc::var("T", TypeDesc::real_sample())))
        .output("result", TypeDesc::float())
        .build()
}
