//! `add` ops
//!
//! Three candidates share the name `add`. The parallel byte image variant
//! ranks highest and splits its work over the injected chunk executor. The
//! sequential variant serves registries built without it. `AddNumbers`
//! takes any numeric pair.

use imgops_core::prelude::*;
use tracing::trace;

pub const NAME: &str = "add";

/// `a + b`; integer pairs stay integers (wrapping), anything else is a float
#[derive(Default)]
pub struct AddNumbers {
    a: Option<Value>,
    b: Option<Value>,
    result: Option<Value>,
}

impl Op for AddNumbers {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        if value.as_float().is_none() {
            return Err(Error::wrong_value(name, "number", &value));
        }
        match name {
            "a" => self.a = Some(value),
            "b" => self.b = Some(value),
            _ => return Err(Error::unknown_param(NAME, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let a = self.a.as_ref().ok_or_else(|| Error::missing_input(NAME, "a"))?;
        let b = self.b.as_ref().ok_or_else(|| Error::missing_input(NAME, "b"))?;
        let result = match (a, b) {
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                Value::Float(a.as_float().unwrap_or_default() + b.as_float().unwrap_or_default())
            }
            _ => Value::Int(
                a.as_int()
                    .unwrap_or_default()
                    .wrapping_add(b.as_int().unwrap_or_default()),
            ),
        };
        self.result = Some(result);
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "result" => self.result.clone(),
            _ => None,
        }
    }
}

fn byte_image_input(name: &str, value: &Value) -> Result<ImgHandle> {
    value
        .as_img()
        .filter(|img| img.sample_type() == SampleType::UInt8)
        .cloned()
        .ok_or_else(|| Error::wrong_value(name, "uint8 image", value))
}

fn add_wrapping(chunk: &mut [u8], value: u8) {
    for v in chunk {
        *v = v.wrapping_add(value);
    }
}

/// Adds a byte constant to every pixel of a byte image, in place
#[derive(Default)]
pub struct AddConstantToByteImage {
    image: Option<ImgHandle>,
    value: u8,
}

impl Op for AddConstantToByteImage {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(byte_image_input(name, &value)?),
            "value" => {
                self.value = value
                    .as_byte()
                    .ok_or_else(|| Error::wrong_value(name, "byte", &value))?
            }
            _ => return Err(Error::unknown_param(NAME, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::missing_input(NAME, "image"))?;
        let mut img = image.write();
        match img.data_mut() {
            ImgData::UInt8(data) => add_wrapping(data, self.value),
            other => {
                return Err(Error::InvalidInput(format!(
                    "expected uint8 pixels, got {}",
                    other.sample_type()
                )))
            }
        }
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "image" => self.image.clone().map(Value::Img),
            _ => None,
        }
    }
}

/// Same as [`AddConstantToByteImage`], split across the chunk executor
#[derive(Default)]
pub struct AddConstantToByteImageParallel {
    executor: Option<ChunkExecutor>,
    image: Option<ImgHandle>,
    value: u8,
}

impl Op for AddConstantToByteImageParallel {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "image" => self.image = Some(byte_image_input(name, &value)?),
            "value" => {
                self.value = value
                    .as_byte()
                    .ok_or_else(|| Error::wrong_value(name, "byte", &value))?
            }
            _ => return Err(Error::unknown_param(NAME, name)),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let executor = self
            .executor
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("chunk executor not injected".into()))?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::missing_input(NAME, "image"))?;
        let value = self.value;

        let mut img = image.write();
        let data = match img.data_mut() {
            ImgData::UInt8(data) => data,
            other => {
                return Err(Error::InvalidInput(format!(
                    "expected uint8 pixels, got {}",
                    other.sample_type()
                )))
            }
        };
        let report = executor.run_chunked_mut(data, |start, chunk| {
            trace!(start, len = chunk.len(), "add chunk");
            add_wrapping(chunk, value);
            Ok(())
        });
        report.into_result()
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "image" => self.image.clone().map(Value::Img),
            _ => None,
        }
    }

    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        match service {
            ServiceHandle::Threads(executor) => {
                self.executor = Some(executor);
                Ok(())
            }
            other => Err(Error::InvalidParameter(format!(
                "{NAME} does not use service {:?}",
                other.kind()
            ))),
        }
    }
}

pub fn descriptors() -> Vec<OpDescriptor> {
    let byte_image = || TypeDesc::array_img(TypeDesc::uint8_sample());
    vec![
        OpDescriptor::builder::<AddNumbers>(NAME)
            .input("a", TypeDesc::number())
            .input("b", TypeDesc::number())
            .output("result", TypeDesc::number())
            .build(),
        OpDescriptor::builder::<AddConstantToByteImage>(NAME)
            .priority(priority::HIGH)
            .both("image", byte_image())
            .input("value", TypeDesc::byte())
            .build(),
        OpDescriptor::builder::<AddConstantToByteImageParallel>(NAME)
            .priority(priority::HIGH.0 + 1.0)
            .requires(Service::Threads)
            .both("image", byte_image())
            .input("value", TypeDesc::byte())
            .build(),
    ]
}
