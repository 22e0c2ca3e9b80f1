//! N-dimensional array images
//!
//! Images are stored flat in row-major order with the first axis varying
//! fastest. Ops share images through [`ImgHandle`], so an op declared with a
//! `Both` parameter can mutate its argument in place and hand back the very
//! same handle as its output.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use num_complex::Complex;
use num_traits::{NumCast, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::types::TypeDesc;
use crate::{Error, Result};

/// Pixel type of an image, also passed around as a value to select output types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    UInt8,
    Float32,
    Float64,
    ComplexFloat32,
    ComplexFloat64,
}

impl SampleType {
    /// Short lowercase name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::UInt8 => "uint8",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::ComplexFloat32 => "complex_float32",
            Self::ComplexFloat64 => "complex_float64",
        }
    }

    /// Real-valued sample types
    pub fn is_real(&self) -> bool {
        matches!(self, Self::UInt8 | Self::Float32 | Self::Float64)
    }

    /// Floating point sample types, real or complex
    pub fn is_floating(&self) -> bool {
        !matches!(self, Self::UInt8)
    }

    /// Structural type of this sample type
    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Self::UInt8 => TypeDesc::uint8_sample(),
            Self::Float32 => TypeDesc::float32_sample(),
            Self::Float64 => TypeDesc::float64_sample(),
            Self::ComplexFloat32 => TypeDesc::complex_float32_sample(),
            Self::ComplexFloat64 => TypeDesc::complex_float64_sample(),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flat pixel storage
#[derive(Debug, Clone, PartialEq)]
pub enum ImgData {
    UInt8(Vec<u8>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    ComplexFloat32(Vec<Complex<f32>>),
    ComplexFloat64(Vec<Complex<f64>>),
}

impl ImgData {
    /// Zero-filled storage of `len` samples
    pub fn zeros(sample: SampleType, len: usize) -> Self {
        match sample {
            SampleType::UInt8 => Self::UInt8(vec![0; len]),
            SampleType::Float32 => Self::Float32(vec![0.0; len]),
            SampleType::Float64 => Self::Float64(vec![0.0; len]),
            SampleType::ComplexFloat32 => Self::ComplexFloat32(vec![Complex::new(0.0, 0.0); len]),
            SampleType::ComplexFloat64 => Self::ComplexFloat64(vec![Complex::new(0.0, 0.0); len]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::UInt8(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::ComplexFloat32(v) => v.len(),
            Self::ComplexFloat64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Self::UInt8(_) => SampleType::UInt8,
            Self::Float32(_) => SampleType::Float32,
            Self::Float64(_) => SampleType::Float64,
            Self::ComplexFloat32(_) => SampleType::ComplexFloat32,
            Self::ComplexFloat64(_) => SampleType::ComplexFloat64,
        }
    }

    /// Real part of the sample at `index`
    pub fn real(&self, index: usize) -> f64 {
        match self {
            Self::UInt8(v) => <f64 as From<u8>>::from(v[index]),
            Self::Float32(v) => <f64 as From<f32>>::from(v[index]),
            Self::Float64(v) => v[index],
            Self::ComplexFloat32(v) => <f64 as From<f32>>::from(v[index].re),
            Self::ComplexFloat64(v) => v[index].re,
        }
    }

    /// Set the real part of the sample at `index`, clearing any imaginary part
    ///
    /// Byte samples are rounded and saturated to `0..=255`.
    pub fn set_real(&mut self, index: usize, value: f64) {
        match self {
            Self::UInt8(v) => {
                v[index] = value.round().clamp(0.0, 255.0).to_u8().unwrap_or(0);
            }
            Self::Float32(v) => v[index] = <f32 as NumCast>::from(value).unwrap_or(f32::NAN),
            Self::Float64(v) => v[index] = value,
            Self::ComplexFloat32(v) => {
                v[index] = Complex::new(<f32 as NumCast>::from(value).unwrap_or(f32::NAN), 0.0)
            }
            Self::ComplexFloat64(v) => v[index] = Complex::new(value, 0.0),
        }
    }
}

/// A dense n-dimensional image
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayImg {
    dims: Vec<usize>,
    data: ImgData,
}

impl ArrayImg {
    /// Create a zero-filled image
    pub fn new(dims: &[usize], sample: SampleType) -> Result<Self> {
        let len = checked_len(dims)?;
        Ok(Self {
            dims: dims.to_vec(),
            data: ImgData::zeros(sample, len),
        })
    }

    /// Wrap existing storage; its length must equal the product of `dims`
    pub fn from_data(dims: &[usize], data: ImgData) -> Result<Self> {
        let len = checked_len(dims)?;
        if data.len() != len {
            return Err(Error::size_mismatch(len, data.len(), "image storage"));
        }
        Ok(Self {
            dims: dims.to_vec(),
            data,
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn num_dimensions(&self) -> usize {
        self.dims.len()
    }

    pub fn dimension(&self, d: usize) -> usize {
        self.dims[d]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sample_type(&self) -> SampleType {
        self.data.sample_type()
    }

    pub fn data(&self) -> &ImgData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ImgData {
        &mut self.data
    }

    /// Flat index of a position
    pub fn index_of(&self, pos: &[usize]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for (d, &p) in pos.iter().enumerate() {
            index += p * stride;
            stride *= self.dims[d];
        }
        index
    }

    /// Write the position of flat `index` into `pos`
    pub fn position_of(&self, mut index: usize, pos: &mut [usize]) {
        for (d, p) in pos.iter_mut().enumerate() {
            *p = index % self.dims[d];
            index /= self.dims[d];
        }
    }

    pub fn real_at(&self, pos: &[usize]) -> f64 {
        self.data.real(self.index_of(pos))
    }

    pub fn set_real_at(&mut self, pos: &[usize], value: f64) {
        let index = self.index_of(pos);
        self.data.set_real(index, value);
    }

    /// Real parts of all samples in storage order
    pub fn real_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.data.len()).map(move |i| self.data.real(i))
    }

    /// Move this image behind a shared handle
    pub fn into_handle(self) -> ImgHandle {
        ImgHandle::new(self)
    }
}

fn checked_len(dims: &[usize]) -> Result<usize> {
    if dims.is_empty() {
        return Err(Error::InvalidInput("image needs at least one dimension".into()));
    }
    if dims.iter().any(|&d| d == 0) {
        return Err(Error::InvalidInput(format!("image dimensions must be positive: {dims:?}")));
    }
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::InvalidInput(format!("image too large: {dims:?}")))
}

/// Shared, mutable handle to an image
///
/// Cloning the handle does not copy pixels; equality is handle identity.
#[derive(Clone)]
pub struct ImgHandle(Arc<RwLock<ArrayImg>>);

impl ImgHandle {
    pub fn new(img: ArrayImg) -> Self {
        Self(Arc::new(RwLock::new(img)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ArrayImg> {
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ArrayImg> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn sample_type(&self) -> SampleType {
        self.read().sample_type()
    }

    pub fn dims(&self) -> Vec<usize> {
        self.read().dims().to_vec()
    }

    /// Structural type: `ArrayImg<sample>`
    pub fn type_desc(&self) -> TypeDesc {
        TypeDesc::array_img(self.sample_type().type_desc())
    }
}

impl PartialEq for ImgHandle {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl fmt::Debug for ImgHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let img = self.read();
        f.debug_struct("ImgHandle")
            .field("dims", &img.dims())
            .field("sample", &img.sample_type())
            .finish()
    }
}

impl From<ArrayImg> for ImgHandle {
    fn from(img: ArrayImg) -> Self {
        Self::new(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_positions() {
        let img = ArrayImg::new(&[4, 3, 2], SampleType::Float64).unwrap();
        assert_eq!(img.len(), 24);
        assert_eq!(img.index_of(&[1, 0, 0]), 1);
        assert_eq!(img.index_of(&[0, 1, 0]), 4);
        assert_eq!(img.index_of(&[0, 0, 1]), 12);

        let mut pos = [0; 3];
        img.position_of(17, &mut pos);
        assert_eq!(pos, [1, 1, 1]);
    }

    #[test]
    fn test_rejects_bad_dims() {
        assert!(ArrayImg::new(&[], SampleType::UInt8).is_err());
        assert!(ArrayImg::new(&[3, 0], SampleType::UInt8).is_err());
        assert!(ArrayImg::from_data(&[2, 2], ImgData::UInt8(vec![1, 2, 3])).is_err());
    }

    #[test]
    fn test_byte_set_real_saturates() {
        let mut data = ImgData::zeros(SampleType::UInt8, 3);
        data.set_real(0, 300.0);
        data.set_real(1, -4.0);
        data.set_real(2, 41.6);
        assert_eq!(data, ImgData::UInt8(vec![255, 0, 42]));
    }

    #[test]
    fn test_narrow_samples_read_as_f64() {
        assert_eq!(ImgData::UInt8(vec![7, 255]).real(1), 255.0);
        assert_eq!(ImgData::Float32(vec![0.5, -1.25]).real(1), -1.25);
        let complex = ImgData::ComplexFloat32(vec![Complex::new(3.5f32, 9.0)]);
        assert_eq!(complex.real(0), 3.5);
    }

    #[test]
    fn test_complex_real_part() {
        let mut data = ImgData::zeros(SampleType::ComplexFloat64, 1);
        data.set_real(0, 2.5);
        assert_eq!(data.real(0), 2.5);
    }

    #[test]
    fn test_handle_identity() {
        let a = ArrayImg::new(&[2], SampleType::UInt8).unwrap().into_handle();
        let b = a.clone();
        let c = ArrayImg::new(&[2], SampleType::UInt8).unwrap().into_handle();
        assert_eq!(a, b);
        assert_ne!(a, c);

        b.write().set_real_at(&[1], 7.0);
        assert_eq!(a.read().real_at(&[1]), 7.0);
    }
}
