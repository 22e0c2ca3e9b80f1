//! Separable N-dimensional complex FFT on flat, first-axis-fastest storage

use num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

use imgops_core::{Error, Result};

/// Transform `data` in place along every axis of `dims`
///
/// Storage is flat with the first axis varying fastest. The inverse
/// direction is left unnormalized, as RustFFT leaves it.
pub fn fft_nd(data: &mut [Complex<f64>], dims: &[usize], direction: FftDirection) -> Result<()> {
    let total: usize = dims.iter().product();
    if total != data.len() {
        return Err(Error::size_mismatch(total, data.len(), "fft_nd"));
    }

    let mut planner = FftPlanner::<f64>::new();
    let mut stride = 1;
    for &len in dims {
        if len > 1 {
            let fft = planner.plan_fft(len, direction);
            let mut line = vec![Complex::new(0.0, 0.0); len];
            let block = len * stride;
            for outer in (0..total).step_by(block) {
                for inner in 0..stride {
                    let base = outer + inner;
                    for (k, v) in line.iter_mut().enumerate() {
                        *v = data[base + k * stride];
                    }
                    fft.process(&mut line);
                    for (k, v) in line.iter().enumerate() {
                        data[base + k * stride] = *v;
                    }
                }
            }
        }
        stride *= len;
    }
    Ok(())
}

/// Forward transform of real samples
pub fn forward_real(
    values: impl Iterator<Item = f64>,
    dims: &[usize],
) -> Result<Vec<Complex<f64>>> {
    let mut data: Vec<Complex<f64>> = values.map(|x| Complex::new(x, 0.0)).collect();
    fft_nd(&mut data, dims, FftDirection::Forward)?;
    Ok(data)
}

/// Inverse transform normalized by the element count; returns real parts
pub fn inverse_to_real(mut data: Vec<Complex<f64>>, dims: &[usize]) -> Result<Vec<f64>> {
    fft_nd(&mut data, dims, FftDirection::Inverse)?;
    let norm_factor = 1.0 / data.len() as f64;
    Ok(data.iter().map(|c| c.re * norm_factor).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dc_component_is_sum() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let spectrum = forward_real(values.iter().copied(), &[3, 2]).unwrap();
        assert_relative_eq!(spectrum[0].re, 21.0, epsilon = 1e-12);
        assert_relative_eq!(spectrum[0].im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_axis_matches_direct_dft() {
        let values = [0.5, -1.0, 2.0, 0.25, 3.0];
        let spectrum = forward_real(values.iter().copied(), &[5]).unwrap();
        for (k, s) in spectrum.iter().enumerate() {
            let expected: Complex<f64> = values
                .iter()
                .enumerate()
                .map(|(n, &x)| {
                    let angle = -2.0 * std::f64::consts::PI * (k * n) as f64 / 5.0;
                    Complex::new(x * angle.cos(), x * angle.sin())
                })
                .sum();
            assert_relative_eq!(s.re, expected.re, epsilon = 1e-9);
            assert_relative_eq!(s.im, expected.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inverse_recovers_input() {
        let dims = [4, 3, 5];
        let values: Vec<f64> = (0..60).map(|i| ((i * 7) % 11) as f64 - 3.0).collect();
        let spectrum = forward_real(values.iter().copied(), &dims).unwrap();
        let back = inverse_to_real(spectrum, &dims).unwrap();
        for (a, b) in values.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_size_mismatch() {
        let mut data = vec![Complex::new(0.0, 0.0); 5];
        assert!(fft_nd(&mut data, &[2, 2], FftDirection::Forward).is_err());
    }
}
