//! 7-smooth FFT sizes
//!
//! RustFFT handles any length, but lengths whose only prime factors are
//! 2, 3, 5 and 7 run through its fastest mixed-radix paths.

use imgops_core::{Error, Result};

/// Whether `n` has no prime factor above 7
pub fn is_smooth(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    for p in [2, 3, 5, 7] {
        while n % p == 0 {
            n /= p;
        }
    }
    n == 1
}

/// Least 7-smooth number `>= n` (1 for `n <= 1`), `None` past `usize::MAX`
///
/// Walks the `3^b 5^c 7^d` odd parts below `n` and doubles each one up to
/// `n`, so the cost is polylogarithmic in `n`.
pub fn next_smooth(n: usize) -> Option<usize> {
    let n = n.max(1);
    let mut best: Option<usize> = None;
    let mut keep = |candidate: usize| {
        if best.map_or(true, |b| candidate < b) {
            best = Some(candidate);
        }
    };

    let mut p7 = 1usize;
    loop {
        let mut p5 = p7;
        loop {
            let mut p3 = p5;
            loop {
                let mut candidate = Some(p3);
                while let Some(c) = candidate.filter(|&c| c < n) {
                    candidate = c.checked_mul(2);
                }
                if let Some(c) = candidate {
                    keep(c);
                }
                match p3.checked_mul(3) {
                    Some(next) if p3 < n => p3 = next,
                    _ => break,
                }
            }
            match p5.checked_mul(5) {
                Some(next) if p5 < n => p5 = next,
                _ => break,
            }
        }
        match p7.checked_mul(7) {
            Some(next) if p7 < n => p7 = next,
            _ => break,
        }
    }
    best
}

/// Padded sizes and complex FFT sizes for a real-to-complex transform
///
/// With `fast`, every axis is padded up to the next smooth number. The
/// complex size keeps only the non-redundant half of the first axis.
pub fn real_to_complex_sizes(dims: &[usize], fast: bool) -> Result<(Vec<usize>, Vec<usize>)> {
    let padded = dims
        .iter()
        .map(|&d| match fast {
            true => next_smooth(d).ok_or_else(|| no_smooth_number(d)),
            false => Ok(d),
        })
        .collect::<Result<Vec<usize>>>()?;
    let mut fft_size = padded.clone();
    if let Some(first) = fft_size.first_mut() {
        *first = *first / 2 + 1;
    }
    Ok((padded, fft_size))
}

pub(crate) fn no_smooth_number(n: impl std::fmt::Display) -> Error {
    Error::InvalidParameter(format!("no 7-smooth size at or above {n} is representable"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(next_smooth(0), Some(1));
        assert_eq!(next_smooth(1), Some(1));
        assert_eq!(next_smooth(11), Some(12));
        assert_eq!(next_smooth(13), Some(14));
        assert_eq!(next_smooth(97), Some(98));
        assert_eq!(next_smooth(121), Some(125));
        assert_eq!(next_smooth(32769), Some(32805));
    }

    #[test]
    fn test_sizes() {
        let (padded, fft) = real_to_complex_sizes(&[121, 129, 10], true).unwrap();
        assert_eq!(padded, vec![125, 135, 10]);
        assert_eq!(fft, vec![63, 135, 10]);

        let (padded, fft) = real_to_complex_sizes(&[121, 7], false).unwrap();
        assert_eq!(padded, vec![121, 7]);
        assert_eq!(fft, vec![61, 7]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_large_inputs_finish() {
        let n = (1usize << 62) + 1;
        let s = next_smooth(n).unwrap();
        assert!(s >= n && is_smooth(s));
        assert_eq!(s, 4_611_840_800_000_000_000);
        assert_eq!(next_smooth(usize::MAX), None);
        assert!(real_to_complex_sizes(&[usize::MAX], true).is_err());
        assert!(real_to_complex_sizes(&[usize::MAX], false).is_ok());
    }

    proptest! {
        #[test]
        fn prop_next_smooth_is_least(n in 1usize..20_000) {
            let s = next_smooth(n).unwrap();
            prop_assert!(s >= n);
            prop_assert!(is_smooth(s));
            prop_assert!((n..s).all(|k| !is_smooth(k)));
        }
    }
}
