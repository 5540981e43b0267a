//! Fixed-size complex spectra and the elementwise operators on them.

use crate::util::{MosseError, MosseResult};
use rustfft::num_complex::Complex64;

/// Row-major `width x height` grid of complex frequency coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    width: usize,
    height: usize,
    data: Vec<Complex64>,
}

impl Spectrum {
    /// Allocates an all-zero spectrum.
    pub fn zeros(width: usize, height: usize) -> MosseResult<Self> {
        let len = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![Complex64::new(0.0, 0.0); len],
        })
    }

    /// Wraps existing coefficients; `data.len()` must equal `width * height`.
    pub fn from_vec(data: Vec<Complex64>, width: usize, height: usize) -> MosseResult<Self> {
        let len = checked_area(width, height)?;
        if data.len() != len {
            return Err(MosseError::SizeMismatch {
                expected: len,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Spectrum width (number of horizontal frequencies).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Spectrum height (number of vertical frequencies).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`; spectra are never empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major coefficients.
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Mutable row-major coefficients.
    pub fn data_mut(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    /// Coefficient at frequency `(u, v)`.
    pub fn get(&self, u: usize, v: usize) -> Option<Complex64> {
        if u >= self.width || v >= self.height {
            return None;
        }
        self.data.get(v * self.width + u).copied()
    }

    pub(crate) fn ensure_same_shape(&self, other: &Spectrum) -> MosseResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(MosseError::SizeMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(())
    }
}

/// Elementwise product `A(u,v) * B(u,v)`.
pub fn mul(a: &Spectrum, b: &Spectrum) -> MosseResult<Spectrum> {
    a.ensure_same_shape(b)?;
    let data = a.data.iter().zip(&b.data).map(|(x, y)| x * y).collect();
    Spectrum::from_vec(data, a.width, a.height)
}

/// Elementwise complex conjugate.
pub fn conj(a: &Spectrum) -> Spectrum {
    Spectrum {
        width: a.width,
        height: a.height,
        data: a.data.iter().map(|c| c.conj()).collect(),
    }
}

/// Elementwise regularized quotient `A(u,v) / (B(u,v) + eps)`.
pub fn div_reg(a: &Spectrum, b: &Spectrum, eps: f64) -> MosseResult<Spectrum> {
    a.ensure_same_shape(b)?;
    let data = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| div_reg_cell(x, y, eps))
        .collect();
    Spectrum::from_vec(data, a.width, a.height)
}

/// Regularized quotient of a single cell.
///
/// The denominator is `b + eps`; if its magnitude still falls below `eps`
/// (only possible for complex `b` near `-eps`) it is replaced by `eps`, so
/// the divisor magnitude is never below `eps`.
#[inline]
pub fn div_reg_cell(a: Complex64, b: Complex64, eps: f64) -> Complex64 {
    let mut denom = b + eps;
    if denom.norm() < eps {
        denom = Complex64::new(eps, 0.0);
    }
    a / denom
}

fn checked_area(width: usize, height: usize) -> MosseResult<usize> {
    if width == 0 || height == 0 {
        return Err(MosseError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(MosseError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::{conj, div_reg, div_reg_cell, mul, Spectrum};
    use rustfft::num_complex::Complex64;

    fn spec(values: &[(f64, f64)]) -> Spectrum {
        let data = values.iter().map(|&(re, im)| Complex64::new(re, im)).collect();
        Spectrum::from_vec(data, values.len(), 1).unwrap()
    }

    #[test]
    fn mul_and_conj_are_elementwise() {
        let a = spec(&[(1.0, 2.0), (0.0, -1.0)]);
        let b = spec(&[(3.0, -1.0), (2.0, 0.0)]);
        let p = mul(&a, &b).unwrap();
        assert_eq!(p.data()[0], Complex64::new(5.0, 5.0));
        assert_eq!(p.data()[1], Complex64::new(0.0, -2.0));

        let c = conj(&a);
        assert_eq!(c.data()[0], Complex64::new(1.0, -2.0));
        assert_eq!(c.data()[1], Complex64::new(0.0, 1.0));
    }

    #[test]
    fn div_reg_adds_eps_to_denominator() {
        let a = spec(&[(2.0, 0.0)]);
        let b = spec(&[(1.0, 0.0)]);
        let q = div_reg(&a, &b, 1.0).unwrap();
        assert!((q.data()[0].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn div_reg_is_bounded_by_eps() {
        let eps = 1e-3;
        let a = Complex64::new(1.0, 1.0);
        for b in [
            Complex64::new(0.0, 0.0),
            Complex64::new(-eps, 0.0),
            Complex64::new(-eps, 1e-9),
        ] {
            let q = div_reg_cell(a, b, eps);
            assert!(q.is_finite());
            assert!(q.norm() <= a.norm() / eps + 1e-6);
        }
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let a = spec(&[(1.0, 0.0), (1.0, 0.0)]);
        let b = spec(&[(1.0, 0.0)]);
        assert!(mul(&a, &b).is_err());
        assert!(div_reg(&a, &b, 1e-5).is_err());
    }
}
