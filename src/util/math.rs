//! Scalar helpers shared by the window, response, and peak code.

use std::f64::consts::TAU;

/// Hann coefficient `0.5 * (1 - cos(2*pi*i / (n - 1)))`, or `1` when `n <= 1`.
#[inline]
pub(crate) fn hann(i: usize, n: usize) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    0.5 * (1.0 - (TAU * i as f64 / (n - 1) as f64).cos())
}

/// Unnormalized isotropic gaussian evaluated at offset `(dx, dy)`.
#[inline]
pub(crate) fn gaussian(dx: f64, dy: f64, sigma: f64) -> f64 {
    (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
}

/// Converts a cell index into a signed offset from `center` on a circular axis.
///
/// Offsets larger than half the axis length are wrapped to negative values,
/// which matches the periodicity of circular correlation.
#[inline]
pub(crate) fn wrap_offset(index: usize, center: usize, len: usize) -> isize {
    let len_i = len as isize;
    let mut d = index as isize - center as isize;
    d = d.rem_euclid(len_i);
    if d > len_i / 2 {
        d -= len_i;
    }
    d
}
