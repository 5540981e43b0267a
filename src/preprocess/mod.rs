//! Patch preprocessing: log compression, normalization, and windowing.
//!
//! Each cell becomes `window * (ln(v + 1) - mean) / std`, where the mean and
//! standard deviation are taken over the log-compressed patch. A standard
//! deviation below [`MIN_STD`] is replaced by `1` so flat patches produce an
//! all-zero output instead of dividing by zero.

use crate::region::Region;
use crate::util::{MosseError, MosseResult};
use crate::window::Window;

#[cfg(feature = "simd")]
mod simd;

/// Standard deviations below this are treated as a flat patch.
pub const MIN_STD: f64 = 1e-6;

/// Mean and population standard deviation of a sample set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

/// Preprocesses a `width x height` patch into `out`.
///
/// Negative intensities are clamped to zero before the log. Fails with
/// [`MosseError::InvalidRegion`] for an empty patch and
/// [`MosseError::SizeMismatch`] if the buffers disagree with the window.
pub fn preprocess(
    patch: &[f64],
    window: &Window,
    width: usize,
    height: usize,
    out: &mut [f64],
) -> MosseResult<PatchStats> {
    let len = width * height;
    if len == 0 {
        return Err(MosseError::InvalidRegion {
            region: Region::new(0, 0, width, height),
            reason: "empty patch",
        });
    }
    for got in [patch.len(), window.weights().len(), out.len()] {
        if got != len {
            return Err(MosseError::SizeMismatch { expected: len, got });
        }
    }

    for (dst, &v) in out.iter_mut().zip(patch) {
        *dst = (v.max(0.0) + 1.0).ln();
    }

    let stats = stats(out);
    let std = if stats.std < MIN_STD { 1.0 } else { stats.std };
    normalize_window(out, window.weights(), stats.mean, 1.0 / std);
    Ok(stats)
}

/// Computes mean and population standard deviation.
pub fn stats(values: &[f64]) -> PatchStats {
    if values.is_empty() {
        return PatchStats {
            mean: 0.0,
            std: 0.0,
        };
    }
    let (sum, sum_sq) = sums(values);
    let n = values.len() as f64;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    PatchStats {
        mean,
        std: variance.sqrt(),
    }
}

#[cfg(not(feature = "simd"))]
fn sums(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((0.0, 0.0), |(s, s2), &v| (s + v, s2 + v * v))
}

#[cfg(feature = "simd")]
fn sums(values: &[f64]) -> (f64, f64) {
    simd::sums(values)
}

#[cfg(not(feature = "simd"))]
fn normalize_window(values: &mut [f64], weights: &[f64], mean: f64, inv_std: f64) {
    for (v, &w) in values.iter_mut().zip(weights) {
        *v = (*v - mean) * inv_std * w;
    }
}

#[cfg(feature = "simd")]
fn normalize_window(values: &mut [f64], weights: &[f64], mean: f64, inv_std: f64) {
    simd::normalize_window(values, weights, mean, inv_std);
}
