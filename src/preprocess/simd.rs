//! SIMD paths for the preprocessing reductions using the `wide` crate.
//!
//! Processes four `f64` lanes at a time with a scalar tail.

use wide::f64x4;

const LANES: usize = 4;

#[inline]
fn load(slice: &[f64]) -> f64x4 {
    f64x4::from([slice[0], slice[1], slice[2], slice[3]])
}

#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

/// Returns `(sum, sum of squares)`.
pub(super) fn sums(values: &[f64]) -> (f64, f64) {
    let mut sum_v = f64x4::ZERO;
    let mut sum_sq_v = f64x4::ZERO;
    let chunks = values.chunks_exact(LANES);
    let tail = chunks.remainder();
    for chunk in chunks {
        let v = load(chunk);
        sum_v += v;
        sum_sq_v += v * v;
    }
    let mut sum = hsum(sum_v);
    let mut sum_sq = hsum(sum_sq_v);
    for &v in tail {
        sum += v;
        sum_sq += v * v;
    }
    (sum, sum_sq)
}

/// Applies `(v - mean) * inv_std * w` in place.
pub(super) fn normalize_window(values: &mut [f64], weights: &[f64], mean: f64, inv_std: f64) {
    let mean_v = f64x4::splat(mean);
    let inv_std_v = f64x4::splat(inv_std);
    let simd_end = values.len() / LANES * LANES;

    let mut i = 0;
    while i < simd_end {
        let v = load(&values[i..]);
        let w = load(&weights[i..]);
        let out = ((v - mean_v) * inv_std_v * w).to_array();
        values[i..i + LANES].copy_from_slice(&out);
        i += LANES;
    }
    while i < values.len() {
        values[i] = (values[i] - mean) * inv_std * weights[i];
        i += 1;
    }
}
