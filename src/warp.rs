//! Random affine perturbations of a patch for filter initialization.
//!
//! Each perturbation is a small rotation plus per-coefficient jitter about
//! the patch center, resampled bilinearly with mirror (reflect-101) borders.

use rand::Rng;

/// 2x3 affine map from destination to source coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    m: [f64; 6],
}

impl Affine {
    /// Identity map.
    pub fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    /// Draws a random perturbation centered on `(cx, cy)`.
    ///
    /// The rotation angle and each linear coefficient jitter are drawn from
    /// `[-scale, scale)`, with `scale` capped at 1. A non-positive or
    /// non-finite `scale` yields the identity.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, scale: f64, cx: f64, cy: f64) -> Self {
        if !(scale.is_finite() && scale > 0.0) {
            return Self::identity();
        }
        let scale = scale.min(1.0);
        let ang: f64 = rng.random_range(-scale..scale);
        let (s, c) = ang.sin_cos();
        let a = c + rng.random_range(-scale..scale);
        let b = -s + rng.random_range(-scale..scale);
        let d = s + rng.random_range(-scale..scale);
        let e = c + rng.random_range(-scale..scale);
        Self {
            m: [a, b, cx - (a * cx + b * cy), d, e, cy - (d * cx + e * cy)],
        }
    }

    #[inline]
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
    }
}

/// Resamples `src` (`width x height`, row-major) through `map` into `dst`.
pub fn warp_bilinear(src: &[f64], width: usize, height: usize, map: &Affine, dst: &mut [f64]) {
    let w = width as isize;
    let h = height as isize;
    for (y, row) in dst.chunks_exact_mut(width).take(height).enumerate() {
        for (x, out) in row.iter_mut().enumerate() {
            let (u, v) = map.apply(x as f64, y as f64);
            let (x0, fx) = split_coord(u, w);
            let (y0, fy) = split_coord(v, h);

            let xa = reflect(x0, w);
            let xb = reflect(x0 + 1, w);
            let ya = reflect(y0, h);
            let yb = reflect(y0 + 1, h);

            let top = src[ya * width + xa] * (1.0 - fx) + src[ya * width + xb] * fx;
            let bottom = src[yb * width + xa] * (1.0 - fx) + src[yb * width + xb] * fx;
            *out = top * (1.0 - fy) + bottom * fy;
        }
    }
}

/// Integer cell and fractional weight of a source coordinate.
///
/// Non-finite coordinates map to cell 0; finite ones are clamped to a few
/// periods around the image so the cell and its right neighbour stay
/// representable.
fn split_coord(u: f64, len: isize) -> (isize, f64) {
    if !u.is_finite() {
        return (0, 0.0);
    }
    let limit = (4 * len.max(1)) as f64;
    let u = u.clamp(-limit, limit);
    let cell = u.floor();
    (cell as isize, u - cell)
}

/// Mirror index into `[0, len)` without repeating the edge sample.
fn reflect(idx: isize, len: isize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut r = idx.rem_euclid(period);
    if r >= len {
        r = period - r;
    }
    r as usize
}
