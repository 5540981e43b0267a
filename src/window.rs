//! Separable Hann window used to taper patches before the transform.
//!
//! `weight(x, y) = hann(x, w) * hann(y, h)` where
//! `hann(i, n) = 0.5 * (1 - cos(2*pi*i / (n - 1)))` for `n > 1`, else `1`.
//! The window is built once per tracker and never mutated afterwards.

use crate::util::math::hann;
use crate::util::{MosseError, MosseResult};

/// Immutable `width x height` grid of weights in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    width: usize,
    height: usize,
    weights: Vec<f64>,
}

impl Window {
    /// Builds the separable Hann window for a `width x height` patch.
    pub fn hann(width: usize, height: usize) -> MosseResult<Self> {
        let (wx, wy) = axis_weights(width, height)?;
        let mut weights = Vec::with_capacity(width * height);
        for &vy in &wy {
            weights.extend(wx.iter().map(|&vx| vx * vy));
        }
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    /// Builds the window with rows computed in parallel.
    ///
    /// Produces the same weights as [`Window::hann`]; each row is an
    /// independent product of the two axis profiles.
    #[cfg(feature = "rayon")]
    pub fn hann_par(width: usize, height: usize) -> MosseResult<Self> {
        use rayon::prelude::*;

        let (wx, wy) = axis_weights(width, height)?;
        let mut weights = vec![0.0f64; width * height];
        weights
            .par_chunks_mut(width)
            .zip(wy.par_iter())
            .for_each(|(row, &vy)| {
                for (dst, &vx) in row.iter_mut().zip(&wx) {
                    *dst = vx * vy;
                }
            });
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    #[cfg(test)]
    pub(crate) fn uniform(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            weights: vec![1.0; width * height],
        }
    }

    /// Window width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Window height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight at `(x, y)`, or `None` outside the window.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.weights.get(y * self.width + x).copied()
    }
}

fn axis_weights(width: usize, height: usize) -> MosseResult<(Vec<f64>, Vec<f64>)> {
    if width == 0 || height == 0 {
        return Err(MosseError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(MosseError::InvalidDimensions { width, height })?;
    let wx = (0..width).map(|i| hann(i, width)).collect();
    let wy = (0..height).map(|i| hann(i, height)).collect();
    Ok((wx, wy))
}
