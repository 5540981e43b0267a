//! Spectral engines: 2D discrete transforms over a fixed patch size.
//!
//! Every engine implements the same definitions:
//!
//! - forward: `F(u,v) = sum_{x,y} f(x,y) * exp(-2*pi*i*(u*x/w + v*y/h))`
//! - inverse: `f(x,y) = 1/(w*h) * sum_{u,v} F(u,v) * exp(+2*pi*i*(u*x/w + v*y/h))`
//!
//! so the tracker can swap a direct-summation reference, a planned FFT, or a
//! row/column-parallel FFT without any change in filter logic. Engines also
//! own window precomputation so an accelerated backend can replace both.

use crate::spectrum::Spectrum;
use crate::util::{MosseError, MosseResult};
use crate::window::Window;
use rustfft::num_complex::Complex64;

mod direct;
mod fft;

#[cfg(feature = "rayon")]
mod rayon;

pub use direct::DirectDft;
pub use fft::FftEngine;

#[cfg(feature = "rayon")]
pub use self::rayon::ParFftEngine;

/// Forward/inverse 2D transform over a size fixed at planning time.
pub trait SpectralEngine {
    /// Plans an engine for `width x height` buffers.
    fn plan(width: usize, height: usize) -> MosseResult<Self>
    where
        Self: Sized;

    /// Planned width.
    fn width(&self) -> usize;

    /// Planned height.
    fn height(&self) -> usize;

    /// In-place forward transform of a row-major complex buffer.
    fn forward_in_place(&mut self, data: &mut [Complex64]) -> MosseResult<()>;

    /// In-place inverse transform, including the `1/(w*h)` normalization.
    fn inverse_in_place(&mut self, data: &mut [Complex64]) -> MosseResult<()>;

    /// Builds the tapering window for the planned size.
    fn window(&self) -> MosseResult<Window> {
        Window::hann(self.width(), self.height())
    }

    /// Transforms a real spatial array into `out`.
    fn forward(&mut self, input: &[f64], out: &mut Spectrum) -> MosseResult<()> {
        check_len(self.width() * self.height(), input.len())?;
        check_shape(self.width(), self.height(), out)?;
        for (dst, &src) in out.data_mut().iter_mut().zip(input) {
            *dst = Complex64::new(src, 0.0);
        }
        self.forward_in_place(out.data_mut())
    }

    /// Allocating form of [`SpectralEngine::forward`].
    fn forward2d(&mut self, input: &[f64]) -> MosseResult<Spectrum> {
        let mut out = Spectrum::zeros(self.width(), self.height())?;
        self.forward(input, &mut out)?;
        Ok(out)
    }

    /// Inverse-transforms `input`, keeping only the real part.
    fn inverse2d(&mut self, input: &Spectrum) -> MosseResult<Vec<f64>> {
        check_shape(self.width(), self.height(), input)?;
        let mut buf = input.data().to_vec();
        self.inverse_in_place(&mut buf)?;
        Ok(buf.iter().map(|c| c.re).collect())
    }
}

pub(crate) fn check_len(expected: usize, got: usize) -> MosseResult<()> {
    if expected != got {
        return Err(MosseError::SizeMismatch { expected, got });
    }
    Ok(())
}

fn check_shape(width: usize, height: usize, spectrum: &Spectrum) -> MosseResult<()> {
    if spectrum.width() != width || spectrum.height() != height {
        return Err(MosseError::SizeMismatch {
            expected: width * height,
            got: spectrum.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_plan_size(width: usize, height: usize) -> MosseResult<usize> {
    if width == 0 || height == 0 {
        return Err(MosseError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(MosseError::InvalidDimensions { width, height })
}

/// Writes the column-major copy of a row-major `width x height` buffer.
pub(crate) fn transpose(src: &[Complex64], width: usize, height: usize, dst: &mut [Complex64]) {
    for (y, row) in src.chunks_exact(width).take(height).enumerate() {
        for (x, &value) in row.iter().enumerate() {
            dst[x * height + y] = value;
        }
    }
}
