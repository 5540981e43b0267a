//! Frame views and sample conversion.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride. The
//! tracker only ever borrows frames for the duration of a call.

use crate::region::Region;
use crate::util::{MosseError, MosseResult};

#[cfg(feature = "image-io")]
pub mod io;
mod owned;

pub use owned::OwnedImage;

/// Single-channel sample type accepted by the tracker.
///
/// Intensities may be in `[0, 255]` (integer samples) or normalized `[0, 1]`;
/// the preprocessor log-compresses either range.
pub trait Pixel: Copy {
    /// Returns the sample as a floating-point intensity.
    fn intensity(self) -> f64;
}

impl Pixel for u8 {
    #[inline]
    fn intensity(self) -> f64 {
        f64::from(self)
    }
}

impl Pixel for u16 {
    #[inline]
    fn intensity(self) -> f64 {
        f64::from(self)
    }
}

impl Pixel for f32 {
    #[inline]
    fn intensity(self) -> f64 {
        f64::from(self)
    }
}

impl Pixel for f64 {
    #[inline]
    fn intensity(self) -> f64 {
        self
    }
}

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> MosseResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> MosseResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(MosseError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy view of `region` into the same backing buffer.
    pub fn roi(&self, region: Region) -> MosseResult<ImageView<'a, T>> {
        if region.width == 0 || region.height == 0 {
            return Err(MosseError::InvalidRegion {
                region,
                reason: "region has zero width or height",
            });
        }
        if !region.fits_within(self.width, self.height) {
            return Err(MosseError::InvalidRegion {
                region,
                reason: "region exceeds frame bounds",
            });
        }

        let start = region
            .y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(region.x))
            .ok_or(MosseError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(MosseError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, region.width, region.height, self.stride)
    }
}

impl<T: Pixel> ImageView<'_, T> {
    /// Copies `region` into `out` as row-major floating-point intensities.
    ///
    /// `out` must hold exactly `region.width * region.height` samples.
    pub fn copy_region_into(&self, region: Region, out: &mut [f64]) -> MosseResult<()> {
        let roi = self.roi(region)?;
        let expected = region.area();
        if out.len() != expected {
            return Err(MosseError::SizeMismatch {
                expected,
                got: out.len(),
            });
        }
        for (y, dst) in out.chunks_exact_mut(region.width).enumerate() {
            let src = roi.row(y).ok_or(MosseError::BufferTooSmall {
                needed: (y + 1) * roi.stride(),
                got: roi.as_slice().len(),
            })?;
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s.intensity();
            }
        }
        Ok(())
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> MosseResult<usize> {
    if width == 0 || height == 0 {
        return Err(MosseError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(MosseError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(MosseError::InvalidDimensions { width, height })?;
    Ok(needed)
}
