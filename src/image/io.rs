//! Convenience helpers for loading and writing frames via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::OwnedImage;
use crate::util::{MosseError, MosseResult};
use std::path::Path;

/// Creates an owned frame from a dynamic image, converting to 8-bit luma.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> MosseResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk and converts it to a grayscale owned frame.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> MosseResult<OwnedImage> {
    let img = image::open(path).map_err(|err| MosseError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Writes a row-major 8-bit grayscale buffer to disk; format follows the extension.
pub fn save_gray_image<P: AsRef<Path>>(
    path: P,
    data: &[u8],
    width: usize,
    height: usize,
) -> MosseResult<()> {
    let expected = width
        .checked_mul(height)
        .ok_or(MosseError::InvalidDimensions { width, height })?;
    if data.len() != expected {
        return Err(MosseError::SizeMismatch {
            expected,
            got: data.len(),
        });
    }
    let w = u32::try_from(width).map_err(|_| MosseError::InvalidDimensions { width, height })?;
    let h = u32::try_from(height).map_err(|_| MosseError::InvalidDimensions { width, height })?;
    let img = image::GrayImage::from_raw(w, h, data.to_vec()).ok_or(MosseError::BufferTooSmall {
        needed: expected,
        got: data.len(),
    })?;
    img.save(path).map_err(|err| MosseError::ImageIo {
        reason: err.to_string(),
    })
}
