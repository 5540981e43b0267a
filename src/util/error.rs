//! Error types for mosse.

use crate::region::Region;
use thiserror::Error;

/// Result alias for tracker operations.
pub type MosseResult<T> = std::result::Result<T, MosseError>;

/// Errors that can occur while building, running, or inspecting a tracker.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MosseError {
    /// Region is out of frame bounds, undersized, or otherwise unusable.
    #[error("invalid region {region:?}: {reason}")]
    InvalidRegion {
        region: Region,
        reason: &'static str,
    },
    /// `update` or `dump` was called before a successful `init`.
    #[error("tracker is not initialized")]
    NotInitialized,
    /// The frame cannot hold the tracked region at its current position.
    #[error("frame {frame_width}x{frame_height} cannot hold region {region:?}")]
    FrameMismatch {
        region: Region,
        frame_width: usize,
        frame_height: usize,
    },
    /// The correlation response was non-finite or below the confidence thresholds.
    #[error("tracking lost (peak={peak}, psr={psr}, peak_to_mean={peak_to_mean})")]
    TrackingLost {
        peak: f64,
        psr: f64,
        peak_to_mean: f64,
    },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A buffer handed to a fixed-size operation has the wrong length.
    #[error("size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    /// Configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// A diagnostic sink failed to write.
    #[error("dump failed: {reason}")]
    Dump { reason: String },
}

impl MosseError {
    /// Returns `true` when the caller may simply retry with the next frame.
    ///
    /// Every other error requires a fresh `init` (or a fix at the call site).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MosseError::FrameMismatch { .. } | MosseError::TrackingLost { .. }
        )
    }
}

impl From<std::io::Error> for MosseError {
    fn from(err: std::io::Error) -> Self {
        MosseError::Dump {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MosseError;
    use crate::region::Region;

    #[test]
    fn recoverable_errors_are_frame_level() {
        let lost = MosseError::TrackingLost {
            peak: 0.1,
            psr: 2.0,
            peak_to_mean: 1.5,
        };
        assert!(lost.is_recoverable());

        let mismatch = MosseError::FrameMismatch {
            region: Region::new(0, 0, 8, 8),
            frame_width: 4,
            frame_height: 4,
        };
        assert!(mismatch.is_recoverable());

        assert!(!MosseError::NotInitialized.is_recoverable());
        assert!(!MosseError::InvalidRegion {
            region: Region::new(0, 0, 0, 8),
            reason: "zero width",
        }
        .is_recoverable());
    }
}
