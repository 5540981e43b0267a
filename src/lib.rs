//! Adaptive MOSSE correlation-filter tracker.
//!
//! A [`Tracker`] learns a frequency-domain filter from a single seed region
//! and follows that region across frames by correlating the filter against
//! each new patch, moving to the response peak, and blending in the new
//! appearance with an exponential learning rate.
//!
//! The transform backend is pluggable through [`SpectralEngine`]:
//! [`FftEngine`] (rustfft, the default), [`DirectDft`] (separable direct sum,
//! useful as a reference), and `ParFftEngine` behind the `rayon` feature.
//! The `simd` feature vectorizes preprocessing, `image-io` adds loading and
//! PNG dumps, and `tracing` emits spans and events around init and update.

pub mod dump;
pub mod engine;
pub mod filter;
pub mod image;
pub mod peak;
pub mod preprocess;
pub mod region;
pub mod spectrum;
mod trace;
pub mod tracker;
pub mod util;
pub mod warp;
pub mod window;

pub use dump::{DumpSink, TextSink};
#[cfg(feature = "image-io")]
pub use dump::PngSink;
pub use engine::{DirectDft, FftEngine, SpectralEngine};
#[cfg(feature = "rayon")]
pub use engine::ParFftEngine;
pub use filter::FilterState;
pub use image::{ImageView, OwnedImage, Pixel};
pub use peak::{Confidence, ResponsePeak};
pub use region::Region;
pub use rustfft::num_complex::Complex64;
pub use spectrum::Spectrum;
pub use tracker::{TrackReport, Tracker, TrackerConfig};
pub use util::{MosseError, MosseResult};
pub use window::Window;
