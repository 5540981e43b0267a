//! MOSSE tracker: filter lifecycle over a fixed-size region.
//!
//! A tracker starts uninitialized. `init` validates the seed region, sizes
//! every buffer to it, and trains the filter; each `update` correlates the
//! filter against the patch at the current position, moves the region to the
//! response peak, and adapts the filter at the new position. A failed `init`
//! leaves the tracker uninitialized; a failed `update` leaves the region and
//! filter exactly as they were.

mod config;

pub use config::{TrackReport, TrackerConfig};

use crate::dump::DumpSink;
use crate::engine::{FftEngine, SpectralEngine};
use crate::filter::FilterState;
use crate::image::{ImageView, Pixel};
use crate::peak::{confidence, locate_peak};
use crate::preprocess::preprocess;
use crate::region::Region;
use crate::spectrum::Spectrum;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::gaussian;
use crate::util::{MosseError, MosseResult};
use crate::warp::{warp_bilinear, Affine};
use crate::window::Window;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Buffers and filter owned by an initialized tracker, all sized at `init`.
struct TrackState<E> {
    engine: E,
    region: Region,
    window: Window,
    target: Spectrum,
    filter: FilterState,
    patch: Vec<f64>,
    features: Vec<f64>,
    spectrum: Spectrum,
    scratch: Spectrum,
    response: Vec<f64>,
}

impl<E: SpectralEngine> TrackState<E> {
    /// Crops `region` from `frame`, preprocesses it, and transforms it into `spectrum`.
    fn observe<T: Pixel>(&mut self, frame: &ImageView<'_, T>, region: Region) -> MosseResult<()> {
        frame.copy_region_into(region, &mut self.patch)?;
        self.transform_patch()
    }

    fn transform_patch(&mut self) -> MosseResult<()> {
        let (w, h) = (self.region.width, self.region.height);
        preprocess(&self.patch, &self.window, w, h, &mut self.features)?;
        self.engine.forward(&self.features, &mut self.spectrum)
    }

    /// Computes the spatial correlation response of the current `spectrum`.
    fn correlate(&mut self) -> MosseResult<()> {
        self.filter.correlate(&self.spectrum, &mut self.scratch)?;
        self.engine.inverse_in_place(self.scratch.data_mut())?;
        for (dst, src) in self.response.iter_mut().zip(self.scratch.data()) {
            *dst = src.re;
        }
        Ok(())
    }
}

/// Single-object correlation-filter tracker.
///
/// The spectral engine is chosen by type; [`FftEngine`] is the default.
pub struct Tracker<E: SpectralEngine = FftEngine> {
    config: TrackerConfig,
    state: Option<TrackState<E>>,
    last_report: Option<TrackReport>,
}

impl<E: SpectralEngine> Default for Tracker<E> {
    fn default() -> Self {
        Self {
            config: TrackerConfig::default(),
            state: None,
            last_report: None,
        }
    }
}

impl<E: SpectralEngine> Tracker<E> {
    /// Creates an uninitialized tracker after validating `config`.
    pub fn new(config: TrackerConfig) -> MosseResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
            last_report: None,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Returns `true` after a successful `init`.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Current region, if initialized.
    pub fn region(&self) -> Option<Region> {
        self.state.as_ref().map(|s| s.region)
    }

    /// Report of the most recent successful update.
    pub fn last_report(&self) -> Option<&TrackReport> {
        self.last_report.as_ref()
    }

    /// Current filter state, if initialized.
    pub fn filter(&self) -> Option<&FilterState> {
        self.state.as_ref().map(|s| &s.filter)
    }

    /// Precomputed window, if initialized.
    pub fn window(&self) -> Option<&Window> {
        self.state.as_ref().map(|s| &s.window)
    }

    /// Spatial response of the most recent update attempt, if initialized.
    pub fn response(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.response.as_slice())
    }

    /// Drops every buffer and returns to the uninitialized state.
    pub fn reset(&mut self) {
        self.state = None;
        self.last_report = None;
    }

    /// Trains a new filter on `region` of `frame`.
    ///
    /// Any previous track is discarded first, so a failure leaves the tracker
    /// uninitialized.
    pub fn init<T: Pixel>(&mut self, frame: ImageView<'_, T>, region: Region) -> MosseResult<()> {
        let _span = trace_span!(
            "tracker_init",
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height
        )
        .entered();
        self.reset();

        let min = self.config.min_region_size;
        if region.width < min || region.height < min {
            return Err(MosseError::InvalidRegion {
                region,
                reason: "region is smaller than the minimum size",
            });
        }
        if !region.fits_within(frame.width(), frame.height()) {
            return Err(MosseError::InvalidRegion {
                region,
                reason: "region exceeds frame bounds",
            });
        }

        let (w, h) = (region.width, region.height);
        let len = region.area();
        let mut engine = E::plan(w, h)?;
        let window = engine.window()?;
        let target = desired_response(&mut engine, self.config.sigma_for(w, h))?;

        let mut patch = vec![0.0; len];
        frame.copy_region_into(region, &mut patch)?;
        let mut features = vec![0.0; len];
        let mut spectrum = Spectrum::zeros(w, h)?;
        preprocess(&patch, &window, w, h, &mut features)?;
        engine.forward(&features, &mut spectrum)?;
        let filter = FilterState::train(&target, &spectrum, self.config.reg_eps)?;

        let mut state = TrackState {
            engine,
            region,
            window,
            target,
            filter,
            patch,
            features,
            spectrum,
            scratch: Spectrum::zeros(w, h)?,
            response: vec![0.0; len],
        };
        self.train_perturbations(&mut state)?;

        trace_event!("tracker_initialized", width = w, height = h);
        self.state = Some(state);
        Ok(())
    }

    /// Folds randomly warped copies of the seed patch into the new filter.
    fn train_perturbations(&self, state: &mut TrackState<E>) -> MosseResult<()> {
        let count = self.config.init_perturbations;
        if count == 0 {
            return Ok(());
        }
        let (w, h) = (state.region.width, state.region.height);
        let (cx, cy) = ((w as f64 - 1.0) / 2.0, (h as f64 - 1.0) / 2.0);
        let mut rng = StdRng::seed_from_u64(self.config.perturbation_seed);
        let seed_patch = state.patch.clone();
        for _ in 0..count {
            let map = Affine::random(&mut rng, self.config.perturbation_scale, cx, cy);
            warp_bilinear(&seed_patch, w, h, &map, &mut state.patch);
            state.transform_patch()?;
            state
                .filter
                .accumulate(&state.target, &state.spectrum, self.config.reg_eps)?;
        }
        state.patch = seed_patch;
        Ok(())
    }

    /// Tracks into `frame` with learning rate `learning_rate`; returns the new region.
    pub fn update<T: Pixel>(
        &mut self,
        frame: ImageView<'_, T>,
        learning_rate: f64,
    ) -> MosseResult<Region> {
        self.update_with_report(frame, learning_rate)
            .map(|report| report.region)
    }

    /// [`Tracker::update`] with the configured learning rate.
    pub fn update_default<T: Pixel>(&mut self, frame: ImageView<'_, T>) -> MosseResult<Region> {
        let eta = self.config.learning_rate;
        self.update(frame, eta)
    }

    /// Tracks into `frame` and returns the full report.
    ///
    /// On `FrameMismatch` or `TrackingLost` the region and filter are left
    /// unchanged so the caller may retry with a later frame.
    pub fn update_with_report<T: Pixel>(
        &mut self,
        frame: ImageView<'_, T>,
        learning_rate: f64,
    ) -> MosseResult<TrackReport> {
        let config = &self.config;
        let state = self.state.as_mut().ok_or(MosseError::NotInitialized)?;
        let _span = trace_span!(
            "tracker_update",
            x = state.region.x,
            y = state.region.y
        )
        .entered();

        if !(0.0..=1.0).contains(&learning_rate) {
            return Err(MosseError::InvalidConfig(
                "learning rate must lie in [0, 1]",
            ));
        }
        let (fw, fh) = (frame.width(), frame.height());
        let region = state.region;
        if !region.fits_within(fw, fh) {
            return Err(MosseError::FrameMismatch {
                region,
                frame_width: fw,
                frame_height: fh,
            });
        }

        state.observe(&frame, region)?;
        state.correlate()?;

        let (w, h) = (region.width, region.height);
        let peak = locate_peak(&state.response, w, h).ok_or(MosseError::SizeMismatch {
            expected: region.area(),
            got: state.response.len(),
        })?;
        let radius = config.sidelobe_radius_for(w, h);
        let conf = confidence(&state.response, w, h, &peak, radius);
        trace_event!(
            "response_peak",
            dx = peak.dx,
            dy = peak.dy,
            psr = conf.psr,
            peak_to_mean = conf.peak_to_mean
        );

        let confident = peak.value.is_finite()
            && conf.psr >= config.min_psr
            && conf.peak_to_mean >= config.min_peak_to_mean;
        if !confident {
            trace_warn!(
                "tracking_lost",
                peak = peak.value,
                psr = conf.psr,
                peak_to_mean = conf.peak_to_mean
            );
            return Err(MosseError::TrackingLost {
                peak: peak.value,
                psr: conf.psr,
                peak_to_mean: conf.peak_to_mean,
            });
        }

        let (moved, near_boundary) = region.translate_clamped(peak.dx, peak.dy, fw, fh);
        if near_boundary {
            trace_warn!("near_boundary", x = moved.x, y = moved.y);
        }

        state.observe(&frame, moved)?;
        state
            .filter
            .adapt(&state.target, &state.spectrum, learning_rate, config.reg_eps)?;
        state.region = moved;

        let report = TrackReport {
            region: moved,
            dx: peak.dx,
            dy: peak.dy,
            subpixel_dx: peak.dx as f64 + peak.sub_dx,
            subpixel_dy: peak.dy as f64 + peak.sub_dy,
            peak: peak.value,
            psr: conf.psr,
            peak_to_mean: conf.peak_to_mean,
            near_boundary,
        };
        self.last_report = Some(report);
        Ok(report)
    }

    /// Writes the window, last response, and filter spectra to `sink`.
    ///
    /// Matrices: `window`, `response`, `filter_re`, `filter_im`, `filter_mag`
    /// (the filter ones `width x height` in frequency order).
    pub fn dump(&self, sink: &mut dyn DumpSink) -> MosseResult<()> {
        let state = self.state.as_ref().ok_or(MosseError::NotInitialized)?;
        let (w, h) = (state.region.width, state.region.height);
        let h_spec = state.filter.filter().data();

        sink.write_matrix("window", state.window.weights(), w, h)?;
        sink.write_matrix("response", &state.response, w, h)?;
        let re: Vec<f64> = h_spec.iter().map(|c| c.re).collect();
        sink.write_matrix("filter_re", &re, w, h)?;
        let im: Vec<f64> = h_spec.iter().map(|c| c.im).collect();
        sink.write_matrix("filter_im", &im, w, h)?;
        let mag: Vec<f64> = h_spec.iter().map(|c| c.norm()).collect();
        sink.write_matrix("filter_mag", &mag, w, h)?;
        sink.finish()
    }
}

/// Transform of a gaussian peak centered at `(w/2, h/2)`.
fn desired_response<E: SpectralEngine>(engine: &mut E, sigma: f64) -> MosseResult<Spectrum> {
    let (w, h) = (engine.width(), engine.height());
    let (cx, cy) = ((w / 2) as f64, (h / 2) as f64);
    let mut spatial = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            spatial.push(gaussian(x as f64 - cx, y as f64 - cy, sigma));
        }
    }
    engine.forward2d(&spatial)
}
