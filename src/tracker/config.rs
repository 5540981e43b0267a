//! Tracker configuration and per-frame reports.

use crate::region::Region;
use crate::util::{MosseError, MosseResult};

/// Tuning parameters for a [`Tracker`](super::Tracker).
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    /// Default learning rate used by `update_default`, in `[0, 1]`.
    pub learning_rate: f64,
    /// Regularization epsilon added to the filter denominator.
    pub reg_eps: f64,
    /// Desired-response spread as a fraction of `min(width, height)`.
    pub sigma_factor: f64,
    /// Lower bound on the desired-response spread, in pixels.
    pub min_sigma: f64,
    /// Smallest accepted region width and height.
    pub min_region_size: usize,
    /// Minimum peak-to-sidelobe ratio for an accepted update.
    pub min_psr: f64,
    /// Minimum peak over mean absolute response for an accepted update.
    pub min_peak_to_mean: f64,
    /// Upper bound on the half-size of the window around the peak excluded
    /// from the sidelobe; see [`TrackerConfig::sidelobe_radius_for`].
    pub sidelobe_radius: usize,
    /// Number of randomly warped copies of the seed patch added at `init`.
    pub init_perturbations: usize,
    /// Magnitude of the random rotation and affine jitter for perturbations,
    /// in `(0, 1]`.
    pub perturbation_scale: f64,
    /// Seed for the perturbation generator.
    pub perturbation_seed: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.125,
            reg_eps: 1e-5,
            sigma_factor: 1.0 / 16.0,
            min_sigma: 1.0,
            min_region_size: 16,
            min_psr: 5.0,
            min_peak_to_mean: 3.0,
            sidelobe_radius: 5,
            init_perturbations: 0,
            perturbation_scale: 0.1,
            perturbation_seed: 0,
        }
    }
}

impl TrackerConfig {
    /// Checks that every field is finite and in range.
    pub fn validate(&self) -> MosseResult<()> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(MosseError::InvalidConfig(
                "learning_rate must lie in [0, 1]",
            ));
        }
        if !(self.reg_eps.is_finite() && self.reg_eps > 0.0) {
            return Err(MosseError::InvalidConfig("reg_eps must be positive"));
        }
        if !(self.sigma_factor.is_finite() && self.sigma_factor > 0.0) {
            return Err(MosseError::InvalidConfig("sigma_factor must be positive"));
        }
        if !(self.min_sigma.is_finite() && self.min_sigma > 0.0) {
            return Err(MosseError::InvalidConfig("min_sigma must be positive"));
        }
        if self.min_region_size == 0 {
            return Err(MosseError::InvalidConfig(
                "min_region_size must be at least 1",
            ));
        }
        if self.min_psr.is_nan() || self.min_peak_to_mean.is_nan() {
            return Err(MosseError::InvalidConfig("confidence thresholds must not be NaN"));
        }
        if self.init_perturbations > 0
            && !(self.perturbation_scale > 0.0 && self.perturbation_scale <= 1.0)
        {
            return Err(MosseError::InvalidConfig(
                "perturbation_scale must lie in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Desired-response spread for a `width x height` region.
    pub fn sigma_for(&self, width: usize, height: usize) -> f64 {
        (width.min(height) as f64 * self.sigma_factor).max(self.min_sigma)
    }

    /// Sidelobe exclusion radius for a `width x height` response.
    ///
    /// Capped at a quarter of the shorter side so small regions keep a
    /// sidelobe that is not dominated by the peak's own slope.
    pub fn sidelobe_radius_for(&self, width: usize, height: usize) -> usize {
        let quarter = width.min(height).saturating_sub(1) / 4;
        self.sidelobe_radius.min(quarter)
    }
}

/// Outcome of a successful update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackReport {
    /// Region after the update.
    pub region: Region,
    /// Integer column displacement taken from the response peak.
    pub dx: isize,
    /// Integer row displacement taken from the response peak.
    pub dy: isize,
    /// Sub-pixel column displacement (`dx` plus the quadratic refinement).
    pub subpixel_dx: f64,
    /// Sub-pixel row displacement (`dy` plus the quadratic refinement).
    pub subpixel_dy: f64,
    /// Response value at the peak.
    pub peak: f64,
    /// Peak-to-sidelobe ratio.
    pub psr: f64,
    /// Peak over mean absolute response.
    pub peak_to_mean: f64,
    /// The move was clamped to keep the region inside the frame.
    pub near_boundary: bool,
}
