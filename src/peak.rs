//! Correlation response analysis: peak location, wrap-around offsets,
//! sub-pixel refinement, and confidence measures.

use crate::util::math::wrap_offset;

const FLAT_EPS: f64 = 1e-12;

/// Integer and sub-pixel location of the response maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponsePeak {
    /// Column of the maximum cell.
    pub x: usize,
    /// Row of the maximum cell.
    pub y: usize,
    /// Response value at the maximum.
    pub value: f64,
    /// Signed column offset from the response center (circular).
    pub dx: isize,
    /// Signed row offset from the response center (circular).
    pub dy: isize,
    /// Fractional column correction in `[-1, 1]` from a quadratic fit.
    pub sub_dx: f64,
    /// Fractional row correction in `[-1, 1]` from a quadratic fit.
    pub sub_dy: f64,
}

/// Confidence measures of a response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Confidence {
    /// Peak-to-sidelobe ratio `(peak - mean_s) / std_s`.
    pub psr: f64,
    /// Peak value over the mean absolute response.
    pub peak_to_mean: f64,
}

/// Estimates the sub-sample peak offset for a quadratic fit.
///
/// Given samples at `x = -1, 0, +1` (`fm`, `f0`, `fp`), this returns the peak
/// offset `dx` in `[-1, 1]` when the fitted parabola is concave and stable.
pub fn quad_peak_offset_1d(fm: f64, f0: f64, fp: f64) -> Option<f64> {
    if !fm.is_finite() || !f0.is_finite() || !fp.is_finite() {
        return None;
    }

    let denom = fm - 2.0 * f0 + fp;
    if denom.abs() < 1e-12 || denom >= 0.0 {
        return None;
    }

    let dx = 0.5 * (fm - fp) / denom;
    if dx.is_finite() && dx.abs() <= 1.0 {
        Some(dx)
    } else {
        None
    }
}

/// Finds the maximum of a `width x height` response.
///
/// Ties keep the first cell in row-major order. A non-finite cell is
/// returned immediately so callers can reject the response. Returns `None`
/// if the response does not match the given size.
pub fn locate_peak(response: &[f64], width: usize, height: usize) -> Option<ResponsePeak> {
    if width == 0 || height == 0 || response.len() != width * height {
        return None;
    }
    let mut best = 0usize;
    for (idx, &v) in response.iter().enumerate() {
        if !v.is_finite() {
            best = idx;
            break;
        }
        if v > response[best] {
            best = idx;
        }
    }

    let x = best % width;
    let y = best / width;
    let value = response[best];
    let (sub_dx, sub_dy) = if value.is_finite() {
        refine_subpixel(response, width, height, x, y)
    } else {
        (0.0, 0.0)
    };
    Some(ResponsePeak {
        x,
        y,
        value,
        dx: wrap_offset(x, width / 2, width),
        dy: wrap_offset(y, height / 2, height),
        sub_dx,
        sub_dy,
    })
}

/// Separable quadratic refinement on the circular 3x3 neighborhood.
fn refine_subpixel(response: &[f64], width: usize, height: usize, x: usize, y: usize) -> (f64, f64) {
    let at = |cx: usize, cy: usize| response[cy * width + cx];
    let f0 = at(x, y);
    let sub_dx = if width >= 3 {
        let xm = (x + width - 1) % width;
        let xp = (x + 1) % width;
        quad_peak_offset_1d(at(xm, y), f0, at(xp, y)).unwrap_or(0.0)
    } else {
        0.0
    };
    let sub_dy = if height >= 3 {
        let ym = (y + height - 1) % height;
        let yp = (y + 1) % height;
        quad_peak_offset_1d(at(x, ym), f0, at(x, yp)).unwrap_or(0.0)
    } else {
        0.0
    };
    (sub_dx, sub_dy)
}

/// Computes the peak-to-sidelobe and peak-to-mean ratios around `peak`.
///
/// The sidelobe is every cell farther than `sidelobe_radius` (circular
/// Chebyshev distance) from the peak; when that leaves nothing, all cells but
/// the peak are used. A flat sidelobe yields `psr = 0` unless the peak stands
/// above it, in which case `psr` is infinite.
pub fn confidence(
    response: &[f64],
    width: usize,
    height: usize,
    peak: &ResponsePeak,
    sidelobe_radius: usize,
) -> Confidence {
    if !peak.value.is_finite() || response.is_empty() {
        return Confidence {
            psr: f64::NAN,
            peak_to_mean: f64::NAN,
        };
    }

    let (mut n, mut sum, mut sum_sq) = sidelobe_sums(response, width, height, peak, sidelobe_radius);
    if n == 0 {
        (n, sum, sum_sq) = sidelobe_sums(response, width, height, peak, 0);
    }

    let psr = if n == 0 {
        0.0
    } else {
        let nf = n as f64;
        let mean = sum / nf;
        let std = (sum_sq / nf - mean * mean).max(0.0).sqrt();
        let lift = peak.value - mean;
        if std > FLAT_EPS {
            lift / std
        } else if lift > FLAT_EPS {
            f64::INFINITY
        } else {
            0.0
        }
    };

    let mean_abs = response.iter().map(|v| v.abs()).sum::<f64>() / response.len() as f64;
    let peak_to_mean = if mean_abs > FLAT_EPS {
        peak.value / mean_abs
    } else {
        0.0
    };

    Confidence { psr, peak_to_mean }
}

fn sidelobe_sums(
    response: &[f64],
    width: usize,
    height: usize,
    peak: &ResponsePeak,
    radius: usize,
) -> (usize, f64, f64) {
    let circular = |a: usize, b: usize, len: usize| {
        let d = a.abs_diff(b);
        d.min(len - d)
    };
    let mut n = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for (idx, &v) in response.iter().enumerate() {
        let x = idx % width;
        let y = idx / width;
        let dist = circular(x, peak.x, width).max(circular(y, peak.y, height));
        if dist <= radius {
            continue;
        }
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    (n, sum, sum_sq)
}

#[cfg(test)]
mod tests {
    use super::{confidence, locate_peak, quad_peak_offset_1d};
    use crate::util::math::gaussian;

    fn gaussian_response(width: usize, height: usize, cx: f64, cy: f64, sigma: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                out.push(gaussian(x as f64 - cx, y as f64 - cy, sigma));
            }
        }
        out
    }

    #[test]
    fn quad_peak_offset_symmetric() {
        let dx = quad_peak_offset_1d(0.9, 1.0, 0.9).unwrap();
        assert!(dx.abs() < 1e-12);
    }

    #[test]
    fn quad_peak_offset_shifted() {
        let f = |x: f64| 1.0 - (x - 0.25).powi(2);
        let dx = quad_peak_offset_1d(f(-1.0), f(0.0), f(1.0)).unwrap();
        assert!((dx - 0.25).abs() < 1e-9);
    }

    #[test]
    fn quad_peak_offset_non_concave() {
        assert!(quad_peak_offset_1d(1.0, 0.5, 1.0).is_none());
    }

    #[test]
    fn centered_peak_has_zero_offset() {
        let r = gaussian_response(16, 12, 8.0, 6.0, 1.5);
        let peak = locate_peak(&r, 16, 12).unwrap();
        assert_eq!((peak.x, peak.y), (8, 6));
        assert_eq!((peak.dx, peak.dy), (0, 0));
        assert!(peak.sub_dx.abs() < 1e-9);
        assert!(peak.sub_dy.abs() < 1e-9);
    }

    #[test]
    fn offsets_wrap_around_the_edge() {
        let mut r = vec![0.0; 16 * 16];
        r[15 * 16 + 1] = 1.0;
        let peak = locate_peak(&r, 16, 16).unwrap();
        // Row 15 is 7 below the center, column 1 is 7 left of it.
        assert_eq!((peak.dx, peak.dy), (-7, 7));

        let mut r = vec![0.0; 16 * 16];
        r[0] = 1.0;
        let peak = locate_peak(&r, 16, 16).unwrap();
        assert_eq!((peak.dx, peak.dy), (8, 8));
    }

    #[test]
    fn subpixel_offset_tracks_fractional_center() {
        let r = gaussian_response(32, 32, 16.3, 15.8, 2.0);
        let peak = locate_peak(&r, 32, 32).unwrap();
        assert_eq!((peak.x, peak.y), (16, 16));
        assert!((peak.sub_dx - 0.3).abs() < 0.1);
        assert!((peak.sub_dy + 0.2).abs() < 0.1);
    }

    #[test]
    fn sharp_peak_is_confident_and_flat_is_not() {
        let r = gaussian_response(32, 32, 16.0, 16.0, 2.0);
        let peak = locate_peak(&r, 32, 32).unwrap();
        let c = confidence(&r, 32, 32, &peak, 5);
        assert!(c.psr > 50.0, "psr = {}", c.psr);
        assert!(c.peak_to_mean > 10.0);

        let flat = vec![0.25; 32 * 32];
        let peak = locate_peak(&flat, 32, 32).unwrap();
        let c = confidence(&flat, 32, 32, &peak, 5);
        assert_eq!(c.psr, 0.0);
        assert!((c.peak_to_mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_response_is_reported() {
        let mut r = vec![0.0; 9];
        r[4] = f64::NAN;
        let peak = locate_peak(&r, 3, 3).unwrap();
        assert!(peak.value.is_nan());
        let c = confidence(&r, 3, 3, &peak, 1);
        assert!(c.psr.is_nan());
    }
}
