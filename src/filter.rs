//! Adaptive correlation filter state.
//!
//! The filter is kept as a numerator `H1 = G * conj(F)` and a denominator
//! `H2 = F * conj(F) + eps`, both running exponential averages, with the
//! quotient `H = H1 / (H2 + eps)` refreshed after every change. `H2` is real
//! and never drops below `eps`.

use crate::spectrum::{conj, div_reg, div_reg_cell, mul, Spectrum};
use crate::util::{MosseError, MosseResult};

/// Numerator, denominator, and quotient spectra of one tracker's filter.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    h1: Spectrum,
    h2: Spectrum,
    h: Spectrum,
}

impl FilterState {
    /// Trains a fresh filter from the desired response `g` and patch spectrum `fi`.
    pub fn train(g: &Spectrum, fi: &Spectrum, eps: f64) -> MosseResult<Self> {
        let fc = conj(fi);
        let h1 = mul(g, &fc)?;
        let mut h2 = mul(fi, &fc)?;
        for v in h2.data_mut() {
            *v += eps;
        }
        let h = div_reg(&h1, &h2, eps)?;
        Ok(Self { h1, h2, h })
    }

    /// Adds one more training sample: `H1 += G conj(F)`, `H2 += F conj(F)`.
    ///
    /// Used to fold perturbed copies of the seed patch into a fresh filter.
    pub fn accumulate(&mut self, g: &Spectrum, fi: &Spectrum, eps: f64) -> MosseResult<()> {
        self.h1.ensure_same_shape(g)?;
        self.h1.ensure_same_shape(fi)?;
        for ((a, b), (&gv, &fv)) in self
            .h1
            .data_mut()
            .iter_mut()
            .zip(self.h2.data_mut().iter_mut())
            .zip(g.data().iter().zip(fi.data()))
        {
            let fc = fv.conj();
            *a += gv * fc;
            *b += fv * fc;
        }
        self.refresh_quotient(eps);
        Ok(())
    }

    /// Blends the observation `fi` into the filter with learning rate `eta`.
    ///
    /// `H1 = (1-eta) H1 + eta G conj(F)`, `H2 = (1-eta) H2 + eta (F conj(F) + eps)`.
    pub fn adapt(&mut self, g: &Spectrum, fi: &Spectrum, eta: f64, eps: f64) -> MosseResult<()> {
        if !(0.0..=1.0).contains(&eta) {
            return Err(MosseError::InvalidConfig("learning rate must lie in [0, 1]"));
        }
        self.h1.ensure_same_shape(g)?;
        self.h1.ensure_same_shape(fi)?;
        let keep = 1.0 - eta;
        for ((a, b), (&gv, &fv)) in self
            .h1
            .data_mut()
            .iter_mut()
            .zip(self.h2.data_mut().iter_mut())
            .zip(g.data().iter().zip(fi.data()))
        {
            let fc = fv.conj();
            *a = *a * keep + gv * fc * eta;
            *b = *b * keep + (fv * fc + eps) * eta;
        }
        self.refresh_quotient(eps);
        Ok(())
    }

    /// Writes the correlation response spectrum `H * fi` into `out`.
    pub fn correlate(&self, fi: &Spectrum, out: &mut Spectrum) -> MosseResult<()> {
        self.h.ensure_same_shape(fi)?;
        self.h.ensure_same_shape(out)?;
        for (dst, (&hv, &fv)) in out
            .data_mut()
            .iter_mut()
            .zip(self.h.data().iter().zip(fi.data()))
        {
            *dst = hv * fv;
        }
        Ok(())
    }

    /// Accumulated numerator spectrum.
    pub fn numerator(&self) -> &Spectrum {
        &self.h1
    }

    /// Accumulated denominator spectrum.
    pub fn denominator(&self) -> &Spectrum {
        &self.h2
    }

    /// Current filter `H1 / (H2 + eps)`.
    pub fn filter(&self) -> &Spectrum {
        &self.h
    }

    fn refresh_quotient(&mut self, eps: f64) {
        for (q, (&a, &b)) in self
            .h
            .data_mut()
            .iter_mut()
            .zip(self.h1.data().iter().zip(self.h2.data()))
        {
            *q = div_reg_cell(a, b, eps);
        }
    }
}
