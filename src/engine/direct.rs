//! Direct-summation DFT used as the numerical reference engine.
//!
//! The 2D sum is evaluated separably (rows, then columns) with precomputed
//! twiddle tables, for `O(w*h*(w+h))` work. Exact for any size, slow for
//! large patches.

use crate::engine::{check_len, check_plan_size, SpectralEngine};
use crate::util::MosseResult;
use rustfft::num_complex::Complex64;
use std::f64::consts::TAU;

/// Reference engine evaluating the DFT definition directly.
pub struct DirectDft {
    width: usize,
    height: usize,
    twiddles_w: Vec<Complex64>,
    twiddles_h: Vec<Complex64>,
    line: Vec<Complex64>,
    acc: Vec<Complex64>,
}

/// Layout of the lines transformed in one separable pass.
#[derive(Clone, Copy)]
struct Pass {
    len: usize,
    count: usize,
    elem_stride: usize,
    line_stride: usize,
}

impl DirectDft {
    fn run_pass(&mut self, data: &mut [Complex64], pass: Pass, horizontal: bool, inverse: bool) {
        let twiddles = if horizontal {
            &self.twiddles_w
        } else {
            &self.twiddles_h
        };
        let line = &mut self.line[..pass.len];
        let acc = &mut self.acc[..pass.len];

        for l in 0..pass.count {
            let base = l * pass.line_stride;
            for (k, dst) in line.iter_mut().enumerate() {
                *dst = data[base + k * pass.elem_stride];
            }
            for (u, out) in acc.iter_mut().enumerate() {
                let mut sum = Complex64::new(0.0, 0.0);
                for (k, &value) in line.iter().enumerate() {
                    let tw = twiddles[(u * k) % pass.len];
                    sum += value * if inverse { tw.conj() } else { tw };
                }
                *out = sum;
            }
            for (k, &value) in acc.iter().enumerate() {
                data[base + k * pass.elem_stride] = value;
            }
        }
    }

    fn transform(&mut self, data: &mut [Complex64], inverse: bool) -> MosseResult<()> {
        let (w, h) = (self.width, self.height);
        check_len(w * h, data.len())?;
        let rows = Pass {
            len: w,
            count: h,
            elem_stride: 1,
            line_stride: w,
        };
        let cols = Pass {
            len: h,
            count: w,
            elem_stride: w,
            line_stride: 1,
        };
        self.run_pass(data, rows, true, inverse);
        self.run_pass(data, cols, false, inverse);
        Ok(())
    }
}

fn twiddles(n: usize) -> Vec<Complex64> {
    (0..n)
        .map(|k| Complex64::from_polar(1.0, -TAU * k as f64 / n as f64))
        .collect()
}

impl SpectralEngine for DirectDft {
    fn plan(width: usize, height: usize) -> MosseResult<Self> {
        check_plan_size(width, height)?;
        let longest = width.max(height);
        Ok(Self {
            width,
            height,
            twiddles_w: twiddles(width),
            twiddles_h: twiddles(height),
            line: vec![Complex64::new(0.0, 0.0); longest],
            acc: vec![Complex64::new(0.0, 0.0); longest],
        })
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn forward_in_place(&mut self, data: &mut [Complex64]) -> MosseResult<()> {
        self.transform(data, false)
    }

    fn inverse_in_place(&mut self, data: &mut [Complex64]) -> MosseResult<()> {
        self.transform(data, true)?;
        let scale = 1.0 / (self.width * self.height) as f64;
        for value in data.iter_mut() {
            *value *= scale;
        }
        Ok(())
    }
}
