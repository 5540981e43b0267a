//! Planned FFT engine backed by `rustfft`.

use crate::engine::{check_len, check_plan_size, transpose, SpectralEngine};
use crate::util::MosseResult;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Row/column FFT engine with plans and scratch allocated once.
pub struct FftEngine {
    width: usize,
    height: usize,
    row_fwd: Arc<dyn Fft<f64>>,
    row_inv: Arc<dyn Fft<f64>>,
    col_fwd: Arc<dyn Fft<f64>>,
    col_inv: Arc<dyn Fft<f64>>,
    columns: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl FftEngine {
    fn transform(&mut self, data: &mut [Complex64], inverse: bool) -> MosseResult<()> {
        let (w, h) = (self.width, self.height);
        check_len(w * h, data.len())?;
        let (row, col) = if inverse {
            (&self.row_inv, &self.col_inv)
        } else {
            (&self.row_fwd, &self.col_fwd)
        };

        // rustfft processes every `len`-sized chunk of the buffer.
        row.process_with_scratch(data, &mut self.scratch);
        transpose(data, w, h, &mut self.columns);
        col.process_with_scratch(&mut self.columns, &mut self.scratch);
        transpose(&self.columns, h, w, data);
        Ok(())
    }
}

impl SpectralEngine for FftEngine {
    fn plan(width: usize, height: usize) -> MosseResult<Self> {
        let len = check_plan_size(width, height)?;
        let mut planner = FftPlanner::<f64>::new();
        let row_fwd = planner.plan_fft_forward(width);
        let row_inv = planner.plan_fft_inverse(width);
        let col_fwd = planner.plan_fft_forward(height);
        let col_inv = planner.plan_fft_inverse(height);
        let scratch_len = [&row_fwd, &row_inv, &col_fwd, &col_inv]
            .iter()
            .map(|fft| fft.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        Ok(Self {
            width,
            height,
            row_fwd,
            row_inv,
            col_fwd,
            col_inv,
            columns: vec![Complex64::new(0.0, 0.0); len],
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
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
