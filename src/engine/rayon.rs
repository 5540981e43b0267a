//! Rayon-parallel FFT engine (feature-gated).
//!
//! Rows and columns are independent 1D transforms, so each pass is split
//! across the rayon pool. Results match [`FftEngine`](super::FftEngine) up to
//! floating-point reassociation.

use crate::engine::{check_len, check_plan_size, SpectralEngine};
use crate::util::MosseResult;
use crate::window::Window;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Row/column-parallel FFT engine.
pub struct ParFftEngine {
    width: usize,
    height: usize,
    row_fwd: Arc<dyn Fft<f64>>,
    row_inv: Arc<dyn Fft<f64>>,
    col_fwd: Arc<dyn Fft<f64>>,
    col_inv: Arc<dyn Fft<f64>>,
    columns: Vec<Complex64>,
}

fn process_lines(fft: &Arc<dyn Fft<f64>>, data: &mut [Complex64], len: usize) {
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_mut(len).for_each_init(
        || vec![Complex64::new(0.0, 0.0); scratch_len],
        |scratch, line| fft.process_with_scratch(line, scratch),
    );
}

impl ParFftEngine {
    fn transform(&mut self, data: &mut [Complex64], inverse: bool) -> MosseResult<()> {
        let (w, h) = (self.width, self.height);
        check_len(w * h, data.len())?;
        let (row, col) = if inverse {
            (&self.row_inv, &self.col_inv)
        } else {
            (&self.row_fwd, &self.col_fwd)
        };

        process_lines(row, data, w);

        let rows: &[Complex64] = data;
        self.columns
            .par_chunks_mut(h)
            .enumerate()
            .for_each(|(x, column)| {
                for (y, dst) in column.iter_mut().enumerate() {
                    *dst = rows[y * w + x];
                }
            });

        process_lines(col, &mut self.columns, h);

        let columns: &[Complex64] = &self.columns;
        data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, dst) in row.iter_mut().enumerate() {
                *dst = columns[x * h + y];
            }
        });
        Ok(())
    }
}

impl SpectralEngine for ParFftEngine {
    fn plan(width: usize, height: usize) -> MosseResult<Self> {
        let len = check_plan_size(width, height)?;
        let mut planner = FftPlanner::<f64>::new();
        Ok(Self {
            width,
            height,
            row_fwd: planner.plan_fft_forward(width),
            row_inv: planner.plan_fft_inverse(width),
            col_fwd: planner.plan_fft_forward(height),
            col_inv: planner.plan_fft_inverse(height),
            columns: vec![Complex64::new(0.0, 0.0); len],
        })
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn window(&self) -> MosseResult<Window> {
        Window::hann_par(self.width, self.height)
    }

    fn forward_in_place(&mut self, data: &mut [Complex64]) -> MosseResult<()> {
        self.transform(data, false)
    }

    fn inverse_in_place(&mut self, data: &mut [Complex64]) -> MosseResult<()> {
        self.transform(data, true)?;
        let scale = 1.0 / (self.width * self.height) as f64;
        data.par_iter_mut().for_each(|value| *value *= scale);
        Ok(())
    }
}
