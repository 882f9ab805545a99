// src/spectral.rs
//! Spectral Transform over the Spatial Axes
//!
//! The kinetic propagator only needs a linear, invertible transform pair
//! acting on one (trajectory, component) batch at a time:
//! ```text
//! inverse(forward(x)) == x   (up to round-off)
//! ```
//! Trajectory and component axes are never touched by the transform; the
//! caller fans batches out over threads.
//!
//! `FftTransform` is the default implementation: an unnormalised forward
//! FFT along every spatial axis and an inverse scaled by `1/N`, so a mode
//! multiplier applied between them acts exactly as a Fourier multiplier.

use crate::grid::Grid;
use ndarray::{ArrayViewMutD, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward/inverse transform pair over one spatial batch
pub trait SpectralTransform: Send + Sync {
    fn forward(&self, batch: ArrayViewMutD<'_, Complex64>);
    fn inverse(&self, batch: ArrayViewMutD<'_, Complex64>);
}

/// Multi-dimensional FFT built from one planned 1-D FFT per axis
pub struct FftTransform {
    forward_plans: Vec<Arc<dyn Fft<f64>>>,
    inverse_plans: Vec<Arc<dyn Fft<f64>>>,
    norm: f64,
}

impl FftTransform {
    pub fn new(grid: &Grid) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let forward_plans = grid
            .shape()
            .iter()
            .map(|&n| planner.plan_fft_forward(n))
            .collect();
        let inverse_plans = grid
            .shape()
            .iter()
            .map(|&n| planner.plan_fft_inverse(n))
            .collect();

        FftTransform {
            forward_plans,
            inverse_plans,
            norm: 1.0 / grid.size() as f64,
        }
    }

    /// Applies each axis plan along every lane of that axis
    fn transform_axes(plans: &[Arc<dyn Fft<f64>>], batch: &mut ArrayViewMutD<'_, Complex64>) {
        for (axis, plan) in plans.iter().enumerate() {
            let len = batch.len_of(Axis(axis));
            if len < 2 {
                continue;
            }
            let mut buffer = vec![Complex64::new(0.0, 0.0); len];
            let mut scratch = vec![Complex64::new(0.0, 0.0); plan.get_inplace_scratch_len()];

            for mut lane in batch.lanes_mut(Axis(axis)) {
                buffer
                    .iter_mut()
                    .zip(lane.iter())
                    .for_each(|(b, x)| *b = *x);
                plan.process_with_scratch(&mut buffer, &mut scratch);
                lane.iter_mut()
                    .zip(buffer.iter())
                    .for_each(|(x, b)| *x = *b);
            }
        }
    }
}

impl SpectralTransform for FftTransform {
    fn forward(&self, mut batch: ArrayViewMutD<'_, Complex64>) {
        Self::transform_axes(&self.forward_plans, &mut batch);
    }

    fn inverse(&self, mut batch: ArrayViewMutD<'_, Complex64>) {
        Self::transform_axes(&self.inverse_plans, &mut batch);
        let norm = self.norm;
        batch.mapv_inplace(|x| x * norm);
    }
}
