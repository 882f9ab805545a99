// src/solvers/propagator.rs
//! Kinetic Propagator
//!
//! # Algorithm
//!
//! For a field `ψ` of shape (trajectories, components, *spatial) and a step
//! `δ`, every (trajectory, component) batch is propagated independently:
//! ```text
//! ψ'_{t,c} = F⁻¹[ F[ψ_{t,c}] ⊙ exp(E_c(k²)·δ) ]
//! ```
//! where `E_c` is the spectral exponent of the kinetic table.
//!
//! # Group Property
//!
//! `exp(E·δ₁)·exp(E·δ₂) = exp(E·(δ₁+δ₂))`, so two half-step propagations
//! compose into a full step. The RK4IP stepper relies on this and only ever
//! derives half-step factors.
//!
//! # Parallelism
//!
//! Batches are disjoint chunks of the flattened field and are transformed
//! concurrently with Rayon.

use super::kinetic::KineticTable;
use crate::error::{validation::*, SdeError, SdeResult};
use crate::grid::Grid;
use crate::spectral::{FftTransform, SpectralTransform};
use ndarray::{ArrayBase, ArrayD, ArrayViewMutD, Axis, Data, Dimension, IxDyn};
use num_complex::Complex64;
use rayon::prelude::*;
use std::sync::Arc;

/// Mode multipliers `exp(E_c(k²)·δ)` for one step size
#[derive(Clone, Debug)]
pub struct PropagationFactors {
    delta: f64,
    // (components, *spatial)
    table: ArrayD<Complex64>,
}

impl PropagationFactors {
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn table(&self) -> &ArrayD<Complex64> {
        &self.table
    }
}

pub struct KineticPropagator<T: SpectralTransform = FftTransform> {
    ksquared: Arc<ArrayD<f64>>,
    table: KineticTable,
    transform: T,
}

impl KineticPropagator<FftTransform> {
    pub fn new(grid: &Grid, table: KineticTable) -> Self {
        Self::with_transform(grid, table, FftTransform::new(grid))
    }
}

impl<T: SpectralTransform> KineticPropagator<T> {
    pub fn with_transform(grid: &Grid, table: KineticTable, transform: T) -> Self {
        KineticPropagator {
            ksquared: Arc::new(grid.ksquared()),
            table,
            transform,
        }
    }

    /// The Wavenumber Table this propagator was built with
    pub fn ksquared(&self) -> &Arc<ArrayD<f64>> {
        &self.ksquared
    }

    pub fn table(&self) -> &KineticTable {
        &self.table
    }

    pub fn components(&self) -> usize {
        self.table.components()
    }

    /// Derives the mode multipliers for a step of size `delta`
    pub fn factors(&self, delta: f64) -> PropagationFactors {
        let mut shape = vec![self.components()];
        shape.extend_from_slice(self.ksquared.shape());

        let table = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            let idx = idx.slice();
            let k2 = self.ksquared[&idx[1..]];
            (self.table.exponent(idx[0], k2) * delta).exp()
        });

        PropagationFactors { delta, table }
    }

    /// Propagates `input` by the step the factors were derived for
    pub fn apply<S>(
        &self,
        input: &ArrayBase<S, IxDyn>,
        factors: &PropagationFactors,
    ) -> SdeResult<ArrayD<Complex64>>
    where
        S: Data<Elem = Complex64>,
    {
        self.validate_field("field", input.shape())?;

        let components = self.components();
        let spatial = self.ksquared.shape().to_vec();
        let batch = self.ksquared.len();

        let mut data: Vec<Complex64> = input.iter().copied().collect();
        data.par_chunks_mut(batch)
            .enumerate()
            .try_for_each(|(i, chunk)| -> Result<(), ndarray::ShapeError> {
                let multipliers = factors.table.index_axis(Axis(0), i % components);
                let mut view = ArrayViewMutD::from_shape(IxDyn(&spatial), chunk)?;
                self.transform.forward(view.view_mut());
                view *= &multipliers;
                self.transform.inverse(view);
                Ok(())
            })
            .map_err(|e| self.shape_error("batch", e))?;

        ArrayD::from_shape_vec(IxDyn(input.shape()), data).map_err(|e| self.shape_error("field", e))
    }

    /// Propagates `input` by `delta` in one call
    pub fn propagate<S>(&self, input: &ArrayBase<S, IxDyn>, delta: f64) -> SdeResult<ArrayD<Complex64>>
    where
        S: Data<Elem = Complex64>,
    {
        validate_finite("delta", delta)?;
        self.apply(input, &self.factors(delta))
    }

    fn validate_field(&self, buffer: &str, shape: &[usize]) -> SdeResult<()> {
        let trajectories = shape.first().copied().unwrap_or(0).max(1);
        let mut expected = vec![trajectories, self.components()];
        expected.extend_from_slice(self.ksquared.shape());
        validate_shape(buffer, &expected, shape)
    }

    fn shape_error(&self, buffer: &str, err: ndarray::ShapeError) -> SdeError {
        SdeError::ConfigurationError {
            field: buffer.to_string(),
            reason: format!("inconsistent batch layout: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::kinetic::KineticCoeffs;
    use std::f64::consts::PI;

    fn plane_wave(grid: &Grid, mode: i32, trajectories: usize) -> ArrayD<Complex64> {
        let n = grid.shape()[0];
        ArrayD::from_shape_fn(IxDyn(&[trajectories, 1, n]), |idx| {
            let x = 2.0 * PI * idx[2] as f64 / n as f64;
            Complex64::new(0.0, mode as f64 * x).exp()
        })
    }

    #[test]
    fn test_plane_wave_gains_phase() {
        let grid = Grid::new(&[16], &[2.0 * PI]).expect("Valid grid");
        let table =
            KineticTable::normalize(&KineticCoeffs::default(), 1).expect("Valid coefficients");
        let propagator = KineticPropagator::new(&grid, table);

        let psi = plane_wave(&grid, 3, 2);
        let out = propagator.propagate(&psi, 0.2).expect("Valid field");

        // exp(0.5i·(-9)·0.2)
        let phase = Complex64::new(0.0, -0.9).exp();
        for (a, b) in out.iter().zip(psi.iter()) {
            assert!((a - b * phase).norm() < 1e-12);
        }
    }

    #[test]
    fn test_half_steps_compose() {
        let grid = Grid::new(&[8, 4], &[3.0, 2.0]).expect("Valid grid");
        let table = KineticTable::normalize(&Complex64::new(0.1, 0.7).into(), 2)
            .expect("Valid coefficients");
        let propagator = KineticPropagator::new(&grid, table);

        let psi = ArrayD::from_shape_fn(IxDyn(&[1, 2, 8, 4]), |idx| {
            Complex64::new((idx[2] as f64).sin(), idx[1] as f64 + 0.1 * idx[3] as f64)
        });
        let half = propagator.factors(0.05);
        let twice = propagator
            .apply(&propagator.apply(&psi, &half).expect("Valid"), &half)
            .expect("Valid");
        let once = propagator.propagate(&psi, 0.1).expect("Valid");

        for (a, b) in twice.iter().zip(once.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_component_mismatch() {
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        let table = KineticTable::normalize(&0.5.into(), 2).expect("Valid coefficients");
        let propagator = KineticPropagator::new(&grid, table);

        let psi: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[1, 1, 8]));
        match propagator.propagate(&psi, 0.1) {
            Err(SdeError::ShapeMismatch { expected, actual, .. }) => {
                assert_eq!(expected, vec![1, 2, 8]);
                assert_eq!(actual, vec![1, 1, 8]);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }
}
