// src/models/gpe.rs
//! Gross-Pitaevskii Drift
//!
//! # Mathematical Framework
//!
//! The (dimensionless, ħ = m = 1) multi-component Gross-Pitaevskii equation
//! ```text
//! ∂ψ_c/∂t = (i/2)∇²ψ_c - i(V(x) + Σ_j g_cj |ψ_j|²)ψ_c - γ_c ψ_c
//! ```
//! splits into the kinetic coefficient `K = 0.5i` handled by the stepper
//! and the pointwise drift implemented here.
//!
//! Where:
//! - V(x) = ½ Σ_d ω_d² x_d²: harmonic trap (zero if no trap is set)
//! - g_cj: contact interaction between components c and j
//! - γ_c: linear loss rate of component c

use super::model::Drift;
use crate::error::{SdeError, SdeResult};
use crate::grid::Grid;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

#[derive(Clone, Debug)]
pub struct GrossPitaevskii {
    interactions: Vec<Vec<f64>>,
    losses: Vec<f64>,
    potential: ArrayD<f64>,
}

impl GrossPitaevskii {
    /// Untrapped, lossless condensate with the given interaction matrix
    pub fn new(grid: &Grid, interactions: Vec<Vec<f64>>) -> SdeResult<Self> {
        let components = interactions.len();
        if components == 0 {
            return Err(SdeError::ConfigurationError {
                field: "interactions".to_string(),
                reason: "at least one component is required".to_string(),
            });
        }
        if let Some(row) = interactions.iter().find(|row| row.len() != components) {
            return Err(SdeError::ConfigurationError {
                field: "interactions".to_string(),
                reason: format!(
                    "matrix must be {}x{}, found a row of length {}",
                    components,
                    components,
                    row.len()
                ),
            });
        }

        Ok(GrossPitaevskii {
            interactions,
            losses: vec![0.0; components],
            potential: ArrayD::zeros(IxDyn(grid.shape())),
        })
    }

    /// Adds the harmonic potential `½ Σ_d ω_d² x_d²`
    pub fn with_harmonic_trap(mut self, grid: &Grid, frequencies: &[f64]) -> SdeResult<Self> {
        if frequencies.len() != grid.dims() {
            return Err(SdeError::ConfigurationError {
                field: "frequencies".to_string(),
                reason: format!(
                    "{} trap frequencies given for a {}-dimensional grid",
                    frequencies.len(),
                    grid.dims()
                ),
            });
        }

        let coords: Vec<Vec<f64>> = (0..grid.dims()).map(|d| grid.coordinates(d)).collect();
        self.potential = ArrayD::from_shape_fn(IxDyn(grid.shape()), |idx| {
            frequencies
                .iter()
                .enumerate()
                .map(|(d, w)| 0.5 * w * w * coords[d][idx[d]] * coords[d][idx[d]])
                .sum()
        });
        Ok(self)
    }

    pub fn with_losses(mut self, losses: Vec<f64>) -> SdeResult<Self> {
        if losses.len() != self.interactions.len() {
            return Err(SdeError::ConfigurationError {
                field: "losses".to_string(),
                reason: format!(
                    "{} loss rates given for {} components",
                    losses.len(),
                    self.interactions.len()
                ),
            });
        }
        self.losses = losses;
        Ok(self)
    }

    pub fn potential(&self) -> &ArrayD<f64> {
        &self.potential
    }
}

impl Drift for GrossPitaevskii {
    fn components(&self) -> usize {
        self.interactions.len()
    }

    fn evaluate(&self, idx: &[usize], psi: &[Complex64], _t: f64, out: &mut [Complex64]) {
        let v = self.potential[idx];
        for (c, o) in out.iter_mut().enumerate() {
            let mean_field: f64 = self.interactions[c]
                .iter()
                .zip(psi)
                .map(|(g, p)| g * p.norm_sqr())
                .sum();
            *o = Complex64::new(-self.losses[c], -(v + mean_field)) * psi[c];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_component_phase_rotation() {
        let grid = Grid::new(&[4], &[1.0]).expect("Valid grid");
        let gpe = GrossPitaevskii::new(&grid, vec![vec![2.0]]).expect("Valid model");

        let psi = [Complex64::new(1.5, 0.0)];
        let mut out = [Complex64::new(0.0, 0.0)];
        gpe.evaluate(&[1], &psi, 0.0, &mut out);

        // -i·g|ψ|²ψ = -i·2·2.25·1.5
        assert!((out[0] - Complex64::new(0.0, -6.75)).norm() < 1e-12);
    }

    #[test]
    fn test_trap_and_losses() {
        let grid = Grid::new(&[8], &[4.0]).expect("Valid grid");
        let gpe = GrossPitaevskii::new(&grid, vec![vec![0.0, 0.0], vec![0.0, 0.0]])
            .and_then(|g| g.with_harmonic_trap(&grid, &[2.0]))
            .and_then(|g| g.with_losses(vec![0.1, 0.0]))
            .expect("Valid model");

        // x_0 = -2 → V = ½·4·4 = 8
        assert!((gpe.potential()[[0]] - 8.0).abs() < 1e-12);
        assert!(gpe.potential()[[4]].abs() < 1e-12);

        let psi = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        let mut out = [Complex64::new(0.0, 0.0); 2];
        gpe.evaluate(&[0], &psi, 0.0, &mut out);
        assert!((out[0] - Complex64::new(-0.1, -8.0)).norm() < 1e-12);
        assert!((out[1] - Complex64::new(8.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_invalid_configuration() {
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        assert!(GrossPitaevskii::new(&grid, vec![]).is_err());
        assert!(GrossPitaevskii::new(&grid, vec![vec![1.0, 0.0]]).is_err());
        let gpe = GrossPitaevskii::new(&grid, vec![vec![1.0]]).expect("Valid model");
        assert!(gpe.clone().with_losses(vec![0.1, 0.2]).is_err());
        assert!(gpe.with_harmonic_trap(&grid, &[1.0, 1.0]).is_err());
    }
}
