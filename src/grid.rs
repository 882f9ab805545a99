// src/grid.rs
//! Periodic Spatial Grid
//!
//! # Geometry
//!
//! A rectangular box of physical size `L_0 × L_1 × …` sampled on
//! `n_0 × n_1 × …` points with periodic boundaries. Coordinates along each
//! axis are
//! ```text
//! x_i = -L/2 + i·dx,   dx = L/n,   i = 0..n
//! ```
//!
//! # Wavenumbers
//!
//! The spectral transform orders modes the way an FFT does, so the
//! wavenumber of mode `i` along an axis is
//! ```text
//! k_i = 2π·m_i / L,   m = 0, 1, …, ⌈n/2⌉-1, -⌊n/2⌋, …, -1
//! ```
//! and the Wavenumber Table holds `k² = Σ_d k_d²` for every grid point.

use crate::error::{validation::*, SdeError, SdeResult};
use ndarray::{ArrayD, IxDyn};
use std::f64::consts::PI;

/// Highest spatial rank a grid may have
pub const MAX_SPATIAL_DIMS: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    shape: Vec<usize>,
    box_size: Vec<f64>,
}

impl Grid {
    pub fn new(shape: &[usize], box_size: &[f64]) -> SdeResult<Self> {
        if shape.is_empty() || shape.len() > MAX_SPATIAL_DIMS {
            return Err(SdeError::ConfigurationError {
                field: "shape".to_string(),
                reason: format!(
                    "grid must have between 1 and {} spatial dimensions, got {}",
                    MAX_SPATIAL_DIMS,
                    shape.len()
                ),
            });
        }
        if shape.len() != box_size.len() {
            return Err(SdeError::ConfigurationError {
                field: "box_size".to_string(),
                reason: format!(
                    "{} box extents given for a {}-dimensional grid",
                    box_size.len(),
                    shape.len()
                ),
            });
        }
        for &n in shape {
            validate_count("shape", n)?;
        }
        for &l in box_size {
            validate_positive("box_size", l)?;
        }

        Ok(Grid {
            shape: shape.to_vec(),
            box_size: box_size.to_vec(),
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn box_size(&self) -> &[f64] {
        &self.box_size
    }

    pub fn dims(&self) -> usize {
        self.shape.len()
    }

    /// Total number of grid points
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn dx(&self, axis: usize) -> f64 {
        self.box_size[axis] / self.shape[axis] as f64
    }

    /// Volume of one grid cell
    pub fn cell_volume(&self) -> f64 {
        (0..self.dims()).map(|axis| self.dx(axis)).product()
    }

    pub fn coordinates(&self, axis: usize) -> Vec<f64> {
        let dx = self.dx(axis);
        let origin = -0.5 * self.box_size[axis];
        (0..self.shape[axis])
            .map(|i| origin + i as f64 * dx)
            .collect()
    }

    /// Wavenumbers along one axis, in FFT mode order
    pub fn wavenumbers(&self, axis: usize) -> Vec<f64> {
        let n = self.shape[axis];
        let scale = 2.0 * PI / self.box_size[axis];
        (0..n)
            .map(|i| {
                let m = if i < (n + 1) / 2 {
                    i as f64
                } else {
                    i as f64 - n as f64
                };
                scale * m
            })
            .collect()
    }

    /// Builds the Wavenumber Table `k²` with the same shape as the grid
    pub fn ksquared(&self) -> ArrayD<f64> {
        let axis_ks: Vec<Vec<f64>> = (0..self.dims()).map(|d| self.wavenumbers(d)).collect();
        ArrayD::from_shape_fn(IxDyn(&self.shape), |idx| {
            axis_ks
                .iter()
                .enumerate()
                .map(|(d, ks)| ks[idx[d]] * ks[idx[d]])
                .sum()
        })
    }

    /// Converts a row-major flat spatial index into per-axis indices
    pub fn unravel(&self, mut flat: usize, out: &mut [usize]) {
        for d in (0..self.dims()).rev() {
            out[d] = flat % self.shape[d];
            flat /= self.shape[d];
        }
    }
}
