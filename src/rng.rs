// src/rng.rs
//! Wiener Increments for Stochastic Steps
//!
//! # Noise Model
//!
//! Space-time white noise on a grid with cell volume `dV` has, over a step
//! `Δt`, independent increments at every (trajectory, source, point):
//! ```text
//! ΔW ~ N(0, Δt / dV)
//! ```
//! Complex increments split that variance evenly between two independent
//! real draws, so `Re ΔW, Im ΔW ~ N(0, Δt / 2dV)` and `E|ΔW|² = Δt / dV`.
//!
//! # Reproducibility
//!
//! Every (step, trajectory) pair gets its own `StdRng`, seeded by mixing
//! the base seed with both counters through splitmix64:
//! ```text
//! z = base_seed + counter
//! z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
//! z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
//! output = z ⊕ (z >> 31)
//! ```
//! Trajectories are filled in parallel, yet the result does not depend on
//! the number of threads.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::grid::Grid;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

fn splitmix64(base_seed: u64, counter: u64) -> u64 {
    let mut z = base_seed.wrapping_add(counter);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
    z ^ (z >> 31)
}

/// RNG factory for reproducible parallel streams
#[derive(Clone, Copy, Debug)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Independent generator for one (step, trajectory) pair
    pub fn create_std_rng(&self, step: u64, trajectory: u64) -> StdRng {
        let step_seed = splitmix64(self.base_seed, step);
        StdRng::seed_from_u64(splitmix64(step_seed, trajectory))
    }
}

/// Supplies Wiener increments shaped (trajectories, noise_sources, *spatial)
#[derive(Clone, Debug)]
pub struct WienerNoise {
    factory: RngFactory,
    trajectories: usize,
    noise_sources: usize,
    grid: Grid,
}

impl WienerNoise {
    pub fn new(seed: u64, trajectories: usize, noise_sources: usize, grid: &Grid) -> Self {
        WienerNoise {
            factory: RngFactory::new(seed),
            trajectories,
            noise_sources,
            grid: grid.clone(),
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![self.trajectories, self.noise_sources];
        shape.extend_from_slice(self.grid.shape());
        shape
    }

    /// Real increments for step number `step` of size `dt`
    pub fn increments(&self, step: u64, dt: f64) -> SdeResult<ArrayD<f64>> {
        let normal = self.normal(dt, 1.0)?;
        self.draw(step, |rng| normal.sample(rng))
    }

    /// Complex increments for step number `step` of size `dt`
    pub fn complex_increments(&self, step: u64, dt: f64) -> SdeResult<ArrayD<Complex64>> {
        let normal = self.normal(dt, 2.0)?;
        self.draw(step, |rng| {
            let re = normal.sample(&mut *rng);
            Complex64::new(re, normal.sample(rng))
        })
    }

    /// `N(0, dt / (parts·dV))`
    fn normal(&self, dt: f64, parts: f64) -> SdeResult<Normal<f64>> {
        validate_finite("dt", dt)?;
        if dt < 0.0 {
            return Err(SdeError::InvalidParameters {
                parameter: "dt".to_string(),
                value: dt,
                constraint: "Wiener increments need a non-negative step".to_string(),
            });
        }

        let std_dev = (dt / (parts * self.grid.cell_volume())).sqrt();
        Normal::new(0.0, std_dev).map_err(|e| SdeError::RandomGenerationError {
            reason: format!("cannot build N(0, {}): {}", std_dev, e),
        })
    }

    fn draw<W, F>(&self, step: u64, sample: F) -> SdeResult<ArrayD<W>>
    where
        W: Default + Clone + Send,
        F: Fn(&mut StdRng) -> W + Sync,
    {
        let per_trajectory = self.noise_sources * self.grid.size();
        let mut data = vec![W::default(); self.trajectories * per_trajectory];
        if per_trajectory > 0 {
            data.par_chunks_mut(per_trajectory)
                .enumerate()
                .for_each(|(trajectory, chunk)| {
                    let mut rng = self.factory.create_std_rng(step, trajectory as u64);
                    chunk.iter_mut().for_each(|x| *x = sample(&mut rng));
                });
        }

        ArrayD::from_shape_vec(IxDyn(&self.shape()), data).map_err(|e| {
            SdeError::RandomGenerationError {
                reason: format!("cannot shape increments: {}", e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_factory_reproducibility() {
        let factory = RngFactory::new(42);
        let mut rng1 = factory.create_std_rng(3, 0);
        let mut rng2 = factory.create_std_rng(3, 0);
        for _ in 0..100 {
            assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
        }
    }

    #[test]
    fn test_streams_differ() {
        let factory = RngFactory::new(42);
        let draws = |step: u64, trajectory: u64| -> Vec<u64> {
            let mut rng = factory.create_std_rng(step, trajectory);
            (0..10).map(|_| rng.gen()).collect()
        };
        assert_ne!(draws(0, 0), draws(0, 1));
        assert_ne!(draws(0, 0), draws(1, 0));
    }

    #[test]
    fn test_increment_shape_and_determinism() {
        let grid = Grid::new(&[8, 4], &[1.0, 1.0]).expect("Valid grid");
        let noise = WienerNoise::new(7, 3, 2, &grid);

        let dw = noise.increments(5, 0.01).expect("Valid increments");
        assert_eq!(dw.shape(), &[3, 2, 8, 4]);
        assert_eq!(dw, noise.increments(5, 0.01).expect("Valid increments"));
        assert_ne!(dw, noise.increments(6, 0.01).expect("Valid increments"));
    }

    #[test]
    fn test_zero_step_and_invalid_step() {
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        let noise = WienerNoise::new(1, 1, 1, &grid);

        let dw = noise.increments(0, 0.0).expect("Valid increments");
        assert!(dw.iter().all(|&x| x == 0.0));
        assert!(noise.increments(0, -0.1).is_err());
        assert!(noise.increments(0, f64::NAN).is_err());
    }

    #[test]
    fn test_complex_increments() {
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        let noise = WienerNoise::new(3, 2, 1, &grid);

        let dw = noise.complex_increments(4, 0.01).expect("Valid increments");
        assert_eq!(dw.shape(), &[2, 1, 8]);
        assert_eq!(dw, noise.complex_increments(4, 0.01).expect("Valid increments"));
        assert!(dw.iter().all(|x| x.im != 0.0));

        let silent = noise.complex_increments(0, 0.0).expect("Valid increments");
        assert!(silent.iter().all(|x| x.norm() == 0.0));
        assert!(noise.complex_increments(0, -0.1).is_err());
    }

    #[test]
    fn test_no_sources_gives_empty_buffer() {
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        let noise = WienerNoise::new(1, 2, 0, &grid);
        let dw = noise.increments(0, 0.1).expect("Valid increments");
        assert_eq!(dw.shape(), &[2, 0, 8]);
    }
}
