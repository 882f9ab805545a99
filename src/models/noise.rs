// src/models/noise.rs
//! Diffusion Couplings
//!
//! Both couplings give every component its own noise source:
//! ```text
//! additive:        S_cn = σ_c δ_cn
//! multiplicative:  S_cn = σ_c ψ_c δ_cn
//! ```
//! `new` builds a coupling driven by real increments, `complex` one driven
//! by complex increments.

use super::model::{Diffusion, NoiseIncrement};
use num_complex::Complex64;
use std::marker::PhantomData;

fn diagonal(sigmas: &[Complex64], factors: impl Iterator<Item = Complex64>, out: &mut [Complex64]) {
    let n = sigmas.len();
    out.iter_mut().for_each(|o| *o = Complex64::new(0.0, 0.0));
    for (c, (sigma, factor)) in sigmas.iter().zip(factors).enumerate() {
        out[c * n + c] = sigma * factor;
    }
}

#[derive(Clone, Debug)]
pub struct AdditiveNoise<W = f64> {
    pub sigmas: Vec<Complex64>,
    increment: PhantomData<W>,
}

impl AdditiveNoise {
    pub fn new(sigmas: Vec<Complex64>) -> Self {
        AdditiveNoise {
            sigmas,
            increment: PhantomData,
        }
    }
}

impl AdditiveNoise<Complex64> {
    pub fn complex(sigmas: Vec<Complex64>) -> Self {
        AdditiveNoise {
            sigmas,
            increment: PhantomData,
        }
    }
}

impl<W: NoiseIncrement> Diffusion for AdditiveNoise<W> {
    type Increment = W;

    fn components(&self) -> usize {
        self.sigmas.len()
    }

    fn noise_sources(&self) -> usize {
        self.sigmas.len()
    }

    fn evaluate(&self, _idx: &[usize], _psi: &[Complex64], _t: f64, out: &mut [Complex64]) {
        let ones = std::iter::repeat(Complex64::new(1.0, 0.0));
        diagonal(&self.sigmas, ones, out);
    }
}

#[derive(Clone, Debug)]
pub struct MultiplicativeNoise<W = f64> {
    pub sigmas: Vec<Complex64>,
    increment: PhantomData<W>,
}

impl MultiplicativeNoise {
    pub fn new(sigmas: Vec<Complex64>) -> Self {
        MultiplicativeNoise {
            sigmas,
            increment: PhantomData,
        }
    }
}

impl MultiplicativeNoise<Complex64> {
    pub fn complex(sigmas: Vec<Complex64>) -> Self {
        MultiplicativeNoise {
            sigmas,
            increment: PhantomData,
        }
    }
}

impl<W: NoiseIncrement> Diffusion for MultiplicativeNoise<W> {
    type Increment = W;

    fn components(&self) -> usize {
        self.sigmas.len()
    }

    fn noise_sources(&self) -> usize {
        self.sigmas.len()
    }

    fn evaluate(&self, _idx: &[usize], psi: &[Complex64], _t: f64, out: &mut [Complex64]) {
        diagonal(&self.sigmas, psi.iter().copied(), out);
    }
}
