// src/models/model.rs
//! Pointwise Capabilities of the Field Equation
//!
//! The equation advanced by the steppers is
//! ```text
//! ∂ψ/∂t = K·∇²ψ + D(ψ, t) + S(ψ, t)·ξ(t)
//! ```
//! The kinetic term is handled spectrally by the stepper itself; the drift
//! `D` and the optional diffusion `S` are supplied by the caller as values of
//! the traits below. Both are evaluated one grid point at a time, with every
//! component at that point available, so they may couple components but
//! never neighbouring points.
//!
//! Implementations must be pure: the same arguments always give the same
//! result, and evaluation happens concurrently from many threads.

use num_complex::Complex64;

/// Deterministic right-hand side `D(ψ, t)`
pub trait Drift: Send + Sync {
    /// Number of field components the drift couples
    fn components(&self) -> usize;

    /// Writes `D_c(idx, ψ, t)` for every component `c` into `out`.
    ///
    /// `idx` holds the per-axis spatial index of the point, `psi` and `out`
    /// have length `components()`.
    fn evaluate(&self, idx: &[usize], psi: &[Complex64], t: f64, out: &mut [Complex64]);
}

/// Element type of Wiener increments. Complex increments carry
/// independent real and imaginary parts.
pub trait NoiseIncrement: Copy + Default + Send + Sync + 'static {
    /// `coupling · dW`
    fn couple(self, coupling: Complex64) -> Complex64;
}

impl NoiseIncrement for f64 {
    fn couple(self, coupling: Complex64) -> Complex64 {
        coupling * self
    }
}

impl NoiseIncrement for Complex64 {
    fn couple(self, coupling: Complex64) -> Complex64 {
        coupling * self
    }
}

/// Noise coupling `S(ψ, t)` multiplying the Wiener increments
pub trait Diffusion: Send + Sync {
    /// Element type of the `dW` buffers this coupling is driven by
    type Increment: NoiseIncrement;

    fn components(&self) -> usize;

    /// Fixed number of independent noise sources
    fn noise_sources(&self) -> usize;

    /// Writes the coupling of every (component, noise source) pair into
    /// `out`, row-major: `out[c * noise_sources() + n]`.
    fn evaluate(&self, idx: &[usize], psi: &[Complex64], t: f64, out: &mut [Complex64]);
}

/// Diffusion type of a deterministic stepper. It has no values, so a
/// stepper parameterised by it can never evaluate noise terms.
#[derive(Debug, Clone, Copy)]
pub enum NoDiffusion {}

impl Diffusion for NoDiffusion {
    type Increment = f64;

    fn components(&self) -> usize {
        match *self {}
    }

    fn noise_sources(&self) -> usize {
        match *self {}
    }

    fn evaluate(&self, _idx: &[usize], _psi: &[Complex64], _t: f64, _out: &mut [Complex64]) {
        match *self {}
    }
}
