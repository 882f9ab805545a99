// src/models/linear.rs
use super::model::Drift;
use num_complex::Complex64;

/// `D ≡ 0`: the stepper reduces to pure kinetic propagation
#[derive(Clone, Copy, Debug)]
pub struct ZeroDrift {
    pub components: usize,
}

impl ZeroDrift {
    pub fn new(components: usize) -> Self {
        ZeroDrift { components }
    }
}

impl Drift for ZeroDrift {
    fn components(&self) -> usize {
        self.components
    }

    fn evaluate(&self, _idx: &[usize], _psi: &[Complex64], _t: f64, out: &mut [Complex64]) {
        out.iter_mut().for_each(|o| *o = Complex64::new(0.0, 0.0));
    }
}

/// `D_c = λ_c ψ_c`, exactly solvable together with any kinetic term
#[derive(Clone, Debug)]
pub struct LinearDrift {
    pub rates: Vec<Complex64>,
}

impl LinearDrift {
    pub fn new(rates: Vec<Complex64>) -> Self {
        LinearDrift { rates }
    }

    pub fn uniform(rate: Complex64, components: usize) -> Self {
        LinearDrift {
            rates: vec![rate; components],
        }
    }
}

impl Drift for LinearDrift {
    fn components(&self) -> usize {
        self.rates.len()
    }

    fn evaluate(&self, _idx: &[usize], psi: &[Complex64], _t: f64, out: &mut [Complex64]) {
        for ((o, p), rate) in out.iter_mut().zip(psi).zip(&self.rates) {
            *o = rate * p;
        }
    }
}

/// Adapts a closure `f(idx, psi, t, out)` into a drift
pub struct FnDrift<F> {
    components: usize,
    f: F,
}

impl<F> FnDrift<F>
where
    F: Fn(&[usize], &[Complex64], f64, &mut [Complex64]) + Send + Sync,
{
    pub fn new(components: usize, f: F) -> Self {
        FnDrift { components, f }
    }
}

impl<F> Drift for FnDrift<F>
where
    F: Fn(&[usize], &[Complex64], f64, &mut [Complex64]) + Send + Sync,
{
    fn components(&self) -> usize {
        self.components
    }

    fn evaluate(&self, idx: &[usize], psi: &[Complex64], t: f64, out: &mut [Complex64]) {
        (self.f)(idx, psi, t, out)
    }
}
