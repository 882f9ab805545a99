// src/analytics/exact.rs
//! Closed-form solutions used to check the stepper
//!
//! # Linear Equation
//!
//! With a linear drift `D_c = λ_c ψ_c` and no noise every Fourier mode
//! evolves independently:
//! ```text
//! ψ̂_c(k, t) = ψ̂_c(k, 0)·exp((λ_c + E_c(k²))·t)
//! ```
//!
//! # Uniform Condensate
//!
//! A spatially uniform, untrapped single-component GPE field only rotates
//! its phase at the mean-field rate:
//! ```text
//! ψ(t) = ψ(0)·exp(-i·g|ψ(0)|²·t)
//! ```

use crate::error::{validation::*, SdeError, SdeResult};
use crate::grid::Grid;
use crate::solvers::kinetic::KineticTable;
use crate::solvers::propagator::KineticPropagator;
use ndarray::{ArrayBase, ArrayD, Axis, Data, IxDyn};
use num_complex::Complex64;

/// Exact solution of `∂ψ_c/∂t = L_c ψ_c + λ_c ψ_c` at time `t`
pub fn linear_solution<S>(
    grid: &Grid,
    table: &KineticTable,
    rates: &[Complex64],
    psi0: &ArrayBase<S, IxDyn>,
    t: f64,
) -> SdeResult<ArrayD<Complex64>>
where
    S: Data<Elem = Complex64>,
{
    if rates.len() != table.components() {
        return Err(SdeError::ConfigurationError {
            field: "rates".to_string(),
            reason: format!(
                "{} rates given for {} components",
                rates.len(),
                table.components()
            ),
        });
    }

    let propagator = KineticPropagator::new(grid, table.clone());
    let mut out = propagator.propagate(psi0, t)?;
    for mut trajectory in out.outer_iter_mut() {
        for (mut component, rate) in trajectory.axis_iter_mut(Axis(0)).zip(rates) {
            let growth = (*rate * t).exp();
            component.mapv_inplace(|x| x * growth);
        }
    }
    Ok(out)
}

/// Phase of a uniform condensate with density `|psi0|²` after time `t`
pub fn uniform_condensate(psi0: Complex64, interaction: f64, t: f64) -> SdeResult<Complex64> {
    validate_finite("interaction", interaction)?;
    validate_finite("t", t)?;
    let rate = interaction * psi0.norm_sqr();
    Ok(psi0 * Complex64::new(0.0, -rate * t).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::kinetic::KineticCoeffs;

    #[test]
    fn test_linear_solution_uniform_mode() {
        // k = 0 carries no kinetic phase, so only the rate acts
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        let table = KineticTable::normalize(&KineticCoeffs::default(), 1).expect("Valid");
        let psi0 = ArrayD::from_elem(IxDyn(&[1, 1, 8]), Complex64::new(2.0, 0.0));
        let rate = Complex64::new(-0.5, 1.0);

        let out = linear_solution(&grid, &table, &[rate], &psi0, 0.4).expect("Valid");
        let expected = Complex64::new(2.0, 0.0) * (rate * 0.4).exp();
        for x in out.iter() {
            assert!((x - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn test_linear_solution_rate_mismatch() {
        let grid = Grid::new(&[8], &[1.0]).expect("Valid grid");
        let table = KineticTable::normalize(&KineticCoeffs::default(), 2).expect("Valid");
        let psi0: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[1, 2, 8]));
        assert!(linear_solution(&grid, &table, &[Complex64::new(0.0, 0.0)], &psi0, 1.0).is_err());
    }

    #[test]
    fn test_uniform_condensate_keeps_density() {
        let psi0 = Complex64::new(0.6, 0.8);
        let psi = uniform_condensate(psi0, 3.0, 2.5).expect("Valid");
        assert!((psi.norm() - 1.0).abs() < 1e-12);
        assert!((psi - Complex64::new(0.0, -7.5).exp() * psi0).norm() < 1e-12);
    }
}
