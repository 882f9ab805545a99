// src/solvers/kinetic.rs
//! Kinetic Coefficients
//!
//! # Mathematical Framework
//!
//! The linear, non-local part of the equation is a sum of even powers of
//! the gradient:
//! ```text
//! L ψ_c = Σ_p K_{c,p} ∇^p ψ_c,   p ∈ {0, 2, 4, …}
//! ```
//! In the spectral domain `∇² ↦ -k²`, so `L` becomes the per-mode exponent
//! ```text
//! E_c(k²) = Σ_p K_{c,p} (-k²)^{p/2}
//! ```
//! and propagating by `δ` multiplies mode `k` of component `c` by
//! `exp(E_c(k²)·δ)`. Power 0 is a uniform linear term `K_{c,0}·ψ_c`.
//!
//! # Accepted Forms
//!
//! - scalar: the same coefficient for every component, power 2
//! - vector: one coefficient per component, power 2
//! - map `{power: values}`: values per component (or one value broadcast
//!   to all components) for each listed even power

use crate::error::{SdeError, SdeResult};
use num_complex::Complex64;
use std::collections::BTreeMap;

/// Power of the gradient every normalized table carries
pub const BASE_POWER: u32 = 2;

/// Kinetic coefficients as supplied by the caller
#[derive(Clone, Debug, PartialEq)]
pub enum KineticCoeffs {
    Scalar(Complex64),
    PerComponent(Vec<Complex64>),
    ByPower(BTreeMap<u32, Vec<Complex64>>),
}

impl Default for KineticCoeffs {
    fn default() -> Self {
        KineticCoeffs::Scalar(Complex64::new(0.0, 0.5))
    }
}

impl From<f64> for KineticCoeffs {
    fn from(value: f64) -> Self {
        KineticCoeffs::Scalar(Complex64::new(value, 0.0))
    }
}

impl From<Complex64> for KineticCoeffs {
    fn from(value: Complex64) -> Self {
        KineticCoeffs::Scalar(value)
    }
}

impl From<Vec<Complex64>> for KineticCoeffs {
    fn from(values: Vec<Complex64>) -> Self {
        KineticCoeffs::PerComponent(values)
    }
}

impl From<BTreeMap<u32, Vec<Complex64>>> for KineticCoeffs {
    fn from(values: BTreeMap<u32, Vec<Complex64>>) -> Self {
        KineticCoeffs::ByPower(values)
    }
}

/// Uniform `components × powers` coefficient table
#[derive(Clone, Debug, PartialEq)]
pub struct KineticTable {
    powers: Vec<u32>,
    // coeffs[c][p] pairs with powers[p]
    coeffs: Vec<Vec<Complex64>>,
}

impl KineticTable {
    /// Normalizes any accepted form into a table for `components` components
    pub fn normalize(coeffs: &KineticCoeffs, components: usize) -> SdeResult<Self> {
        let mut by_power = match coeffs {
            KineticCoeffs::Scalar(value) => {
                BTreeMap::from([(BASE_POWER, vec![*value; components])])
            }
            KineticCoeffs::PerComponent(values) => {
                if values.len() != components {
                    return Err(SdeError::ConfigurationError {
                        field: "kinetic_coeffs".to_string(),
                        reason: format!(
                            "{} coefficients given for {} components",
                            values.len(),
                            components
                        ),
                    });
                }
                BTreeMap::from([(BASE_POWER, values.clone())])
            }
            KineticCoeffs::ByPower(map) => {
                let mut by_power = BTreeMap::new();
                for (&power, values) in map {
                    if power % 2 != 0 {
                        return Err(SdeError::ConfigurationError {
                            field: "kinetic_coeffs".to_string(),
                            reason: format!("only even Laplacian powers are supported, got {}", power),
                        });
                    }
                    let values = match values.len() {
                        1 => vec![values[0]; components],
                        n if n == components => values.clone(),
                        n => {
                            return Err(SdeError::ConfigurationError {
                                field: "kinetic_coeffs".to_string(),
                                reason: format!(
                                    "power {} has {} coefficients for {} components",
                                    power, n, components
                                ),
                            })
                        }
                    };
                    by_power.insert(power, values);
                }
                by_power
            }
        };
        by_power
            .entry(BASE_POWER)
            .or_insert_with(|| vec![Complex64::new(0.0, 0.0); components]);

        let powers: Vec<u32> = by_power.keys().copied().collect();
        let coeffs = (0..components)
            .map(|c| by_power.values().map(|values| values[c]).collect())
            .collect();

        Ok(KineticTable { powers, coeffs })
    }

    pub fn components(&self) -> usize {
        self.coeffs.len()
    }

    /// Laplacian powers in ascending order
    pub fn powers(&self) -> &[u32] {
        &self.powers
    }

    pub fn coeff(&self, component: usize, power: u32) -> Option<Complex64> {
        self.powers
            .iter()
            .position(|&p| p == power)
            .map(|i| self.coeffs[component][i])
    }

    /// Spectral exponent `Σ_p K_{c,p} (-k²)^{p/2}` of one mode
    pub fn exponent(&self, component: usize, ksquared: f64) -> Complex64 {
        self.powers
            .iter()
            .zip(&self.coeffs[component])
            .map(|(&p, k)| k * (-ksquared).powi((p / 2) as i32))
            .sum()
    }

    /// True when some coefficient amplifies high modes
    pub fn is_unstable(&self) -> bool {
        self.powers.iter().enumerate().any(|(i, &p)| {
            // (-k²)^{p/2} is negative for p ≡ 2 (mod 4)
            let sign = if (p / 2) % 2 == 1 { -1.0 } else { 1.0 };
            self.coeffs.iter().any(|row| sign * row[i].re > 0.0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_scalar_broadcasts_to_components() {
        let table = KineticTable::normalize(&c(0.0, 0.5).into(), 3).expect("Valid coefficients");
        assert_eq!(table.powers(), &[2]);
        assert_eq!(table.components(), 3);
        for comp in 0..3 {
            assert_eq!(table.coeff(comp, 2), Some(c(0.0, 0.5)));
        }
    }

    #[test]
    fn test_vector_must_match_components() {
        let coeffs: KineticCoeffs = vec![c(1.0, 0.0), c(2.0, 0.0)].into();
        assert!(KineticTable::normalize(&coeffs, 2).is_ok());
        assert!(KineticTable::normalize(&coeffs, 3).is_err());
    }

    #[test]
    fn test_power_map_fills_base_power() {
        let coeffs = KineticCoeffs::ByPower(BTreeMap::from([(4, vec![c(-0.1, 0.0)])]));
        let table = KineticTable::normalize(&coeffs, 2).expect("Valid coefficients");
        assert_eq!(table.powers(), &[2, 4]);
        assert_eq!(table.coeff(1, 2), Some(c(0.0, 0.0)));
        assert_eq!(table.coeff(1, 4), Some(c(-0.1, 0.0)));
        assert_eq!(table.coeff(0, 6), None);
    }

    #[test]
    fn test_odd_powers_rejected() {
        for power in [1, 3, 5] {
            let coeffs = KineticCoeffs::ByPower(BTreeMap::from([(power, vec![c(1.0, 0.0)])]));
            match KineticTable::normalize(&coeffs, 1) {
                Err(SdeError::ConfigurationError { field, .. }) => {
                    assert_eq!(field, "kinetic_coeffs")
                }
                other => panic!("power {} should be rejected, got {:?}", power, other),
            }
        }
    }

    #[test]
    fn test_power_zero_is_uniform_term() {
        let coeffs = KineticCoeffs::ByPower(BTreeMap::from([
            (0, vec![c(-1.0, 0.0)]),
            (2, vec![c(0.0, 0.5)]),
        ]));
        let table = KineticTable::normalize(&coeffs, 1).expect("Valid coefficients");
        assert_eq!(table.powers(), &[0, 2]);
        assert_eq!(table.coeff(0, 0), Some(c(-1.0, 0.0)));

        // -1 + 0.5i·(-9)
        let e = table.exponent(0, 9.0);
        assert!((e - c(-1.0, -4.5)).norm() < 1e-12);
        assert!(!table.is_unstable());

        let growing = KineticCoeffs::ByPower(BTreeMap::from([(0, vec![c(0.2, 0.0)])]));
        let table = KineticTable::normalize(&growing, 1).expect("Valid coefficients");
        assert!(table.is_unstable());
    }

    #[test]
    fn test_exponent_signs() {
        let coeffs = KineticCoeffs::ByPower(BTreeMap::from([
            (2, vec![c(0.0, 0.5)]),
            (4, vec![c(0.25, 0.0)]),
        ]));
        let table = KineticTable::normalize(&coeffs, 1).expect("Valid coefficients");
        // 0.5i·(-4) + 0.25·16
        let e = table.exponent(0, 4.0);
        assert!((e - c(4.0, -2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_stability_detection() {
        let diffusive = KineticTable::normalize(&0.1.into(), 1).expect("Valid coefficients");
        assert!(!diffusive.is_unstable());
        let anti = KineticTable::normalize(&(-0.1).into(), 1).expect("Valid coefficients");
        assert!(anti.is_unstable());
        let unitary = KineticTable::normalize(&KineticCoeffs::default(), 1).expect("Valid");
        assert!(!unitary.is_unstable());
    }
}
