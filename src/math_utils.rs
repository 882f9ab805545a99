// src/math_utils.rs
use crate::grid::Grid;
use ndarray::{ArrayBase, Axis, Data, IxDyn};
use num_complex::Complex64;

/// Discrete L2 norm `sqrt(Σ |ψ|² dV)` of every (trajectory, component)
/// batch, in row-major order
pub fn field_norms<S>(field: &ArrayBase<S, IxDyn>, grid: &Grid) -> Vec<f64>
where
    S: Data<Elem = Complex64>,
{
    let dv = grid.cell_volume();
    field
        .outer_iter()
        .flat_map(|trajectory| {
            trajectory
                .axis_iter(Axis(0))
                .map(|component| (component.iter().map(|x| x.norm_sqr()).sum::<f64>() * dv).sqrt())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Largest pointwise `|a - b|`
pub fn max_abs_diff<S, T>(a: &ArrayBase<S, IxDyn>, b: &ArrayBase<T, IxDyn>) -> f64
where
    S: Data<Elem = Complex64>,
    T: Data<Elem = Complex64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    #[test]
    fn test_field_norms_per_batch() {
        let grid = Grid::new(&[4], &[2.0]).expect("Valid grid");
        let field = ArrayD::from_shape_fn(IxDyn(&[2, 2, 4]), |idx| {
            Complex64::new((idx[0] + idx[1]) as f64, 0.0)
        });
        let norms = field_norms(&field, &grid);
        // dV = 0.5, four points
        assert_eq!(norms.len(), 4);
        assert!(norms[0].abs() < 1e-15);
        assert!((norms[1] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((norms[3] - 2.0 * 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_max_abs_diff() {
        let a = ArrayD::from_elem(IxDyn(&[1, 1, 3]), Complex64::new(1.0, 0.0));
        let mut b = a.clone();
        b[[0, 0, 1]] = Complex64::new(1.0, 0.5);
        assert!((max_abs_diff(&a, &b) - 0.5).abs() < 1e-15);
    }
}
