// src/solvers/nonlinear.rs
//! Nonlinear Evaluator for the RK4IP Scheme
//!
//! # Pointwise Right-Hand Side
//!
//! At every grid point the nonlinear increment over a step is
//! ```text
//! N_c(ψ, t) = D_c(ψ, t)·Δt + Σ_n S_cn(ψ, t)·ΔW_n
//! ```
//! with the noise sum present only when a diffusion is configured. The
//! increments are real or complex, as the diffusion's `Increment` says.
//!
//! # Stages
//!
//! 1. `stage1`: `N(ψ, t)`, later propagated into `k1`
//! 2. `stage2`: from `ψ_I` and `k1`
//!    ```text
//!    k2    = N(ψ_I + k1/2, t + Δt/2)
//!    k3    = N(ψ_I + k2/2, t + Δt/2)
//!    psi_4 = ψ_I + k3
//!    psi_k = ψ_I + k1/6 + k2/3 + k3/3
//!    ```
//! 3. `stage3`: from the propagated `psi_k` and `psi_4`
//!    ```text
//!    k4     = N(psi_4, t + Δt)
//!    output = psi_k + k4/6
//!    ```
//!
//! # Parallelism
//!
//! Every (trajectory, point) pair is independent. Fields are viewed as
//! (trajectories, components, points) arrays and zipped over their
//! component lanes, so each parallel task sees all components of one point.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::grid::Grid;
use crate::models::model::{Diffusion, Drift, NoDiffusion, NoiseIncrement};
use ndarray::{
    Array3, ArrayBase, ArrayD, ArrayView1, ArrayView3, ArrayViewMut1, Axis, Data, IxDyn, Zip,
};
use num_complex::Complex64;
use rayon::prelude::*;

/// Per-task scratch space, reused across the points a task visits
struct Workspace {
    idx: Vec<usize>,
    psi: Vec<Complex64>,
    arg: Vec<Complex64>,
    k1: Vec<Complex64>,
    k2: Vec<Complex64>,
    k3: Vec<Complex64>,
    coupling: Vec<Complex64>,
}

fn load(dst: &mut [Complex64], lane: &ArrayView1<'_, Complex64>) {
    dst.iter_mut().zip(lane.iter()).for_each(|(d, x)| *d = *x);
}

pub struct NonlinearEvaluator<D: Drift, S: Diffusion = NoDiffusion> {
    grid: Grid,
    drift: D,
    diffusion: Option<S>,
}

impl<D: Drift> NonlinearEvaluator<D, NoDiffusion> {
    pub fn new(grid: Grid, drift: D) -> Self {
        NonlinearEvaluator {
            grid,
            drift,
            diffusion: None,
        }
    }
}

impl<D: Drift, S: Diffusion> NonlinearEvaluator<D, S> {
    pub fn with_diffusion(grid: Grid, drift: D, diffusion: S) -> SdeResult<Self> {
        if diffusion.components() != drift.components() {
            return Err(SdeError::ConfigurationError {
                field: "diffusion".to_string(),
                reason: format!(
                    "diffusion couples {} components but the drift has {}",
                    diffusion.components(),
                    drift.components()
                ),
            });
        }

        Ok(NonlinearEvaluator {
            grid,
            drift,
            diffusion: Some(diffusion),
        })
    }

    pub fn components(&self) -> usize {
        self.drift.components()
    }

    /// Noise sources of the diffusion, zero without one
    pub fn noise_sources(&self) -> usize {
        self.diffusion.as_ref().map_or(0, |s| s.noise_sources())
    }

    pub fn has_diffusion(&self) -> bool {
        self.diffusion.is_some()
    }

    fn workspace(&self) -> Workspace {
        let c = self.components();
        Workspace {
            idx: vec![0; self.grid.dims()],
            psi: vec![Complex64::new(0.0, 0.0); c],
            arg: vec![Complex64::new(0.0, 0.0); c],
            k1: vec![Complex64::new(0.0, 0.0); c],
            k2: vec![Complex64::new(0.0, 0.0); c],
            k3: vec![Complex64::new(0.0, 0.0); c],
            coupling: vec![Complex64::new(0.0, 0.0); c * self.noise_sources()],
        }
    }

    /// `N_c(ψ, t)` at one point, written into `out`
    #[allow(clippy::too_many_arguments)]
    fn evaluate_point(
        &self,
        idx: &[usize],
        psi: &[Complex64],
        dw: Option<&ArrayView1<'_, S::Increment>>,
        t: f64,
        dt: f64,
        coupling: &mut [Complex64],
        out: &mut [Complex64],
    ) {
        self.drift.evaluate(idx, psi, t, out);
        out.iter_mut().for_each(|o| *o *= dt);

        if let (Some(diffusion), Some(dw)) = (&self.diffusion, dw) {
            let sources = dw.len();
            diffusion.evaluate(idx, psi, t, coupling);
            for (c, o) in out.iter_mut().enumerate() {
                let row = &coupling[c * sources..(c + 1) * sources];
                for (s, w) in row.iter().zip(dw.iter()) {
                    *o += w.couple(*s);
                }
            }
        }
    }

    /// Checks the (trajectories, channels, *spatial) contract and views the
    /// buffer as (trajectories, channels, points)
    fn points<'a, A, T>(
        &self,
        buffer: &str,
        field: &'a ArrayBase<T, IxDyn>,
        trajectories: usize,
        channels: usize,
    ) -> SdeResult<ArrayView3<'a, A>>
    where
        T: Data<Elem = A>,
    {
        let mut expected = vec![trajectories, channels];
        expected.extend_from_slice(self.grid.shape());
        validate_shape(buffer, &expected, field.shape())?;

        field
            .view()
            .into_shape((trajectories, channels, self.grid.size()))
            .map_err(|e| SdeError::ConfigurationError {
                field: buffer.to_string(),
                reason: format!("buffer is not in standard layout: {}", e),
            })
    }

    /// Reads the trajectory count off a field and checks noise presence
    fn prepare<T: Data<Elem = Complex64>>(
        &self,
        field: &ArrayBase<T, IxDyn>,
        has_noise: bool,
    ) -> SdeResult<usize> {
        match (self.diffusion.is_some(), has_noise) {
            (true, false) => Err(SdeError::ConfigurationError {
                field: "dW".to_string(),
                reason: "diffusion is configured but no noise increments were supplied"
                    .to_string(),
            }),
            (false, true) => Err(SdeError::ConfigurationError {
                field: "dW".to_string(),
                reason: "noise increments supplied but no diffusion is configured".to_string(),
            }),
            _ => {
                let trajectories = field.shape().first().copied().unwrap_or(0);
                validate_count("trajectories", trajectories)?;
                Ok(trajectories)
            }
        }
    }

    fn finish(&self, out: Array3<Complex64>) -> SdeResult<ArrayD<Complex64>> {
        let mut shape = vec![out.len_of(Axis(0)), out.len_of(Axis(1))];
        shape.extend_from_slice(self.grid.shape());
        out.into_shape(IxDyn(&shape))
            .map_err(|e| SdeError::ConfigurationError {
                field: "output".to_string(),
                reason: format!("cannot restore spatial shape: {}", e),
            })
    }

    /// Stage 1: `N(ψ, t)` at every point
    pub fn stage1<T>(
        &self,
        input: &ArrayBase<T, IxDyn>,
        dw: Option<&ArrayD<S::Increment>>,
        t: f64,
        dt: f64,
    ) -> SdeResult<ArrayD<Complex64>>
    where
        T: Data<Elem = Complex64>,
    {
        let trajectories = self.prepare(input, dw.is_some())?;
        let components = self.components();
        let input = input.as_standard_layout();
        let input = self.points("input", &input, trajectories, components)?;
        let dw = dw.map(|dw| dw.as_standard_layout());
        let dw = match &dw {
            Some(dw) => Some(self.points("dW", dw, trajectories, self.noise_sources())?),
            None => None,
        };

        let mut out = Array3::zeros((trajectories, components, self.grid.size()));
        let point = |ws: &mut Workspace,
                     s: usize,
                     mut out: ArrayViewMut1<'_, Complex64>,
                     psi: ArrayView1<'_, Complex64>,
                     dw: Option<ArrayView1<'_, S::Increment>>| {
            self.grid.unravel(s, &mut ws.idx);
            load(&mut ws.psi, &psi);
            self.evaluate_point(&ws.idx, &ws.psi, dw.as_ref(), t, dt, &mut ws.coupling, &mut ws.k1);
            out.iter_mut().zip(&ws.k1).for_each(|(o, k)| *o = *k);
        };

        let zip = Zip::indexed(out.lanes_mut(Axis(1))).and(input.lanes(Axis(1)));
        match dw {
            Some(dw) => zip
                .and(dw.lanes(Axis(1)))
                .into_par_iter()
                .for_each_init(
                    || self.workspace(),
                    |ws, ((_, s), out, psi, dw)| point(ws, s, out, psi, Some(dw)),
                ),
            None => zip.into_par_iter().for_each_init(
                || self.workspace(),
                |ws, ((_, s), out, psi)| point(ws, s, out, psi, None),
            ),
        }

        self.finish(out)
    }

    /// Stage 2: `k2`, `k3` and the two combinations, returned as
    /// `(psi_k, psi_4)`
    pub fn stage2<T, U>(
        &self,
        psi_i: &ArrayBase<T, IxDyn>,
        k1: &ArrayBase<U, IxDyn>,
        dw: Option<&ArrayD<S::Increment>>,
        t: f64,
        dt: f64,
    ) -> SdeResult<(ArrayD<Complex64>, ArrayD<Complex64>)>
    where
        T: Data<Elem = Complex64>,
        U: Data<Elem = Complex64>,
    {
        let trajectories = self.prepare(psi_i, dw.is_some())?;
        let components = self.components();
        let psi_i = psi_i.as_standard_layout();
        let psi_i = self.points("psi_I", &psi_i, trajectories, components)?;
        let k1 = k1.as_standard_layout();
        let k1 = self.points("k1", &k1, trajectories, components)?;
        let dw = dw.map(|dw| dw.as_standard_layout());
        let dw = match &dw {
            Some(dw) => Some(self.points("dW", dw, trajectories, self.noise_sources())?),
            None => None,
        };

        let t_half = t + dt / 2.0;
        let shape = (trajectories, components, self.grid.size());
        let mut psi_k = Array3::zeros(shape);
        let mut psi_4 = Array3::zeros(shape);

        let point = |ws: &mut Workspace,
                     s: usize,
                     mut psi_k: ArrayViewMut1<'_, Complex64>,
                     mut psi_4: ArrayViewMut1<'_, Complex64>,
                     psi_i: ArrayView1<'_, Complex64>,
                     k1: ArrayView1<'_, Complex64>,
                     dw: Option<ArrayView1<'_, S::Increment>>| {
            self.grid.unravel(s, &mut ws.idx);
            load(&mut ws.psi, &psi_i);
            load(&mut ws.k1, &k1);

            for c in 0..components {
                ws.arg[c] = ws.psi[c] + ws.k1[c] / 2.0;
            }
            self.evaluate_point(&ws.idx, &ws.arg, dw.as_ref(), t_half, dt, &mut ws.coupling, &mut ws.k2);

            for c in 0..components {
                ws.arg[c] = ws.psi[c] + ws.k2[c] / 2.0;
            }
            self.evaluate_point(&ws.idx, &ws.arg, dw.as_ref(), t_half, dt, &mut ws.coupling, &mut ws.k3);

            for c in 0..components {
                psi_4[c] = ws.psi[c] + ws.k3[c];
                psi_k[c] = ws.psi[c] + ws.k1[c] / 6.0 + ws.k2[c] / 3.0 + ws.k3[c] / 3.0;
            }
        };

        let zip = Zip::indexed(psi_k.lanes_mut(Axis(1)))
            .and(psi_4.lanes_mut(Axis(1)))
            .and(psi_i.lanes(Axis(1)))
            .and(k1.lanes(Axis(1)));
        match dw {
            Some(dw) => zip
                .and(dw.lanes(Axis(1)))
                .into_par_iter()
                .for_each_init(
                    || self.workspace(),
                    |ws, ((_, s), psi_k, psi_4, psi_i, k1, dw)| {
                        point(ws, s, psi_k, psi_4, psi_i, k1, Some(dw))
                    },
                ),
            None => zip.into_par_iter().for_each_init(
                || self.workspace(),
                |ws, ((_, s), psi_k, psi_4, psi_i, k1)| point(ws, s, psi_k, psi_4, psi_i, k1, None),
            ),
        }

        Ok((self.finish(psi_k)?, self.finish(psi_4)?))
    }

    /// Stage 3: `k4` at the end of the step and the final combination
    pub fn stage3<T, U>(
        &self,
        psi_k: &ArrayBase<T, IxDyn>,
        psi_4: &ArrayBase<U, IxDyn>,
        dw: Option<&ArrayD<S::Increment>>,
        t: f64,
        dt: f64,
    ) -> SdeResult<ArrayD<Complex64>>
    where
        T: Data<Elem = Complex64>,
        U: Data<Elem = Complex64>,
    {
        let trajectories = self.prepare(psi_k, dw.is_some())?;
        let components = self.components();
        let psi_k = psi_k.as_standard_layout();
        let psi_k = self.points("psi_k", &psi_k, trajectories, components)?;
        let psi_4 = psi_4.as_standard_layout();
        let psi_4 = self.points("psi_4", &psi_4, trajectories, components)?;
        let dw = dw.map(|dw| dw.as_standard_layout());
        let dw = match &dw {
            Some(dw) => Some(self.points("dW", dw, trajectories, self.noise_sources())?),
            None => None,
        };

        let t_end = t + dt;
        let mut out = Array3::zeros((trajectories, components, self.grid.size()));

        let point = |ws: &mut Workspace,
                     s: usize,
                     mut out: ArrayViewMut1<'_, Complex64>,
                     psi_k: ArrayView1<'_, Complex64>,
                     psi_4: ArrayView1<'_, Complex64>,
                     dw: Option<ArrayView1<'_, S::Increment>>| {
            self.grid.unravel(s, &mut ws.idx);
            load(&mut ws.psi, &psi_4);
            // k4 goes into the k1 slot, which is free in this stage
            self.evaluate_point(&ws.idx, &ws.psi, dw.as_ref(), t_end, dt, &mut ws.coupling, &mut ws.k1);

            for (c, o) in out.iter_mut().enumerate() {
                *o = psi_k[c] + ws.k1[c] / 6.0;
            }
        };

        let zip = Zip::indexed(out.lanes_mut(Axis(1)))
            .and(psi_k.lanes(Axis(1)))
            .and(psi_4.lanes(Axis(1)));
        match dw {
            Some(dw) => zip
                .and(dw.lanes(Axis(1)))
                .into_par_iter()
                .for_each_init(
                    || self.workspace(),
                    |ws, ((_, s), out, psi_k, psi_4, dw)| point(ws, s, out, psi_k, psi_4, Some(dw)),
                ),
            None => zip.into_par_iter().for_each_init(
                || self.workspace(),
                |ws, ((_, s), out, psi_k, psi_4)| point(ws, s, out, psi_k, psi_4, None),
            ),
        }

        self.finish(out)
    }
}
