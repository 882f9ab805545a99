// demos/demo.rs
use fast_spde::grid::Grid;
use fast_spde::logging::init_logging;
use fast_spde::math_utils::{field_norms, Timer};
use fast_spde::models::gpe::GrossPitaevskii;
use fast_spde::models::noise::AdditiveNoise;
use fast_spde::output;
use fast_spde::rng::WienerNoise;
use fast_spde::solvers::{Rk4ipStepper, Stepper, StepperConfig};
use fast_spde::SdeResult;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

const POINTS: usize = 256;
const BOX: f64 = 40.0;
const STEPS: usize = 2000;
const DT: f64 = 1e-3;

fn main() {
    init_logging(None);

    let args: Vec<String> = std::env::args().collect();
    let noisy = args.iter().any(|a| a == "--noise");

    let result = if noisy {
        run_stochastic()
    } else {
        run_deterministic()
    };
    if let Err(e) = result {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn config(trajectories: usize) -> StepperConfig {
    StepperConfig {
        shape: vec![POINTS],
        box_size: vec![BOX],
        trajectories,
        ..Default::default()
    }
}

/// Bright soliton `sech(x)`, stationary for attractive g = -1
fn soliton(grid: &Grid, trajectories: usize) -> ArrayD<Complex64> {
    let x = grid.coordinates(0);
    ArrayD::from_shape_fn(IxDyn(&[trajectories, 1, POINTS]), |idx| {
        Complex64::new(1.0 / x[idx[2]].cosh(), 0.0)
    })
}

fn peak_density(field: &ArrayD<Complex64>) -> f64 {
    field.iter().map(|x| x.norm_sqr()).fold(0.0, f64::max)
}

fn evolve<S: Stepper<Increment = f64>>(
    stepper: &S,
    mut psi: ArrayD<Complex64>,
    noise: Option<&WienerNoise>,
) -> SdeResult<ArrayD<Complex64>> {
    let grid = stepper.grid().clone();
    let mut timer = Timer::new();
    timer.start();

    for step in 0..STEPS {
        let t = step as f64 * DT;
        let dw = match noise {
            Some(noise) => Some(noise.increments(step as u64, DT)?),
            None => None,
        };
        psi = stepper.step(&psi, dw.as_ref(), t, DT)?;

        if (step + 1) % 500 == 0 {
            let norms = field_norms(&psi, &grid);
            println!(
                "t = {:.3}  norm[0] = {:.10}  peak density = {:.6}",
                t + DT,
                norms[0],
                peak_density(&psi)
            );
        }
    }

    let elapsed = timer.elapsed_ms();
    println!(
        "{} steps in {:.1} ms ({:.1} steps/s)\n",
        STEPS,
        elapsed,
        STEPS as f64 / (elapsed / 1000.0)
    );
    Ok(psi)
}

fn run_deterministic() -> SdeResult<()> {
    println!("Running fast-spde RK4IP Demo: bright soliton\n");

    let config = config(1);
    let grid = config.grid()?;
    let drift = GrossPitaevskii::new(&grid, vec![vec![-1.0]])?;
    let stepper = Rk4ipStepper::new(config, drift)?;

    let psi0 = soliton(&grid, 1);
    println!("Initial norm: {:.10}", field_norms(&psi0, &grid)[0]);
    let psi = evolve(&stepper, psi0, None)?;

    write_outputs(&grid, &psi, "results/soliton_density.csv", false);
    Ok(())
}

fn run_stochastic() -> SdeResult<()> {
    println!("Running fast-spde RK4IP Demo: soliton ensemble with additive noise\n");

    let trajectories = 8;
    let config = config(trajectories);
    let grid = config.grid()?;
    let drift = GrossPitaevskii::new(&grid, vec![vec![-1.0]])?.with_losses(vec![0.01])?;
    let diffusion = AdditiveNoise::new(vec![Complex64::new(0.01, 0.0)]);
    let stepper = Rk4ipStepper::with_diffusion(config, drift, diffusion)?;
    let noise = WienerNoise::new(12345, trajectories, stepper.noise_sources(), &grid);

    let psi = evolve(&stepper, soliton(&grid, trajectories), Some(&noise))?;

    let norms = field_norms(&psi, &grid);
    let mean = norms.iter().sum::<f64>() / norms.len() as f64;
    println!("Ensemble mean norm: {:.6}", mean);

    write_outputs(&grid, &psi, "results/noisy_soliton_density.csv", true);
    Ok(())
}

fn write_outputs(grid: &Grid, psi: &ArrayD<Complex64>, filename: &str, noisy: bool) {
    if let Err(e) = std::fs::create_dir_all("results") {
        eprintln!("Error creating results directory: {}", e);
        return;
    }
    match output::write_density_to_csv(filename, grid, psi) {
        Ok(_) => println!("Density written to {}", filename),
        Err(e) => eprintln!("Error writing density: {}", e),
    }

    let norm = field_norms(psi, grid)[0].to_string();
    let peak = peak_density(psi).to_string();
    let summary = [
        ("stepper", "RK4IP"),
        ("noise", if noisy { "additive" } else { "none" }),
        ("final_norm", norm.as_str()),
        ("peak_density", peak.as_str()),
    ];
    match output::write_summary_to_csv("results/summary.csv", &summary) {
        Ok(_) => println!("Summary written to results/summary.csv"),
        Err(e) => eprintln!("Error writing summary: {}", e),
    }
}
