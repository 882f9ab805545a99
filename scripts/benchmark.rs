// scripts/benchmark.rs
use fast_spde::analytics::linear_solution;
use fast_spde::grid::Grid;
use fast_spde::logging::init_logging;
use fast_spde::math_utils::{max_abs_diff, Timer};
use fast_spde::models::gpe::GrossPitaevskii;
use fast_spde::models::linear::LinearDrift;
use fast_spde::models::noise::AdditiveNoise;
use fast_spde::rng::WienerNoise;
use fast_spde::solvers::{Rk4ipStepper, Stepper, StepperConfig};
use fast_spde::SdeResult;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::Command;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Self::get_rust_version(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/cpuinfo")
                .ok()
                .and_then(|content| {
                    content
                        .lines()
                        .find(|line| line.starts_with("model name"))
                        .and_then(|line| line.split(':').nth(1))
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "Unknown CPU".to_string())
        }

        #[cfg(target_os = "macos")]
        {
            Command::new("sysctl")
                .args(["-n", "machdep.cpu.brand_string"])
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown CPU".to_string())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            "Unknown CPU".to_string()
        }
    }

    fn get_rust_version() -> String {
        Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    points: usize,
    trajectories: usize,
    steps: usize,
    time_ms: f64,
    steps_per_sec: f64,
    // Max deviation from the exact solution, where one exists
    error: Option<f64>,
}

impl BenchmarkResult {
    fn new(name: String, grid: &Grid, trajectories: usize, steps: usize, time_ms: f64) -> Self {
        BenchmarkResult {
            name,
            points: grid.size(),
            trajectories,
            steps,
            time_ms,
            steps_per_sec: steps as f64 / (time_ms / 1000.0),
            error: None,
        }
    }
}

fn gaussian(grid: &Grid, trajectories: usize) -> ArrayD<Complex64> {
    let coords: Vec<Vec<f64>> = (0..grid.dims()).map(|d| grid.coordinates(d)).collect();
    let mut shape = vec![trajectories, 1];
    shape.extend_from_slice(grid.shape());
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        let r2: f64 = coords
            .iter()
            .enumerate()
            .map(|(d, x)| x[idx[d + 2]] * x[idx[d + 2]])
            .sum();
        Complex64::new((-r2).exp(), 0.0)
    })
}

fn time_steps<S: Stepper<Increment = f64>>(
    stepper: &S,
    psi0: ArrayD<Complex64>,
    noise: Option<&WienerNoise>,
    steps: usize,
    dt: f64,
) -> SdeResult<(ArrayD<Complex64>, f64)> {
    let mut psi = psi0;
    let mut timer = Timer::new();
    timer.start();
    for step in 0..steps {
        let dw = match noise {
            Some(noise) => Some(noise.increments(step as u64, dt)?),
            None => None,
        };
        psi = stepper.step(&psi, dw.as_ref(), step as f64 * dt, dt)?;
    }
    Ok((psi, timer.elapsed_ms()))
}

fn run_gpe_benchmarks() -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let grids: Vec<(Vec<usize>, Vec<f64>)> = vec![
        (vec![256], vec![20.0]),
        (vec![1024], vec![20.0]),
        (vec![4096], vec![20.0]),
        (vec![64, 64], vec![10.0, 10.0]),
        (vec![128, 128], vec![10.0, 10.0]),
    ];
    let trajectories = 4;
    let steps = 100;
    let dt = 1e-3;

    for (shape, box_size) in grids {
        println!("Benchmarking GPE on grid {:?}...", shape);
        let config = StepperConfig {
            shape: shape.clone(),
            box_size,
            trajectories,
            ..Default::default()
        };
        let grid = config.grid()?;
        let psi0 = gaussian(&grid, trajectories);
        let drift = GrossPitaevskii::new(&grid, vec![vec![1.0]])?;

        let deterministic = Rk4ipStepper::new(config.clone(), drift.clone())?;
        let (_, time_ms) = time_steps(&deterministic, psi0.clone(), None, steps, dt)?;
        results.push(BenchmarkResult::new(
            format!("GPE {:?}", shape),
            &grid,
            trajectories,
            steps,
            time_ms,
        ));

        let diffusion = AdditiveNoise::new(vec![Complex64::new(0.01, 0.0)]);
        let stochastic = Rk4ipStepper::with_diffusion(config, drift, diffusion)?;
        let noise = WienerNoise::new(42, trajectories, 1, &grid);
        let (_, time_ms) = time_steps(&stochastic, psi0, Some(&noise), steps, dt)?;
        results.push(BenchmarkResult::new(
            format!("GPE+noise {:?}", shape),
            &grid,
            trajectories,
            steps,
            time_ms,
        ));
    }

    Ok(results)
}

fn run_accuracy_benchmarks() -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let rate = Complex64::new(-0.3, 0.7);
    let t_end = 1.0;

    for steps in [10, 20, 40, 80] {
        println!("Benchmarking linear accuracy with {} steps...", steps);
        let config = StepperConfig {
            shape: vec![256],
            box_size: vec![20.0],
            ..Default::default()
        };
        let grid = config.grid()?;
        let stepper = Rk4ipStepper::new(config, LinearDrift::uniform(rate, 1))?;
        let psi0 = gaussian(&grid, 1);

        let dt = t_end / steps as f64;
        let (psi, time_ms) = time_steps(&stepper, psi0.clone(), None, steps, dt)?;
        let exact = linear_solution(&grid, stepper.propagator().table(), &[rate], &psi0, t_end)?;

        let mut result =
            BenchmarkResult::new(format!("Linear dt={}", dt), &grid, 1, steps, time_ms);
        result.error = Some(max_abs_diff(&psi, &exact));
        results.push(result);
    }

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;
    writeln!(file, "Benchmark,Points,Trajectories,Steps,Time_ms,Steps_per_sec,Max_Error")?;

    for result in results {
        writeln!(
            file,
            "{},{},{},{},{:.2},{:.1},{}",
            result.name.replace(',', ";"),
            result.points,
            result.trajectories,
            result.steps,
            result.time_ms,
            result.steps_per_sec,
            result
                .error
                .map(|e| format!("{:.3e}", e))
                .unwrap_or_else(|| "N/A".to_string())
        )?;
    }
    file.flush()
}

fn main() {
    init_logging(None);

    println!("fast-spde RK4IP Benchmark Suite");
    println!("===============================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = run_gpe_benchmarks().and_then(|mut all| {
        all.extend(run_accuracy_benchmarks()?);
        Ok(all)
    });
    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Benchmark failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{:=<86}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<86}", "");
    println!(
        "{:<30} {:>8} {:>6} {:>6} {:>12} {:>10} {:>10}",
        "Benchmark", "Points", "Traj", "Steps", "Time (ms)", "Steps/s", "Error"
    );
    println!("{:-<86}", "");
    for result in &results {
        println!(
            "{:<30} {:>8} {:>6} {:>6} {:>12.2} {:>10.1} {:>10}",
            result.name,
            result.points,
            result.trajectories,
            result.steps,
            result.time_ms,
            result.steps_per_sec,
            result
                .error
                .map(|e| format!("{:.2e}", e))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }
    println!("{:=<86}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&results, &system_info, &filename) {
        Ok(()) => println!("\nResults saved to: {}", filename),
        Err(e) => eprintln!("Error writing {}: {}", filename, e),
    }
    println!("Run with: cargo run --bin benchmark --release");
}
