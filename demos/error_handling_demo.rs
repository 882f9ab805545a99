// demos/error_handling_demo.rs
use fast_spde::error::SdeError;
use fast_spde::models::linear::ZeroDrift;
use fast_spde::models::noise::AdditiveNoise;
use fast_spde::rng::WienerNoise;
use fast_spde::solvers::{KineticCoeffs, Rk4ipStepper, StepperConfig};
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;
use std::collections::BTreeMap;

fn report<T>(result: Result<T, SdeError>) {
    match result {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }
}

fn main() {
    fast_spde::logging::init_logging(Some("warn"));

    println!("Error Handling Demo for fast-spde");
    println!("==================================\n");

    let base = StepperConfig {
        shape: vec![16],
        box_size: vec![2.0],
        trajectories: 2,
        ..Default::default()
    };

    // Test 1: Spectral cutoff
    println!("1. Requesting a spectral cutoff...");
    let with_cutoff = StepperConfig {
        ksquared_cutoff: Some(50.0),
        ..base.clone()
    };
    report(Rk4ipStepper::new(with_cutoff, ZeroDrift::new(1)));

    // Test 2: Odd Laplacian power
    println!("\n2. Testing an odd Laplacian power...");
    let odd_power = StepperConfig {
        kinetic_coeffs: KineticCoeffs::ByPower(BTreeMap::from([(3, vec![Complex64::new(0.0, 0.5)])])),
        ..base.clone()
    };
    report(Rk4ipStepper::new(odd_power, ZeroDrift::new(1)));

    // Test 3: Component count mismatch
    println!("\n3. Testing mismatched kinetic coefficients...");
    let per_component = StepperConfig {
        kinetic_coeffs: vec![Complex64::new(0.0, 0.5); 3].into(),
        ..base.clone()
    };
    report(Rk4ipStepper::new(per_component, ZeroDrift::new(2)));

    // Test 4: Amplifying coefficients are legal but logged
    println!("\n4. Testing amplifying (but valid) kinetic coefficients...");
    let amplifying = StepperConfig {
        kinetic_coeffs: Complex64::new(0.1, 0.5).into(),
        ..base.clone()
    };
    match Rk4ipStepper::new(amplifying, ZeroDrift::new(1)) {
        Ok(_) => println!("   ✓ Created with warning (high modes grow)"),
        Err(e) => println!("   Error: {}", e),
    }

    // Test 5: Shape mismatch
    println!("\n5. Testing a field with the wrong trajectory count...");
    match Rk4ipStepper::new(base.clone(), ZeroDrift::new(1)) {
        Ok(stepper) => {
            let psi: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[3, 1, 16]));
            report(stepper.advance(&psi, 0.0, 0.01));
        }
        Err(e) => println!("   Error: {}", e),
    }

    // Test 6: Missing noise
    println!("\n6. Stepping a stochastic stepper without increments...");
    let stochastic = Rk4ipStepper::with_diffusion(
        base.clone(),
        ZeroDrift::new(1),
        AdditiveNoise::new(vec![Complex64::new(0.1, 0.0)]),
    );
    match stochastic {
        Ok(stepper) => {
            let psi: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[2, 1, 16]));
            report(stepper.advance(&psi, 0.0, 0.01));
        }
        Err(e) => println!("   Error: {}", e),
    }

    // Test 7: Non-finite step
    println!("\n7. Testing a non-finite time step...");
    match Rk4ipStepper::new(base.clone(), ZeroDrift::new(1)) {
        Ok(stepper) => {
            let psi: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[2, 1, 16]));
            report(stepper.advance(&psi, 0.0, f64::NAN));
        }
        Err(e) => println!("   Error: {}", e),
    }

    // Test 8: Negative noise step
    println!("\n8. Requesting Wiener increments for a negative step...");
    match base.grid() {
        Ok(grid) => report(WienerNoise::new(1, 2, 1, &grid).increments(0, -0.01)),
        Err(e) => println!("   Error: {}", e),
    }

    println!("\nError handling demo completed!");
}
