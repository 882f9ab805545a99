// tests/error_handling_test.rs
use fast_spde::models::linear::{LinearDrift, ZeroDrift};
use fast_spde::models::noise::AdditiveNoise;
use fast_spde::solvers::{KineticCoeffs, Rk4ipStepper, Stepper, StepperConfig};
use fast_spde::SdeError;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;
use std::collections::BTreeMap;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn small_config() -> StepperConfig {
    StepperConfig {
        shape: vec![8],
        box_size: vec![1.0],
        trajectories: 2,
        ..Default::default()
    }
}

#[test]
fn test_odd_laplacian_power_rejected() {
    let config = StepperConfig {
        kinetic_coeffs: KineticCoeffs::ByPower(BTreeMap::from([(3, vec![c(0.0, 0.5)])])),
        ..small_config()
    };
    match Rk4ipStepper::new(config, ZeroDrift::new(1)) {
        Err(SdeError::ConfigurationError { field, .. }) => assert_eq!(field, "kinetic_coeffs"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("odd power accepted"),
    }
}

#[test]
fn test_higher_even_powers_accepted() {
    let config = StepperConfig {
        kinetic_coeffs: KineticCoeffs::ByPower(BTreeMap::from([
            (2, vec![c(0.0, 0.5)]),
            (4, vec![c(-0.01, 0.0)]),
        ])),
        ..small_config()
    };
    let stepper = Rk4ipStepper::new(config, ZeroDrift::new(1)).expect("Valid stepper");
    assert_eq!(stepper.propagator().table().powers(), &[2, 4]);
}

#[test]
fn test_kinetic_component_count_must_match() {
    let config = StepperConfig {
        kinetic_coeffs: vec![c(0.0, 0.5), c(0.0, 0.5)].into(),
        ..small_config()
    };
    let result = Rk4ipStepper::new(config, LinearDrift::uniform(c(0.0, 1.0), 3));
    assert!(matches!(result, Err(SdeError::ConfigurationError { .. })));
}

#[test]
fn test_diffusion_component_count_must_match() {
    let result = Rk4ipStepper::with_diffusion(
        small_config(),
        ZeroDrift::new(2),
        AdditiveNoise::new(vec![c(1.0, 0.0)]),
    );
    assert!(matches!(result, Err(SdeError::ConfigurationError { .. })));
}

#[test]
fn test_cutoff_rejected_even_when_huge() {
    for cutoff in [0.0, 1.0, f64::INFINITY] {
        let config = StepperConfig {
            ksquared_cutoff: Some(cutoff),
            ..small_config()
        };
        let result = Rk4ipStepper::new(config, ZeroDrift::new(1));
        assert!(
            matches!(result, Err(SdeError::UnsupportedOption { .. })),
            "cutoff {} was not rejected",
            cutoff
        );
    }
}

#[test]
fn test_invalid_grid_and_trajectories() {
    let too_many_dims = StepperConfig {
        shape: vec![2; 7],
        box_size: vec![1.0; 7],
        ..small_config()
    };
    assert!(Rk4ipStepper::new(too_many_dims, ZeroDrift::new(1)).is_err());

    let no_trajectories = StepperConfig {
        trajectories: 0,
        ..small_config()
    };
    assert!(Rk4ipStepper::new(no_trajectories, ZeroDrift::new(1)).is_err());

    let bad_box = StepperConfig {
        box_size: vec![-1.0],
        ..small_config()
    };
    assert!(Rk4ipStepper::new(bad_box, ZeroDrift::new(1)).is_err());
}

#[test]
fn test_noise_presence_mismatch() {
    let psi: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[2, 1, 8]));
    let dw: ArrayD<f64> = ArrayD::zeros(IxDyn(&[2, 1, 8]));

    let deterministic = Rk4ipStepper::new(small_config(), ZeroDrift::new(1)).expect("Valid stepper");
    assert!(matches!(
        deterministic.step(&psi, Some(&dw), 0.0, 0.1),
        Err(SdeError::ConfigurationError { .. })
    ));

    let stochastic = Rk4ipStepper::with_diffusion(
        small_config(),
        ZeroDrift::new(1),
        AdditiveNoise::new(vec![c(1.0, 0.0)]),
    )
    .expect("Valid stepper");
    assert!(matches!(
        stochastic.advance(&psi, 0.0, 0.1),
        Err(SdeError::ConfigurationError { .. })
    ));
}

#[test]
fn test_noise_shape_mismatch() {
    let stepper = Rk4ipStepper::with_diffusion(
        small_config(),
        ZeroDrift::new(1),
        AdditiveNoise::new(vec![c(1.0, 0.0)]),
    )
    .expect("Valid stepper");
    let psi: ArrayD<Complex64> = ArrayD::zeros(IxDyn(&[2, 1, 8]));
    let dw: ArrayD<f64> = ArrayD::zeros(IxDyn(&[2, 2, 8]));

    match stepper.advance_with_noise(&psi, &dw, 0.0, 0.1) {
        Err(SdeError::ShapeMismatch {
            buffer,
            expected,
            actual,
        }) => {
            assert_eq!(buffer, "dW");
            assert_eq!(expected, vec![2, 1, 8]);
            assert_eq!(actual, vec![2, 2, 8]);
        }
        other => panic!("expected a shape mismatch, got {:?}", other),
    }
}

#[test]
fn test_error_messages_name_the_problem() {
    let err = SdeError::ShapeMismatch {
        buffer: "input".to_string(),
        expected: vec![1, 1, 8],
        actual: vec![1, 2, 8],
    };
    let message = err.to_string();
    assert!(message.contains("input"));
    assert!(message.contains("[1, 1, 8]"));

    let err = SdeError::UnsupportedOption {
        option: "ksquared_cutoff".to_string(),
        context: "spectral cutoffs are not implemented".to_string(),
    };
    assert!(err.to_string().contains("ksquared_cutoff"));
}
