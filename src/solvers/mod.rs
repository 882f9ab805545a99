// src/solvers/mod.rs
pub mod kinetic;
pub mod nonlinear;
pub mod propagator;
pub mod rk4ip;

pub use kinetic::{KineticCoeffs, KineticTable};
pub use propagator::KineticPropagator;
pub use rk4ip::{Rk4ipStepper, Stepper, StepperConfig};
