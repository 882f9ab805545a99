// src/analytics/mod.rs
pub mod exact;

pub use exact::{linear_solution, uniform_condensate};
