// src/models/mod.rs
pub mod gpe;
pub mod linear;
pub mod model;
pub mod noise;

pub use model::{Diffusion, Drift, NoDiffusion};
