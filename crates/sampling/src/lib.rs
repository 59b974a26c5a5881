//! # Sampling
//!
//! Probability primitives used by the Monte Carlo engine: standard normal, Gamma,
//! PERT (Beta via two Gamma draws) and Poisson. Every draw goes through a
//! [`DistributionSampler`] wrapping a caller-supplied generator.

pub mod sampler;

pub use sampler::{DistributionSampler, POISSON_NORMAL_THRESHOLD};
