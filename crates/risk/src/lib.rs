//! # Risk
//!
//! Control-effectiveness resolution. Given the selected controls and the
//! threat-control map, the [`EffectivenessResolver`] turns a scenario into the
//! residual-risk multiplier applied to its threat event frequency.

pub mod effectiveness;

pub use effectiveness::{ControlContribution, EffectivenessResolver, ReductionSource};
