//! # Analytics
//!
//! The deterministic side of the risk engine and the presentation helpers for
//! simulation output.
//!
//! - `AggregationCalculator`: tier-paired point estimates (TEF, average loss per
//!   event, expected annual loss) for the current selection. Stateless and cheap
//!   enough to rerun on every selection change.
//! - `Histogram` / `exceedance_curve`: views over a simulated loss sample.
//! - `format`: currency and probability formatting shared by the CLI and reports.

// Declare the modules that constitute this crate.
pub mod distribution;
pub mod engine;
pub mod error;
pub mod format;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use distribution::{Bucket, DEFAULT_BIN_COUNT, ExceedancePoint, Histogram, exceedance_curve};
pub use engine::AggregationCalculator;
pub use error::AnalyticsError;
pub use report::{AggregatedMetrics, TierValues};
