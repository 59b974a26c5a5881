//! # Core Types
//!
//! The shared data model for the risk engine: assets, threats, controls, scenarios
//! and the threat-control map, plus the normalization rules every other crate relies
//! on (identifier matching, effectiveness fractions, three-point estimates).

pub mod amount;
pub mod enums;
pub mod error;
pub mod estimate;
pub mod fraction;
pub mod ids;
pub mod model;
pub mod profile;

// Re-export the core types to provide a clean public API.
pub use amount::parse_amount;
pub use enums::Tier;
pub use error::CoreError;
pub use estimate::Estimate;
pub use fraction::{normalize_fraction, parse_fraction};
pub use ids::{ids_match, normalize_id};
pub use model::{Asset, Control, ExtraFields, RiskModel, Scenario, Threat, ThreatControlMapping};
pub use profile::RiskProfile;
