use core_types::Tier;
use serde::{Deserialize, Serialize};

/// One metric evaluated at each of the three estimate tiers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierValues {
    pub min: f64,
    pub most_likely: f64,
    pub max: f64,
}

impl TierValues {
    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Min => self.min,
            Tier::MostLikely => self.most_likely,
            Tier::Max => self.max,
        }
    }

    pub fn get_mut(&mut self, tier: Tier) -> &mut f64 {
        match tier {
            Tier::Min => &mut self.min,
            Tier::MostLikely => &mut self.most_likely,
            Tier::Max => &mut self.max,
        }
    }
}

/// The pre-simulation point estimates for a scenario/control selection.
///
/// Each tier pairs frequency and loss of the same tier (min with min, max with max).
/// This is a fast approximation, not a propagation of the full distributions; the
/// Monte Carlo engine is the statistically sound counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    /// Threat event frequency after controls, summed over scenarios (events/year).
    pub tef: TierValues,
    /// Expected annual loss divided by TEF; 0 when TEF is 0.
    pub avg_loss_per_event: TierValues,
    /// Summed TEF × loss.
    pub expected_annual_loss: TierValues,
}

impl AggregatedMetrics {
    /// A zeroed-out report, returned for an empty selection.
    pub fn new() -> Self {
        Self::default()
    }
}
