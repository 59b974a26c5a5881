use crate::report::AggregatedMetrics;
use core_types::{Control, Scenario, ThreatControlMapping, Tier};
use risk::EffectivenessResolver;

/// A stateless calculator for the deterministic, pre-simulation risk metrics.
#[derive(Debug, Default)]
pub struct AggregationCalculator {
    resolver: EffectivenessResolver,
}

impl AggregationCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating the point estimates.
    ///
    /// # Arguments
    ///
    /// * `scenarios` - The currently selected scenarios.
    /// * `controls` - The currently selected controls.
    /// * `map` - The full threat-control map.
    ///
    /// # Returns
    ///
    /// The nine aggregated metrics. No randomness is involved, so the same inputs
    /// always produce the same output. Scenarios with a non-finite estimate are left
    /// out of the sums, where the simulator would refuse to run them.
    pub fn compute(
        &self,
        scenarios: &[Scenario],
        controls: &[Control],
        map: &[ThreatControlMapping],
    ) -> AggregatedMetrics {
        let mut metrics = AggregatedMetrics::new();

        if scenarios.is_empty() {
            return metrics;
        }

        for scenario in scenarios {
            let residual = self.resolver.residual_factor(scenario, controls, map);
            let finite =
                scenario.frequency.is_finite() && scenario.loss.is_finite() && residual.is_finite();
            if !finite {
                tracing::warn!(
                    scenario = %scenario.id,
                    "Skipping scenario with a non-finite estimate."
                );
                continue;
            }

            for tier in Tier::ALL {
                let tef = scenario.frequency.tier(tier) * residual;
                let eal = tef * scenario.loss.tier(tier);
                *metrics.tef.get_mut(tier) += tef;
                *metrics.expected_annual_loss.get_mut(tier) += eal;
            }
        }

        for tier in Tier::ALL {
            let tef = metrics.tef.get(tier);
            let eal = metrics.expected_annual_loss.get(tier);
            *metrics.avg_loss_per_event.get_mut(tier) = if tef > 0.0 { eal / tef } else { 0.0 };
        }

        tracing::debug!(
            scenarios = scenarios.len(),
            controls = controls.len(),
            tef_ml = metrics.tef.most_likely,
            eal_ml = metrics.expected_annual_loss.most_likely,
            "Computed aggregated metrics."
        );

        metrics
    }
}
