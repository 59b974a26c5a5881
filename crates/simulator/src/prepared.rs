use crate::error::SimulationError;
use core_types::{Control, Estimate, Scenario, ThreatControlMapping};
use risk::EffectivenessResolver;

/// A scenario reduced to what a trial needs. Built once per run and shared
/// read-only by every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedScenario {
    pub id: String,
    pub residual_factor: f64,
    /// Resolved (min, most likely, max) events per year, before controls.
    pub frequency: (f64, f64, f64),
    /// Resolved (min, most likely, max) loss per event.
    pub loss: (f64, f64, f64),
}

/// Resolves control effectiveness and estimate bounds for every selected scenario.
///
/// Missing bounds fall back to the most-likely value, giving a degenerate PERT that
/// always returns that point. Non-finite inputs are rejected here so they can never
/// reach a trial.
pub fn prepare_scenarios(
    scenarios: &[Scenario],
    controls: &[Control],
    map: &[ThreatControlMapping],
) -> Result<Vec<PreparedScenario>, SimulationError> {
    let resolver = EffectivenessResolver::new();

    scenarios
        .iter()
        .map(|scenario| {
            let residual_factor = resolver.residual_factor(scenario, controls, map);
            if !residual_factor.is_finite() {
                return Err(SimulationError::InvalidResidualFactor {
                    scenario: scenario.id.clone(),
                });
            }
            Ok(PreparedScenario {
                id: scenario.id.clone(),
                residual_factor,
                frequency: resolve(&scenario.id, &scenario.frequency, "frequency")?,
                loss: resolve(&scenario.id, &scenario.loss, "loss")?,
            })
        })
        .collect()
}

fn resolve(
    scenario: &str,
    estimate: &Estimate,
    field: &'static str,
) -> Result<(f64, f64, f64), SimulationError> {
    if !estimate.is_finite() {
        return Err(SimulationError::InvalidEstimate {
            scenario: scenario.to_string(),
            field,
        });
    }
    Ok(estimate.resolved())
}
