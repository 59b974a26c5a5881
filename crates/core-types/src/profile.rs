use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::estimate::Estimate;
use crate::ids::link_matches;
use crate::model::{Asset, Control, RiskModel, Scenario, Threat, ThreatControlMapping};

/// Loss multipliers applied to an asset value: (min, most likely, max).
const ASSET_LOSS_SPREAD: (f64, f64, f64) = (0.5, 1.0, 2.0);

/// A risk profile as delivered by the upstream loader, before threat and asset data
/// has been merged into the scenarios.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskProfile {
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub threats: Vec<Threat>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default, alias = "threatControlMap", alias = "Threat_Control_Map")]
    pub threat_control_map: Vec<ThreatControlMapping>,
}

impl RiskProfile {
    /// Reads a JSON profile from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Produces the calculation model: scenario IDs are filled in and every scenario
    /// inherits its threat's frequency and a loss estimate derived from its asset.
    pub fn into_model(self) -> RiskModel {
        let RiskProfile {
            assets,
            threats,
            controls,
            scenarios,
            threat_control_map,
        } = self;

        let total = scenarios.len();
        let mut merged = 0usize;

        let scenarios = scenarios
            .into_iter()
            .enumerate()
            .map(|(i, mut scenario)| {
                if scenario.id.trim().is_empty() {
                    scenario.id = format!("S-{:02}", i + 1);
                }

                let threat = threats
                    .iter()
                    .find(|t| link_matches(scenario.threat_id.as_deref(), &t.id));
                let asset = assets
                    .iter()
                    .find(|a| link_matches(scenario.asset_id.as_deref(), &a.id));

                match threat {
                    Some(threat) => {
                        merged += 1;
                        scenario.frequency = inherited_frequency(&threat.frequency);
                        scenario.loss = derived_loss(asset, threat);
                    }
                    None => {
                        tracing::debug!(
                            scenario = %scenario.id,
                            threat_id = ?scenario.threat_id,
                            "No threat matches scenario; keeping its own estimates."
                        );
                    }
                }
                scenario
            })
            .collect();

        tracing::info!("Merged {} of {} scenarios with threat data.", merged, total);

        RiskModel {
            assets,
            threats,
            controls,
            scenarios,
            threat_control_map,
        }
    }
}

/// Missing threat bounds fall back to the threat's most-likely frequency. A bound of
/// exactly 0 counts as missing, since blank sheet cells arrive as 0.
fn inherited_frequency(frequency: &Estimate) -> Estimate {
    let ml = frequency.most_likely;
    Estimate::new(
        frequency.min.filter(|v| *v != 0.0).unwrap_or(ml),
        ml,
        frequency.max.filter(|v| *v != 0.0).unwrap_or(ml),
    )
}

fn derived_loss(asset: Option<&Asset>, threat: &Threat) -> Estimate {
    match asset.and_then(Asset::loss_basis).filter(|v| *v > 0.0) {
        Some(value) => {
            let (lo, ml, hi) = ASSET_LOSS_SPREAD;
            Estimate::new(value * lo, value * ml, value * hi)
        }
        None => Estimate::new(
            threat.loss.min.unwrap_or(0.0),
            threat.loss.most_likely,
            threat.loss.max.unwrap_or(0.0),
        ),
    }
}
