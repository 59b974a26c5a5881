use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amount::{amount_from_json, deserialize_opt_amount};
use crate::estimate::Estimate;
use crate::fraction::{deserialize_fraction_estimate, deserialize_opt_fraction};
use crate::ids::{ids_match, normalize_id};

/// Source columns outside the canonical schema. Carried for pass-through; only the
/// asset loss columns in [`ASSET_LOSS_COLUMNS`] are ever read from it.
pub type ExtraFields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(alias = "ID", alias = "asset_id")]
    pub id: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Monetary value. Currency text is accepted; anything that is not an amount is
    /// read as absent.
    #[serde(default, alias = "Value", deserialize_with = "deserialize_opt_amount")]
    pub value: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Asset sheet columns consulted, in order, when an asset has no usable value.
pub const ASSET_LOSS_COLUMNS: [&str; 4] = [
    "Base Loss (Downtime Only) (USD)",
    "Base Loss",
    "Loss",
    "Base Asset Loss",
];

impl Asset {
    /// The amount losses are derived from: `value` when present and non-zero,
    /// otherwise the first loss column that holds an amount.
    pub fn loss_basis(&self) -> Option<f64> {
        self.value.filter(|v| *v != 0.0).or_else(|| {
            ASSET_LOSS_COLUMNS
                .iter()
                .filter_map(|column| self.extra.get(*column))
                .find_map(amount_from_json)
        })
    }
}

/// The inherent (uncontrolled) rate and impact of a threat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    #[serde(alias = "ID", alias = "threat_id")]
    pub id: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Events per year.
    #[serde(default, alias = "tef")]
    pub frequency: Estimate,
    /// Currency units per event.
    #[serde(default, alias = "impact")]
    pub loss: Estimate,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    #[serde(alias = "ID", alias = "control_id")]
    pub id: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Generic reduction in `[0, 1]`, used when a mapping entry gives no explicit value.
    #[serde(
        default,
        alias = "reduction",
        deserialize_with = "deserialize_fraction_estimate"
    )]
    pub effectiveness: Estimate,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Links a control to a threat, optionally with a threat-specific reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatControlMapping {
    #[serde(alias = "ThreatID", alias = "threat")]
    pub threat_id: String,
    #[serde(alias = "ControlID", alias = "control")]
    pub control_id: String,
    #[serde(
        default,
        alias = "Reduction",
        alias = "effectiveness",
        deserialize_with = "deserialize_opt_fraction"
    )]
    pub reduction: Option<f64>,
    #[serde(default, alias = "rationale")]
    pub justification: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ThreatControlMapping {
    pub fn links(&self, threat_id: &str, control_id: &str) -> bool {
        ids_match(&self.threat_id, threat_id) && ids_match(&self.control_id, control_id)
    }
}

/// A threat acting on an asset, with the merged frequency and loss estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, alias = "ID", alias = "scenario_id")]
    pub id: String,
    #[serde(default, alias = "Name", alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "AssetID", alias = "asset")]
    pub asset_id: Option<String>,
    #[serde(default, alias = "ThreatID", alias = "threat")]
    pub threat_id: Option<String>,
    #[serde(default)]
    pub frequency: Estimate,
    #[serde(default)]
    pub loss: Estimate,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Scenario {
    pub fn new(id: impl Into<String>, threat_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            asset_id: None,
            threat_id: Some(threat_id.into()),
            frequency: Estimate::default(),
            loss: Estimate::default(),
            extra: ExtraFields::new(),
        }
    }

    pub fn with_frequency(mut self, frequency: Estimate) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_loss(mut self, loss: Estimate) -> Self {
        self.loss = loss;
        self
    }
}

impl Control {
    pub fn new(id: impl Into<String>, effectiveness: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            effectiveness: Estimate::point(effectiveness),
            cost: None,
            extra: ExtraFields::new(),
        }
    }
}

impl ThreatControlMapping {
    pub fn new(threat_id: impl Into<String>, control_id: impl Into<String>) -> Self {
        Self {
            threat_id: threat_id.into(),
            control_id: control_id.into(),
            reduction: None,
            justification: None,
            extra: ExtraFields::new(),
        }
    }

    pub fn with_reduction(mut self, reduction: f64) -> Self {
        self.reduction = Some(reduction);
        self
    }
}

/// The normalized, merged model the calculations run against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskModel {
    pub assets: Vec<Asset>,
    pub threats: Vec<Threat>,
    pub controls: Vec<Control>,
    pub scenarios: Vec<Scenario>,
    pub threat_control_map: Vec<ThreatControlMapping>,
}

impl RiskModel {
    /// Scenarios whose ID is in `ids`. An empty list selects every scenario.
    pub fn select_scenarios(&self, ids: &[String]) -> Vec<Scenario> {
        select_by_id(&self.scenarios, ids, |s| s.id.as_str())
    }

    /// Controls whose ID is in `ids`. An empty list selects every control.
    pub fn select_controls(&self, ids: &[String]) -> Vec<Control> {
        select_by_id(&self.controls, ids, |c| c.id.as_str())
    }

    /// Controls mapped to the threat of any of `scenarios`, in profile order.
    /// Scenarios without a threat recommend nothing.
    pub fn recommended_controls(&self, scenarios: &[Scenario]) -> Vec<Control> {
        let threats: Vec<String> = scenarios
            .iter()
            .filter_map(|s| s.threat_id.as_deref())
            .map(normalize_id)
            .collect();
        let recommended: Vec<String> = self
            .threat_control_map
            .iter()
            .filter(|m| threats.contains(&normalize_id(&m.threat_id)))
            .map(|m| normalize_id(&m.control_id))
            .collect();

        self.controls
            .iter()
            .filter(|c| recommended.contains(&normalize_id(&c.id)))
            .cloned()
            .collect()
    }
}

fn select_by_id<T: Clone>(items: &[T], ids: &[String], id_of: impl Fn(&T) -> &str) -> Vec<T> {
    if ids.is_empty() {
        return items.to_vec();
    }
    let wanted: Vec<String> = ids.iter().map(|id| normalize_id(id)).collect();
    items
        .iter()
        .filter(|item| wanted.contains(&normalize_id(id_of(item))))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_columns_land_in_extra() {
        let json = r#"{"ID": "C-1", "Name": "Firewall", "effectiveness": "85%", "Owner": "OT Team"}"#;
        let control: Control = serde_json::from_str(json).unwrap();
        assert_eq!(control.id, "C-1");
        assert_eq!(control.effectiveness.most_likely, 0.85);
        assert_eq!(control.extra.get("Owner"), Some(&Value::from("OT Team")));
    }

    #[test]
    fn mapping_reduction_is_normalized() {
        let json = r#"{"threat_id": "T1", "control_id": "C1", "reduction": 40}"#;
        let mapping: ThreatControlMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.reduction, Some(0.4));
        assert!(mapping.links("t-1", "c 1"));

        let json = r#"{"threat_id": "T1", "control_id": "C1", "reduction": "lots"}"#;
        let mapping: ThreatControlMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.reduction, Some(0.0));
    }

    #[test]
    fn selection_uses_normalized_ids() {
        let model = RiskModel {
            scenarios: vec![Scenario::new("S-01", "T1"), Scenario::new("S-02", "T2")],
            ..Default::default()
        };
        let picked = model.select_scenarios(&["s02".to_string()]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, "S-02");
        assert_eq!(model.select_scenarios(&[]).len(), 2);
    }

    #[test]
    fn recommendations_follow_the_selected_threats() {
        let model = RiskModel {
            controls: vec![
                Control::new("C-01", 0.5),
                Control::new("C-02", 0.5),
                Control::new("C-03", 0.5),
            ],
            threat_control_map: vec![
                ThreatControlMapping::new("T-01", "c02"),
                ThreatControlMapping::new("T-02", "C-03"),
                ThreatControlMapping::new("t 01", "C-03"),
            ],
            ..Default::default()
        };

        let ids = |controls: Vec<Control>| controls.into_iter().map(|c| c.id).collect::<Vec<_>>();

        let picked = model.recommended_controls(&[Scenario::new("S-01", "T01")]);
        assert_eq!(ids(picked), vec!["C-02", "C-03"]);

        let picked = model.recommended_controls(&[Scenario::new("S-02", "T-02")]);
        assert_eq!(ids(picked), vec!["C-03"]);

        let mut orphan = Scenario::new("S-03", "T-01");
        orphan.threat_id = None;
        assert!(model.recommended_controls(&[orphan]).is_empty());
        assert!(model.recommended_controls(&[]).is_empty());
    }
}
