use core_types::{Control, Scenario, ThreatControlMapping, ids_match, normalize_fraction};
use serde::Serialize;

/// Where the reduction applied by a control came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReductionSource {
    /// The threat-control mapping carried an explicit reduction.
    Mapping,
    /// The control's own most-likely effectiveness.
    Control,
}

/// A selected control that applies to a scenario's threat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlContribution {
    pub control_id: String,
    /// Reduction in `[0, 1]`.
    pub reduction: f64,
    pub source: ReductionSource,
}

/// Combines the selected controls acting on a scenario's threat into a single
/// residual-risk multiplier.
///
/// Controls are treated as independent layers: each one lets `1 - reduction` of the
/// remaining events through, so the residual factor is the product of those terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectivenessResolver;

impl EffectivenessResolver {
    pub fn new() -> Self {
        Self
    }

    /// The fraction of the scenario's frequency left after its applicable, selected
    /// controls. Returns 1.0 when no selected control maps to the scenario's threat.
    pub fn residual_factor(
        &self,
        scenario: &Scenario,
        selected_controls: &[Control],
        map: &[ThreatControlMapping],
    ) -> f64 {
        let contributions = self.contributions(scenario, selected_controls, map);
        let factor = contributions
            .iter()
            .fold(1.0, |acc, c| acc * (1.0 - c.reduction));

        if !contributions.is_empty() {
            tracing::debug!(
                scenario = %scenario.id,
                threat = ?scenario.threat_id,
                controls = contributions.len(),
                residual_factor = factor,
                "Resolved control effectiveness."
            );
        }
        factor
    }

    /// Lists the controls that are both selected and mapped to the scenario's threat,
    /// with the reduction each one applies.
    pub fn contributions(
        &self,
        scenario: &Scenario,
        selected_controls: &[Control],
        map: &[ThreatControlMapping],
    ) -> Vec<ControlContribution> {
        let Some(threat_id) = scenario.threat_id.as_deref() else {
            return Vec::new();
        };

        let mappings: Vec<&ThreatControlMapping> = map
            .iter()
            .filter(|m| ids_match(&m.threat_id, threat_id))
            .collect();
        if mappings.is_empty() {
            return Vec::new();
        }

        selected_controls
            .iter()
            .filter_map(|control| {
                let entry = mappings
                    .iter()
                    .find(|m| ids_match(&m.control_id, &control.id))?;
                let (reduction, source) = match entry.reduction {
                    Some(r) => (r, ReductionSource::Mapping),
                    None => (control.effectiveness.most_likely, ReductionSource::Control),
                };
                Some(ControlContribution {
                    control_id: control.id.clone(),
                    reduction: normalize_fraction(reduction),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario::new("S-01", "T-01")
    }

    #[test]
    fn no_controls_means_no_mitigation() {
        let resolver = EffectivenessResolver::new();
        let map = vec![ThreatControlMapping::new("T-01", "C-01")];
        assert_eq!(resolver.residual_factor(&scenario(), &[], &map), 1.0);
    }

    #[test]
    fn unmapped_controls_are_ignored() {
        let resolver = EffectivenessResolver::new();
        let controls = vec![Control::new("C-01", 0.9)];
        let map = vec![ThreatControlMapping::new("T-02", "C-01")];
        assert_eq!(resolver.residual_factor(&scenario(), &controls, &map), 1.0);
    }

    #[test]
    fn independent_layers_multiply() {
        let resolver = EffectivenessResolver::new();
        let controls = vec![Control::new("C-01", 0.5), Control::new("C-02", 0.5)];
        let map = vec![
            ThreatControlMapping::new("T-01", "C-01"),
            ThreatControlMapping::new("t01", "c-02"),
        ];
        assert_eq!(resolver.residual_factor(&scenario(), &controls, &map), 0.25);
    }

    #[test]
    fn mapping_reduction_overrides_control() {
        let resolver = EffectivenessResolver::new();
        let controls = vec![Control::new("C-01", 0.5)];
        let map = vec![ThreatControlMapping::new("T-01", "C-01").with_reduction(0.8)];

        let contributions = resolver.contributions(&scenario(), &controls, &map);
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].source, ReductionSource::Mapping);

        let factor = resolver.residual_factor(&scenario(), &controls, &map);
        assert!((factor - 0.2).abs() < 1e-12);
    }

    #[test]
    fn percentage_effectiveness_is_normalized() {
        let resolver = EffectivenessResolver::new();
        let controls = vec![Control::new("C-01", 75.0)];
        let map = vec![ThreatControlMapping::new("T-01", "C-01")];
        assert_eq!(resolver.residual_factor(&scenario(), &controls, &map), 0.25);
    }

    #[test]
    fn scenario_without_threat_is_unmitigated() {
        let resolver = EffectivenessResolver::new();
        let mut s = scenario();
        s.threat_id = None;
        let controls = vec![Control::new("C-01", 0.5)];
        let map = vec![ThreatControlMapping::new("T-01", "C-01")];
        assert_eq!(resolver.residual_factor(&s, &controls, &map), 1.0);
    }
}
