use serde::{Deserialize, Serialize};

use crate::enums::Tier;

/// A three-point (min / most-likely / max) estimate.
///
/// Bounds are optional: a missing bound falls back to the most-likely value, so an
/// estimate with only `most_likely` set behaves as a point value. A triple with
/// `min > most_likely` or `min >= max` is tolerated and treated as degenerate by the
/// samplers rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "EstimateRepr")]
pub struct Estimate {
    pub min: Option<f64>,
    pub most_likely: f64,
    pub max: Option<f64>,
}

impl Estimate {
    pub fn new(min: f64, most_likely: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            most_likely,
            max: Some(max),
        }
    }

    /// An estimate with no spread.
    pub fn point(value: f64) -> Self {
        Self {
            min: None,
            most_likely: value,
            max: None,
        }
    }

    /// The lower bound, or the most-likely value when absent.
    pub fn lower(&self) -> f64 {
        self.min.unwrap_or(self.most_likely)
    }

    /// The upper bound, or the most-likely value when absent.
    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(self.most_likely)
    }

    pub fn tier(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Min => self.lower(),
            Tier::MostLikely => self.most_likely,
            Tier::Max => self.upper(),
        }
    }

    /// `(min, most_likely, max)` with bounds resolved.
    pub fn resolved(&self) -> (f64, f64, f64) {
        (self.lower(), self.most_likely, self.upper())
    }

    /// True when sampling this estimate collapses to a single value.
    pub fn is_degenerate(&self) -> bool {
        self.lower() >= self.upper()
    }

    pub fn is_finite(&self) -> bool {
        let (min, ml, max) = self.resolved();
        min.is_finite() && ml.is_finite() && max.is_finite()
    }

    /// Multiplies every point by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min.map(|v| v * factor),
            most_likely: self.most_likely * factor,
            max: self.max.map(|v| v * factor),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EstimateRepr {
    Point(f64),
    Triple {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default, alias = "ml")]
        most_likely: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl From<EstimateRepr> for Estimate {
    fn from(repr: EstimateRepr) -> Self {
        match repr {
            EstimateRepr::Point(v) => Estimate::point(v),
            EstimateRepr::Triple {
                min,
                most_likely,
                max,
            } => Estimate {
                min,
                most_likely: most_likely.unwrap_or(0.0),
                max,
            },
        }
    }
}
