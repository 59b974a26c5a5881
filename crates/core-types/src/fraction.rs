//! Effectiveness and reduction values.
//!
//! Sources mix fractions (`0.27`), percentages (`27.06`) and text (`"27%"`, `"n/a"`).
//! Every value is brought into `[0, 1]` before any calculation uses it:
//!
//! - a value greater than 1 is a percentage and is divided by 100;
//! - text with a trailing `%` is always a percentage;
//! - anything that does not parse becomes 0 (no protection).

use serde::{Deserialize, Deserializer};

use crate::estimate::Estimate;

/// Normalizes a numeric effectiveness/reduction into `[0, 1]`.
pub fn normalize_fraction(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let value = if value > 1.0 { value / 100.0 } else { value };
    value.clamp(0.0, 1.0)
}

/// Parses a textual effectiveness/reduction. Unparseable text yields 0.
pub fn parse_fraction(text: &str) -> f64 {
    let trimmed = text.trim();
    if let Some(number) = trimmed.strip_suffix('%') {
        return match number.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => (v / 100.0).clamp(0.0, 1.0),
            _ => 0.0,
        };
    }
    trimmed.parse::<f64>().map(normalize_fraction).unwrap_or(0.0)
}

/// A fraction as it appears in a source document, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawFraction {
    Number(f64),
    Text(String),
}

impl RawFraction {
    pub fn normalize(&self) -> f64 {
        match self {
            RawFraction::Number(v) => normalize_fraction(*v),
            RawFraction::Text(s) => parse_fraction(s),
        }
    }
}

/// `deserialize_with` helper for an optional fraction field.
pub fn deserialize_opt_fraction<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawFraction>::deserialize(deserializer)?;
    Ok(raw.map(|r| r.normalize()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFractionEstimate {
    Single(RawFraction),
    Triple {
        #[serde(default)]
        min: Option<RawFraction>,
        #[serde(default, alias = "ml")]
        most_likely: Option<RawFraction>,
        #[serde(default)]
        max: Option<RawFraction>,
    },
}

/// `deserialize_with` helper for a three-point effectiveness estimate.
///
/// Accepts either a bare value (treated as the most-likely point) or an object with
/// `min` / `most_likely` / `max` keys. Every present point is normalized.
pub fn deserialize_fraction_estimate<'de, D>(deserializer: D) -> Result<Estimate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawFractionEstimate::deserialize(deserializer)?;
    Ok(match raw {
        RawFractionEstimate::Single(v) => Estimate::point(v.normalize()),
        RawFractionEstimate::Triple {
            min,
            most_likely,
            max,
        } => Estimate {
            min: min.map(|v| v.normalize()),
            most_likely: most_likely.map(|v| v.normalize()).unwrap_or(0.0),
            max: max.map(|v| v.normalize()),
        },
    })
}
