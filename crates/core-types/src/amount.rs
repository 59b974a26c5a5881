//! Monetary amounts as they appear in asset sheets.
//!
//! Values may be numbers or text such as `"$250,000"` or `"USD 1.5e3"`. Text is
//! reduced to its digits, `.` and `-` before parsing. Anything left that is not a
//! number counts as absent.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Parses a currency string, ignoring every character other than digits, `.` and `-`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawAmount {
    fn value(&self) -> Option<f64> {
        match self {
            RawAmount::Number(v) => Some(*v).filter(|v| v.is_finite()),
            RawAmount::Text(s) => parse_amount(s),
            RawAmount::Other(_) => None,
        }
    }
}

/// `deserialize_with` helper for an optional amount. Values that are not amounts
/// deserialize as `None` instead of failing the document.
pub fn deserialize_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.value()))
}

/// Reads an amount from a pass-through JSON value.
pub fn amount_from_json(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_amount(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_text_is_stripped() {
        assert_eq!(parse_amount("$250,000"), Some(250_000.0));
        assert_eq!(parse_amount(" 1,250.50 USD "), Some(1250.5));
        assert_eq!(parse_amount("-300"), Some(-300.0));
        assert_eq!(parse_amount("Yes"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn any_json_shape_is_accepted() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_opt_amount")]
            value: Option<f64>,
        }

        let rows: Vec<Row> = serde_json::from_str(
            r#"[{"value": 10}, {"value": "$7,500"}, {"value": "n/a"}, {"value": true}, {"value": null}, {}]"#,
        )
        .unwrap();
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(10.0), Some(7500.0), None, None, None, None]);
    }
}
