//! Serde helpers for noisy analytics payloads. Client-side tracking sends
//! numbers as numbers, numeric strings, or garbage; a malformed field must
//! deserialize as absent, never as an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional f64 leniently. Used with
/// #[serde(default, deserialize_with = "crate::utils::serde_num::lenient_f64")].
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// Deserialize an optional string leniently: numbers are stringified, other
/// non-string values become None.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse a milestone label like "25%" (or a bare number) into its numeric value.
pub fn parse_milestone(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').parse::<f64>().ok()
}
