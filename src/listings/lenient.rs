// lenient.rs
//
// `deserialize_with` helpers for upstream listing fields. Upstream feeds are
// loosely typed (prices arrive as "450000", ids as numbers), so a field with
// the wrong JSON type decodes to `None` instead of failing the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::normalize::decode_string_array;

fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Option::<Value>::deserialize(d)
}

pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(raw(d)?.as_ref().and_then(as_string))
}

pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(raw(d)?.as_ref().and_then(as_string).unwrap_or_default())
}

pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(raw(d)?.as_ref().and_then(as_f64))
}

pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(raw(d)?.as_ref().and_then(as_i64))
}

/// Keeps the value untouched. Used for JSON-encoded sub-documents that the
/// normalizer decodes explicitly.
pub fn opt_raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Ok(raw(d)?.filter(|v| !v.is_null()))
}

/// Native arrays and JSON-encoded array strings both decode; anything else is `None`.
pub fn string_array<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(raw(d)?.as_ref().and_then(decode_string_array))
}
