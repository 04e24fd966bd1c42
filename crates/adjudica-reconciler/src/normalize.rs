//! Value normalization for conflict detection
//!
//! Two candidates conflict only if their normalized forms differ, so
//! `"WVW 123"` and `"wvw  123 "` are the same value while `84000` and
//! `"84,500"` are not.

use adjudica_domain::ExtractedField;
use serde_json::{Number, Value};

/// The normalized form of a field: the extractor's own normalization if it
/// supplied a non-null one, otherwise [`normalize_value`] of the raw value.
pub fn normalized_for(field: &ExtractedField) -> Value {
    match &field.normalized_value {
        Some(v) if !v.is_null() => v.clone(),
        _ => normalize_value(&field.value),
    }
}

/// Normalize a raw JSON value.
///
/// - strings: trimmed, inner whitespace collapsed, lowercased; numeric
///   strings become numbers
/// - numbers: integral floats become integers
/// - arrays and objects: normalized element-wise
pub fn normalize_value(raw: &Value) -> Value {
    match raw {
        Value::String(s) => normalize_string(s),
        Value::Number(n) => normalize_number(n),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn normalize_string(s: &str) -> Value {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(number) = parse_number(&collapsed) {
        return number;
    }
    Value::String(collapsed.to_lowercase())
}

fn parse_number(s: &str) -> Option<Value> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Number::from_f64(f).map(|n| normalize_number(&n))
}

fn normalize_number(n: &Number) -> Value {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                return Value::Number((f as i64).into());
            }
        }
    }
    Value::Number(n.clone())
}
