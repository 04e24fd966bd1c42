//! Typed access to reconciled fact values

use crate::ScreeningError;
use adjudica_domain::ClaimFacts;
use chrono::NaiveDate;
use serde_json::Value;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse a date in one of the formats seen on claim documents.
///
/// Timestamps are accepted by their leading `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Interpret a JSON value as a number; strings may use `,` as a thousands separator
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '\'').collect();
            cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Interpret a JSON value as a boolean (`true`, `"yes"`, `1`, ...)
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "ja" => Some(true),
            "false" | "no" | "n" | "0" | "nein" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Required string fact
pub fn require_str<'a>(facts: &'a ClaimFacts, name: &str) -> Result<&'a str, ScreeningError> {
    match facts.value(name) {
        None => Err(ScreeningError::MissingFact(name.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ScreeningError::InvalidFact {
            name: name.to_string(),
            reason: format!("expected text, got {}", other),
        }),
    }
}

/// Required date fact
pub fn require_date(facts: &ClaimFacts, name: &str) -> Result<NaiveDate, ScreeningError> {
    let raw = require_str(facts, name)?;
    parse_date(raw).ok_or_else(|| ScreeningError::InvalidFact {
        name: name.to_string(),
        reason: format!("unrecognized date '{}'", raw),
    })
}

/// Optional date fact; present but unparseable is an error
pub fn optional_date(facts: &ClaimFacts, name: &str) -> Result<Option<NaiveDate>, ScreeningError> {
    match facts.value(name) {
        None => Ok(None),
        Some(_) => require_date(facts, name).map(Some),
    }
}

/// Required numeric fact
pub fn require_number(facts: &ClaimFacts, name: &str) -> Result<f64, ScreeningError> {
    let value = facts
        .value(name)
        .ok_or_else(|| ScreeningError::MissingFact(name.to_string()))?;
    as_number(value).ok_or_else(|| ScreeningError::InvalidFact {
        name: name.to_string(),
        reason: format!("expected a number, got {}", value),
    })
}

/// Optional numeric fact; unparseable values are treated as absent
pub fn optional_number(facts: &ClaimFacts, name: &str) -> Option<f64> {
    facts.value(name).and_then(as_number)
}
