//! Claim Data Mapper
//!
//! Inflates flat dotted-path keys into the nested structure clause logic
//! reads with `var`:
//!
//! ```text
//! "claim.parties.claimants[0].role" = "owner"
//!   ──► {"claim": {"parties": {"claimants": [{"role": "owner"}]}}}
//! ```
//!
//! Rules:
//! - a key is split on `.`; `name[i]` (or `name[i][j]`) expands into a name
//!   segment followed by index segments, and an all-digit segment is an index
//! - an index segment addresses an array, which grows and is padded with nulls
//! - a name segment addresses an object
//! - a missing intermediate container is created as an array or an object
//!   according to the kind of the *next* segment
//! - null values are skipped, so the output stays sparse
//! - a container of the wrong kind along the path is replaced
//! - a key with an index above the configured maximum is skipped

use crate::RulesError;
use adjudica_domain::ClaimFacts;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Largest array index [`inflate`] accepts
pub const DEFAULT_MAX_ARRAY_INDEX: usize = 1024;

/// One parsed path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

/// Parse a dotted path into segments
pub fn parse_path(path: &str) -> Result<Vec<Segment>, RulesError> {
    let invalid = || RulesError::InvalidPath(path.to_string());
    let mut segments = Vec::new();

    for part in path.split('.') {
        if part.is_empty() {
            return Err(invalid());
        }
        let (name, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if !name.is_empty() {
            if rest.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                segments.push(Segment::Index(name.parse().map_err(|_| invalid())?));
            } else {
                segments.push(Segment::Key(name.to_string()));
            }
        } else if rest.is_empty() {
            return Err(invalid());
        }

        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(invalid)?;
            if !rest.starts_with('[') {
                return Err(invalid());
            }
            let index = rest[1..close].parse::<usize>().map_err(|_| invalid())?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(segments)
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Key(_) => Value::Object(Map::new()),
        Segment::Index(_) => Value::Array(Vec::new()),
    }
}

fn insert(target: &mut Value, segments: &[Segment], value: Value) {
    let Some((head, tail)) = segments.split_first() else {
        *target = value;
        return;
    };

    let slot = match head {
        Segment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            let Value::Object(map) = target else {
                return;
            };
            map.entry(key.clone()).or_insert(Value::Null)
        }
        Segment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            let Value::Array(items) = target else {
                return;
            };
            let Some(len) = index.checked_add(1) else {
                return;
            };
            if items.len() < len {
                items.resize(len, Value::Null);
            }
            &mut items[*index]
        }
    };

    match tail.first() {
        None => *slot = value,
        Some(next) => {
            let kind_matches = match next {
                Segment::Key(_) => slot.is_object(),
                Segment::Index(_) => slot.is_array(),
            };
            if !kind_matches {
                *slot = empty_container_for(next);
            }
            insert(slot, tail, value);
        }
    }
}

/// Inflate a flat `path -> value` map into nested JSON.
///
/// Keys with malformed paths, or with an index above
/// [`DEFAULT_MAX_ARRAY_INDEX`], are skipped with a warning.
pub fn inflate(flat: &BTreeMap<String, Value>) -> Value {
    inflate_with_limit(flat, DEFAULT_MAX_ARRAY_INDEX)
}

/// [`inflate`] with an explicit maximum array index
pub fn inflate_with_limit(flat: &BTreeMap<String, Value>, max_array_index: usize) -> Value {
    let mut root = Value::Object(Map::new());
    for (path, value) in flat {
        if value.is_null() {
            continue;
        }
        match parse_path(path) {
            Ok(segments) if !segments.is_empty() => {
                if matches!(segments[0], Segment::Index(_)) {
                    warn!(path = %path, "Skipping fact path that starts with an index");
                    continue;
                }
                let too_large = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Index(i) if *i > max_array_index));
                if too_large {
                    warn!(path = %path, max_array_index, "Skipping fact path with an out-of-range index");
                    continue;
                }
                insert(&mut root, &segments, value.clone());
            }
            Ok(_) => {}
            Err(e) => warn!(path = %path, error = %e, "Skipping fact with malformed path"),
        }
    }
    root
}

/// Nested evaluator input for a claim: its facts with overrides applied.
///
/// An override replaces the fact of the same name; a null override
/// removes it. Indexes above `max_array_index` are skipped.
pub fn build_claim_data(
    facts: &ClaimFacts,
    overrides: &BTreeMap<String, Value>,
    max_array_index: usize,
) -> Value {
    let mut flat = facts.to_flat_map();
    for (name, value) in overrides {
        flat.insert(name.clone(), value.clone());
    }
    inflate_with_limit(&flat, max_array_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(
            parse_path("claim.parties.claimants[0].role").unwrap(),
            vec![
                Segment::Key("claim".into()),
                Segment::Key("parties".into()),
                Segment::Key("claimants".into()),
                Segment::Index(0),
                Segment::Key("role".into()),
            ]
        );
        assert_eq!(
            parse_path("grid[1][2]").unwrap(),
            vec![Segment::Key("grid".into()), Segment::Index(1), Segment::Index(2)]
        );
        assert_eq!(
            parse_path("items.3.amount").unwrap(),
            vec![Segment::Key("items".into()), Segment::Index(3), Segment::Key("amount".into())]
        );
    }

    #[test]
    fn test_parse_path_rejects_malformed() {
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a[x]").is_err());
        assert!(parse_path("a[1").is_err());
        assert!(parse_path("").is_err());
    }

    #[test]
    fn test_inflate_nested_objects() {
        let data = inflate(&flat(&[
            ("vehicle.odometer_km", json!(91000)),
            ("vehicle.vin", json!("WVW1")),
            ("policy.number", json!("P-1")),
        ]));
        assert_eq!(
            data,
            json!({
                "vehicle": {"odometer_km": 91000, "vin": "WVW1"},
                "policy": {"number": "P-1"}
            })
        );
    }

    #[test]
    fn test_inflate_arrays_padded() {
        let data = inflate(&flat(&[
            ("claim.parties.claimants[2].role", json!("driver")),
            ("claim.parties.claimants[0].role", json!("owner")),
        ]));
        assert_eq!(
            data,
            json!({"claim": {"parties": {"claimants": [
                {"role": "owner"},
                null,
                {"role": "driver"}
            ]}}})
        );
    }

    #[test]
    fn test_inflate_skips_nulls() {
        let data = inflate(&flat(&[("a.b", Value::Null), ("a.c", json!(1)), ("d", Value::Null)]));
        assert_eq!(data, json!({"a": {"c": 1}}));
    }

    #[test]
    fn test_inflate_skips_malformed_keys() {
        let data = inflate(&flat(&[("a..b", json!(1)), ("ok", json!(2)), ("[0]", json!(3))]));
        assert_eq!(data, json!({"ok": 2}));
    }

    #[test]
    fn test_inflate_skips_out_of_range_indexes() {
        let data = inflate(&flat(&[
            ("parts[18446744073709551615]", json!("x")),
            ("parts[1000000000000].name", json!("y")),
            ("grid[0][5000]", json!("z")),
            ("ok", json!(1)),
        ]));
        assert_eq!(data, json!({"ok": 1}));
    }

    #[test]
    fn test_inflate_limit_is_inclusive() {
        let data = inflate_with_limit(&flat(&[("a[2]", json!(1)), ("b[3]", json!(2))]), 2);
        assert_eq!(data, json!({"a": [null, null, 1]}));
    }

    #[test]
    fn test_overrides_replace_and_remove() {
        let mut values = BTreeMap::new();
        values.insert("vehicle.odometer_km".to_string(), json!(91000));
        values.insert("vehicle.vin".to_string(), json!("WVW1"));
        let facts = ClaimFacts::from_values("CLM", values);

        let overrides = flat(&[("vehicle.odometer_km", json!(120000)), ("vehicle.vin", Value::Null)]);
        let data = build_claim_data(&facts, &overrides, DEFAULT_MAX_ARRAY_INDEX);
        assert_eq!(data, json!({"vehicle": {"odometer_km": 120000}}));
    }
}
