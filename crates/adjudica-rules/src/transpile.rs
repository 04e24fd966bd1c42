//! Authoring form to canonical form

use crate::RulesError;
use adjudica_domain::{Clause, ClauseSet, ClauseType, Operator};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Rewrite authoring-form nodes `{"operator": op, "arguments": [...]}` into
/// canonical `{op: [...]}`, recursing into arguments.
///
/// Primitives pass through unchanged, arrays and plain objects are
/// transpiled element-wise, and canonical input comes back unchanged.
pub fn transpile(node: &Value) -> Value {
    match node {
        Value::Object(map) if is_authoring_node(map) => {
            let operator = map
                .get("operator")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let arguments = match map.get("arguments") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.iter().map(transpile).collect(),
                Some(single) => vec![transpile(single)],
            };
            let mut canonical = Map::new();
            canonical.insert(operator, Value::Array(arguments));
            Value::Object(canonical)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), transpile(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(transpile).collect()),
        primitive => primitive.clone(),
    }
}

fn is_authoring_node(map: &Map<String, Value>) -> bool {
    matches!(map.get("operator"), Some(Value::String(_)))
        && map.keys().all(|k| k == "operator" || k == "arguments")
}

/// Check that every operation in a canonical tree uses a known operator
pub fn validate_logic(logic: &Value) -> Result<(), RulesError> {
    match logic {
        Value::Object(map) if map.len() == 1 => {
            let Some((key, args)) = map.iter().next() else {
                return Ok(());
            };
            if Operator::parse(key).is_none() {
                return Err(RulesError::UnknownOperator(key.clone()));
            }
            validate_logic(args)
        }
        Value::Object(map) => map.values().try_for_each(validate_logic),
        Value::Array(items) => items.iter().try_for_each(validate_logic),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct AuthoringClause {
    clause_id: String,
    clause_type: ClauseType,
    logic: Value,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source_reference: String,
}

#[derive(Debug, Deserialize)]
struct AuthoringClauseSet {
    policy_id: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    clauses: Vec<AuthoringClause>,
}

/// Compile an authoring clause file into a canonical [`ClauseSet`]
///
/// With `validate` set, an unknown operator anywhere fails the whole file;
/// otherwise it surfaces later as an ERROR verdict on its clause.
pub fn transpile_clause_set(authoring: &Value, validate: bool) -> Result<ClauseSet, RulesError> {
    let parsed: AuthoringClauseSet = serde_json::from_value(authoring.clone())?;

    let mut clauses = Vec::with_capacity(parsed.clauses.len());
    for clause in parsed.clauses {
        let logic = transpile(&clause.logic);
        if validate {
            validate_logic(&logic).map_err(|e| {
                RulesError::InvalidNode(format!("clause {}: {}", clause.clause_id, e))
            })?;
        }
        debug!(clause_id = %clause.clause_id, "Transpiled clause");
        clauses.push(Clause {
            clause_id: clause.clause_id,
            clause_type: clause.clause_type,
            logic,
            description: clause.description,
            source_reference: clause.source_reference,
        });
    }

    Ok(ClauseSet {
        policy_id: parsed.policy_id,
        version: parsed.version,
        clauses,
    })
}
