//! Compiled policy clauses and their evaluations

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of policy clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseType {
    /// Caps the payable amount
    Limit,
    /// Must hold for the claim to be payable
    Condition,
    /// Excludes the claim when it holds
    Exclusion,
    /// Amount borne by the policyholder
    Deductible,
}

impl ClauseType {
    /// Get the clause type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseType::Limit => "limit",
            ClauseType::Condition => "condition",
            ClauseType::Exclusion => "exclusion",
            ClauseType::Deductible => "deductible",
        }
    }
}

/// One compiled clause; `logic` is in canonical evaluator form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Clause identifier (e.g., "EXC-04")
    pub clause_id: String,
    /// Clause kind
    pub clause_type: ClauseType,
    /// Canonical logic tree
    pub logic: Value,
    /// Plain-language summary
    #[serde(default)]
    pub description: String,
    /// Pointer into the policy wording (e.g., "§4.2(b)")
    #[serde(default)]
    pub source_reference: String,
}

/// A policy's compiled clauses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseSet {
    /// Policy or product identifier
    pub policy_id: String,
    /// Wording version
    #[serde(default)]
    pub version: String,
    /// Clauses in evaluation order
    #[serde(default)]
    pub clauses: Vec<Clause>,
}

/// Per-clause verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClauseVerdict {
    /// Limit/deductible evaluated to a positive amount
    Applied,
    /// Limit/deductible evaluated to zero, negative or non-numeric
    NotApplied,
    /// Condition holds
    Pass,
    /// Condition does not hold
    Fail,
    /// Exclusion holds
    Triggered,
    /// Exclusion does not hold
    NotTriggered,
    /// Result was not a boolean where one was expected
    Indeterminate,
    /// Evaluation faulted
    Error,
}

impl ClauseVerdict {
    /// Derive a verdict from a clause's evaluated value.
    ///
    /// Limits and deductibles apply iff the value is numeric and > 0.
    /// Conditions and exclusions need a boolean; anything else is
    /// indeterminate.
    pub fn from_result(clause_type: ClauseType, value: &Value) -> Self {
        match clause_type {
            ClauseType::Limit | ClauseType::Deductible => match value.as_f64() {
                Some(n) if n > 0.0 => ClauseVerdict::Applied,
                _ => ClauseVerdict::NotApplied,
            },
            ClauseType::Condition => match value {
                Value::Bool(true) => ClauseVerdict::Pass,
                Value::Bool(false) => ClauseVerdict::Fail,
                _ => ClauseVerdict::Indeterminate,
            },
            ClauseType::Exclusion => match value {
                Value::Bool(true) => ClauseVerdict::Triggered,
                Value::Bool(false) => ClauseVerdict::NotTriggered,
                _ => ClauseVerdict::Indeterminate,
            },
        }
    }

    /// Get the verdict name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseVerdict::Applied => "APPLIED",
            ClauseVerdict::NotApplied => "NOT_APPLIED",
            ClauseVerdict::Pass => "PASS",
            ClauseVerdict::Fail => "FAIL",
            ClauseVerdict::Triggered => "TRIGGERED",
            ClauseVerdict::NotTriggered => "NOT_TRIGGERED",
            ClauseVerdict::Indeterminate => "INDETERMINATE",
            ClauseVerdict::Error => "ERROR",
        }
    }

    /// Whether the verdict leaves the claim outcome uncertain
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ClauseVerdict::Indeterminate | ClauseVerdict::Error)
    }
}

/// Result of evaluating one clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseEvaluation {
    /// Clause identifier
    pub clause_id: String,
    /// Clause kind
    pub clause_type: ClauseType,
    /// Verdict
    pub verdict: ClauseVerdict,
    /// Evaluated value (null on error)
    pub result_value: Value,
    /// Explanation
    pub reasoning: String,
    /// Pointer into the policy wording
    pub source_reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limit_and_deductible_verdicts() {
        assert_eq!(ClauseVerdict::from_result(ClauseType::Limit, &json!(5000)), ClauseVerdict::Applied);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Limit, &json!(0)), ClauseVerdict::NotApplied);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Deductible, &json!(-10.0)), ClauseVerdict::NotApplied);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Deductible, &json!("150")), ClauseVerdict::NotApplied);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Deductible, &json!(0.5)), ClauseVerdict::Applied);
    }

    #[test]
    fn test_condition_verdicts() {
        assert_eq!(ClauseVerdict::from_result(ClauseType::Condition, &json!(true)), ClauseVerdict::Pass);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Condition, &json!(false)), ClauseVerdict::Fail);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Condition, &json!(1)), ClauseVerdict::Indeterminate);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Condition, &Value::Null), ClauseVerdict::Indeterminate);
    }

    #[test]
    fn test_exclusion_verdicts() {
        assert_eq!(ClauseVerdict::from_result(ClauseType::Exclusion, &json!(true)), ClauseVerdict::Triggered);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Exclusion, &json!(false)), ClauseVerdict::NotTriggered);
        assert_eq!(ClauseVerdict::from_result(ClauseType::Exclusion, &json!("yes")), ClauseVerdict::Indeterminate);
    }

    #[test]
    fn test_clause_set_from_json() {
        let set: ClauseSet = serde_json::from_value(json!({
            "policy_id": "MW-2025",
            "clauses": [{
                "clause_id": "LIM-1",
                "clause_type": "limit",
                "logic": {"var": ["policy.max_payout"]}
            }]
        }))
        .unwrap();
        assert_eq!(set.clauses.len(), 1);
        assert_eq!(set.clauses[0].clause_type, ClauseType::Limit);
        assert!(set.clauses[0].source_reference.is_empty());
    }
}
