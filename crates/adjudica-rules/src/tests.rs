//! End-to-end tests for the Rule Evaluator

#[cfg(test)]
mod tests {
    use crate::{
        assemble_rules_dossier, build_claim_data, transpile_clause_set, DossierContext,
        RuleEvaluator, RulesConfig, DEFAULT_MAX_ARRAY_INDEX,
    };
    use adjudica_domain::{
        ClaimFacts, ClaimVerdict, ClauseVerdict, CoverageStatus, CoverageSummary, ItemCategory,
        LineItem,
    };
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn motor_policy() -> Value {
        json!({
            "policy_id": "MW-2025",
            "version": "2025-01",
            "clauses": [
                {
                    "clause_id": "LIM-1",
                    "clause_type": "limit",
                    "logic": {"operator": "if", "arguments": [
                        {"operator": "<", "arguments": [{"operator": "var", "arguments": ["vehicle.odometer_km"]}, 100000]},
                        5000,
                        2500
                    ]},
                    "source_reference": "§3.1"
                },
                {
                    "clause_id": "COND-1",
                    "clause_type": "condition",
                    "logic": {"operator": "<=", "arguments": [
                        "2025-01-01",
                        {"operator": "var", "arguments": ["claim.incident_date"]},
                        "2025-12-31"
                    ]},
                    "source_reference": "§1.2"
                },
                {
                    "clause_id": "EXC-1",
                    "clause_type": "exclusion",
                    "logic": {"operator": "in", "arguments": [
                        {"operator": "var", "arguments": ["claim.parties.claimants[0].role"]},
                        ["racer", "courier"]
                    ]},
                    "source_reference": "§5.4"
                },
                {
                    "clause_id": "DED-1",
                    "clause_type": "deductible",
                    "logic": {"operator": "max", "arguments": [
                        150,
                        {"operator": "*", "arguments": [{"operator": "var", "arguments": ["claim.amount"]}, 0.1]}
                    ]},
                    "source_reference": "§4.1"
                }
            ]
        })
    }

    fn facts() -> ClaimFacts {
        let mut values = BTreeMap::new();
        values.insert("vehicle.odometer_km".to_string(), json!(91000));
        values.insert("claim.incident_date".to_string(), json!("2025-03-14"));
        values.insert("claim.parties.claimants[0].role".to_string(), json!("owner"));
        values.insert("claim.amount".to_string(), json!(2000));
        ClaimFacts::from_values("CLM-7", values)
    }

    #[test]
    fn test_full_policy_evaluation() {
        let set = transpile_clause_set(&motor_policy(), true).unwrap();
        let data = build_claim_data(&facts(), &BTreeMap::new(), DEFAULT_MAX_ARRAY_INDEX);
        let batch = RuleEvaluator::new(RulesConfig::default()).evaluate(&set, &data);

        assert_eq!(batch.metadata.rule_count, 4);
        assert_eq!(batch.metadata.error_count, 0);
        assert_eq!(batch.clauses.limits[0].result_value, json!(5000));
        assert_eq!(batch.clauses.conditions[0].verdict, ClauseVerdict::Pass);
        assert_eq!(batch.clauses.exclusions[0].verdict, ClauseVerdict::NotTriggered);
        assert_eq!(batch.clauses.deductibles[0].result_value, json!(200));

        let coverage = CoverageSummary {
            line_items: vec![LineItem {
                item_id: "1".to_string(),
                description: "Turbocharger".to_string(),
                category: ItemCategory::Parts,
                amount: 2000.0,
                status: CoverageStatus::Covered,
                confidence: 0.95,
            }],
            currency: "EUR".to_string(),
        };
        let overrides = BTreeMap::new();
        let dossier = assemble_rules_dossier(
            DossierContext {
                claim_id: "CLM-7",
                version: 1,
                screening: None,
                coverage: Some(&coverage),
                assumption_overrides: &overrides,
                created_at: "2025-06-01T10:00:00Z",
            },
            batch,
        );
        assert_eq!(dossier.verdict, ClaimVerdict::Approve);
        assert_eq!(dossier.net_payable(), 1800.0);
    }

    #[test]
    fn test_override_changes_outcome() {
        let set = transpile_clause_set(&motor_policy(), true).unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert("claim.parties.claimants[0].role".to_string(), json!("courier"));
        let data = build_claim_data(&facts(), &overrides, DEFAULT_MAX_ARRAY_INDEX);

        let batch = RuleEvaluator::default().evaluate(&set, &data);
        assert_eq!(batch.clauses.exclusions[0].verdict, ClauseVerdict::Triggered);
        assert_eq!(crate::claim_verdict(&batch.clauses).0, ClaimVerdict::Reject);
    }

    #[test]
    fn test_missing_fact_makes_condition_fail_not_error() {
        let set = transpile_clause_set(&motor_policy(), true).unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert("claim.incident_date".to_string(), Value::Null);
        let data = build_claim_data(&facts(), &overrides, DEFAULT_MAX_ARRAY_INDEX);

        // An absent date is not comparable with the bounds
        let batch = RuleEvaluator::default().evaluate(&set, &data);
        assert_eq!(batch.clauses.conditions[0].verdict, ClauseVerdict::Fail);
        assert_eq!(batch.metadata.error_count, 0);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let set = transpile_clause_set(&motor_policy(), true).unwrap();
        let data = build_claim_data(&facts(), &BTreeMap::new(), DEFAULT_MAX_ARRAY_INDEX);
        let evaluator = RuleEvaluator::default();

        let first = evaluator.evaluate(&set, &data);
        let second = evaluator.evaluate(&set, &data);
        assert_eq!(first.clauses, second.clauses);
    }
}
