//! Rule Evaluator - runs a clause set against nested claim data

use crate::logic::Evaluator;
use crate::{RulesConfig, RulesError};
use adjudica_domain::{
    Clause, ClauseBuckets, ClauseEvaluation, ClauseSet, ClauseVerdict, ExecutionMetadata,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Evaluations of one clause set, bucketed by clause type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseBatch {
    /// Evaluations by clause type
    pub clauses: ClauseBuckets,
    /// Run statistics
    pub metadata: ExecutionMetadata,
}

/// Evaluates compiled clauses
///
/// Each clause is evaluated in isolation: a fault produces an ERROR verdict
/// for that clause and the remaining clauses still run.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    config: RulesConfig,
}

impl RuleEvaluator {
    /// Create a new evaluator
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Evaluate every clause of `set` against `data`
    pub fn evaluate(&self, set: &ClauseSet, data: &Value) -> ClauseBatch {
        let started = Instant::now();
        let mut clauses = ClauseBuckets::default();
        let mut error_count = 0;

        for clause in &set.clauses {
            let evaluation = self.evaluate_clause(clause, data);
            if evaluation.verdict == ClauseVerdict::Error {
                error_count += 1;
            }
            clauses.push(evaluation);
        }

        let metadata = ExecutionMetadata {
            rule_count: set.clauses.len(),
            error_count,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            policy_id = %set.policy_id,
            rules = metadata.rule_count,
            errors = metadata.error_count,
            elapsed_ms = metadata.elapsed_ms,
            "Evaluated clause set"
        );

        ClauseBatch { clauses, metadata }
    }

    /// Evaluate a single clause
    pub fn evaluate_clause(&self, clause: &Clause, data: &Value) -> ClauseEvaluation {
        match self.run(&clause.logic, data) {
            Ok(value) => {
                let verdict = ClauseVerdict::from_result(clause.clause_type, &value);
                debug!(clause_id = %clause.clause_id, verdict = verdict.as_str(), "Clause evaluated");
                ClauseEvaluation {
                    clause_id: clause.clause_id.clone(),
                    clause_type: clause.clause_type,
                    verdict,
                    reasoning: reasoning_for(clause, verdict, &value),
                    result_value: value,
                    source_reference: clause.source_reference.clone(),
                }
            }
            Err(e) => {
                warn!(clause_id = %clause.clause_id, error = %e, "Clause evaluation failed");
                ClauseEvaluation {
                    clause_id: clause.clause_id.clone(),
                    clause_type: clause.clause_type,
                    verdict: ClauseVerdict::Error,
                    result_value: Value::Null,
                    reasoning: format!("Evaluation error: {}", e),
                    source_reference: clause.source_reference.clone(),
                }
            }
        }
    }

    fn run(&self, logic: &Value, data: &Value) -> Result<Value, RulesError> {
        Evaluator::new(data, self.config.max_depth).eval(logic, 0)
    }
}

fn reasoning_for(clause: &Clause, verdict: ClauseVerdict, value: &Value) -> String {
    let subject = if clause.description.is_empty() {
        format!("{} {}", clause.clause_type.as_str(), clause.clause_id)
    } else {
        clause.description.clone()
    };
    match verdict {
        ClauseVerdict::Indeterminate => {
            format!("{}: expected a boolean, got {}", subject, value)
        }
        _ => format!("{}: {} (result {})", subject, verdict.as_str(), value),
    }
}
