//! Decision dossier - the versioned outcome of evaluating a claim

use crate::clause::{ClauseEvaluation, ClauseType, ClauseVerdict};
use crate::confidence::ConfidenceIndex;
use crate::coverage::{CoverageStatus, ItemCategory};
use crate::decision::ClaimVerdict;
use crate::screening::PayoutCalculation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Which stage produced the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecidedBy {
    /// Screening auto-reject; the rule evaluator was not consulted
    Screening,
    /// Clause evaluation
    Rules,
}

/// Clause evaluations partitioned by clause type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseBuckets {
    /// Limit clauses
    #[serde(default)]
    pub limits: Vec<ClauseEvaluation>,
    /// Condition clauses
    #[serde(default)]
    pub conditions: Vec<ClauseEvaluation>,
    /// Exclusion clauses
    #[serde(default)]
    pub exclusions: Vec<ClauseEvaluation>,
    /// Deductible clauses
    #[serde(default)]
    pub deductibles: Vec<ClauseEvaluation>,
}

impl ClauseBuckets {
    /// Place an evaluation in its bucket
    pub fn push(&mut self, evaluation: ClauseEvaluation) {
        match evaluation.clause_type {
            ClauseType::Limit => self.limits.push(evaluation),
            ClauseType::Condition => self.conditions.push(evaluation),
            ClauseType::Exclusion => self.exclusions.push(evaluation),
            ClauseType::Deductible => self.deductibles.push(evaluation),
        }
    }

    /// All evaluations, bucket by bucket
    pub fn iter(&self) -> impl Iterator<Item = &ClauseEvaluation> {
        self.limits
            .iter()
            .chain(&self.conditions)
            .chain(&self.exclusions)
            .chain(&self.deductibles)
    }

    /// Flattened copy of all evaluations
    pub fn to_vec(&self) -> Vec<ClauseEvaluation> {
        self.iter().cloned().collect()
    }

    /// Total number of evaluations
    pub fn len(&self) -> usize {
        self.limits.len() + self.conditions.len() + self.exclusions.len() + self.deductibles.len()
    }

    /// Whether no clause was evaluated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of clauses whose verdict is ERROR
    pub fn failed_clause_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|c| c.verdict == ClauseVerdict::Error)
            .map(|c| c.clause_id.clone())
            .collect()
    }
}

impl FromIterator<ClauseEvaluation> for ClauseBuckets {
    fn from_iter<I: IntoIterator<Item = ClauseEvaluation>>(iter: I) -> Self {
        let mut buckets = ClauseBuckets::default();
        for evaluation in iter {
            buckets.push(evaluation);
        }
        buckets
    }
}

/// Execution statistics of one rule evaluation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Clauses evaluated
    pub rule_count: usize,
    /// Clauses that faulted
    pub error_count: usize,
    /// Wall-clock time of the run
    pub elapsed_ms: u64,
}

/// Per line item payout decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDecision {
    /// Item identifier
    pub item_id: String,
    /// Invoice description
    pub description: String,
    /// Category
    pub category: ItemCategory,
    /// Coverage classification the decision is based on
    pub status: CoverageStatus,
    /// Amount claimed
    pub claimed_amount: f64,
    /// Amount accepted for payment before limits and deductibles
    pub approved_amount: f64,
    /// Short explanation
    pub reason: String,
}

/// Money view of the decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// ISO currency code
    pub currency: String,
    /// Sum of all line items
    pub claimed_total: f64,
    /// Sum of covered line items
    pub covered_total: f64,
    /// Sum of excluded line items
    pub not_covered_total: f64,
    /// Sum of items awaiting review
    pub review_total: f64,
    /// Smallest applied limit, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_limit: Option<f64>,
    /// Sum of applied deductible clauses
    pub applied_deductible: f64,
    /// Screening payout estimate, when one was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screening_payout: Option<PayoutCalculation>,
    /// Amount payable for this verdict; zero unless approved
    pub net_payable: f64,
}

/// The versioned decision for a claim (persisted as `decision_dossier_v{N}.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dossier {
    /// Claim identifier
    pub claim_id: String,
    /// Monotonic version, starting at 1
    pub version: u32,
    /// Final verdict
    pub verdict: ClaimVerdict,
    /// Stage that produced the verdict
    pub decided_by: DecidedBy,
    /// Human-readable verdict explanation
    pub summary: String,
    /// Hard-failing screening checks, when decided by screening
    #[serde(default)]
    pub hard_fails: Vec<String>,
    /// Clause evaluations (empty when decided by screening)
    #[serde(default)]
    pub clauses: ClauseBuckets,
    /// Rule evaluation statistics
    #[serde(default)]
    pub metadata: ExecutionMetadata,
    /// Per line item decisions
    #[serde(default)]
    pub line_item_decisions: Vec<LineItemDecision>,
    /// Money view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_summary: Option<FinancialSummary>,
    /// Fact values overridden for this evaluation
    #[serde(default)]
    pub assumption_overrides: BTreeMap<String, Value>,
    /// Compact confidence index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceIndex>,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl Dossier {
    /// Net amount payable, zero without a financial summary
    pub fn net_payable(&self) -> f64 {
        self.financial_summary
            .as_ref()
            .map(|f| f.net_payable)
            .unwrap_or(0.0)
    }
}
