//! Reconciliation outputs: conflicts and the advisory gate

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One document that contributed a value to a conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictSource {
    /// Document identifier
    pub doc_id: String,
    /// Document classification
    pub doc_type: String,
    /// Extraction run identifier
    pub run_id: String,
    /// Confidence the extractor reported for this value
    pub confidence: f64,
}

/// One distinct value observed for a conflicting fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictValue {
    /// First raw value seen for this normalized form
    pub value: Value,
    /// Normalized form shared by all sources below
    pub normalized_value: Value,
    /// Documents that reported this value
    pub sources: Vec<ConflictSource>,
}

/// Two or more distinct non-null values for the same fact name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactConflict {
    /// Fact name
    pub fact_name: String,
    /// Every distinct value with its contributing documents
    pub values: Vec<ConflictValue>,
    /// Value chosen by the reconciler
    pub selected_value: Value,
    /// Confidence of the chosen value
    pub selected_confidence: f64,
    /// Human-readable explanation of the choice
    pub selection_reason: String,
}

impl FactConflict {
    /// Document ids contributing to any value, in first-seen order
    pub fn doc_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for value in &self.values {
            for source in &value.sources {
                if !ids.contains(&source.doc_id.as_str()) {
                    ids.push(&source.doc_id);
                }
            }
        }
        ids
    }
}

/// Gate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    /// Reconciliation looks sound
    Pass,
    /// Quality issues worth a reviewer's attention
    Warn,
    /// Critical facts missing or too many conflicts
    Fail,
}

impl GateStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            GateStatus::Pass => "pass",
            GateStatus::Warn => "warn",
            GateStatus::Fail => "fail",
        }
    }
}

/// Advisory assessment of reconciliation quality.
///
/// The gate never blocks downstream stages; it feeds the confidence
/// aggregator and the reconciliation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationGate {
    /// Overall status
    pub status: GateStatus,
    /// Declared critical facts that no document provided
    pub missing_critical_facts: Vec<String>,
    /// Number of conflicting fact names
    pub conflict_count: usize,
    /// Fraction of selected facts with a located provenance [0.0, 1.0]
    pub provenance_coverage: f64,
    /// Rough token size of the fact set when rendered for a reviewer
    pub estimated_tokens: usize,
    /// Why the status is not `pass`
    pub reasons: Vec<String>,
}

/// Persisted as `reconciliation_report.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Claim identifier
    pub claim_id: String,
    /// Gate assessment
    pub gate: ReconciliationGate,
    /// Conflicts, sorted by fact name
    pub conflicts: Vec<FactConflict>,
    /// Number of reconciled facts
    pub fact_count: usize,
    /// Number of document runs read
    pub document_count: usize,
}
