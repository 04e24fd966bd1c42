//! Fact reconciliation logic

use crate::normalize::normalized_for;
use crate::{ReconcilerConfig, ReconcilerError};
use adjudica_domain::traits::FactSource;
use adjudica_domain::{
    compare_run_ids, AggregatedFact, ClaimFacts, ConflictSource, ConflictValue,
    DocumentExtraction, FactConflict, FactProvenance, GateStatus, ReconciliationGate,
    ReconciliationReport,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Result of reconciling one claim
#[derive(Debug, Clone)]
pub struct ReconciliationOutput {
    /// Canonical facts (persisted as `claim_facts.json`)
    pub facts: ClaimFacts,

    /// Gate and conflicts (persisted as `reconciliation_report.json`)
    pub report: ReconciliationReport,
}

/// One `(name, value)` observation from one document run
#[derive(Debug, Clone)]
struct Candidate {
    value: Value,
    normalized: Value,
    confidence: f64,
    provenance: FactProvenance,
}

impl Candidate {
    /// Whether this candidate should replace `current` as the winner.
    ///
    /// Higher confidence wins; equal confidence goes to the later run id
    /// (digit runs compare numerically); a full tie keeps the earlier
    /// document.
    fn beats(&self, current: &Candidate) -> bool {
        if self.confidence != current.confidence {
            return self.confidence > current.confidence;
        }
        compare_run_ids(&self.provenance.run_id, &current.provenance.run_id) == Ordering::Greater
    }
}

/// The Reconciler merges document extractions into one fact set
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new Reconciler with the given configuration
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    /// Create a Reconciler with default configuration
    pub fn default_config() -> Self {
        Self::new(ReconcilerConfig::default())
    }

    /// Access the configuration
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile the latest extraction run of every document from a source
    pub fn reconcile_from_source<S: FactSource + ?Sized>(
        &self,
        source: &S,
        claim_id: &str,
    ) -> Result<ReconciliationOutput, ReconcilerError>
    where
        S::Error: std::fmt::Display,
    {
        let extractions = source
            .latest_extractions(claim_id)
            .map_err(|e| ReconcilerError::Source(e.to_string()))?;
        Ok(self.reconcile(claim_id, &extractions))
    }

    /// Reconcile a claim's document extractions
    ///
    /// # Arguments
    ///
    /// * `claim_id` - The claim being reconciled
    /// * `documents` - Extraction runs, in document order
    ///
    /// # Returns
    ///
    /// The canonical fact set plus a report with conflicts and the gate
    pub fn reconcile(&self, claim_id: &str, documents: &[DocumentExtraction]) -> ReconciliationOutput {
        let groups = group_candidates(documents);

        let mut facts = Vec::with_capacity(groups.len());
        let mut conflicts = Vec::new();

        for (name, candidates) in &groups {
            let Some(winner) = select(candidates) else {
                continue;
            };

            if let Some(conflict) = detect_conflict(name, candidates, winner) {
                debug!(
                    fact = %name,
                    distinct_values = conflict.values.len(),
                    "Conflicting values"
                );
                conflicts.push(conflict);
            }

            facts.push(AggregatedFact {
                name: name.clone(),
                value: winner.value.clone(),
                normalized_value: winner.normalized.clone(),
                confidence: winner.confidence,
                provenance: winner.provenance.clone(),
                candidate_count: candidates.len(),
            });
        }

        let facts = ClaimFacts::new(claim_id, facts);
        let gate = self.evaluate_gate(&facts, conflicts.len());

        match gate.status {
            GateStatus::Pass => {}
            _ => warn!(
                claim_id,
                status = gate.status.as_str(),
                reasons = ?gate.reasons,
                "Reconciliation gate not passed"
            ),
        }
        info!(
            claim_id,
            facts = facts.len(),
            conflicts = conflicts.len(),
            gate = gate.status.as_str(),
            "Reconciled claim facts"
        );

        let report = ReconciliationReport {
            claim_id: claim_id.to_string(),
            gate,
            conflicts,
            fact_count: facts.len(),
            document_count: documents.len(),
        };

        ReconciliationOutput { facts, report }
    }

    /// Evaluate the advisory gate for a reconciled fact set
    pub fn evaluate_gate(&self, facts: &ClaimFacts, conflict_count: usize) -> ReconciliationGate {
        let missing: Vec<String> = self
            .config
            .critical_facts
            .iter()
            .filter(|name| facts.get(name).is_none())
            .cloned()
            .collect();

        let provenance_coverage = if facts.is_empty() {
            0.0
        } else {
            let located = facts.facts.iter().filter(|f| f.provenance.is_located()).count();
            located as f64 / facts.len() as f64
        };

        let mut fail_reasons = Vec::new();
        let mut warn_reasons = Vec::new();

        if missing.len() > self.config.fail_missing_critical {
            fail_reasons.push(format!("Missing critical facts: {}", missing.join(", ")));
        } else if missing.len() > self.config.warn_missing_critical {
            warn_reasons.push(format!("Missing critical facts: {}", missing.join(", ")));
        }

        if conflict_count > self.config.fail_conflicts {
            fail_reasons.push(format!(
                "{} conflicting facts exceeds limit of {}",
                conflict_count, self.config.fail_conflicts
            ));
        } else if conflict_count > self.config.warn_conflicts {
            warn_reasons.push(format!("{} conflicting facts", conflict_count));
        }

        if provenance_coverage < self.config.min_provenance_coverage {
            warn_reasons.push(format!(
                "Provenance coverage {:.2} below {:.2}",
                provenance_coverage, self.config.min_provenance_coverage
            ));
        }

        let status = if !fail_reasons.is_empty() {
            GateStatus::Fail
        } else if !warn_reasons.is_empty() {
            GateStatus::Warn
        } else {
            GateStatus::Pass
        };

        let mut reasons = fail_reasons;
        reasons.extend(warn_reasons);

        ReconciliationGate {
            status,
            missing_critical_facts: missing,
            conflict_count,
            provenance_coverage,
            estimated_tokens: self.estimate_tokens(facts),
            reasons,
        }
    }

    fn estimate_tokens(&self, facts: &ClaimFacts) -> usize {
        let chars: usize = facts
            .facts
            .iter()
            .map(|f| f.name.len() + f.value.to_string().len())
            .sum();
        chars.div_ceil(self.config.chars_per_token.max(1))
    }
}

/// Group non-null field values by name, preserving document order
fn group_candidates(documents: &[DocumentExtraction]) -> BTreeMap<String, Vec<Candidate>> {
    let mut groups: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
    for doc in documents {
        for field in &doc.fields {
            if field.value.is_null() {
                continue;
            }
            let confidence = if field.confidence.is_nan() {
                0.0
            } else {
                field.confidence.clamp(0.0, 1.0)
            };
            groups.entry(field.name.clone()).or_default().push(Candidate {
                value: field.value.clone(),
                normalized: normalized_for(field),
                confidence,
                provenance: doc.provenance_for(field),
            });
        }
    }
    groups
}

fn select(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if !candidate.beats(current) => {}
            _ => best = Some(candidate),
        }
    }
    best
}

fn detect_conflict(name: &str, candidates: &[Candidate], winner: &Candidate) -> Option<FactConflict> {
    let mut values: Vec<ConflictValue> = Vec::new();
    for candidate in candidates {
        let source = ConflictSource {
            doc_id: candidate.provenance.doc_id.clone(),
            doc_type: candidate.provenance.doc_type.clone(),
            run_id: candidate.provenance.run_id.clone(),
            confidence: candidate.confidence,
        };
        match values.iter_mut().find(|v| v.normalized_value == candidate.normalized) {
            Some(existing) => existing.sources.push(source),
            None => values.push(ConflictValue {
                value: candidate.value.clone(),
                normalized_value: candidate.normalized.clone(),
                sources: vec![source],
            }),
        }
    }

    if values.len() < 2 {
        return None;
    }

    let tied = candidates
        .iter()
        .filter(|c| c.confidence == winner.confidence && c.normalized != winner.normalized)
        .count();
    let selection_reason = if tied > 0 {
        format!(
            "Confidence tie at {:.2}; most recent run {} from {}",
            winner.confidence, winner.provenance.run_id, winner.provenance.doc_id
        )
    } else {
        format!(
            "Highest confidence {:.2} from {} ({})",
            winner.confidence, winner.provenance.doc_id, winner.provenance.doc_type
        )
    };

    Some(FactConflict {
        fact_name: name.to_string(),
        values,
        selected_value: winner.value.clone(),
        selected_confidence: winner.confidence,
        selection_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjudica_domain::ExtractedField;
    use serde_json::json;

    fn doc(id: &str, run: &str, fields: Vec<ExtractedField>) -> DocumentExtraction {
        let mut d = DocumentExtraction::new(id, "invoice", run);
        d.fields = fields;
        d
    }

    fn field(name: &str, value: Value, confidence: f64) -> ExtractedField {
        ExtractedField::new(name, value, confidence).with_page(1)
    }

    #[test]
    fn test_single_document_passes_through() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![doc("d1", "r1", vec![field("vin", json!("WVW1"), 0.9)])];

        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.facts.value("vin"), Some(&json!("WVW1")));
        assert!(output.report.conflicts.is_empty());
        assert_eq!(output.report.gate.status, GateStatus::Pass);
    }

    #[test]
    fn test_highest_confidence_wins_and_conflict_recorded() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![
            doc("d1", "r1", vec![field("odometer_km", json!(84000), 0.7)]),
            doc("d2", "r1", vec![field("odometer_km", json!(84500), 0.95)]),
            doc("d3", "r1", vec![field("odometer_km", json!("84000"), 0.6)]),
        ];

        let output = reconciler.reconcile("CLM-1", &docs);
        let fact = output.facts.get("odometer_km").unwrap();
        assert_eq!(fact.value, json!(84500));
        assert_eq!(fact.provenance.doc_id, "d2");
        assert_eq!(fact.candidate_count, 3);

        assert_eq!(output.report.conflicts.len(), 1);
        let conflict = &output.report.conflicts[0];
        assert_eq!(conflict.values.len(), 2);
        assert_eq!(conflict.selected_value, json!(84500));
        // "84000" normalizes to the same value as 84000
        assert_eq!(conflict.values[0].sources.len(), 2);
        assert_eq!(conflict.doc_ids(), vec!["d1", "d3", "d2"]);
    }

    #[test]
    fn test_equivalent_values_do_not_conflict() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![
            doc("d1", "r1", vec![field("vin", json!("wvw 123"), 0.8)]),
            doc("d2", "r1", vec![field("vin", json!(" WVW   123"), 0.9)]),
        ];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert!(output.report.conflicts.is_empty());
        assert_eq!(output.facts.value("vin"), Some(&json!(" WVW   123")));
    }

    #[test]
    fn test_tie_broken_by_most_recent_run() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![
            doc("d1", "run-002", vec![field("make", json!("VW"), 0.8)]),
            doc("d2", "run-005", vec![field("make", json!("Audi"), 0.8)]),
            doc("d3", "run-001", vec![field("make", json!("Seat"), 0.8)]),
        ];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.facts.value("make"), Some(&json!("Audi")));
        assert!(output.report.conflicts[0].selection_reason.contains("tie"));
    }

    #[test]
    fn test_tie_compares_run_numbers_not_text() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![
            doc("d1", "run-10", vec![field("make", json!("VW"), 0.8)]),
            doc("d2", "run-9", vec![field("make", json!("Audi"), 0.8)]),
        ];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.facts.value("make"), Some(&json!("VW")));
        assert_eq!(output.facts.get("make").unwrap().provenance.run_id, "run-10");
    }

    #[test]
    fn test_full_tie_keeps_document_order() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![
            doc("d1", "r1", vec![field("make", json!("VW"), 0.8)]),
            doc("d2", "r1", vec![field("make", json!("Audi"), 0.8)]),
        ];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.facts.value("make"), Some(&json!("VW")));
    }

    #[test]
    fn test_null_values_ignored() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![
            doc("d1", "r1", vec![field("vin", Value::Null, 0.99)]),
            doc("d2", "r1", vec![field("vin", json!("WVW1"), 0.5)]),
        ];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.facts.value("vin"), Some(&json!("WVW1")));
        assert!(output.report.conflicts.is_empty());
        assert_eq!(output.facts.get("vin").unwrap().candidate_count, 1);
    }

    #[test]
    fn test_gate_fails_on_missing_critical_fact() {
        let reconciler = Reconciler::default_config();
        let docs = vec![doc(
            "d1",
            "r1",
            vec![
                field("policy_number", json!("P-1"), 0.9),
                field("policy_start_date", json!("2025-01-01"), 0.9),
                field("vin", json!("WVW1"), 0.9),
            ],
        )];
        let output = reconciler.reconcile("CLM-1", &docs);
        let gate = &output.report.gate;
        assert_eq!(gate.status, GateStatus::Fail);
        assert_eq!(gate.missing_critical_facts, vec!["odometer_km".to_string()]);
    }

    #[test]
    fn test_gate_warns_on_conflicts_below_fail_threshold() {
        let config = ReconcilerConfig {
            critical_facts: vec![],
            warn_conflicts: 0,
            fail_conflicts: 2,
            min_provenance_coverage: 0.0,
            ..ReconcilerConfig::default()
        };
        let reconciler = Reconciler::new(config);
        let docs = vec![
            doc("d1", "r1", vec![field("vin", json!("A"), 0.9)]),
            doc("d2", "r1", vec![field("vin", json!("B"), 0.8)]),
        ];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.report.gate.status, GateStatus::Warn);
        assert_eq!(output.report.gate.conflict_count, 1);
    }

    #[test]
    fn test_gate_warns_on_low_provenance_coverage() {
        let config = ReconcilerConfig {
            critical_facts: vec![],
            min_provenance_coverage: 0.5,
            ..ReconcilerConfig::default()
        };
        let reconciler = Reconciler::new(config);
        let docs = vec![doc(
            "d1",
            "r1",
            vec![ExtractedField::new("vin", json!("A"), 0.9)],
        )];
        let output = reconciler.reconcile("CLM-1", &docs);
        assert_eq!(output.report.gate.status, GateStatus::Warn);
        assert_eq!(output.report.gate.provenance_coverage, 0.0);
    }

    #[test]
    fn test_token_estimate() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let docs = vec![doc("d1", "r1", vec![field("vin", json!("ABCDE"), 0.9)])];
        let output = reconciler.reconcile("CLM-1", &docs);
        // "vin" + "\"ABCDE\"" = 3 + 7 chars
        assert_eq!(output.report.gate.estimated_tokens, 3);
    }

    struct OneDocSource;

    impl FactSource for OneDocSource {
        type Error = String;

        fn list_documents(&self, _claim_id: &str) -> Result<Vec<String>, String> {
            Ok(vec!["d1".to_string()])
        }

        fn list_runs(&self, _claim_id: &str, _doc_id: &str) -> Result<Vec<String>, String> {
            Ok(vec!["r1".to_string(), "r2".to_string()])
        }

        fn read_extraction(&self, _c: &str, doc_id: &str, run_id: &str) -> Result<DocumentExtraction, String> {
            if run_id == "r2" {
                Ok(doc(doc_id, run_id, vec![field("vin", json!("NEW"), 0.5)]))
            } else {
                Err("stale run must not be read".to_string())
            }
        }
    }

    #[test]
    fn test_reconcile_from_source_uses_latest_run() {
        let reconciler = Reconciler::new(ReconcilerConfig::lenient());
        let output = reconciler.reconcile_from_source(&OneDocSource, "CLM-1").unwrap();
        assert_eq!(output.facts.value("vin"), Some(&json!("NEW")));
        assert_eq!(output.report.document_count, 1);
    }
}
