//! Decision service: verdict, confidence, versioning and ledger entry

use crate::artifacts::ArtifactStore;
use crate::registry::WorkspacePlugin;
use crate::{AdjudicaConfig, PipelineError};
use adjudica_domain::{
    ClaimFacts, ClauseSet, ConfidenceAggregator, ConfidenceInputs, ConfidenceSummary,
    CoverageSummary, DecidedBy, DecisionRecord, DecisionType, Dossier, NewDecision,
    ProcessingSummary, Rationale, ReconciliationReport, ScreeningResult,
};
use adjudica_ledger::JsonlLedger;
use adjudica_rules::{
    assemble_rules_dossier, assemble_screening_dossier, build_claim_data, DossierContext,
    RuleEvaluator,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Everything a decision is derived from
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    /// Claim identifier
    pub claim_id: &'a str,
    /// Reconciled facts
    pub facts: &'a ClaimFacts,
    /// Reconciliation report, when reconciliation ran
    pub report: Option<&'a ReconciliationReport>,
    /// Screening result; a hard fail short-circuits rule evaluation
    pub screening: Option<&'a ScreeningResult>,
    /// Coverage summary
    pub coverage: Option<&'a CoverageSummary>,
    /// Processing summary
    pub processing: Option<&'a ProcessingSummary>,
    /// Fact overrides (re-evaluation)
    pub assumption_overrides: &'a BTreeMap<String, Value>,
}

/// A dossier and the confidence breakdown behind its index
#[derive(Debug, Clone)]
pub struct Decision {
    /// Versioned dossier, with the confidence index embedded
    pub dossier: Dossier,
    /// Full confidence breakdown
    pub confidence: ConfidenceSummary,
}

/// Turns screened facts into a versioned dossier and records it
#[derive(Clone)]
pub struct DecisionService {
    config: Arc<AdjudicaConfig>,
    clauses: Arc<ClauseSet>,
    evaluator: RuleEvaluator,
    aggregator: ConfidenceAggregator,
    ledger: Arc<JsonlLedger>,
    artifacts: Option<ArtifactStore>,
}

impl DecisionService {
    /// Create a service for one workspace
    pub fn new(
        config: Arc<AdjudicaConfig>,
        plugin: Arc<dyn WorkspacePlugin>,
        ledger: Arc<JsonlLedger>,
        artifacts: Option<ArtifactStore>,
    ) -> Self {
        Self {
            clauses: Arc::new(plugin.clause_set()),
            evaluator: RuleEvaluator::new(config.rules.clone()),
            aggregator: ConfidenceAggregator::new(config.confidence.clone()),
            config,
            ledger,
            artifacts,
        }
    }

    /// Clause set evaluated by this service
    pub fn clause_set(&self) -> &ClauseSet {
        &self.clauses
    }

    /// Version the next dossier of a claim gets: one past the highest
    /// dossier on disk, or past the claim's ledger entries without artifacts
    pub fn next_version(&self, claim_id: &str) -> Result<u32, PipelineError> {
        match &self.artifacts {
            Some(store) => store.next_version(claim_id),
            None => Ok(self.ledger.records_for_claim(claim_id)?.len() as u32 + 1),
        }
    }

    /// Decide a claim without side effects.
    ///
    /// A screening auto-reject yields a REJECT dossier decided by screening
    /// and the rule evaluator is not consulted.
    pub fn decide(&self, input: &DecisionInput<'_>) -> Result<Decision, PipelineError> {
        let version = self.next_version(input.claim_id)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let ctx = DossierContext {
            claim_id: input.claim_id,
            version,
            screening: input.screening,
            coverage: input.coverage,
            assumption_overrides: input.assumption_overrides,
            created_at: &created_at,
        };

        let mut dossier = if input.screening.is_some_and(|s| s.auto_reject) {
            assemble_screening_dossier(ctx)
        } else {
            let data = build_claim_data(
                input.facts,
                input.assumption_overrides,
                self.evaluator.config().max_array_index,
            );
            let batch = self.evaluator.evaluate(&self.clauses, &data);
            assemble_rules_dossier(ctx, batch)
        };

        let clauses = dossier.clauses.to_vec();
        let confidence = self.aggregator.summarize(
            input.claim_id,
            &ConfidenceInputs {
                facts: Some(input.facts),
                report: input.report,
                screening: input.screening,
                coverage: input.coverage,
                processing: input.processing,
                clauses: &clauses,
            },
        );
        dossier.confidence = Some(confidence.index());

        info!(
            claim_id = input.claim_id,
            version,
            verdict = dossier.verdict.as_str(),
            decided_by = ?dossier.decided_by,
            confidence = confidence.composite_score,
            "Claim decided"
        );
        Ok(Decision { dossier, confidence })
    }

    /// Write the dossier and confidence artifacts, returning the file names
    pub fn persist(&self, decision: &Decision) -> Result<Vec<String>, PipelineError> {
        let Some(store) = &self.artifacts else {
            return Ok(Vec::new());
        };
        Ok(vec![
            store.write_dossier(&decision.dossier)?,
            store.write_confidence(&decision.confidence, decision.dossier.version)?,
        ])
    }

    /// Append the decision to the ledger
    pub fn record(
        &self,
        decision: &Decision,
        run_id: Option<&str>,
        linked: Vec<String>,
    ) -> Result<DecisionRecord, PipelineError> {
        let dossier = &decision.dossier;
        let decision_type = if dossier.assumption_overrides.is_empty() {
            DecisionType::ClaimVerdict
        } else {
            DecisionType::Reevaluation
        };
        let decided_by = match dossier.decided_by {
            DecidedBy::Screening => "screening",
            DecidedBy::Rules => "rules",
        };

        let record = self.ledger.append(NewDecision {
            decision_type,
            claim_id: dossier.claim_id.clone(),
            run_id: run_id.map(str::to_string),
            rationale: Rationale {
                summary: dossier.summary.clone(),
                confidence: decision.confidence.composite_score,
                linked_call_ids: linked,
            },
            outcome: json!({
                "decision": dossier.verdict.as_str(),
                "dossier_version": dossier.version,
                "decided_by": decided_by,
                "hard_fails": dossier.hard_fails,
                "net_payable": dossier.net_payable(),
            }),
            actor: self.config.pipeline.actor.clone(),
        })?;
        Ok(record)
    }

    /// Decide, persist and record in one call.
    ///
    /// Each call creates a new dossier version and exactly one ledger record;
    /// earlier versions are left untouched.
    pub fn evaluate(
        &self,
        claim_id: &str,
        facts: &ClaimFacts,
        screening: Option<&ScreeningResult>,
        coverage: Option<&CoverageSummary>,
        processing: Option<&ProcessingSummary>,
        assumption_overrides: Option<&BTreeMap<String, Value>>,
    ) -> Result<Dossier, PipelineError> {
        let no_overrides = BTreeMap::new();
        let decision = self.decide(&DecisionInput {
            claim_id,
            facts,
            report: None,
            screening,
            coverage,
            processing,
            assumption_overrides: assumption_overrides.unwrap_or(&no_overrides),
        })?;
        let linked = self.persist(&decision)?;
        self.record(&decision, None, linked)?;
        Ok(decision.dossier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticWorkspace;
    use adjudica_domain::{
        CheckVerdict, ClaimVerdict, Clause, ClauseType, ClauseVerdict, ScreeningCheck,
    };
    use adjudica_ledger::LEDGER_FILE;

    fn clause_set() -> ClauseSet {
        ClauseSet {
            policy_id: "MW-1".to_string(),
            version: "2025".to_string(),
            clauses: vec![Clause {
                clause_id: "EXC-1".to_string(),
                clause_type: ClauseType::Exclusion,
                logic: json!({"==": [{"var": ["usage"]}, "racing"]}),
                description: "Racing use".to_string(),
                source_reference: "§7".to_string(),
            }],
        }
    }

    fn service(dir: &std::path::Path, artifacts: bool) -> (DecisionService, Arc<JsonlLedger>) {
        let ledger = Arc::new(JsonlLedger::open(dir.join(LEDGER_FILE)).unwrap());
        let service = DecisionService::new(
            Arc::new(AdjudicaConfig::default()),
            Arc::new(StaticWorkspace::new("motor", clause_set())),
            Arc::clone(&ledger),
            artifacts.then(|| ArtifactStore::new(dir)),
        );
        (service, ledger)
    }

    fn facts(usage: &str) -> ClaimFacts {
        let mut values = BTreeMap::new();
        values.insert("usage".to_string(), json!(usage));
        ClaimFacts::from_values("CLM-1", values)
    }

    #[test]
    fn test_evaluate_versions_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let (service, ledger) = service(dir.path(), true);

        let first = service
            .evaluate("CLM-1", &facts("private"), None, None, None, None)
            .unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.verdict, ClaimVerdict::Approve);
        assert!(first.confidence.is_some());

        let mut overrides = BTreeMap::new();
        overrides.insert("usage".to_string(), json!("racing"));
        let second = service
            .evaluate("CLM-1", &facts("private"), None, None, None, Some(&overrides))
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.verdict, ClaimVerdict::Reject);
        assert_eq!(second.clauses.exclusions[0].verdict, ClauseVerdict::Triggered);

        let records = ledger.records_for_claim("CLM-1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].decision_type, DecisionType::ClaimVerdict);
        assert_eq!(records[1].decision_type, DecisionType::Reevaluation);
        assert_eq!(records[1].outcome["dossier_version"], json!(2));
        assert_eq!(
            records[1].rationale.linked_call_ids,
            vec!["decision_dossier_v2.json", "confidence_summary_v2.json"]
        );
    }

    #[test]
    fn test_auto_reject_skips_rules() {
        let dir = tempfile::tempdir().unwrap();
        let (service, ledger) = service(dir.path(), false);
        let screening = ScreeningResult::new(
            "CLM-1",
            vec![ScreeningCheck::new("3", "mileage_compliance", CheckVerdict::Fail, "over limit")
                .hard_fail(true)],
        );

        let dossier = service
            .evaluate("CLM-1", &facts("racing"), Some(&screening), None, None, None)
            .unwrap();
        assert_eq!(dossier.verdict, ClaimVerdict::Reject);
        assert_eq!(dossier.decided_by, DecidedBy::Screening);
        assert_eq!(dossier.hard_fails, vec!["3"]);
        assert!(dossier.clauses.is_empty());

        let record = ledger.last_record().unwrap().unwrap();
        assert_eq!(record.outcome_decision(), Some("REJECT"));
        assert_eq!(record.outcome["decided_by"], json!("screening"));
    }

    #[test]
    fn test_version_from_ledger_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _ledger) = service(dir.path(), false);
        service.evaluate("CLM-1", &facts("private"), None, None, None, None).unwrap();
        assert_eq!(service.next_version("CLM-1").unwrap(), 2);
        assert_eq!(service.next_version("CLM-2").unwrap(), 1);
    }
}
