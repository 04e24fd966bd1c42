//! Per-claim state threaded through the stages

use adjudica_domain::{
    ClaimFacts, ConfidenceSummary, CoverageSummary, DecisionId, DecisionRecord, Dossier,
    ProcessingSummary, ReconciliationReport, ScreeningResult,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Status of a stage, and of the claim as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not started
    Pending,
    /// In progress
    Running,
    /// Finished
    Success,
    /// Nothing to do
    Skipped,
    /// Failed; the run stops here
    Error,
}

impl StageStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Success => "success",
            StageStatus::Skipped => "skipped",
            StageStatus::Error => "error",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage name
    pub stage: String,
    /// Final status
    pub status: StageStatus,
    /// Wall-clock time
    pub elapsed: Duration,
}

/// Everything known about a claim during one pipeline run.
///
/// Each stage fills in its own fields; downstream stages read them and
/// fail the claim when a required input is absent.
#[derive(Debug, Clone)]
pub struct ClaimContext {
    /// Claim identifier
    pub claim_id: String,
    /// Identifier of this run
    pub run_id: String,
    /// Reference date for date-based checks when the claim has no incident date
    pub as_of: NaiveDate,

    /// Reconciled facts (set by reconcile, or supplied up front)
    pub facts: Option<ClaimFacts>,
    /// Reconciliation report (set by reconcile)
    pub report: Option<ReconciliationReport>,
    /// Coverage summary (supplied, or loaded by reconcile)
    pub coverage: Option<CoverageSummary>,
    /// Processing summary (supplied, or loaded by reconcile)
    pub processing: Option<ProcessingSummary>,
    /// Fact overrides for re-evaluation
    pub assumption_overrides: BTreeMap<String, Value>,

    /// Screening result (set by screen)
    pub screening: Option<ScreeningResult>,
    /// Versioned decision (set by decide)
    pub dossier: Option<Dossier>,
    /// Confidence breakdown (set by decide)
    pub confidence: Option<ConfidenceSummary>,
    /// Artifact files written (set by persist)
    pub artifacts: Vec<String>,
    /// Ledger record (set by record)
    pub decision: Option<DecisionRecord>,

    /// Overall status
    pub status: StageStatus,
    /// Why the claim failed, when it did
    pub error: Option<String>,
    /// Per stage outcomes, in execution order
    pub stages: Vec<StageRecord>,
}

impl ClaimContext {
    /// Create an empty context dated today
    pub fn new(claim_id: impl Into<String>) -> Self {
        Self {
            claim_id: claim_id.into(),
            run_id: DecisionId::new().to_string(),
            as_of: Utc::now().date_naive(),
            facts: None,
            report: None,
            coverage: None,
            processing: None,
            assumption_overrides: BTreeMap::new(),
            screening: None,
            dossier: None,
            confidence: None,
            artifacts: Vec::new(),
            decision: None,
            status: StageStatus::Pending,
            error: None,
            stages: Vec::new(),
        }
    }

    /// Supply already-reconciled facts; the reconcile stage will not reload them
    pub fn with_facts(mut self, facts: ClaimFacts) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Supply a coverage summary
    pub fn with_coverage(mut self, coverage: CoverageSummary) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Supply a processing summary
    pub fn with_processing(mut self, processing: ProcessingSummary) -> Self {
        self.processing = Some(processing);
        self
    }

    /// Override fact values for this run
    pub fn with_overrides(mut self, overrides: BTreeMap<String, Value>) -> Self {
        self.assumption_overrides = overrides;
        self
    }

    /// Pin the reference date
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    /// Mark the claim as failed
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = StageStatus::Error;
        self.error = Some(reason.into());
    }

    /// Whether the claim has failed
    pub fn is_failed(&self) -> bool {
        self.status == StageStatus::Error
    }

    /// Status recorded for a stage, if it ran
    pub fn stage_status(&self, stage: &str) -> Option<StageStatus> {
        self.stages
            .iter()
            .rev()
            .find(|r| r.stage == stage)
            .map(|r| r.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context() {
        let ctx = ClaimContext::new("CLM-1");
        assert_eq!(ctx.status, StageStatus::Pending);
        assert!(ctx.facts.is_none());
        assert!(!ctx.run_id.is_empty());
        assert_ne!(ClaimContext::new("CLM-1").run_id, ctx.run_id);
    }

    #[test]
    fn test_fail() {
        let mut ctx = ClaimContext::new("CLM-1");
        ctx.fail("no facts");
        assert!(ctx.is_failed());
        assert_eq!(ctx.error.as_deref(), Some("no facts"));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&StageStatus::Success).unwrap(), "\"success\"");
        assert_eq!(StageStatus::Error.to_string(), "error");
    }
}
