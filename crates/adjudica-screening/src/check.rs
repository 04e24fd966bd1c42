//! The check abstraction

use crate::ScreeningError;
use adjudica_domain::{CheckVerdict, ClaimFacts, CoverageSummary, ReconciliationReport};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything a check may inspect
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// Claim identifier
    pub claim_id: &'a str,
    /// Reconciled facts
    pub facts: &'a ClaimFacts,
    /// Reconciliation report, when reconciliation ran in this process
    pub report: Option<&'a ReconciliationReport>,
    /// Coverage classification, when the provider produced one
    pub coverage: Option<&'a CoverageSummary>,
    /// Reference date for date checks when the claim carries no incident date
    pub as_of: NaiveDate,
}

impl<'a> CheckContext<'a> {
    /// Context with facts only
    pub fn new(claim_id: &'a str, facts: &'a ClaimFacts, as_of: NaiveDate) -> Self {
        Self {
            claim_id,
            facts,
            report: None,
            coverage: None,
            as_of,
        }
    }

    /// Attach a reconciliation report
    pub fn with_report(mut self, report: &'a ReconciliationReport) -> Self {
        self.report = Some(report);
        self
    }

    /// Attach a coverage summary
    pub fn with_coverage(mut self, coverage: &'a CoverageSummary) -> Self {
        self.coverage = Some(coverage);
        self
    }
}

/// What a check returns
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Verdict
    pub verdict: CheckVerdict,
    /// Explanation
    pub reason: String,
    /// Values the verdict is based on
    pub evidence: BTreeMap<String, Value>,
}

impl CheckOutcome {
    fn with_verdict(verdict: CheckVerdict, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            reason: reason.into(),
            evidence: BTreeMap::new(),
        }
    }

    /// Passing outcome
    pub fn pass(reason: impl Into<String>) -> Self {
        Self::with_verdict(CheckVerdict::Pass, reason)
    }

    /// Failing outcome
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::with_verdict(CheckVerdict::Fail, reason)
    }

    /// Outcome when the data does not allow a verdict
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Self::with_verdict(CheckVerdict::Inconclusive, reason)
    }

    /// Outcome when the check was not run
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::with_verdict(CheckVerdict::Skipped, reason)
    }

    /// Record a piece of evidence (builder style)
    pub fn evidence(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.evidence.insert(key.into(), value.into());
        self
    }
}

/// A single named screening check
///
/// Checks are independent: each sees the same context and returns exactly
/// one outcome. An `Err` is recorded as INCONCLUSIVE by the engine.
pub trait Check: Send + Sync {
    /// Stable check id (e.g. "3")
    fn id(&self) -> &str;

    /// Descriptive name (e.g. "mileage_compliance")
    fn name(&self) -> &str;

    /// Whether a FAIL verdict alone rejects the claim
    fn is_hard_fail(&self) -> bool {
        false
    }

    /// Whether the check needs a model; such checks are reported SKIPPED
    fn requires_llm(&self) -> bool {
        false
    }

    /// Run the check
    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError>;
}
