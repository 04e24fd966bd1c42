//! Screening results: deterministic check verdicts and the payout estimate

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Verdict of a single screening check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckVerdict {
    /// The check passed
    Pass,
    /// The check failed
    Fail,
    /// The check ran but could not reach a verdict
    Inconclusive,
    /// The check did not run (missing inputs or deferred)
    Skipped,
}

impl CheckVerdict {
    /// Get the verdict name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckVerdict::Pass => "PASS",
            CheckVerdict::Fail => "FAIL",
            CheckVerdict::Inconclusive => "INCONCLUSIVE",
            CheckVerdict::Skipped => "SKIPPED",
        }
    }
}

/// Outcome of one screening check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCheck {
    /// Workspace-defined check id (e.g., "3")
    pub check_id: String,
    /// Human-readable check name (e.g., "mileage_compliance")
    pub check_name: String,
    /// Verdict
    pub verdict: CheckVerdict,
    /// Explanation of the verdict
    pub reason: String,
    /// Values the check looked at
    #[serde(default)]
    pub evidence: BTreeMap<String, Value>,
    /// Whether a FAIL alone forces rejection
    pub is_hard_fail: bool,
    /// Whether a full evaluation would need a model opinion
    #[serde(default)]
    pub requires_llm: bool,
}

impl ScreeningCheck {
    /// Create a check outcome
    pub fn new(
        check_id: impl Into<String>,
        check_name: impl Into<String>,
        verdict: CheckVerdict,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            check_name: check_name.into(),
            verdict,
            reason: reason.into(),
            evidence: BTreeMap::new(),
            is_hard_fail: false,
            requires_llm: false,
        }
    }

    /// Add one evidence entry
    pub fn with_evidence(mut self, key: impl Into<String>, value: Value) -> Self {
        self.evidence.insert(key.into(), value);
        self
    }

    /// Mark as hard fail
    pub fn hard_fail(mut self, is_hard_fail: bool) -> Self {
        self.is_hard_fail = is_hard_fail;
        self
    }

    /// Whether this check forces rejection
    pub fn is_blocking(&self) -> bool {
        self.verdict == CheckVerdict::Fail && self.is_hard_fail
    }
}

/// Aggregate verdict counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningCounts {
    /// Checks run
    pub total: usize,
    /// PASS verdicts
    pub passed: usize,
    /// FAIL verdicts
    pub failed: usize,
    /// INCONCLUSIVE verdicts
    pub inconclusive: usize,
    /// SKIPPED verdicts
    pub skipped: usize,
}

/// Payout estimate derived from covered amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutCalculation {
    /// Sum of covered line items
    pub covered_total: f64,
    /// Maximum payable, if the policy has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_cap: Option<f64>,
    /// `min(covered_total, coverage_cap)`
    pub capped_amount: f64,
    /// Deductible share of the capped amount
    pub deductible_percent: f64,
    /// Deductible floor
    pub deductible_minimum: f64,
    /// `max(capped_amount * deductible_percent, deductible_minimum)`
    pub deductible_amount: f64,
    /// `capped_amount - deductible_amount`
    pub after_deductible: f64,
    /// VAT rate deducted for VAT-registered claimants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    /// VAT removed from the payout
    pub vat_amount: f64,
    /// Amount to pay, never negative
    pub final_payout: f64,
    /// ISO currency code
    pub currency: String,
}

/// Result of running all screening checks for a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Claim identifier
    pub claim_id: String,
    /// Check outcomes in execution order
    pub checks: Vec<ScreeningCheck>,
    /// Verdict counts
    pub counts: ScreeningCounts,
    /// Ids of checks with verdict FAIL and `is_hard_fail`
    pub hard_fails: Vec<String>,
    /// True iff `hard_fails` is non-empty
    pub auto_reject: bool,
    /// Payout estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout: Option<PayoutCalculation>,
    /// Why no payout was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_error: Option<String>,
}

impl ScreeningResult {
    /// Build a result from check outcomes, deriving counts and hard fails
    pub fn new(claim_id: impl Into<String>, checks: Vec<ScreeningCheck>) -> Self {
        let mut result = Self {
            claim_id: claim_id.into(),
            checks,
            counts: ScreeningCounts::default(),
            hard_fails: Vec::new(),
            auto_reject: false,
            payout: None,
            payout_error: None,
        };
        result.recompute();
        result
    }

    /// Recompute counts, `hard_fails` and `auto_reject` from the checks.
    ///
    /// Stored aggregates are never trusted; call this after any edit to
    /// `checks`.
    pub fn recompute(&mut self) {
        let mut counts = ScreeningCounts {
            total: self.checks.len(),
            ..Default::default()
        };
        for check in &self.checks {
            match check.verdict {
                CheckVerdict::Pass => counts.passed += 1,
                CheckVerdict::Fail => counts.failed += 1,
                CheckVerdict::Inconclusive => counts.inconclusive += 1,
                CheckVerdict::Skipped => counts.skipped += 1,
            }
        }
        self.counts = counts;
        self.hard_fails = self
            .checks
            .iter()
            .filter(|c| c.is_blocking())
            .map(|c| c.check_id.clone())
            .collect();
        self.auto_reject = !self.hard_fails.is_empty();
    }

    /// Look up a check outcome by id
    pub fn check(&self, check_id: &str) -> Option<&ScreeningCheck> {
        self.checks.iter().find(|c| c.check_id == check_id)
    }

    /// Fraction of evaluated checks (PASS or FAIL) that passed
    pub fn pass_rate(&self) -> Option<f64> {
        let evaluated = self.counts.passed + self.counts.failed;
        if evaluated == 0 {
            return None;
        }
        Some(self.counts.passed as f64 / evaluated as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: &str, verdict: CheckVerdict, hard: bool) -> ScreeningCheck {
        ScreeningCheck::new(id, format!("check_{}", id), verdict, "test").hard_fail(hard)
    }

    #[test]
    fn test_recompute_counts_and_hard_fails() {
        let result = ScreeningResult::new(
            "CLM-1",
            vec![
                check("1", CheckVerdict::Pass, true),
                check("2", CheckVerdict::Fail, false),
                check("3", CheckVerdict::Fail, true),
                check("4", CheckVerdict::Inconclusive, true),
                check("5", CheckVerdict::Skipped, false),
            ],
        );

        assert_eq!(result.counts.total, 5);
        assert_eq!(result.counts.passed, 1);
        assert_eq!(result.counts.failed, 2);
        assert_eq!(result.counts.inconclusive, 1);
        assert_eq!(result.counts.skipped, 1);
        assert_eq!(result.hard_fails, vec!["3".to_string()]);
        assert!(result.auto_reject);
    }

    #[test]
    fn test_soft_fail_does_not_reject() {
        let result = ScreeningResult::new("CLM-1", vec![check("2", CheckVerdict::Fail, false)]);
        assert!(result.hard_fails.is_empty());
        assert!(!result.auto_reject);
        assert_eq!(result.pass_rate(), Some(0.0));
    }

    #[test]
    fn test_recompute_after_edit() {
        let mut result = ScreeningResult::new("CLM-1", vec![check("3", CheckVerdict::Fail, true)]);
        assert!(result.auto_reject);

        result.checks[0].verdict = CheckVerdict::Pass;
        result.recompute();
        assert!(!result.auto_reject);
        assert_eq!(result.pass_rate(), Some(1.0));
    }

    #[test]
    fn test_verdict_wire_format() {
        let json = serde_json::to_string(&CheckVerdict::Inconclusive).unwrap();
        assert_eq!(json, "\"INCONCLUSIVE\"");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn verdict_strategy() -> impl Strategy<Value = CheckVerdict> {
        prop_oneof![
            Just(CheckVerdict::Pass),
            Just(CheckVerdict::Fail),
            Just(CheckVerdict::Inconclusive),
            Just(CheckVerdict::Skipped),
        ]
    }

    proptest! {
        /// Property: auto_reject == (hard_fails non-empty), and hard_fails is
        /// exactly the FAIL ∧ is_hard_fail set
        #[test]
        fn test_hard_fail_set_property(specs in proptest::collection::vec((verdict_strategy(), any::<bool>()), 0..12)) {
            let checks: Vec<ScreeningCheck> = specs
                .iter()
                .enumerate()
                .map(|(i, (v, hard))| ScreeningCheck::new(i.to_string(), "c", *v, "").hard_fail(*hard))
                .collect();
            let expected: Vec<String> = specs
                .iter()
                .enumerate()
                .filter(|(_, (v, hard))| *v == CheckVerdict::Fail && *hard)
                .map(|(i, _)| i.to_string())
                .collect();

            let result = ScreeningResult::new("CLM", checks);
            prop_assert_eq!(&result.hard_fails, &expected);
            prop_assert_eq!(result.auto_reject, !expected.is_empty());
            prop_assert_eq!(
                result.counts.passed + result.counts.failed + result.counts.inconclusive + result.counts.skipped,
                result.counts.total
            );
        }
    }
}
