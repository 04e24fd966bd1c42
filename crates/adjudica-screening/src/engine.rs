//! Screening engine

use crate::checks::builtin_checks;
use crate::{compute_payout, Check, CheckContext, CheckOutcome, ScreeningConfig};
use adjudica_domain::{CheckVerdict, ScreeningCheck, ScreeningResult};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Runs an ordered list of checks and derives the screening result
pub struct ScreeningEngine {
    config: ScreeningConfig,
    checks: Vec<Box<dyn Check>>,
}

impl ScreeningEngine {
    /// Create an engine with the built-in checks
    pub fn new(config: ScreeningConfig) -> Self {
        let checks = builtin_checks(&config);
        Self { config, checks }
    }

    /// Create an engine with no checks; add them with [`ScreeningEngine::with_check`]
    pub fn empty(config: ScreeningConfig) -> Self {
        Self {
            config,
            checks: Vec::new(),
        }
    }

    /// Add a check, replacing any existing check with the same id in place
    pub fn with_check(mut self, check: Box<dyn Check>) -> Self {
        self.add_check(check);
        self
    }

    /// Add a check, replacing any existing check with the same id in place
    pub fn add_check(&mut self, check: Box<dyn Check>) {
        match self.checks.iter().position(|c| c.id() == check.id()) {
            Some(index) => self.checks[index] = check,
            None => self.checks.push(check),
        }
    }

    /// Ids of the configured checks, in execution order
    pub fn check_ids(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.id()).collect()
    }

    /// Access the configuration
    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Run every check and compute the payout estimate.
    ///
    /// Never fails: a check error becomes INCONCLUSIVE with the error in its
    /// evidence, and payout problems are reported in `payout_error`.
    pub fn screen(&self, ctx: &CheckContext<'_>) -> ScreeningResult {
        let checks: Vec<ScreeningCheck> = self.checks.iter().map(|c| self.run_check(c.as_ref(), ctx)).collect();

        let mut result = ScreeningResult::new(ctx.claim_id, checks);

        if result.auto_reject {
            result.payout_error = Some(format!(
                "Payout not computed: hard fail on checks {}",
                result.hard_fails.join(", ")
            ));
        } else {
            match ctx.coverage {
                None => result.payout_error = Some("No coverage summary available".to_string()),
                Some(coverage) => match compute_payout(coverage, ctx.facts, &self.config.payout) {
                    Ok(payout) => result.payout = Some(payout),
                    Err(e) => {
                        warn!(claim_id = ctx.claim_id, error = %e, "Payout calculation failed");
                        result.payout_error = Some(e.to_string());
                    }
                },
            }
        }

        info!(
            claim_id = ctx.claim_id,
            passed = result.counts.passed,
            failed = result.counts.failed,
            inconclusive = result.counts.inconclusive,
            skipped = result.counts.skipped,
            auto_reject = result.auto_reject,
            "Screening complete"
        );

        result
    }

    fn run_check(&self, check: &dyn Check, ctx: &CheckContext<'_>) -> ScreeningCheck {
        let outcome = if check.requires_llm() {
            CheckOutcome::skipped("Requires model review")
        } else {
            match check.run(ctx) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        claim_id = ctx.claim_id,
                        check_id = check.id(),
                        error = %e,
                        "Check could not be evaluated"
                    );
                    CheckOutcome::inconclusive(format!("Check could not be evaluated: {}", e))
                        .evidence("error", Value::String(e.to_string()))
                }
            }
        };

        debug!(
            claim_id = ctx.claim_id,
            check_id = check.id(),
            verdict = outcome.verdict.as_str(),
            "Check evaluated"
        );

        let mut result = ScreeningCheck::new(check.id(), check.name(), outcome.verdict, outcome.reason)
            .hard_fail(check.is_hard_fail());
        result.requires_llm = check.requires_llm();
        result.evidence = outcome.evidence;
        if result.verdict == CheckVerdict::Fail && result.is_hard_fail {
            info!(claim_id = ctx.claim_id, check_id = check.id(), "Hard fail");
        }
        result
    }
}
