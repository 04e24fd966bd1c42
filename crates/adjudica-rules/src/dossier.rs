//! Dossier assembly
//!
//! Turns a clause batch (or a screening auto-reject) into the versioned
//! [`Dossier`] for a claim, including per line item decisions and the money
//! view of the verdict.

use crate::claim_verdict;
use crate::ClauseBatch;
use adjudica_domain::{
    ClaimVerdict, ClauseBuckets, ClauseVerdict, CoverageStatus, CoverageSummary, DecidedBy,
    Dossier, ExecutionMetadata, FinancialSummary, LineItemDecision, ScreeningResult,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Inputs shared by both assembly paths
#[derive(Debug, Clone, Copy)]
pub struct DossierContext<'a> {
    /// Claim identifier
    pub claim_id: &'a str,
    /// Version to assign
    pub version: u32,
    /// Screening result, if screening ran
    pub screening: Option<&'a ScreeningResult>,
    /// Coverage summary, if one was supplied
    pub coverage: Option<&'a CoverageSummary>,
    /// Fact overrides applied to this evaluation
    pub assumption_overrides: &'a BTreeMap<String, Value>,
    /// RFC 3339 creation time
    pub created_at: &'a str,
}

/// Dossier for a claim decided by clause evaluation
pub fn assemble_rules_dossier(ctx: DossierContext<'_>, batch: ClauseBatch) -> Dossier {
    let (verdict, summary) = claim_verdict(&batch.clauses);
    let line_items = ctx
        .coverage
        .map(|c| line_item_decisions(c, verdict))
        .unwrap_or_default();
    let financial = ctx
        .coverage
        .map(|c| financial_summary(c, &batch.clauses, ctx.screening, verdict));

    Dossier {
        claim_id: ctx.claim_id.to_string(),
        version: ctx.version,
        verdict,
        decided_by: DecidedBy::Rules,
        summary,
        hard_fails: Vec::new(),
        clauses: batch.clauses,
        metadata: batch.metadata,
        line_item_decisions: line_items,
        financial_summary: financial,
        assumption_overrides: ctx.assumption_overrides.clone(),
        confidence: None,
        created_at: ctx.created_at.to_string(),
    }
}

/// Dossier for a claim auto-rejected by screening; no clause is evaluated
pub fn assemble_screening_dossier(ctx: DossierContext<'_>) -> Dossier {
    let hard_fails = ctx
        .screening
        .map(|s| s.hard_fails.clone())
        .unwrap_or_default();
    let summary = format!(
        "Auto-rejected by screening; hard fail on check(s): {}",
        hard_fails.join(", ")
    );
    let verdict = ClaimVerdict::Reject;
    let empty = ClauseBuckets::default();

    Dossier {
        claim_id: ctx.claim_id.to_string(),
        version: ctx.version,
        verdict,
        decided_by: DecidedBy::Screening,
        summary,
        hard_fails,
        clauses: empty.clone(),
        metadata: ExecutionMetadata::default(),
        line_item_decisions: ctx
            .coverage
            .map(|c| line_item_decisions(c, verdict))
            .unwrap_or_default(),
        financial_summary: ctx
            .coverage
            .map(|c| financial_summary(c, &empty, ctx.screening, verdict)),
        assumption_overrides: ctx.assumption_overrides.clone(),
        confidence: None,
        created_at: ctx.created_at.to_string(),
    }
}

/// Per line item decisions for a verdict
///
/// Only covered items of an approved claim carry an approved amount.
pub fn line_item_decisions(coverage: &CoverageSummary, verdict: ClaimVerdict) -> Vec<LineItemDecision> {
    coverage
        .line_items
        .iter()
        .map(|item| {
            let (approved_amount, reason) = match (item.status, verdict) {
                (CoverageStatus::Covered, ClaimVerdict::Approve) => {
                    (item.amount, "Covered by policy".to_string())
                }
                (CoverageStatus::Covered, ClaimVerdict::Reject) => {
                    (0.0, "Covered item; claim rejected".to_string())
                }
                (CoverageStatus::Covered, ClaimVerdict::Refer) => {
                    (0.0, "Covered item; claim referred for review".to_string())
                }
                (CoverageStatus::NotCovered, _) => (0.0, "Not covered by policy".to_string()),
                (CoverageStatus::Review, _) => (0.0, "Coverage needs manual review".to_string()),
            };
            LineItemDecision {
                item_id: item.item_id.clone(),
                description: item.description.clone(),
                category: item.category,
                status: item.status,
                claimed_amount: item.amount,
                approved_amount,
                reason,
            }
        })
        .collect()
}

/// Money view of a verdict
///
/// `applied_limit` is the smallest APPLIED limit and `applied_deductible`
/// the sum of APPLIED deductibles. The net payable is zero unless the claim
/// is approved; otherwise it is the screening payout when one exists, else
/// the covered total less deductibles, capped by the limit.
pub fn financial_summary(
    coverage: &CoverageSummary,
    clauses: &ClauseBuckets,
    screening: Option<&ScreeningResult>,
    verdict: ClaimVerdict,
) -> FinancialSummary {
    let applied_limit = clauses
        .limits
        .iter()
        .filter(|c| c.verdict == ClauseVerdict::Applied)
        .filter_map(|c| c.result_value.as_f64())
        .reduce(f64::min);
    let applied_deductible: f64 = clauses
        .deductibles
        .iter()
        .filter(|c| c.verdict == ClauseVerdict::Applied)
        .filter_map(|c| c.result_value.as_f64())
        .sum();

    let covered_total = coverage.covered_total();
    let screening_payout = screening.and_then(|s| s.payout.clone());

    let net_payable = if verdict == ClaimVerdict::Approve {
        let base = match &screening_payout {
            Some(payout) => payout.final_payout,
            None => covered_total - applied_deductible,
        };
        let capped = applied_limit.map_or(base, |limit| base.min(limit));
        capped.max(0.0)
    } else {
        0.0
    };

    FinancialSummary {
        currency: coverage.currency.clone(),
        claimed_total: coverage.claimed_total(),
        covered_total,
        not_covered_total: coverage.total_with_status(CoverageStatus::NotCovered),
        review_total: coverage.total_with_status(CoverageStatus::Review),
        applied_limit,
        applied_deductible,
        screening_payout,
        net_payable,
    }
}
