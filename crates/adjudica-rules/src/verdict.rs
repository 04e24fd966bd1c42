//! Claim verdict from clause buckets

use adjudica_domain::{ClauseBuckets, ClauseVerdict, ClaimVerdict};

/// Derive the claim verdict and a one-line summary.
///
/// A triggered exclusion or a failed condition rejects the claim. Otherwise
/// any ERROR or INDETERMINATE clause refers it to a reviewer. A claim with
/// neither is approved.
pub fn claim_verdict(buckets: &ClauseBuckets) -> (ClaimVerdict, String) {
    let triggered: Vec<&str> = buckets
        .exclusions
        .iter()
        .filter(|c| c.verdict == ClauseVerdict::Triggered)
        .map(|c| c.clause_id.as_str())
        .collect();
    let failed: Vec<&str> = buckets
        .conditions
        .iter()
        .filter(|c| c.verdict == ClauseVerdict::Fail)
        .map(|c| c.clause_id.as_str())
        .collect();

    if !triggered.is_empty() || !failed.is_empty() {
        let mut parts = Vec::new();
        if !triggered.is_empty() {
            parts.push(format!("exclusion(s) triggered: {}", triggered.join(", ")));
        }
        if !failed.is_empty() {
            parts.push(format!("condition(s) failed: {}", failed.join(", ")));
        }
        return (ClaimVerdict::Reject, format!("Rejected; {}", parts.join("; ")));
    }

    let unresolved: Vec<&str> = buckets
        .iter()
        .filter(|c| c.verdict.is_unresolved())
        .map(|c| c.clause_id.as_str())
        .collect();
    if !unresolved.is_empty() {
        return (
            ClaimVerdict::Refer,
            format!("Referred for review; unresolved clause(s): {}", unresolved.join(", ")),
        );
    }

    (
        ClaimVerdict::Approve,
        format!("Approved; {} clause(s) evaluated without objection", buckets.len()),
    )
}
