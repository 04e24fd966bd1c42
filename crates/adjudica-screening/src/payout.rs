//! Payout estimate

use crate::facts::{as_bool, optional_number};
use crate::{PayoutConfig, ScreeningError};
use adjudica_domain::{ClaimFacts, CoverageSummary, PayoutCalculation};

/// Compute the payout estimate for a claim
///
/// ```text
/// capped_amount    = min(covered_total, coverage_cap)
/// deductible       = max(capped_amount * deductible_percent, deductible_minimum)
/// after_deductible = capped_amount - deductible
/// vat_amount       = after_deductible * rate / (1 + rate)   (VAT-registered claimants only)
/// final_payout     = max(after_deductible - vat_amount, 0)
/// ```
///
/// A `coverage_cap` fact overrides the configured cap, and the
/// `vat_registered` fact decides whether VAT is removed.
pub fn compute_payout(
    coverage: &CoverageSummary,
    facts: &ClaimFacts,
    config: &PayoutConfig,
) -> Result<PayoutCalculation, ScreeningError> {
    let covered_total = coverage.covered_total();
    if !covered_total.is_finite() || covered_total < 0.0 {
        return Err(ScreeningError::Payout(format!(
            "covered total {} is not a valid amount",
            covered_total
        )));
    }

    let coverage_cap = optional_number(facts, "coverage_cap").or(config.coverage_cap);
    if let Some(cap) = coverage_cap {
        if cap < 0.0 {
            return Err(ScreeningError::Payout(format!("negative coverage cap {}", cap)));
        }
    }
    let capped_amount = coverage_cap.map_or(covered_total, |cap| covered_total.min(cap));

    let deductible_amount =
        (capped_amount * config.deductible_percent).max(config.deductible_minimum);
    let after_deductible = capped_amount - deductible_amount;

    let vat_registered = facts
        .value("vat_registered")
        .and_then(as_bool)
        .unwrap_or(false);
    let vat_rate = config.vat_rate.filter(|_| vat_registered);
    let vat_amount = match vat_rate {
        Some(rate) if after_deductible > 0.0 => after_deductible * rate / (1.0 + rate),
        _ => 0.0,
    };

    let currency = if coverage.currency.is_empty() {
        config.currency.clone()
    } else {
        coverage.currency.clone()
    };

    Ok(PayoutCalculation {
        covered_total,
        coverage_cap,
        capped_amount,
        deductible_percent: config.deductible_percent,
        deductible_minimum: config.deductible_minimum,
        deductible_amount,
        after_deductible,
        vat_rate,
        vat_amount,
        final_payout: (after_deductible - vat_amount).max(0.0),
        currency,
    })
}
