//! Built-in motor claim checks

use crate::facts::{as_bool, optional_date, optional_number, require_date, require_number, require_str};
use crate::{Check, CheckContext, CheckOutcome, ScreeningConfig, ScreeningError};
use chrono::{Datelike, NaiveDate};
use serde_json::json;

/// Incident date, falling back to the context's reference date
fn incident_date(ctx: &CheckContext<'_>) -> Result<NaiveDate, ScreeningError> {
    Ok(optional_date(ctx.facts, "incident_date")?.unwrap_or(ctx.as_of))
}

/// Whole years between two dates
fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// 1: the incident falls within the policy period
pub struct PolicyValidity;

impl Check for PolicyValidity {
    fn id(&self) -> &str {
        "1"
    }

    fn name(&self) -> &str {
        "policy_validity"
    }

    fn is_hard_fail(&self) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let start = require_date(ctx.facts, "policy_start_date")?;
        let end = optional_date(ctx.facts, "policy_end_date")?;
        let incident = incident_date(ctx)?;

        let outcome = if incident < start {
            CheckOutcome::fail(format!("Incident {} precedes policy start {}", incident, start))
        } else if let Some(end) = end.filter(|end| incident > *end) {
            CheckOutcome::fail(format!("Incident {} after policy end {}", incident, end))
        } else {
            CheckOutcome::pass("Incident within policy period")
        };

        Ok(outcome
            .evidence("policy_start_date", start.to_string())
            .evidence("policy_end_date", end.map(|d| d.to_string()))
            .evidence("incident_date", incident.to_string()))
    }
}

/// 2: the VIN is well-formed and documents agree on it
pub struct VinConsistency;

impl VinConsistency {
    fn is_well_formed(vin: &str) -> bool {
        vin.len() == 17
            && vin
                .chars()
                .all(|c| c.is_ascii_alphanumeric() && !matches!(c.to_ascii_uppercase(), 'I' | 'O' | 'Q'))
    }
}

impl Check for VinConsistency {
    fn id(&self) -> &str {
        "2"
    }

    fn name(&self) -> &str {
        "vin_consistency"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let vin: String = require_str(ctx.facts, "vin")?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if let Some(conflict) = ctx
            .report
            .and_then(|r| r.conflicts.iter().find(|c| c.fact_name == "vin"))
        {
            return Ok(CheckOutcome::fail("Documents disagree on the VIN")
                .evidence("vin", vin)
                .evidence("documents", conflict.doc_ids()));
        }

        if !Self::is_well_formed(&vin) {
            return Ok(CheckOutcome::fail(format!("VIN '{}' is not a valid 17-character VIN", vin))
                .evidence("vin", vin));
        }

        Ok(CheckOutcome::pass("VIN well-formed and consistent").evidence("vin", vin))
    }
}

/// 3: odometer reading within the policy's mileage limit
pub struct MileageCompliance {
    max_mileage_km: u64,
}

impl Check for MileageCompliance {
    fn id(&self) -> &str {
        "3"
    }

    fn name(&self) -> &str {
        "mileage_compliance"
    }

    fn is_hard_fail(&self) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let odometer = require_number(ctx.facts, "odometer_km")?;
        let limit = optional_number(ctx.facts, "mileage_limit_km").unwrap_or(self.max_mileage_km as f64);

        let outcome = if odometer < 0.0 {
            CheckOutcome::inconclusive("Negative odometer reading")
        } else if odometer > limit {
            CheckOutcome::fail(format!("Odometer {} km exceeds limit of {} km", odometer, limit))
        } else {
            CheckOutcome::pass(format!("Odometer {} km within limit", odometer))
        };

        Ok(outcome
            .evidence("odometer_km", odometer)
            .evidence("mileage_limit_km", limit))
    }
}

/// 4: vehicle age at the incident date within the limit
pub struct VehicleAge {
    max_vehicle_age_years: u32,
}

impl Check for VehicleAge {
    fn id(&self) -> &str {
        "4"
    }

    fn name(&self) -> &str {
        "vehicle_age"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let registered = require_date(ctx.facts, "first_registration_date")?;
        let incident = incident_date(ctx)?;
        let age = years_between(registered, incident);

        let outcome = if age < 0 {
            CheckOutcome::inconclusive("First registration after incident date")
        } else if age as u32 > self.max_vehicle_age_years {
            CheckOutcome::fail(format!(
                "Vehicle is {} years old, limit is {}",
                age, self.max_vehicle_age_years
            ))
        } else {
            CheckOutcome::pass(format!("Vehicle is {} years old", age))
        };

        Ok(outcome
            .evidence("first_registration_date", registered.to_string())
            .evidence("vehicle_age_years", age)
            .evidence("max_vehicle_age_years", self.max_vehicle_age_years))
    }
}

/// 5: at least one line item is covered by the policy
pub struct CoveragePresent;

impl Check for CoveragePresent {
    fn id(&self) -> &str {
        "5"
    }

    fn name(&self) -> &str {
        "coverage_present"
    }

    fn is_hard_fail(&self) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let Some(coverage) = ctx.coverage else {
            return Ok(CheckOutcome::inconclusive("No coverage summary available"));
        };
        if coverage.line_items.is_empty() {
            return Ok(CheckOutcome::inconclusive("Coverage summary has no line items"));
        }

        let covered = coverage.covered_total();
        let outcome = if covered > 0.0 {
            CheckOutcome::pass(format!("{:.2} {} covered", covered, coverage.currency))
        } else {
            CheckOutcome::fail("No line item is covered by the policy")
        };

        Ok(outcome
            .evidence("covered_total", covered)
            .evidence("claimed_total", coverage.claimed_total())
            .evidence("line_items", coverage.line_items.len()))
    }
}

/// 6: claimed amount is positive and below the plausibility threshold
pub struct ClaimAmountPlausibility {
    amount_threshold: f64,
}

impl Check for ClaimAmountPlausibility {
    fn id(&self) -> &str {
        "6"
    }

    fn name(&self) -> &str {
        "claim_amount_plausibility"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let (amount, basis) = match ctx.coverage.filter(|c| !c.line_items.is_empty()) {
            Some(coverage) => (coverage.claimed_total(), "coverage_summary"),
            None => (require_number(ctx.facts, "claim_amount")?, "claim_amount"),
        };

        let outcome = if amount <= 0.0 {
            CheckOutcome::fail(format!("Claimed amount {:.2} is not positive", amount))
        } else if amount > self.amount_threshold {
            CheckOutcome::fail(format!(
                "Claimed amount {:.2} exceeds plausibility threshold {:.2}",
                amount, self.amount_threshold
            ))
        } else {
            CheckOutcome::pass(format!("Claimed amount {:.2} plausible", amount))
        };

        Ok(outcome
            .evidence("claimed_amount", amount)
            .evidence("basis", basis)
            .evidence("threshold", self.amount_threshold))
    }
}

/// 7: maintenance history supports the claim; judged by a reviewer model
pub struct ServiceHistory;

impl Check for ServiceHistory {
    fn id(&self) -> &str {
        "7"
    }

    fn name(&self) -> &str {
        "service_history"
    }

    fn requires_llm(&self) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
        let recorded = ctx.facts.value("service_history_complete").and_then(as_bool);
        Ok(CheckOutcome::skipped("Service history review requires a model").evidence(
            "service_history_complete",
            json!(recorded),
        ))
    }
}

/// The built-in checks in execution order, minus any disabled ids
pub fn builtin_checks(config: &ScreeningConfig) -> Vec<Box<dyn Check>> {
    let all: Vec<Box<dyn Check>> = vec![
        Box::new(PolicyValidity),
        Box::new(VinConsistency),
        Box::new(MileageCompliance {
            max_mileage_km: config.max_mileage_km,
        }),
        Box::new(VehicleAge {
            max_vehicle_age_years: config.max_vehicle_age_years,
        }),
        Box::new(CoveragePresent),
        Box::new(ClaimAmountPlausibility {
            amount_threshold: config.amount_threshold,
        }),
        Box::new(ServiceHistory),
    ];
    all.into_iter()
        .filter(|c| !config.disabled_checks.iter().any(|id| id == c.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjudica_domain::{
        CheckVerdict, ClaimFacts, CoverageStatus, CoverageSummary, ItemCategory, LineItem,
    };
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn facts(pairs: &[(&str, Value)]) -> ClaimFacts {
        let values: BTreeMap<String, Value> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        ClaimFacts::from_values("CLM-1", values)
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn item(amount: f64, status: CoverageStatus) -> LineItem {
        LineItem {
            item_id: "i".to_string(),
            description: "part".to_string(),
            category: ItemCategory::Parts,
            amount,
            status,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_policy_validity() {
        let f = facts(&[("policy_start_date", json!("2025-01-01"))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(PolicyValidity.run(&ctx).unwrap().verdict, CheckVerdict::Pass);

        let f = facts(&[
            ("policy_start_date", json!("2025-01-01")),
            ("incident_date", json!("31.12.2024")),
        ]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(PolicyValidity.run(&ctx).unwrap().verdict, CheckVerdict::Fail);

        let f = facts(&[
            ("policy_start_date", json!("2024-01-01")),
            ("policy_end_date", json!("2024-12-31")),
        ]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(PolicyValidity.run(&ctx).unwrap().verdict, CheckVerdict::Fail);
    }

    #[test]
    fn test_policy_validity_missing_start_is_error() {
        let f = facts(&[]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert!(matches!(PolicyValidity.run(&ctx), Err(ScreeningError::MissingFact(_))));
    }

    #[test]
    fn test_vin_format() {
        let f = facts(&[("vin", json!("WVWZZZ1KZAW000001"))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(VinConsistency.run(&ctx).unwrap().verdict, CheckVerdict::Pass);

        let f = facts(&[("vin", json!("WVWZZZ1KZAW00000O"))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(VinConsistency.run(&ctx).unwrap().verdict, CheckVerdict::Fail);
    }

    #[test]
    fn test_mileage_limit_and_fact_override() {
        let check = MileageCompliance { max_mileage_km: 150_000 };

        let f = facts(&[("odometer_km", json!("162,400"))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        let outcome = check.run(&ctx).unwrap();
        assert_eq!(outcome.verdict, CheckVerdict::Fail);
        assert_eq!(outcome.evidence["odometer_km"], json!(162400.0));

        let f = facts(&[("odometer_km", json!(162400)), ("mileage_limit_km", json!(200000))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(check.run(&ctx).unwrap().verdict, CheckVerdict::Pass);
    }

    #[test]
    fn test_vehicle_age_boundary() {
        let check = VehicleAge { max_vehicle_age_years: 10 };

        // 10 years and 364 days
        let f = facts(&[("first_registration_date", json!("2014-06-02"))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(check.run(&ctx).unwrap().verdict, CheckVerdict::Pass);

        let f = facts(&[("first_registration_date", json!("2014-06-01"))]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(check.run(&ctx).unwrap().verdict, CheckVerdict::Fail);
    }

    #[test]
    fn test_coverage_present() {
        let f = facts(&[]);
        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(CoveragePresent.run(&ctx).unwrap().verdict, CheckVerdict::Inconclusive);

        let coverage = CoverageSummary {
            line_items: vec![item(400.0, CoverageStatus::NotCovered)],
            currency: "EUR".to_string(),
        };
        let ctx = CheckContext::new("CLM-1", &f, as_of()).with_coverage(&coverage);
        assert_eq!(CoveragePresent.run(&ctx).unwrap().verdict, CheckVerdict::Fail);
    }

    #[test]
    fn test_amount_plausibility_prefers_coverage() {
        let check = ClaimAmountPlausibility { amount_threshold: 1000.0 };
        let f = facts(&[("claim_amount", json!(50.0))]);
        let coverage = CoverageSummary {
            line_items: vec![item(800.0, CoverageStatus::Covered), item(400.0, CoverageStatus::Review)],
            currency: "EUR".to_string(),
        };
        let ctx = CheckContext::new("CLM-1", &f, as_of()).with_coverage(&coverage);
        let outcome = check.run(&ctx).unwrap();
        assert_eq!(outcome.verdict, CheckVerdict::Fail);
        assert_eq!(outcome.evidence["basis"], json!("coverage_summary"));

        let ctx = CheckContext::new("CLM-1", &f, as_of());
        assert_eq!(check.run(&ctx).unwrap().verdict, CheckVerdict::Pass);
    }

    #[test]
    fn test_builtin_order_and_disable() {
        let ids: Vec<String> = builtin_checks(&ScreeningConfig::default())
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7"]);

        let config = ScreeningConfig {
            disabled_checks: vec!["4".to_string(), "7".to_string()],
            ..Default::default()
        };
        assert_eq!(builtin_checks(&config).len(), 5);
    }
}
