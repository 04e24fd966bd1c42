//! Screening configuration

use crate::ScreeningError;
use serde::{Deserialize, Serialize};

/// Payout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    /// Maximum payable amount; a `coverage_cap` fact takes precedence
    pub coverage_cap: Option<f64>,

    /// Deductible share of the capped amount (0.0-1.0)
    pub deductible_percent: f64,

    /// Deductible floor
    pub deductible_minimum: f64,

    /// VAT rate deducted when the claimant is VAT-registered
    pub vat_rate: Option<f64>,

    /// Currency used when the coverage summary does not name one
    pub currency: String,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            coverage_cap: None,
            deductible_percent: 0.10,
            deductible_minimum: 150.0,
            vat_rate: Some(0.081),
            currency: "EUR".to_string(),
        }
    }
}

/// Configuration for the built-in checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Odometer reading above which the mileage check fails
    pub max_mileage_km: u64,

    /// Vehicle age in years above which the age check fails
    pub max_vehicle_age_years: u32,

    /// Claimed amount above which the plausibility check fails
    pub amount_threshold: f64,

    /// Ids of built-in checks to leave out of the engine
    pub disabled_checks: Vec<String>,

    /// Payout parameters
    pub payout: PayoutConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            max_mileage_km: 150_000,
            max_vehicle_age_years: 10,
            amount_threshold: 10_000.0,
            disabled_checks: Vec::new(),
            payout: PayoutConfig::default(),
        }
    }
}

impl ScreeningConfig {
    /// Create a lenient configuration (higher limits)
    pub fn lenient() -> Self {
        Self {
            max_mileage_km: 250_000,
            max_vehicle_age_years: 15,
            amount_threshold: 25_000.0,
            ..Self::default()
        }
    }

    /// Create a strict configuration (lower limits, higher deductible floor)
    pub fn strict() -> Self {
        Self {
            max_mileage_km: 120_000,
            max_vehicle_age_years: 8,
            amount_threshold: 5_000.0,
            disabled_checks: Vec::new(),
            payout: PayoutConfig {
                deductible_minimum: 300.0,
                ..PayoutConfig::default()
            },
        }
    }

    /// Check that limits and payout parameters are in range
    pub fn validate(&self) -> Result<(), ScreeningError> {
        if self.max_mileage_km == 0 {
            return Err(ScreeningError::Config("max_mileage_km must be positive".to_string()));
        }
        if self.amount_threshold <= 0.0 {
            return Err(ScreeningError::Config("amount_threshold must be positive".to_string()));
        }
        let payout = &self.payout;
        if !(0.0..=1.0).contains(&payout.deductible_percent) {
            return Err(ScreeningError::Config(format!(
                "deductible_percent must be in [0, 1], got {}",
                payout.deductible_percent
            )));
        }
        if payout.deductible_minimum < 0.0 {
            return Err(ScreeningError::Config("deductible_minimum must not be negative".to_string()));
        }
        if let Some(cap) = payout.coverage_cap {
            if cap < 0.0 {
                return Err(ScreeningError::Config("coverage_cap must not be negative".to_string()));
            }
        }
        if let Some(rate) = payout.vat_rate {
            if !(0.0..1.0).contains(&rate) {
                return Err(ScreeningError::Config(format!("vat_rate must be in [0, 1), got {}", rate)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScreeningConfig::default();
        assert_eq!(config.max_mileage_km, 150_000);
        assert_eq!(config.payout.deductible_minimum, 150.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_valid() {
        assert!(ScreeningConfig::lenient().validate().is_ok());
        assert!(ScreeningConfig::strict().validate().is_ok());
        assert_eq!(ScreeningConfig::strict().max_vehicle_age_years, 8);
    }

    #[test]
    fn test_invalid_deductible_rejected() {
        let mut config = ScreeningConfig::default();
        config.payout.deductible_percent = 1.5;
        assert!(matches!(config.validate(), Err(ScreeningError::Config(_))));
    }
}
