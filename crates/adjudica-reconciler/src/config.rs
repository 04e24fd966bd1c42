//! Reconciler configuration

use crate::ReconcilerError;
use serde::{Deserialize, Serialize};

/// Configuration for fact selection and the reconciliation gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Fact names every claim is expected to provide
    pub critical_facts: Vec<String>,

    /// Warn when more critical facts than this are missing
    pub warn_missing_critical: usize,

    /// Fail when more critical facts than this are missing
    pub fail_missing_critical: usize,

    /// Warn when more fact names than this are in conflict
    pub warn_conflicts: usize,

    /// Fail when more fact names than this are in conflict
    pub fail_conflicts: usize,

    /// Warn when fewer selected facts than this carry a page or quote (0.0-1.0)
    pub min_provenance_coverage: f64,

    /// Characters per token used for the size estimate
    pub chars_per_token: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            critical_facts: vec![
                "policy_number".to_string(),
                "policy_start_date".to_string(),
                "vin".to_string(),
                "odometer_km".to_string(),
            ],
            warn_missing_critical: 0,
            fail_missing_critical: 0,
            warn_conflicts: 0,
            fail_conflicts: 3,
            min_provenance_coverage: 0.5,
            chars_per_token: 4,
        }
    }
}

impl ReconcilerConfig {
    /// Create a lenient configuration (no critical facts, tolerant thresholds)
    pub fn lenient() -> Self {
        Self {
            critical_facts: Vec::new(),
            warn_missing_critical: 0,
            fail_missing_critical: 2,
            warn_conflicts: 2,
            fail_conflicts: 10,
            min_provenance_coverage: 0.0,
            chars_per_token: 4,
        }
    }

    /// Create a strict configuration (any conflict beyond one fails)
    pub fn strict() -> Self {
        Self {
            fail_conflicts: 1,
            min_provenance_coverage: 0.8,
            ..Self::default()
        }
    }

    /// Check that thresholds are consistent
    pub fn validate(&self) -> Result<(), ReconcilerError> {
        if self.warn_missing_critical > self.fail_missing_critical {
            return Err(ReconcilerError::Config(format!(
                "warn_missing_critical ({}) exceeds fail_missing_critical ({})",
                self.warn_missing_critical, self.fail_missing_critical
            )));
        }
        if self.warn_conflicts > self.fail_conflicts {
            return Err(ReconcilerError::Config(format!(
                "warn_conflicts ({}) exceeds fail_conflicts ({})",
                self.warn_conflicts, self.fail_conflicts
            )));
        }
        if !(0.0..=1.0).contains(&self.min_provenance_coverage) {
            return Err(ReconcilerError::Config(format!(
                "min_provenance_coverage must be in [0, 1], got {}",
                self.min_provenance_coverage
            )));
        }
        if self.chars_per_token == 0 {
            return Err(ReconcilerError::Config("chars_per_token must be positive".to_string()));
        }
        Ok(())
    }
}
