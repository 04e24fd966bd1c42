//! Confidence summary types

use serde::{Deserialize, Serialize};

/// Score at or above which a decision is high confidence
pub const HIGH_THRESHOLD: f64 = 0.80;

/// Score at or above which a decision is moderate confidence
pub const MODERATE_THRESHOLD: f64 = 0.55;

/// Confidence band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    /// score >= 0.80
    High,
    /// 0.55 <= score < 0.80
    Moderate,
    /// score < 0.55
    Low,
}

impl ConfidenceBand {
    /// Band for a composite score
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            ConfidenceBand::High
        } else if score >= MODERATE_THRESHOLD {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }

    /// Get the band name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Moderate => "moderate",
            ConfidenceBand::Low => "low",
        }
    }
}

/// Weighted component of the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Document extraction quality
    Extraction,
    /// Cross-document agreement
    Reconciliation,
    /// Line item coverage classification
    Coverage,
    /// Deterministic screening
    Screening,
    /// Clause evaluation
    Decision,
}

impl ComponentKind {
    /// Every component, in report order
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Extraction,
        ComponentKind::Reconciliation,
        ComponentKind::Coverage,
        ComponentKind::Screening,
        ComponentKind::Decision,
    ];

    /// Get the component name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Extraction => "extraction",
            ComponentKind::Reconciliation => "reconciliation",
            ComponentKind::Coverage => "coverage",
            ComponentKind::Screening => "screening",
            ComponentKind::Decision => "decision",
        }
    }
}

/// A named signal normalized to [0.0, 1.0]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Signal name (e.g., "mean_fact_confidence")
    pub name: String,
    /// Component the signal belongs to
    pub component: ComponentKind,
    /// Normalized value
    pub value: f64,
}

/// One component's contribution to the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    /// Component
    pub component: ComponentKind,
    /// Mean of the component's signals
    pub score: f64,
    /// Configured weight
    pub base_weight: f64,
    /// Weight after redistribution over available components
    pub effective_weight: f64,
    /// Contributing signals
    pub signals: Vec<Signal>,
}

/// Full confidence breakdown (persisted as `confidence_summary.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    /// Claim identifier
    pub claim_id: String,
    /// Weighted composite [0.0, 1.0]
    pub composite_score: f64,
    /// Band for the composite
    pub band: ConfidenceBand,
    /// Available components
    pub components: Vec<ComponentScore>,
    /// Components with no data
    pub missing_components: Vec<ComponentKind>,
}

impl ConfidenceSummary {
    /// Compact form embedded in the dossier
    pub fn index(&self) -> ConfidenceIndex {
        ConfidenceIndex {
            composite_score: self.composite_score,
            band: self.band,
            components: self
                .components
                .iter()
                .map(|c| (c.component, c.score))
                .collect(),
            missing_components: self.missing_components.clone(),
        }
    }
}

/// Compact confidence index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIndex {
    /// Weighted composite
    pub composite_score: f64,
    /// Band
    pub band: ConfidenceBand,
    /// `(component, score)` pairs
    pub components: Vec<(ComponentKind, f64)>,
    /// Components with no data
    pub missing_components: Vec<ComponentKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ConfidenceBand::from_score(0.80), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(0.7999), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_score(0.55), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_score(0.5499), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_score(0.0), ConfidenceBand::Low);
    }
}
