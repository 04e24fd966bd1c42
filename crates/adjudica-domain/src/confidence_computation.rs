//! Confidence aggregation
//!
//! Implements the deterministic composite confidence formula:
//! 1. Signal collection from whichever stages produced data
//! 2. Per-component scoring (mean of the component's signals)
//! 3. Weight redistribution over components that have signals
//! 4. Weighted sum and banding

use crate::clause::ClauseEvaluation;
use crate::confidence::{ComponentKind, ComponentScore, ConfidenceBand, ConfidenceSummary, Signal};
use crate::coverage::{CoverageStatus, CoverageSummary, ProcessingSummary};
use crate::fact::ClaimFacts;
use crate::reconciliation::{GateStatus, ReconciliationReport};
use crate::screening::ScreeningResult;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that weights sum to 1
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Base weights per component; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Document extraction quality
    pub extraction: f64,
    /// Cross-document agreement
    pub reconciliation: f64,
    /// Coverage classification
    pub coverage: f64,
    /// Screening
    pub screening: f64,
    /// Clause evaluation
    pub decision: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            extraction: 0.25,
            reconciliation: 0.20,
            coverage: 0.15,
            screening: 0.20,
            decision: 0.20,
        }
    }
}

impl ConfidenceWeights {
    /// Base weight of a component
    pub fn weight(&self, component: ComponentKind) -> f64 {
        match component {
            ComponentKind::Extraction => self.extraction,
            ComponentKind::Reconciliation => self.reconciliation,
            ComponentKind::Coverage => self.coverage,
            ComponentKind::Screening => self.screening,
            ComponentKind::Decision => self.decision,
        }
    }

    /// Validate that weights are non-negative and sum to 1.0
    pub fn validate(&self) -> Result<(), String> {
        let mut sum = 0.0;
        for component in ComponentKind::ALL {
            let w = self.weight(component);
            if !(0.0..=1.0).contains(&w) {
                return Err(format!("weight for {} must be in [0, 1], got {}", component.as_str(), w));
            }
            sum += w;
        }
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("confidence weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }
}

/// Configuration for confidence aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Component weights
    #[serde(default)]
    pub weights: ConfidenceWeights,
}

/// Everything the aggregator may draw signals from; all parts are optional
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceInputs<'a> {
    /// Reconciled facts
    pub facts: Option<&'a ClaimFacts>,
    /// Reconciliation report
    pub report: Option<&'a ReconciliationReport>,
    /// Screening result
    pub screening: Option<&'a ScreeningResult>,
    /// Coverage summary
    pub coverage: Option<&'a CoverageSummary>,
    /// Document processing summary
    pub processing: Option<&'a ProcessingSummary>,
    /// Clause evaluations (empty when the rule evaluator did not run)
    pub clauses: &'a [ClauseEvaluation],
}

fn signal(name: &str, component: ComponentKind, value: f64) -> Signal {
    Signal {
        name: name.to_string(),
        component,
        value: value.clamp(0.0, 1.0),
    }
}

/// Collect normalized signals from the available inputs
pub fn collect_signals(inputs: &ConfidenceInputs<'_>) -> Vec<Signal> {
    let mut signals = Vec::new();

    // Extraction
    if let Some(mean) = inputs.facts.and_then(ClaimFacts::mean_confidence) {
        signals.push(signal("mean_fact_confidence", ComponentKind::Extraction, mean));
    }
    if let Some(processing) = inputs.processing {
        if let Some(ratio) = processing.success_ratio() {
            signals.push(signal("document_success_ratio", ComponentKind::Extraction, ratio));
        }
        if let Some(quality) = processing.mean_extraction_quality {
            signals.push(signal("extraction_quality", ComponentKind::Extraction, quality));
        }
    }

    // Reconciliation
    if let Some(report) = inputs.report {
        let gate_score = match report.gate.status {
            GateStatus::Pass => 1.0,
            GateStatus::Warn => 0.6,
            GateStatus::Fail => 0.2,
        };
        signals.push(signal("gate_status", ComponentKind::Reconciliation, gate_score));
        if report.fact_count > 0 {
            let ratio = 1.0 - report.gate.conflict_count as f64 / report.fact_count as f64;
            signals.push(signal("conflict_free_ratio", ComponentKind::Reconciliation, ratio));
        }
        signals.push(signal(
            "provenance_coverage",
            ComponentKind::Reconciliation,
            report.gate.provenance_coverage,
        ));
    }

    // Coverage
    if let Some(coverage) = inputs.coverage {
        if let Some(mean) = coverage.mean_confidence() {
            signals.push(signal("classification_confidence", ComponentKind::Coverage, mean));
            let decided = coverage
                .line_items
                .iter()
                .filter(|i| i.status != CoverageStatus::Review)
                .count();
            signals.push(signal(
                "decided_item_ratio",
                ComponentKind::Coverage,
                decided as f64 / coverage.line_items.len() as f64,
            ));
        }
    }

    // Screening
    if let Some(screening) = inputs.screening {
        if let Some(rate) = screening.pass_rate() {
            signals.push(signal("check_pass_rate", ComponentKind::Screening, rate));
        }
        if screening.counts.total > 0 {
            let conclusive = screening.counts.passed + screening.counts.failed;
            signals.push(signal(
                "conclusive_ratio",
                ComponentKind::Screening,
                conclusive as f64 / screening.counts.total as f64,
            ));
        }
    }

    // Decision
    if !inputs.clauses.is_empty() {
        let resolved = inputs.clauses.iter().filter(|c| !c.verdict.is_unresolved()).count();
        signals.push(signal(
            "resolved_clause_ratio",
            ComponentKind::Decision,
            resolved as f64 / inputs.clauses.len() as f64,
        ));
    }

    signals
}

/// Re-normalize base weights over the available components.
///
/// Dropped components give their weight to the remaining ones in proportion
/// to their base weights. If every available component has zero base
/// weight, the weight is split evenly.
pub fn redistribute_weights(
    weights: &ConfidenceWeights,
    available: &[ComponentKind],
) -> Vec<(ComponentKind, f64)> {
    if available.is_empty() {
        return Vec::new();
    }
    let total: f64 = available.iter().map(|c| weights.weight(*c)).sum();
    if total <= 0.0 {
        let even = 1.0 / available.len() as f64;
        return available.iter().map(|c| (*c, even)).collect();
    }
    available
        .iter()
        .map(|c| (*c, weights.weight(*c) / total))
        .collect()
}

/// Aggregate signals into a confidence summary
pub fn aggregate(claim_id: &str, signals: &[Signal], weights: &ConfidenceWeights) -> ConfidenceSummary {
    let mut scored: Vec<(ComponentKind, f64, Vec<Signal>)> = Vec::new();
    let mut missing = Vec::new();

    for component in ComponentKind::ALL {
        let component_signals: Vec<Signal> = signals
            .iter()
            .filter(|s| s.component == component)
            .cloned()
            .collect();
        if component_signals.is_empty() {
            missing.push(component);
            continue;
        }
        let score = component_signals.iter().map(|s| s.value).sum::<f64>()
            / component_signals.len() as f64;
        scored.push((component, score.clamp(0.0, 1.0), component_signals));
    }

    let available: Vec<ComponentKind> = scored.iter().map(|(c, _, _)| *c).collect();
    let effective = redistribute_weights(weights, &available);

    let mut composite = 0.0;
    let components: Vec<ComponentScore> = scored
        .into_iter()
        .zip(effective)
        .map(|((component, score, signals), (_, effective_weight))| {
            composite += score * effective_weight;
            ComponentScore {
                component,
                score,
                base_weight: weights.weight(component),
                effective_weight,
                signals,
            }
        })
        .collect();

    let composite = composite.clamp(0.0, 1.0);

    ConfidenceSummary {
        claim_id: claim_id.to_string(),
        composite_score: composite,
        band: ConfidenceBand::from_score(composite),
        components,
        missing_components: missing,
    }
}

/// Stateless aggregator bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct ConfidenceAggregator {
    config: ConfidenceConfig,
}

impl ConfidenceAggregator {
    /// Create an aggregator with the given configuration
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    /// Collect signals and aggregate them in one step
    pub fn summarize(&self, claim_id: &str, inputs: &ConfidenceInputs<'_>) -> ConfidenceSummary {
        let signals = collect_signals(inputs);
        aggregate(claim_id, &signals, &self.config.weights)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: for any subset of available components, effective
        /// weights sum to 1.0
        #[test]
        fn test_redistributed_weights_sum_to_one(mask in 1u8..32) {
            let available: Vec<ComponentKind> = ComponentKind::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c)
                .collect();
            let effective = redistribute_weights(&ConfidenceWeights::default(), &available);
            let sum: f64 = effective.iter().map(|(_, w)| w).sum();
            prop_assert!((sum - 1.0).abs() < WEIGHT_EPSILON);
        }

        /// Property: composite stays in [0, 1] for any signal values
        #[test]
        fn test_composite_bounded(values in proptest::collection::vec(-1.0f64..2.0, 0..10)) {
            let signals: Vec<Signal> = values
                .iter()
                .enumerate()
                .map(|(i, v)| Signal {
                    name: format!("s{}", i),
                    component: ComponentKind::ALL[i % ComponentKind::ALL.len()],
                    value: *v,
                })
                .collect();
            let summary = aggregate("CLM", &signals, &ConfidenceWeights::default());
            prop_assert!((0.0..=1.0).contains(&summary.composite_score));
        }
    }
}
