//! Metrics collection for pipeline runs

use crate::{StageRecord, StageStatus};
use adjudica_domain::ClaimVerdict;
use serde::Serialize;
use std::collections::BTreeMap;

/// Metrics collected over a batch of claim runs
///
/// Tracks outcomes per status and verdict, and time spent per stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineMetrics {
    /// Claims per final status
    pub by_status: BTreeMap<String, usize>,

    /// Decided claims per verdict
    pub by_verdict: BTreeMap<String, usize>,

    /// Total milliseconds per stage
    pub stage_millis: BTreeMap<String, u64>,

    /// Stage executions per stage
    pub stage_runs: BTreeMap<String, usize>,

    /// Claims processed
    pub claims_processed: usize,

    /// Wall-clock runtime of the batch in milliseconds
    pub total_runtime_ms: u64,
}

impl PipelineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished claim
    pub fn record_claim(&mut self, status: StageStatus, verdict: Option<ClaimVerdict>) {
        self.claims_processed += 1;
        *self.by_status.entry(status.as_str().to_string()).or_insert(0) += 1;
        if let Some(verdict) = verdict {
            *self.by_verdict.entry(verdict.as_str().to_string()).or_insert(0) += 1;
        }
    }

    /// Record the stages of one claim run
    pub fn record_stages(&mut self, stages: &[StageRecord]) {
        for record in stages {
            *self.stage_millis.entry(record.stage.clone()).or_insert(0) +=
                record.elapsed.as_millis() as u64;
            *self.stage_runs.entry(record.stage.clone()).or_insert(0) += 1;
        }
    }

    /// Claims with a given final status
    pub fn count_status(&self, status: StageStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Claims with a given verdict
    pub fn count_verdict(&self, verdict: ClaimVerdict) -> usize {
        self.by_verdict.get(verdict.as_str()).copied().unwrap_or(0)
    }

    /// Claims that ended in error
    pub fn total_errors(&self) -> usize {
        self.count_status(StageStatus::Error)
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Pipeline Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Claims processed: {}", self.claims_processed),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
        ];

        if !self.by_status.is_empty() {
            lines.push("Claims by status:".to_string());
            for (status, count) in &self.by_status {
                lines.push(format!("  {}: {}", status, count));
            }
            lines.push(String::new());
        }

        if !self.by_verdict.is_empty() {
            lines.push("Claims by verdict:".to_string());
            for (verdict, count) in &self.by_verdict {
                lines.push(format!("  {}: {}", verdict, count));
            }
            lines.push(String::new());
        }

        if !self.stage_millis.is_empty() {
            lines.push("Time per stage:".to_string());
            for (stage, millis) in &self.stage_millis {
                let runs = self.stage_runs.get(stage).copied().unwrap_or(0);
                lines.push(format!("  {}: {}ms over {} run(s)", stage, millis, runs));
            }
        }

        lines.join("\n")
    }
}
