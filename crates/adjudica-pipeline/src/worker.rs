//! Concurrent batch processing

use crate::{ClaimContext, PipelineBuilder, PipelineError, PipelineMetrics, StageRecord, StageStatus};
use adjudica_domain::ClaimVerdict;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of one claim in a batch
#[derive(Debug, Clone, Serialize)]
pub struct ClaimReport {
    /// Claim identifier
    pub claim_id: String,
    /// Final status
    pub status: StageStatus,
    /// Verdict, when the claim was decided
    pub verdict: Option<ClaimVerdict>,
    /// Dossier version, when the claim was decided
    pub dossier_version: Option<u32>,
    /// Ledger record id, when the decision was recorded
    pub decision_id: Option<String>,
    /// Failure reason
    pub error: Option<String>,
    /// Stage outcomes
    pub stages: Vec<StageRecord>,
    /// Wall-clock time for the claim
    pub elapsed_ms: u64,
}

impl ClaimReport {
    fn from_context(ctx: &ClaimContext, elapsed_ms: u64) -> Self {
        Self {
            claim_id: ctx.claim_id.clone(),
            status: ctx.status,
            verdict: ctx.dossier.as_ref().map(|d| d.verdict),
            dossier_version: ctx.dossier.as_ref().map(|d| d.version),
            decision_id: ctx.decision.as_ref().map(|r| r.decision_id.to_string()),
            error: ctx.error.clone(),
            stages: ctx.stages.clone(),
            elapsed_ms,
        }
    }
}

/// Per-claim reports in input order, plus aggregate metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// One report per claim, in input order
    pub claims: Vec<ClaimReport>,
    /// Aggregates over the batch
    pub metrics: PipelineMetrics,
}

impl BatchReport {
    /// Claims that ended in error
    pub fn error_count(&self) -> usize {
        self.claims
            .iter()
            .filter(|c| c.status == StageStatus::Error)
            .count()
    }

    /// Whether any claim ended in error
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Runs many claims concurrently.
///
/// Each claim runs on a blocking task with its own runner built from the
/// shared [`PipelineBuilder`]; a semaphore bounds how many run at once.
///
/// # Examples
///
/// ```no_run
/// use adjudica_pipeline::{AdjudicaConfig, BatchWorker, FsFactSource, PipelineBuilder, WorkspaceRegistry};
/// use adjudica_ledger::JsonlLedger;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AdjudicaConfig::load("adjudica.toml")?;
///     let registry = Arc::new(WorkspaceRegistry::from_config(&config)?);
///     let source = Arc::new(FsFactSource::new(&config.data_dir));
///     let ledger = Arc::new(JsonlLedger::open(config.ledger_path())?);
///     let builder = PipelineBuilder::new(config, registry, source, ledger);
///
///     let report = BatchWorker::new(builder)
///         .run_ids(vec!["CLM-1".to_string(), "CLM-2".to_string()])
///         .await?;
///     println!("{}", report.metrics.summary());
///     Ok(())
/// }
/// ```
pub struct BatchWorker {
    builder: PipelineBuilder,
    max_concurrency: usize,
}

impl BatchWorker {
    /// Create a worker using `pipeline.max_concurrency` from the builder's config
    pub fn new(builder: PipelineBuilder) -> Self {
        let max_concurrency = builder.config().pipeline.max_concurrency.max(1);
        Self {
            builder,
            max_concurrency,
        }
    }

    /// Override the concurrency bound
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Concurrency bound
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run claims by id, reconciling each from the source
    pub async fn run_ids(&self, claim_ids: Vec<String>) -> Result<BatchReport, PipelineError> {
        self.run(claim_ids.into_iter().map(ClaimContext::new).collect())
            .await
    }

    /// Run prepared claim contexts
    ///
    /// # Errors
    ///
    /// Returns an error only for runtime faults (a task that cannot be
    /// joined); claim failures are reported per claim.
    pub async fn run(&self, claims: Vec<ClaimContext>) -> Result<BatchReport, PipelineError> {
        let started = Instant::now();
        let total = claims.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        tracing::info!(
            "Batch started: {} claim(s), concurrency {}",
            total,
            self.max_concurrency
        );

        for (index, ctx) in claims.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))?;
            let builder = self.builder.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, process_claim(&builder, ctx))
            });
        }

        let mut slots: Vec<Option<ClaimReport>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            let (index, report) = joined.map_err(|e| PipelineError::Worker(e.to_string()))?;
            slots[index] = Some(report);
        }

        let mut report = BatchReport::default();
        for claim in slots.into_iter().flatten() {
            report.metrics.record_claim(claim.status, claim.verdict);
            report.metrics.record_stages(&claim.stages);
            report.claims.push(claim);
        }
        report.metrics.total_runtime_ms = started.elapsed().as_millis() as u64;

        tracing::info!("Batch finished.\n{}", report.metrics.summary());
        Ok(report)
    }
}

fn process_claim(builder: &PipelineBuilder, mut ctx: ClaimContext) -> ClaimReport {
    let started = Instant::now();
    match builder.build() {
        Ok(runner) => {
            runner.run(&mut ctx);
        }
        Err(e) => {
            tracing::error!("Cannot build pipeline for claim {}: {}", ctx.claim_id, e);
            ctx.fail(e.to_string());
        }
    }
    ClaimReport::from_context(&ctx, started.elapsed().as_millis() as u64)
}
