//! Pipeline runner and builder

use crate::artifacts::ArtifactStore;
use crate::registry::WorkspaceRegistry;
use crate::service::DecisionService;
use crate::sources::ClaimSource;
use crate::stages::{DecideStage, PersistStage, ReconcileStage, RecordStage, ScreenStage};
use crate::{AdjudicaConfig, ClaimContext, PipelineError, Stage, StageObserver, StageRecord, StageStatus};
use adjudica_ledger::JsonlLedger;
use adjudica_reconciler::Reconciler;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs stages in order against one claim
///
/// # Examples
///
/// ```
/// use adjudica_pipeline::{ClaimContext, PipelineRunner, Stage, StageStatus};
///
/// struct Noop;
/// impl Stage for Noop {
///     fn name(&self) -> &str { "noop" }
///     fn run(&self, _ctx: &mut ClaimContext) -> anyhow::Result<()> { Ok(()) }
/// }
///
/// let runner = PipelineRunner::new().with_stage(Box::new(Noop));
/// let mut ctx = ClaimContext::new("CLM-1");
/// assert_eq!(runner.run(&mut ctx), StageStatus::Success);
/// ```
#[derive(Default)]
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    observers: Vec<Arc<dyn StageObserver>>,
}

impl PipelineRunner {
    /// Runner with no stages
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder style)
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Register an observer (builder style)
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage until one ends in error.
    ///
    /// Returns the final claim status, which is also stored in `ctx.status`.
    pub fn run(&self, ctx: &mut ClaimContext) -> StageStatus {
        ctx.status = StageStatus::Running;
        info!(claim_id = %ctx.claim_id, run_id = %ctx.run_id, "Claim run started");

        for stage in &self.stages {
            let name = stage.name().to_string();
            self.notify(&ctx.claim_id, &name, StageStatus::Running);

            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage.run(ctx)));
            let status = match outcome {
                Ok(Ok(())) if ctx.is_failed() => StageStatus::Error,
                Ok(Ok(())) => StageStatus::Success,
                Ok(Err(e)) => {
                    error!(claim_id = %ctx.claim_id, stage = %name, error = %format!("{:#}", e), "Stage fault");
                    ctx.fail(format!("stage {} failed: {:#}", name, e));
                    StageStatus::Error
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(claim_id = %ctx.claim_id, stage = %name, panic = %message, "Stage panicked");
                    ctx.fail(format!("stage {} panicked: {}", name, message));
                    StageStatus::Error
                }
            };

            ctx.stages.push(StageRecord {
                stage: name.clone(),
                status,
                elapsed: started.elapsed(),
            });
            self.notify(&ctx.claim_id, &name, status);

            if status == StageStatus::Error {
                info!(
                    claim_id = %ctx.claim_id,
                    stage = %name,
                    reason = ctx.error.as_deref().unwrap_or(""),
                    "Claim run stopped"
                );
                return StageStatus::Error;
            }
        }

        ctx.status = StageStatus::Success;
        info!(claim_id = %ctx.claim_id, "Claim run finished");
        StageStatus::Success
    }

    fn notify(&self, claim_id: &str, stage: &str, status: StageStatus) {
        for observer in &self.observers {
            observer.on_stage(claim_id, stage, status);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Assembles the default stage list for a workspace:
/// reconcile, screen, decide, persist, record.
///
/// The builder is cheap to clone and `Send + Sync`, so batch workers build
/// one runner per claim from a shared builder.
#[derive(Clone)]
pub struct PipelineBuilder {
    config: Arc<AdjudicaConfig>,
    registry: Arc<WorkspaceRegistry>,
    source: Arc<dyn ClaimSource>,
    ledger: Arc<JsonlLedger>,
    artifacts: Option<ArtifactStore>,
    observers: Vec<Arc<dyn StageObserver>>,
}

impl PipelineBuilder {
    /// Create a builder; artifacts are written under `config.data_dir` when
    /// `config.pipeline.write_artifacts` is set
    pub fn new(
        config: AdjudicaConfig,
        registry: Arc<WorkspaceRegistry>,
        source: Arc<dyn ClaimSource>,
        ledger: Arc<JsonlLedger>,
    ) -> Self {
        let artifacts = config
            .pipeline
            .write_artifacts
            .then(|| ArtifactStore::new(&config.data_dir));
        Self {
            config: Arc::new(config),
            registry,
            source,
            ledger,
            artifacts,
            observers: Vec::new(),
        }
    }

    /// Register an observer on every runner built
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Effective configuration
    pub fn config(&self) -> &AdjudicaConfig {
        &self.config
    }

    /// Decision service bound to the configured workspace
    pub fn service(&self) -> Result<DecisionService, PipelineError> {
        let plugin = self.registry.get(&self.config.workspace_id)?;
        Ok(DecisionService::new(
            Arc::clone(&self.config),
            plugin,
            Arc::clone(&self.ledger),
            self.artifacts.clone(),
        ))
    }

    /// Build a runner for one claim
    pub fn build(&self) -> Result<PipelineRunner, PipelineError> {
        let plugin = self.registry.get(&self.config.workspace_id)?;
        let service = self.service()?;

        let mut runner = PipelineRunner::new()
            .with_stage(Box::new(ReconcileStage::new(
                Arc::clone(&self.source),
                Reconciler::new(self.config.reconciler.clone()),
            )))
            .with_stage(Box::new(ScreenStage::new(
                self.config.screening.clone(),
                plugin,
            )))
            .with_stage(Box::new(DecideStage::new(service.clone())));

        if let Some(store) = &self.artifacts {
            runner = runner.with_stage(Box::new(PersistStage::new(store.clone())));
        }
        runner = runner.with_stage(Box::new(RecordStage::new(service)));

        for observer in &self.observers {
            runner = runner.with_observer(Arc::clone(observer));
        }
        Ok(runner)
    }
}
