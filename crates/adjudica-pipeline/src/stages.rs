//! Default stages: reconcile, screen, decide, persist, record

use crate::artifacts::ArtifactStore;
use crate::registry::WorkspacePlugin;
use crate::service::{Decision, DecisionInput, DecisionService};
use crate::sources::ClaimSource;
use crate::{ClaimContext, Stage};
use adjudica_domain::CoverageProvider;
use adjudica_reconciler::Reconciler;
use adjudica_screening::{CheckContext, ScreeningConfig, ScreeningEngine};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads extractions and reconciles them into facts.
///
/// Facts supplied on the context are kept as they are. Coverage and
/// processing summaries are loaded when not supplied.
pub struct ReconcileStage {
    source: Arc<dyn ClaimSource>,
    reconciler: Reconciler,
}

impl ReconcileStage {
    /// Create the stage
    pub fn new(source: Arc<dyn ClaimSource>, reconciler: Reconciler) -> Self {
        Self { source, reconciler }
    }
}

impl Stage for ReconcileStage {
    fn name(&self) -> &str {
        "reconcile"
    }

    fn run(&self, ctx: &mut ClaimContext) -> anyhow::Result<()> {
        if ctx.facts.is_none() {
            let output = self
                .reconciler
                .reconcile_from_source(self.source.as_ref(), &ctx.claim_id)?;
            ctx.facts = Some(output.facts);
            ctx.report = Some(output.report);
        } else {
            debug!(claim_id = %ctx.claim_id, "Using supplied facts");
        }

        if ctx.facts.as_ref().map_or(true, |f| f.is_empty()) {
            ctx.fail(format!("no facts available for claim {}", ctx.claim_id));
            return Ok(());
        }

        if ctx.coverage.is_none() {
            ctx.coverage = self
                .source
                .coverage_summary(&ctx.claim_id)
                .context("loading coverage summary")?;
        }
        if ctx.processing.is_none() {
            ctx.processing = self
                .source
                .processing_summary(&ctx.claim_id)
                .context("loading processing summary")?;
        }
        Ok(())
    }
}

/// Runs the workspace's screening checks
pub struct ScreenStage {
    engine: ScreeningEngine,
}

impl ScreenStage {
    /// Create the stage with the workspace's checks
    pub fn new(config: ScreeningConfig, plugin: Arc<dyn WorkspacePlugin>) -> Self {
        Self {
            engine: plugin.screening_engine(&config),
        }
    }
}

impl Stage for ScreenStage {
    fn name(&self) -> &str {
        "screen"
    }

    fn run(&self, ctx: &mut ClaimContext) -> anyhow::Result<()> {
        let Some(facts) = &ctx.facts else {
            ctx.fail("screening requires reconciled facts");
            return Ok(());
        };

        let mut check_ctx = CheckContext::new(&ctx.claim_id, facts, ctx.as_of);
        if let Some(report) = &ctx.report {
            check_ctx = check_ctx.with_report(report);
        }
        if let Some(coverage) = &ctx.coverage {
            check_ctx = check_ctx.with_coverage(coverage);
        }
        let result = self.engine.screen(&check_ctx);

        if result.auto_reject {
            warn!(claim_id = %ctx.claim_id, hard_fails = ?result.hard_fails, "Screening auto-reject");
        }
        ctx.screening = Some(result);
        Ok(())
    }
}

/// Decides the claim: auto-reject or clause evaluation, plus confidence
pub struct DecideStage {
    service: DecisionService,
}

impl DecideStage {
    /// Create the stage
    pub fn new(service: DecisionService) -> Self {
        Self { service }
    }
}

impl Stage for DecideStage {
    fn name(&self) -> &str {
        "decide"
    }

    fn run(&self, ctx: &mut ClaimContext) -> anyhow::Result<()> {
        let Some(facts) = &ctx.facts else {
            ctx.fail("decision requires reconciled facts");
            return Ok(());
        };

        let decision = self.service.decide(&DecisionInput {
            claim_id: &ctx.claim_id,
            facts,
            report: ctx.report.as_ref(),
            screening: ctx.screening.as_ref(),
            coverage: ctx.coverage.as_ref(),
            processing: ctx.processing.as_ref(),
            assumption_overrides: &ctx.assumption_overrides,
        })?;
        ctx.dossier = Some(decision.dossier);
        ctx.confidence = Some(decision.confidence);
        Ok(())
    }
}

/// Writes the claim's artifacts
pub struct PersistStage {
    store: ArtifactStore,
}

impl PersistStage {
    /// Create the stage
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }
}

impl Stage for PersistStage {
    fn name(&self) -> &str {
        "persist"
    }

    fn run(&self, ctx: &mut ClaimContext) -> anyhow::Result<()> {
        let (Some(dossier), Some(confidence)) = (&ctx.dossier, &ctx.confidence) else {
            ctx.fail("nothing to persist: claim was not decided");
            return Ok(());
        };
        let version = dossier.version;

        let mut written = Vec::new();
        if let Some(facts) = &ctx.facts {
            written.push(self.store.write_facts(facts)?);
        }
        if let Some(report) = &ctx.report {
            written.push(self.store.write_report(report)?);
        }
        if let Some(screening) = &ctx.screening {
            written.push(self.store.write_screening(screening, version)?);
        }
        written.push(self.store.write_dossier(dossier)?);
        written.push(self.store.write_confidence(confidence, version)?);

        ctx.artifacts = written;
        Ok(())
    }
}

/// Appends the decision to the ledger
pub struct RecordStage {
    service: DecisionService,
}

impl RecordStage {
    /// Create the stage
    pub fn new(service: DecisionService) -> Self {
        Self { service }
    }
}

impl Stage for RecordStage {
    fn name(&self) -> &str {
        "record"
    }

    fn run(&self, ctx: &mut ClaimContext) -> anyhow::Result<()> {
        let (Some(dossier), Some(confidence)) = (ctx.dossier.clone(), ctx.confidence.clone()) else {
            ctx.fail("nothing to record: claim was not decided");
            return Ok(());
        };

        let linked = ctx
            .artifacts
            .iter()
            .filter(|name| name.contains("_v"))
            .cloned()
            .collect();
        let record = self
            .service
            .record(&Decision { dossier, confidence }, Some(&ctx.run_id), linked)?;
        ctx.decision = Some(record);
        Ok(())
    }
}
