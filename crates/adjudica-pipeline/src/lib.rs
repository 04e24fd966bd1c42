//! Adjudica Pipeline
//!
//! Runs claims through reconcile, screen, decide, persist and record.
//!
//! # Overview
//!
//! Each claim gets a [`ClaimContext`] that the stages fill in turn. A stage
//! reports business outcomes on the context (a claim without facts ends in
//! [`StageStatus::Error`] and nothing is recorded); unexpected faults and
//! panics are caught at the stage boundary. The runner stops at the first
//! error.
//!
//! ## Stages
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | **reconcile** | extractions, coverage, processing | facts, report |
//! | **screen** | facts, report, coverage | screening |
//! | **decide** | all of the above | dossier, confidence |
//! | **persist** | everything | `claims/<id>/*.json` |
//! | **record** | dossier | one ledger record |
//!
//! Workspaces contribute checks and clauses through [`WorkspacePlugin`]s
//! registered in a [`WorkspaceRegistry`] at startup.
//!
//! # Usage
//!
//! ## One claim
//!
//! ```no_run
//! use adjudica_pipeline::{AdjudicaConfig, ClaimContext, FsFactSource, PipelineBuilder, WorkspaceRegistry};
//! use adjudica_ledger::JsonlLedger;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AdjudicaConfig::default();
//! let registry = Arc::new(WorkspaceRegistry::from_config(&config)?);
//! let source = Arc::new(FsFactSource::new(&config.data_dir));
//! let ledger = Arc::new(JsonlLedger::open(config.ledger_path())?);
//! let builder = PipelineBuilder::new(config, registry, source, ledger);
//!
//! let mut ctx = ClaimContext::new("CLM-1");
//! let status = builder.build()?.run(&mut ctx);
//! println!("{}: {:?}", status, ctx.dossier.map(|d| d.verdict));
//! # Ok(())
//! # }
//! ```
//!
//! ## Batch
//!
//! [`BatchWorker`] runs many claims on blocking tasks, bounded by
//! `pipeline.max_concurrency`, and returns a [`BatchReport`] with
//! [`PipelineMetrics`].
//!
//! # Configuration
//!
//! ```toml
//! workspace_id = "motor"
//! data_dir = "data"
//! clauses_path = "policies/motor.json"
//!
//! [pipeline]
//! max_concurrency = 4
//! actor = "system:pipeline"
//! write_artifacts = true
//! ```

#![warn(missing_docs)]

mod artifacts;
mod config;
mod context;
mod error;
mod metrics;
mod registry;
mod runner;
mod service;
mod sources;
mod stage;
pub mod stages;
mod worker;

pub use artifacts::{ArtifactStore, CONFIDENCE_FILE, FACTS_FILE, REPORT_FILE, SCREENING_FILE};
pub use config::{AdjudicaConfig, PipelineConfig};
pub use context::{ClaimContext, StageRecord, StageStatus};
pub use error::PipelineError;
pub use metrics::PipelineMetrics;
pub use registry::{StaticWorkspace, WorkspacePlugin, WorkspaceRegistry};
pub use runner::{PipelineBuilder, PipelineRunner};
pub use service::{Decision, DecisionInput, DecisionService};
pub use sources::{ClaimSource, FsFactSource, COVERAGE_FILE, PROCESSING_FILE};
pub use stage::{Stage, StageObserver, TracingObserver};
pub use worker::{BatchReport, BatchWorker, ClaimReport};
