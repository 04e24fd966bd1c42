//! Adjudica Domain Layer
//!
//! This crate contains the data model shared by every stage of the claim
//! decisioning pipeline, the collaborator traits the pipeline consumes, and
//! the deterministic confidence aggregation formula.
//!
//! ## Key Concepts
//!
//! - **Fact**: a `(name, value)` pair read from a claim document, with provenance
//! - **Conflict**: two or more distinct values for one fact name
//! - **Gate**: an advisory pass/warn/fail verdict on reconciliation quality
//! - **Screening**: deterministic business checks, some of which are hard fails
//! - **Clause**: one compiled rule (limit, condition, exclusion, deductible)
//! - **Dossier**: the versioned outcome of evaluating a claim
//! - **Decision record**: a hash-chained ledger entry for audit
//!
//! ## Architecture
//!
//! - Only serialization and id primitives as external dependencies
//! - No I/O; storage and infrastructure live in other crates
//! - Trait definitions for all external collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clause;
pub mod confidence;
pub mod confidence_computation;
pub mod coverage;
pub mod decision;
pub mod dossier;
pub mod fact;
pub mod logic;
pub mod provenance;
pub mod reconciliation;
pub mod screening;
pub mod traits;

// Re-exports for convenience
pub use clause::{Clause, ClauseEvaluation, ClauseSet, ClauseType, ClauseVerdict};
pub use confidence::{ComponentKind, ComponentScore, ConfidenceBand, ConfidenceIndex, ConfidenceSummary, Signal};
pub use confidence_computation::{
    ConfidenceAggregator, ConfidenceConfig, ConfidenceInputs, ConfidenceWeights,
};
pub use coverage::{CoverageStatus, CoverageSummary, ItemCategory, LineItem, ProcessingSummary};
pub use decision::{
    ClaimVerdict, DecisionId, DecisionRecord, DecisionType, NewDecision, Rationale, GENESIS,
};
pub use dossier::{
    ClauseBuckets, DecidedBy, Dossier, ExecutionMetadata, FinancialSummary, LineItemDecision,
};
pub use fact::{AggregatedFact, ClaimFacts, DocumentExtraction, ExtractedField};
pub use logic::{LogicArg, LogicNode, Operator, OperatorFamily};
pub use provenance::{compare_run_ids, FactProvenance};
pub use reconciliation::{
    ConflictSource, ConflictValue, FactConflict, GateStatus, ReconciliationGate,
    ReconciliationReport,
};
pub use screening::{
    CheckVerdict, PayoutCalculation, ScreeningCheck, ScreeningCounts, ScreeningResult,
};
pub use traits::{CoverageProvider, FactSource};
