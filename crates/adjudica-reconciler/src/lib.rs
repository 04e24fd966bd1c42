//! Adjudica Reconciler
//!
//! Merges per-document extraction results into one canonical fact set.
//!
//! The Reconciler provides:
//! - Value normalization for conflict detection
//! - Winner selection (highest confidence, then most recent run)
//! - Conflict detection across documents
//! - An advisory quality gate (pass / warn / fail)
//!
//! # Examples
//!
//! ```
//! use adjudica_domain::{DocumentExtraction, ExtractedField};
//! use adjudica_reconciler::{Reconciler, ReconcilerConfig};
//! use serde_json::json;
//!
//! let reconciler = Reconciler::new(ReconcilerConfig::lenient());
//! let docs = vec![DocumentExtraction::new("doc-1", "policy", "run-1")
//!     .with_field(ExtractedField::new("policy_number", json!("P-100"), 0.9))];
//!
//! let output = reconciler.reconcile("CLM-1", &docs);
//! assert_eq!(output.facts.len(), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
pub mod normalize;
mod reconciler;

pub use config::ReconcilerConfig;
pub use error::ReconcilerError;
pub use reconciler::{Reconciler, ReconciliationOutput};
