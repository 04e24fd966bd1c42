//! Reconciler error types

use thiserror::Error;

/// Errors that can occur during reconciliation
#[derive(Error, Debug)]
pub enum ReconcilerError {
    /// Fact source error while loading extractions
    #[error("Fact source error: {0}")]
    Source(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
