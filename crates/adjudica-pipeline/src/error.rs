//! Error types for pipeline operations

use adjudica_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while running claims through the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Decision ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Fact or coverage source error
    #[error("Source error: {0}")]
    Source(String),

    /// Unknown or duplicate workspace
    #[error("Registry error: {0}")]
    Registry(String),

    /// Claim, document or run id that is not a single path component
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Artifact already exists or cannot be written
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
