//! Error types for the Decision Ledger

use thiserror::Error;

/// Errors that can occur while appending to or reading the ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized or parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The tail of the ledger cannot be chained onto
    #[error("Corrupt ledger at line {line}: {reason}")]
    Corrupt {
        /// Zero-based record index
        line: usize,
        /// What is wrong
        reason: String,
    },
}
