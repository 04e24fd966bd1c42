//! Screening error types

use thiserror::Error;

/// Errors that can occur while running a check or computing a payout
#[derive(Error, Debug)]
pub enum ScreeningError {
    /// A fact the check needs is absent
    #[error("Missing fact: {0}")]
    MissingFact(String),

    /// A fact is present but cannot be interpreted
    #[error("Invalid fact {name}: {reason}")]
    InvalidFact {
        /// Fact name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Payout cannot be computed
    #[error("Payout error: {0}")]
    Payout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
