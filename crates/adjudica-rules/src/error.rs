//! Error types for the Rule Evaluator

use thiserror::Error;

/// Errors that can occur while compiling or evaluating clause logic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    /// Operator symbol not in the supported set
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Wrong number of operands
    #[error("Operator '{operator}' expects {expected} argument(s), got {got}")]
    Arity {
        /// Operator symbol
        operator: String,
        /// Human-readable expectation (e.g. "2", "at least 1")
        expected: String,
        /// Operands supplied
        got: usize,
    },

    /// Operand of the wrong type
    #[error("Type error: {0}")]
    Type(String),

    /// Division or remainder by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Tree deeper than the configured limit
    #[error("Logic tree exceeds maximum depth of {0}")]
    MaxDepth(usize),

    /// Malformed dotted path
    #[error("Invalid path '{0}'")]
    InvalidPath(String),

    /// Authoring node that cannot be compiled
    #[error("Invalid logic node: {0}")]
    InvalidNode(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for RulesError {
    fn from(e: serde_json::Error) -> Self {
        RulesError::JsonParse(e.to_string())
    }
}
