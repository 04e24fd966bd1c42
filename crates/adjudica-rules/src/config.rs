//! Configuration for the Rule Evaluator

use crate::mapper::DEFAULT_MAX_ARRAY_INDEX;
use crate::RulesError;
use serde::{Deserialize, Serialize};

/// Upper bound on `max_array_index`
const MAX_ARRAY_INDEX_CEILING: usize = 1 << 20;

/// Configuration for the Rule Evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Maximum nesting depth of a logic tree
    pub max_depth: usize,

    /// Reject clause files containing unknown operators at load time
    pub validate_on_load: bool,

    /// Largest array index accepted in a fact path; larger keys are skipped
    pub max_array_index: usize,
}

impl Default for RulesConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_depth: 64,
            validate_on_load: true,
            max_array_index: DEFAULT_MAX_ARRAY_INDEX,
        }
    }
}

impl RulesConfig {
    /// Permissive preset: deep trees, operator errors surface per clause
    pub fn permissive() -> Self {
        Self {
            max_depth: 256,
            validate_on_load: false,
            max_array_index: DEFAULT_MAX_ARRAY_INDEX * 4,
        }
    }

    /// Strict preset: shallow trees, validated clause files
    pub fn strict() -> Self {
        Self {
            max_depth: 32,
            validate_on_load: true,
            max_array_index: 256,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.max_depth == 0 {
            return Err(RulesError::Config("max_depth must be greater than 0".to_string()));
        }
        if self.max_array_index > MAX_ARRAY_INDEX_CEILING {
            return Err(RulesError::Config(format!(
                "max_array_index must be at most {}",
                MAX_ARRAY_INDEX_CEILING
            )));
        }
        Ok(())
    }
}
