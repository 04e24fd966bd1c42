//! Configuration for the claim pipeline
//!
//! Loaded from `adjudica.toml`:
//!
//! ```toml
//! workspace_id = "motor"
//! data_dir = "data"
//!
//! [reconciler]
//! fail_conflicts = 3
//!
//! [screening]
//! max_mileage_km = 150000
//!
//! [pipeline]
//! max_concurrency = 4
//! ```

use crate::PipelineError;
use adjudica_domain::ConfidenceConfig;
use adjudica_reconciler::ReconcilerConfig;
use adjudica_rules::RulesConfig;
use adjudica_screening::ScreeningConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runner and batch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Claims processed concurrently by the batch worker
    pub max_concurrency: usize,

    /// Actor recorded on ledger entries
    pub actor: String,

    /// Persist artifacts next to the ledger
    pub write_artifacts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            actor: "system:pipeline".to_string(),
            write_artifacts: true,
        }
    }
}

impl PipelineConfig {
    /// Sequential processing, e.g. for debugging a batch
    pub fn sequential() -> Self {
        Self {
            max_concurrency: 1,
            ..Default::default()
        }
    }

    /// Wide fan-out for large batches
    pub fn parallel() -> Self {
        Self {
            max_concurrency: 16,
            ..Default::default()
        }
    }
}

/// Top-level configuration (`adjudica.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjudicaConfig {
    /// Workspace whose plugin supplies checks and clauses
    pub workspace_id: String,

    /// Root of claim inputs and artifacts (`<data_dir>/claims/<id>/...`)
    pub data_dir: PathBuf,

    /// Ledger file; defaults to `<data_dir>/decisions.jsonl`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,

    /// Authoring clause file for the workspace, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clauses_path: Option<PathBuf>,

    /// Reconciler settings
    pub reconciler: ReconcilerConfig,

    /// Screening settings
    pub screening: ScreeningConfig,

    /// Rule evaluator settings
    pub rules: RulesConfig,

    /// Confidence weights
    pub confidence: ConfidenceConfig,

    /// Runner and batch settings
    pub pipeline: PipelineConfig,
}

impl Default for AdjudicaConfig {
    fn default() -> Self {
        Self {
            workspace_id: "default".to_string(),
            data_dir: PathBuf::from("data"),
            ledger_path: None,
            clauses_path: None,
            reconciler: ReconcilerConfig::default(),
            screening: ScreeningConfig::default(),
            rules: RulesConfig::default(),
            confidence: ConfidenceConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AdjudicaConfig {
    /// Strict preset: strict gate, screening and rule settings
    pub fn strict() -> Self {
        Self {
            reconciler: ReconcilerConfig::strict(),
            screening: ScreeningConfig::strict(),
            rules: RulesConfig::strict(),
            ..Default::default()
        }
    }

    /// Lenient preset: lenient gate and screening, permissive rules
    pub fn lenient() -> Self {
        Self {
            reconciler: ReconcilerConfig::lenient(),
            screening: ScreeningConfig::lenient(),
            rules: RulesConfig::permissive(),
            ..Default::default()
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Effective ledger path
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(adjudica_ledger::LEDGER_FILE))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.workspace_id.trim().is_empty() {
            return Err(PipelineError::Config("workspace_id must not be empty".to_string()));
        }
        if self.pipeline.max_concurrency == 0 {
            return Err(PipelineError::Config(
                "pipeline.max_concurrency must be greater than 0".to_string(),
            ));
        }
        self.reconciler
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.screening
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.rules
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.confidence
            .weights
            .validate()
            .map_err(PipelineError::Config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdjudicaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger_path(), PathBuf::from("data").join("decisions.jsonl"));
        assert_eq!(config.pipeline.max_concurrency, 4);
    }

    #[test]
    fn test_presets() {
        assert!(AdjudicaConfig::strict().validate().is_ok());
        assert!(AdjudicaConfig::lenient().validate().is_ok());
        assert_eq!(PipelineConfig::sequential().max_concurrency, 1);
        assert!(PipelineConfig::parallel().max_concurrency > PipelineConfig::default().max_concurrency);
    }

    #[test]
    fn test_partial_toml() {
        let config = AdjudicaConfig::from_toml_str(
            r#"
            workspace_id = "motor"
            data_dir = "/srv/claims"
            ledger_path = "/srv/audit/decisions.jsonl"

            [screening]
            max_mileage_km = 120000

            [pipeline]
            max_concurrency = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.workspace_id, "motor");
        assert_eq!(config.screening.max_mileage_km, 120_000);
        assert_eq!(config.pipeline.max_concurrency, 2);
        assert_eq!(config.pipeline.actor, "system:pipeline");
        assert_eq!(config.ledger_path(), PathBuf::from("/srv/audit/decisions.jsonl"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            AdjudicaConfig::from_toml_str("[pipeline]\nmax_concurrency = 0\n"),
            Err(PipelineError::Config(_))
        ));
        assert!(AdjudicaConfig::from_toml_str("workspace_id = 3").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AdjudicaConfig::strict();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AdjudicaConfig::from_toml_str(&text).unwrap(), config);
    }
}
