//! Command implementations.

pub mod evaluate;
pub mod ledger;
pub mod profile;
pub mod run;
pub mod transpile;

pub use self::evaluate::execute_evaluate;
pub use self::ledger::execute_ledger;
pub use self::profile::execute_profile;
pub use self::run::execute_run;
pub use self::transpile::execute_transpile;

use crate::error::{CliError, Result};
use adjudica_ledger::JsonlLedger;
use adjudica_pipeline::{AdjudicaConfig, FsFactSource, PipelineBuilder, TracingObserver, WorkspaceRegistry};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Registry, fact source and ledger opened from one configuration.
pub struct Workspace {
    /// Effective configuration
    pub config: AdjudicaConfig,
    /// Registered workspace plugins
    pub registry: Arc<WorkspaceRegistry>,
    /// Extraction store under `data_dir`
    pub source: Arc<FsFactSource>,
    /// Decision ledger
    pub ledger: Arc<JsonlLedger>,
}

impl Workspace {
    /// Open the workspace described by `config`.
    pub fn open(config: AdjudicaConfig) -> Result<Self> {
        let registry = Arc::new(WorkspaceRegistry::from_config(&config)?);
        let source = Arc::new(FsFactSource::new(&config.data_dir));
        let ledger = Arc::new(JsonlLedger::open(config.ledger_path())?);
        Ok(Self {
            config,
            registry,
            source,
            ledger,
        })
    }

    /// Pipeline builder with stage transitions logged.
    pub fn builder(&self) -> PipelineBuilder {
        PipelineBuilder::new(
            self.config.clone(),
            Arc::clone(&self.registry),
            self.source.clone(),
            Arc::clone(&self.ledger),
        )
        .with_observer(Arc::new(TracingObserver))
    }
}

/// Parse a `--as-of` date, defaulting to today (UTC).
pub fn parse_as_of(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        None => Ok(Utc::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| CliError::InvalidInput(format!("invalid date '{}': {}", s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_as_of() {
        assert_eq!(
            parse_as_of(Some("2025-06-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert!(parse_as_of(Some("01/06/2025")).is_err());
        assert!(parse_as_of(None).is_ok());
    }
}
