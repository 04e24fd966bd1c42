//! Workspace plugins and their registry
//!
//! A workspace (e.g. one insurer's motor product) contributes screening
//! checks and a compiled clause set. Plugins are registered once at startup
//! and the registry is handed to the [`PipelineBuilder`](crate::PipelineBuilder).

use crate::{AdjudicaConfig, PipelineError};
use adjudica_domain::ClauseSet;
use adjudica_rules::transpile_clause_set;
use adjudica_screening::{Check, ScreeningConfig, ScreeningEngine};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Checks, clauses and settings contributed by one workspace
pub trait WorkspacePlugin: Send + Sync {
    /// Workspace id this plugin is registered under
    fn workspace_id(&self) -> &str;

    /// Extra checks; a check whose id matches a built-in replaces it
    fn checks(&self, _config: &ScreeningConfig) -> Vec<Box<dyn Check>> {
        Vec::new()
    }

    /// Compiled clauses evaluated by the rule stage
    fn clause_set(&self) -> ClauseSet {
        ClauseSet::default()
    }

    /// Adjust the screening configuration for this workspace
    fn screening_config(&self, base: &ScreeningConfig) -> ScreeningConfig {
        base.clone()
    }

    /// Screening engine: built-in checks followed by this plugin's checks
    fn screening_engine(&self, base: &ScreeningConfig) -> ScreeningEngine {
        let config = self.screening_config(base);
        let extra = self.checks(&config);
        let mut engine = ScreeningEngine::new(config);
        for check in extra {
            engine.add_check(check);
        }
        engine
    }
}

/// A plugin with a fixed clause set and no extra checks
#[derive(Debug, Clone)]
pub struct StaticWorkspace {
    id: String,
    clauses: ClauseSet,
}

impl StaticWorkspace {
    /// Create a plugin around an already compiled clause set
    pub fn new(id: impl Into<String>, clauses: ClauseSet) -> Self {
        Self {
            id: id.into(),
            clauses,
        }
    }

    /// Load and compile an authoring clause file (JSON)
    pub fn from_clause_file(
        id: impl Into<String>,
        path: impl AsRef<Path>,
        validate: bool,
    ) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let authoring: Value = serde_json::from_str(&text)?;
        let clauses = transpile_clause_set(&authoring, validate)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), clauses = clauses.clauses.len(), "Loaded clause file");
        Ok(Self::new(id, clauses))
    }
}

impl WorkspacePlugin for StaticWorkspace {
    fn workspace_id(&self) -> &str {
        &self.id
    }

    fn clause_set(&self) -> ClauseSet {
        self.clauses.clone()
    }
}

/// Plugins keyed by workspace id
#[derive(Default)]
pub struct WorkspaceRegistry {
    plugins: BTreeMap<String, Arc<dyn WorkspacePlugin>>,
}

impl WorkspaceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding one [`StaticWorkspace`] for the configured
    /// workspace, with clauses from `clauses_path` when set
    pub fn from_config(config: &AdjudicaConfig) -> Result<Self, PipelineError> {
        let plugin = match &config.clauses_path {
            Some(path) => StaticWorkspace::from_clause_file(
                config.workspace_id.clone(),
                path,
                config.rules.validate_on_load,
            )?,
            None => StaticWorkspace::new(config.workspace_id.clone(), ClauseSet::default()),
        };
        let mut registry = Self::new();
        registry.register(Arc::new(plugin))?;
        Ok(registry)
    }

    /// Register a plugin; ids must be unique
    pub fn register(&mut self, plugin: Arc<dyn WorkspacePlugin>) -> Result<(), PipelineError> {
        let id = plugin.workspace_id().to_string();
        if self.plugins.contains_key(&id) {
            return Err(PipelineError::Registry(format!(
                "workspace '{}' is already registered",
                id
            )));
        }
        info!(workspace_id = %id, "Registered workspace");
        self.plugins.insert(id, plugin);
        Ok(())
    }

    /// Register a plugin (builder style)
    pub fn with(mut self, plugin: Arc<dyn WorkspacePlugin>) -> Result<Self, PipelineError> {
        self.register(plugin)?;
        Ok(self)
    }

    /// Look up a plugin
    pub fn get(&self, workspace_id: &str) -> Result<Arc<dyn WorkspacePlugin>, PipelineError> {
        self.plugins
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| PipelineError::Registry(format!("unknown workspace '{}'", workspace_id)))
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Number of plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugin is registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjudica_screening::{CheckContext, CheckOutcome, ScreeningError};
    use serde_json::json;

    struct AlwaysFail;

    impl Check for AlwaysFail {
        fn id(&self) -> &str {
            "3"
        }
        fn name(&self) -> &str {
            "mileage_compliance"
        }
        fn is_hard_fail(&self) -> bool {
            true
        }
        fn run(&self, _ctx: &CheckContext<'_>) -> Result<CheckOutcome, ScreeningError> {
            Ok(CheckOutcome::fail("odometer over limit"))
        }
    }

    struct Motor;

    impl WorkspacePlugin for Motor {
        fn workspace_id(&self) -> &str {
            "motor"
        }
        fn checks(&self, _config: &ScreeningConfig) -> Vec<Box<dyn Check>> {
            vec![Box::new(AlwaysFail)]
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = WorkspaceRegistry::new()
            .with(Arc::new(Motor))
            .unwrap()
            .with(Arc::new(StaticWorkspace::new("home", ClauseSet::default())))
            .unwrap();

        assert_eq!(registry.ids(), vec!["home", "motor"]);
        assert_eq!(registry.get("motor").unwrap().workspace_id(), "motor");
        assert!(matches!(registry.get("travel"), Err(PipelineError::Registry(_))));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = WorkspaceRegistry::new();
        registry.register(Arc::new(Motor)).unwrap();
        assert!(matches!(
            registry.register(Arc::new(Motor)),
            Err(PipelineError::Registry(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_plugin_check_replaces_builtin_in_place() {
        let builtin = ScreeningEngine::new(ScreeningConfig::default());
        let engine = Motor.screening_engine(&ScreeningConfig::default());
        assert_eq!(engine.check_ids(), builtin.check_ids());
    }

    #[test]
    fn test_from_config_loads_clause_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clauses.json");
        std::fs::write(
            &path,
            json!({
                "policy_id": "MW-1",
                "version": "2025",
                "clauses": [{
                    "clause_id": "C-1",
                    "clause_type": "condition",
                    "logic": {"operator": "==", "arguments": [1, 1]}
                }]
            })
            .to_string(),
        )
        .unwrap();

        let config = AdjudicaConfig {
            workspace_id: "motor".to_string(),
            clauses_path: Some(path),
            ..Default::default()
        };
        let registry = WorkspaceRegistry::from_config(&config).unwrap();
        let set = registry.get("motor").unwrap().clause_set();
        assert_eq!(set.policy_id, "MW-1");
        assert_eq!(set.clauses[0].logic, json!({"==": [1, 1]}));
    }
}
