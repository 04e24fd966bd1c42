//! Configuration management for the CLI.
//!
//! Profiles live in `~/.adjudica/config.toml`; each one points at a
//! pipeline configuration (`adjudica.toml`) and may override its workspace
//! and data directory.

use crate::error::{CliError, Result};
use adjudica_pipeline::AdjudicaConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Pipeline configuration looked up in the working directory
pub const LOCAL_CONFIG: &str = "adjudica.toml";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Workspace profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Pipeline configuration file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,

    /// Workspace id override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,

    /// Data directory override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".adjudica").join("config.toml"))
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a specific file, or default if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }

    /// Resolve the pipeline configuration for a command.
    ///
    /// The file is `explicit` if given, else the active profile's
    /// `config_path`, else `./adjudica.toml` when present; without any file
    /// the defaults apply. Profile overrides are applied last.
    pub fn pipeline_config(&self, explicit: Option<&Path>) -> Result<AdjudicaConfig> {
        let profile = self.profiles.get(&self.active_profile);
        let local = Path::new(LOCAL_CONFIG);

        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| profile.and_then(|p| p.config_path.clone()))
            .or_else(|| local.exists().then(|| local.to_path_buf()));

        let mut config = match path {
            Some(path) => AdjudicaConfig::load(&path)
                .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?,
            None => AdjudicaConfig::default(),
        };

        if let Some(profile) = profile {
            if let Some(workspace_id) = &profile.workspace_id {
                config.workspace_id = workspace_id.clone();
            }
            if let Some(data_dir) = &profile.data_dir {
                config.data_dir = data_dir.clone();
            }
        }
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("default".to_string(), Profile::default());

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.active_profile, "default");
        assert!(config.profiles.contains_key("default"));
        assert!(config.settings.color);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();

        let profile = Profile {
            config_path: Some(PathBuf::from("/etc/adjudica/motor.toml")),
            workspace_id: Some("motor".to_string()),
            data_dir: None,
        };

        config.set_profile("motor".to_string(), profile);
        assert!(config.profiles.contains_key("motor"));

        config.switch_profile("motor".to_string()).unwrap();
        assert_eq!(config.active_profile, "motor");
    }

    #[test]
    fn test_switch_to_nonexistent_profile() {
        let mut config = Config::default();
        let result = config.switch_profile("nonexistent".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".adjudica").join("config.toml");

        let mut config = Config::default();
        config.settings.format = OutputFormat::Json;
        config.set_profile(
            "home".to_string(),
            Profile {
                workspace_id: Some("home".to_string()),
                ..Default::default()
            },
        );
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_pipeline_config_applies_profile_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("adjudica.toml");
        fs::write(&toml_path, "workspace_id = \"motor\"\n[pipeline]\nmax_concurrency = 2\n").unwrap();

        let mut config = Config::default();
        config.set_profile(
            "default".to_string(),
            Profile {
                config_path: Some(toml_path),
                workspace_id: None,
                data_dir: Some(dir.path().join("data")),
            },
        );

        let pipeline = config.pipeline_config(None).unwrap();
        assert_eq!(pipeline.workspace_id, "motor");
        assert_eq!(pipeline.pipeline.max_concurrency, 2);
        assert_eq!(pipeline.data_dir, dir.path().join("data"));
    }
}
