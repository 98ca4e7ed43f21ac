use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::roster::cloner::DEFAULT_CLONE_SUFFIX;
use crate::core::roster::distribution::{DistributionTable, TargetSetting};
use crate::core::roster::errors::{Result, RosterError};

/// Distribution table used when no configuration overrides it.
pub const DEFAULT_DISTRIBUTION_CSV: &str = "EditorID,Count,Rename\nLCharWorkshopNPC,1360,Y";

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Global seed mixed into every per-entity random stream.
    pub seed: u32,
    /// Infix of clone identifiers: `<template>_<suffix><n>`.
    pub clone_suffix: String,
    /// Minimum seconds between progress lines while cloning.
    pub progress_interval_secs: u64,
    pub distribution: DistributionConfig,
    pub names: NamesConfig,
}

/// Which collections to grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Tabular `EditorID,Count[,Rename]` text.
    pub csv: Option<String>,
    /// Direct mapping, applied after the tabular rows.
    pub targets: IndexMap<String, TargetSetting>,
}

/// Name-table text. `None` selects the bundled table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    pub male: Option<String>,
    pub female: Option<String>,
    pub family: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            clone_suffix: DEFAULT_CLONE_SUFFIX.to_string(),
            progress_interval_secs: 5,
            distribution: DistributionConfig::default(),
            names: NamesConfig::default(),
        }
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            csv: Some(DEFAULT_DISTRIBUTION_CSV.to_string()),
            targets: IndexMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| RosterError::io(path, source))?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from `~/.config/cast-of-thousands/config.toml`.
    /// Returns `Default` if the file is missing or unusable.
    pub fn load_or_default() -> Self {
        let config_path = Self::config_path();
        if !config_path.exists() {
            log::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to load config at {}: {e}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        let suffix = self.clone_suffix.trim();
        if suffix.is_empty() {
            return Err(RosterError::invalid_config("clone_suffix must not be empty"));
        }
        if suffix.chars().any(|c| c.is_whitespace()) {
            return Err(RosterError::invalid_config(format!(
                "clone_suffix '{}' must not contain whitespace",
                self.clone_suffix
            )));
        }
        Ok(())
    }

    /// Build the distribution table: tabular rows first, then mapping entries.
    pub fn distribution_table(&self) -> DistributionTable {
        let mut table = DistributionTable::new();
        if let Some(csv) = &self.distribution.csv {
            table.extend_csv(csv);
        }
        table.extend_mapping(&self.distribution.targets);
        table
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("cast-of-thousands").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
