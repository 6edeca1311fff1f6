//! Stat layout and storage configuration

use super::presets::validate_presets;
use super::ConfigError;
use crate::controller::StatController;
use crate::modifier::{ModifierPreset, ModifierRegistry};
use crate::persistence::StatDataStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Initial values of one stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub id: String,
    /// Ceiling for the current value; uncapped when absent
    #[serde(default)]
    pub base: Option<f64>,
    /// Starting value; defaults to `base`, or 0 without one
    #[serde(default)]
    pub current: Option<f64>,
}

impl StatDefinition {
    pub fn initial_value(&self) -> f64 {
        self.current.or(self.base).unwrap_or(0.0)
    }
}

/// Where save files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("saves")
}

/// Full engine configuration: storage, stat layout and modifier presets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub stats: Vec<StatDefinition>,
    #[serde(default)]
    pub modifiers: Vec<ModifierPreset>,
}

impl StatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for stat in &self.stats {
            if !seen.insert(stat.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate stat '{}'",
                    stat.id
                )));
            }
            if let (Some(base), Some(current)) = (stat.base, stat.current) {
                if current > base {
                    return Err(ConfigError::ValidationError(format!(
                        "stat '{}' starts at {} above its base {}",
                        stat.id, current, base
                    )));
                }
            }
        }
        validate_presets(&self.modifiers)
    }

    /// Controller seeded with the configured stats
    pub fn build_controller(&self) -> StatController {
        StatController::from_definitions(&self.stats)
    }

    pub fn registry(&self) -> ModifierRegistry {
        self.modifiers.iter().cloned().collect()
    }

    pub fn store(&self) -> StatDataStore {
        StatDataStore::new(self.storage.data_dir.clone())
    }
}

/// Load and validate a configuration file
pub fn load_stat_config(path: &Path) -> Result<StatConfig, ConfigError> {
    let config: StatConfig = super::load_toml(path)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate configuration from a TOML string
pub fn parse_stat_config(content: &str) -> Result<StatConfig, ConfigError> {
    let config: StatConfig = super::parse_toml(content)?;
    config.validate()?;
    Ok(config)
}

/// Bundled default configuration
pub fn default_stat_config() -> StatConfig {
    let toml = include_str!("../../config/stats.toml");
    parse_stat_config(toml).unwrap_or_else(|e| {
        warn!("bundled stat config is invalid: {}", e);
        fallback_stat_config()
    })
}

/// Built-in equivalent of the bundled file
fn fallback_stat_config() -> StatConfig {
    let stat = |id: &str, base: Option<f64>, current: Option<f64>| StatDefinition {
        id: id.to_string(),
        base,
        current,
    };
    StatConfig {
        stats: vec![
            stat("hp", Some(100.0), None),
            stat("mana", Some(50.0), Some(20.0)),
            stat("speed", None, Some(5.0)),
        ],
        modifiers: ModifierRegistry::with_defaults().presets().cloned().collect(),
        ..StatConfig::default()
    }
}
