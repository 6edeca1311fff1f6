//! Modifier preset loading

use super::ConfigError;
use crate::modifier::{ModifierPreset, ModifierRegistry};
use crate::types::ModifierType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for modifier presets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiersConfig {
    #[serde(default)]
    pub modifiers: Vec<ModifierPreset>,
}

/// Load modifier presets from a TOML file
pub fn load_modifier_presets(path: &Path) -> Result<ModifierRegistry, ConfigError> {
    let config: ModifiersConfig = super::load_toml(path)?;
    build_registry(config.modifiers)
}

/// Load modifier presets from a TOML string
pub fn parse_modifier_presets(content: &str) -> Result<ModifierRegistry, ConfigError> {
    let config: ModifiersConfig = super::parse_toml(content)?;
    build_registry(config.modifiers)
}

fn build_registry(presets: Vec<ModifierPreset>) -> Result<ModifierRegistry, ConfigError> {
    validate_presets(&presets)?;
    Ok(presets.into_iter().collect())
}

/// Reject duplicate ids and durations that cannot be ticked
pub(super) fn validate_presets(presets: &[ModifierPreset]) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for preset in presets {
        if !seen.insert(preset.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate modifier preset '{}'",
                preset.id
            )));
        }
        if preset.duration < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "modifier preset '{}' has negative duration {}",
                preset.id, preset.duration
            )));
        }
        let needs_duration = matches!(
            preset.modifier_type,
            ModifierType::OverTime | ModifierType::PercentOverTime | ModifierType::FlatOverTime
        );
        if needs_duration && preset.duration == 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "over-time modifier preset '{}' needs a duration",
                preset.id
            )));
        }
    }
    Ok(())
}
