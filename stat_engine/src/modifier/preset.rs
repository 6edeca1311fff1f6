//! Named modifier templates from design data

use super::StatModifier;
use crate::types::{ModifierType, SourceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template for a modifier, instantiated once per gameplay effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierPreset {
    /// Unique identifier (e.g., "poison", "regen", "haste")
    pub id: String,
    /// Target stat
    pub stat: String,
    #[serde(rename = "type")]
    pub modifier_type: ModifierType,
    pub value: f64,
    /// Seconds; omitted for instantaneous effects
    #[serde(default)]
    pub duration: f64,
}

impl ModifierPreset {
    /// Build a live modifier attributed to `source_id`
    pub fn instantiate(&self, source_id: SourceId) -> StatModifier {
        StatModifier::new(
            self.stat.clone(),
            source_id,
            self.modifier_type,
            self.value,
            self.duration,
        )
    }
}

/// Modifier presets keyed by id
#[derive(Debug, Clone, Default)]
pub struct ModifierRegistry {
    presets: HashMap<String, ModifierPreset>,
}

impl ModifierRegistry {
    pub fn new() -> Self {
        ModifierRegistry {
            presets: HashMap::new(),
        }
    }

    /// Register a preset, replacing any preset with the same id
    pub fn register(&mut self, preset: ModifierPreset) {
        self.presets.insert(preset.id.clone(), preset);
    }

    pub fn get(&self, id: &str) -> Option<&ModifierPreset> {
        self.presets.get(id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn presets(&self) -> impl Iterator<Item = &ModifierPreset> {
        self.presets.values()
    }

    /// Instantiate the preset `id`, or `None` if it is not registered
    pub fn instantiate(&self, id: &str, source_id: SourceId) -> Option<StatModifier> {
        self.get(id).map(|preset| preset.instantiate(source_id))
    }

    /// A handful of common effects
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Chip damage on life
        registry.register(ModifierPreset {
            id: "strike".to_string(),
            stat: "hp".to_string(),
            modifier_type: ModifierType::Flat,
            value: -30.0,
            duration: 0.0,
        });

        // Instant heal for a quarter of max life
        registry.register(ModifierPreset {
            id: "potion".to_string(),
            stat: "hp".to_string(),
            modifier_type: ModifierType::Percent,
            value: 25.0,
            duration: 0.0,
        });

        registry.register(ModifierPreset {
            id: "poison".to_string(),
            stat: "hp".to_string(),
            modifier_type: ModifierType::OverTime,
            value: -20.0,
            duration: 5.0,
        });

        // Heal 30% of max life over 6 seconds
        registry.register(ModifierPreset {
            id: "regen".to_string(),
            stat: "hp".to_string(),
            modifier_type: ModifierType::PercentOverTime,
            value: 30.0,
            duration: 6.0,
        });

        registry.register(ModifierPreset {
            id: "mana_surge".to_string(),
            stat: "mana".to_string(),
            modifier_type: ModifierType::OverTime,
            value: 15.0,
            duration: 3.0,
        });

        registry.register(ModifierPreset {
            id: "haste".to_string(),
            stat: "speed".to_string(),
            modifier_type: ModifierType::FlatOverTime,
            value: 2.0,
            duration: 8.0,
        });

        registry
    }
}

impl FromIterator<ModifierPreset> for ModifierRegistry {
    fn from_iter<I: IntoIterator<Item = ModifierPreset>>(iter: I) -> Self {
        let mut registry = Self::new();
        for preset in iter {
            registry.register(preset);
        }
        registry
    }
}
