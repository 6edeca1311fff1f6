//! stat_engine - Stat and modifier engine for game entities
//!
//! This library provides:
//! - StatController: one entity's stat values, base caps and active modifiers
//! - StatModifier: flat, percent and over-time effects on a single stat
//! - StatModifierFactory: modifiers rebuilt from save records
//! - StatDataStore: per-object JSON save files
//! - Config: stat layouts and modifier presets from TOML
//!
//! ```rust
//! use stat_engine::{SourceId, StatController, StatModifier};
//!
//! let mut controller = StatController::new();
//! controller.link_base_stat("hp", 100.0);
//! controller.link_stat("hp", 100.0);
//!
//! controller.add_modifier(StatModifier::flat("hp", -30.0, SourceId::new()));
//! controller.add_modifier(StatModifier::over_time("hp", -20.0, 5.0, SourceId::new()));
//! for _ in 0..5 {
//!     controller.tick(1.0);
//! }
//!
//! assert!((controller.get_stat("hp") - 50.0).abs() < 1e-6);
//! assert!(!controller.has_over_time_modifier("hp"));
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod modifier;
pub mod persistence;
pub mod prelude;
pub mod types;

// Re-export core types for convenience
pub use config::{default_stat_config, ConfigError, StatConfig, StatDefinition};
pub use controller::{ListenerId, StatAccess, StatController};
pub use error::{StatError, StatResult};
pub use modifier::{
    ModifierPreset, ModifierProgress, ModifierRegistry, StatModifier, StatModifierFactory,
};
pub use persistence::{ObjectStatSaveData, StatDataStore, StatModifierSaveData};
pub use types::{ModifierType, SourceId, StatEvent};
