//! Prelude module for convenient imports
//!
//! ```rust
//! use stat_engine::prelude::*;
//! ```

// Core types
pub use crate::controller::{StatAccess, StatController};
pub use crate::modifier::{StatModifier, StatModifierFactory};
pub use crate::types::{ModifierType, SourceId, StatEvent};

// Persistence
pub use crate::persistence::{StatDataStore, StatModifierSaveData};

// Config
pub use crate::config::{default_stat_config, StatConfig};
pub use crate::modifier::ModifierRegistry;

pub use crate::error::StatError;
