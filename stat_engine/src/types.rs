//! Core types shared across the engine

use crate::error::StatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of effect a modifier has on its stat
///
/// The numeric codes are part of the save format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierType {
    /// Absolute amount, applied once
    Flat,
    /// Percentage of the base value; over time when it has a duration
    Percent,
    /// Absolute amount spread evenly across the duration
    OverTime,
    /// Percentage of the base value spread evenly across the duration
    PercentOverTime,
    /// Absolute amount held for the duration, then removed
    FlatOverTime,
}

impl ModifierType {
    pub fn all() -> &'static [ModifierType] {
        &[
            ModifierType::Flat,
            ModifierType::Percent,
            ModifierType::OverTime,
            ModifierType::PercentOverTime,
            ModifierType::FlatOverTime,
        ]
    }

    /// Integer code used in save files
    pub fn code(self) -> i32 {
        match self {
            ModifierType::Flat => 0,
            ModifierType::Percent => 1,
            ModifierType::OverTime => 2,
            ModifierType::PercentOverTime => 3,
            ModifierType::FlatOverTime => 4,
        }
    }

    /// Whether the value is a percentage of the stat's base value
    pub fn is_percent(self) -> bool {
        matches!(self, ModifierType::Percent | ModifierType::PercentOverTime)
    }
}

impl TryFrom<i32> for ModifierType {
    type Error = StatError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ModifierType::Flat),
            1 => Ok(ModifierType::Percent),
            2 => Ok(ModifierType::OverTime),
            3 => Ok(ModifierType::PercentOverTime),
            4 => Ok(ModifierType::FlatOverTime),
            other => Err(StatError::UnsupportedModifierType(other)),
        }
    }
}

impl From<ModifierType> for i32 {
    fn from(modifier_type: ModifierType) -> Self {
        modifier_type.code()
    }
}

/// Opaque identifier of the effect that produced a modifier (a skill cast, a buff instance, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub Uuid);

impl SourceId {
    /// Generate a fresh random source id
    pub fn new() -> Self {
        SourceId(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SourceId {
    fn from(id: Uuid) -> Self {
        SourceId(id)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Notification emitted by a `StatController` to its listeners
#[derive(Debug, Clone, PartialEq)]
pub enum StatEvent {
    /// A stat changed by a whole number of units
    Modified { stat_id: String, delta: i64 },
    /// A stat gained its first, or lost its last, over-time modifier
    OverTimeActiveChanged { stat_id: String, active: bool },
}

impl StatEvent {
    /// The stat this event refers to
    pub fn stat_id(&self) -> &str {
        match self {
            StatEvent::Modified { stat_id, .. } => stat_id,
            StatEvent::OverTimeActiveChanged { stat_id, .. } => stat_id,
        }
    }
}
