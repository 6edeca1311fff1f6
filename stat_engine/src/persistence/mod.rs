//! Save records for active modifiers and their on-disk store

mod store;

pub use store::StatDataStore;

use crate::modifier::StatModifier;
use crate::types::SourceId;
use serde::{Deserialize, Serialize};

/// Flat record of one active modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatModifierSaveData {
    pub stat_id: String,
    pub source_id: SourceId,
    /// Integer code of a `ModifierType`; kept raw so unknown codes surface at reconstruction
    pub modifier_type: i32,
    pub value: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub elapsed: f64,
}

impl From<&StatModifier> for StatModifierSaveData {
    fn from(modifier: &StatModifier) -> Self {
        StatModifierSaveData {
            stat_id: modifier.stat_id.clone(),
            source_id: modifier.source_id,
            modifier_type: modifier.modifier_type.code(),
            value: modifier.value,
            duration: modifier.duration,
            elapsed: modifier.elapsed(),
        }
    }
}

/// Save file envelope: every active modifier of one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectStatSaveData {
    pub object_id: String,
    #[serde(default)]
    pub modifiers: Vec<StatModifierSaveData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModifierType;

    #[test]
    fn test_record_field_names() {
        let modifier = StatModifier::over_time("hp", -20.0, 5.0, SourceId::new()).with_elapsed(1.5);
        let record = StatModifierSaveData::from(&modifier);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["StatId"], "hp");
        assert_eq!(json["SourceId"], modifier.source_id.to_string());
        assert_eq!(json["ModifierType"], ModifierType::OverTime.code());
        assert_eq!(json["Value"], -20.0);
        assert_eq!(json["Duration"], 5.0);
        assert_eq!(json["Elapsed"], 1.5);
    }

    #[test]
    fn test_envelope_parses_without_modifiers() {
        let envelope: ObjectStatSaveData = serde_json::from_str(r#"{"ObjectId": "npc_7"}"#).unwrap();
        assert_eq!(envelope.object_id, "npc_7");
        assert!(envelope.modifiers.is_empty());
    }
}
