//! Reconstruction of modifiers from save records

use super::StatModifier;
use crate::error::StatError;
use crate::persistence::StatModifierSaveData;
use crate::types::ModifierType;

/// Builds concrete modifiers from flat save records
pub struct StatModifierFactory;

impl StatModifierFactory {
    /// Rebuild a modifier, restoring its elapsed time for time-based types.
    ///
    /// Fails on a type code this build does not recognise; callers should abort
    /// the load rather than skip the record.
    pub fn from_save_data(record: &StatModifierSaveData) -> Result<StatModifier, StatError> {
        let modifier_type = ModifierType::try_from(record.modifier_type)?;
        let source_id = record.source_id;

        let modifier = match modifier_type {
            ModifierType::Flat => StatModifier::flat(record.stat_id.clone(), record.value, source_id),
            ModifierType::Percent => StatModifier::new(
                record.stat_id.clone(),
                source_id,
                ModifierType::Percent,
                record.value,
                record.duration,
            )
            .with_elapsed(record.elapsed),
            ModifierType::OverTime => StatModifier::over_time(
                record.stat_id.clone(),
                record.value,
                record.duration,
                source_id,
            )
            .with_elapsed(record.elapsed),
            ModifierType::PercentOverTime => StatModifier::percent_over_time(
                record.stat_id.clone(),
                record.value,
                record.duration,
                source_id,
            )
            .with_elapsed(record.elapsed),
            // Restored un-held: the value is re-applied on the next tick
            ModifierType::FlatOverTime => StatModifier::flat_over_time(
                record.stat_id.clone(),
                record.value,
                record.duration,
                source_id,
            )
            .with_elapsed(record.elapsed),
        };

        Ok(modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceId;

    fn record(modifier_type: i32) -> StatModifierSaveData {
        StatModifierSaveData {
            stat_id: "hp".to_string(),
            source_id: SourceId::new(),
            modifier_type,
            value: -20.0,
            duration: 5.0,
            elapsed: 2.0,
        }
    }

    #[test]
    fn test_restores_elapsed_for_over_time() {
        let data = record(ModifierType::OverTime.code());
        let modifier = StatModifierFactory::from_save_data(&data).unwrap();

        assert_eq!(modifier.modifier_type, ModifierType::OverTime);
        assert_eq!(modifier.source_id, data.source_id);
        assert!((modifier.elapsed() - 2.0).abs() < f64::EPSILON);
        assert!((modifier.remaining() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flat_ignores_duration() {
        let modifier = StatModifierFactory::from_save_data(&record(0)).unwrap();
        assert!(modifier.is_instant());
        assert_eq!(modifier.duration, 0.0);
    }

    #[test]
    fn test_flat_over_time_restored_unheld() {
        let modifier = StatModifierFactory::from_save_data(&record(4)).unwrap();
        assert_eq!(modifier.modifier_type, ModifierType::FlatOverTime);
        assert!(!modifier.is_holding());
        assert!(!modifier.is_expired());
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let err = StatModifierFactory::from_save_data(&record(9)).unwrap_err();
        assert!(matches!(err, StatError::UnsupportedModifierType(9)));
    }
}
