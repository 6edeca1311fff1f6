//! StatController - Stat values and active modifiers of a single entity

mod observers;

pub use observers::{ListenerId, StatListener, StatObservers};

use crate::config::StatDefinition;
use crate::error::StatError;
use crate::modifier::{StatModifier, StatModifierFactory};
use crate::persistence::{StatDataStore, StatModifierSaveData};
use crate::types::{SourceId, StatEvent};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Read/modify access to stats, as seen by a modifier while it applies
pub trait StatAccess {
    /// Current value, 0 if the stat is unknown
    fn get_stat(&self, stat_id: &str) -> f64;

    /// Base (ceiling) value, 0 if none is linked
    fn get_base_value(&self, stat_id: &str) -> f64;

    /// Change a stat by `delta`, returning the change actually applied
    fn modify_stat(&mut self, stat_id: &str, delta: f64, suppress_event: bool) -> f64;
}

/// Owns one entity's stats and time-based modifiers and is the only place
/// their values change.
///
/// The host calls [`tick`](Self::tick) once per simulation step.
#[derive(Debug, Default)]
pub struct StatController {
    stats: HashMap<String, f64>,
    base_stats: HashMap<String, f64>,
    /// Fractional change not yet reported to listeners, per stat
    pending_deltas: HashMap<String, f64>,
    modifiers: Vec<StatModifier>,
    /// Number of active over-time modifiers per stat
    over_time_counts: HashMap<String, u32>,
    observers: StatObservers,
}

impl StatController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller seeded from design data
    pub fn from_definitions(definitions: &[StatDefinition]) -> Self {
        let mut controller = Self::new();
        for definition in definitions {
            if let Some(base) = definition.base {
                controller.link_base_stat(definition.id.clone(), base);
            }
            controller.link_stat(definition.id.clone(), definition.initial_value());
        }
        controller
    }

    // === Stat values ===

    /// Register or overwrite the current value of a stat
    pub fn link_stat(&mut self, stat_id: impl Into<String>, value: f64) {
        self.stats.insert(stat_id.into(), value);
    }

    /// Register or overwrite the base value that caps a stat
    pub fn link_base_stat(&mut self, stat_id: impl Into<String>, value: f64) {
        self.base_stats.insert(stat_id.into(), value);
    }

    pub fn get_stat(&self, stat_id: &str) -> f64 {
        self.stats.get(stat_id).copied().unwrap_or(0.0)
    }

    pub fn get_base_value(&self, stat_id: &str) -> f64 {
        self.base_stats.get(stat_id).copied().unwrap_or(0.0)
    }

    pub fn has_stat(&self, stat_id: &str) -> bool {
        self.stats.contains_key(stat_id)
    }

    pub fn stat_ids(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(String::as_str)
    }

    /// Add `delta` to a stat, capped at its base value if one is linked.
    ///
    /// Unknown stats are created with `delta` as their value. Listeners receive
    /// the change in whole units only; the fractional remainder is carried to
    /// the next call. Suppressed changes neither notify nor touch the carry.
    ///
    /// Returns the change actually applied after capping.
    pub fn modify_stat(&mut self, stat_id: &str, delta: f64, suppress_event: bool) -> f64 {
        let cap = self.base_stats.get(stat_id).copied();
        let capped = |value: f64| match cap {
            Some(base) => value.min(base),
            None => value,
        };

        let actual = match self.stats.get_mut(stat_id) {
            Some(current) => {
                let before = *current;
                *current = capped(before + delta);
                *current - before
            }
            None => {
                let value = capped(delta);
                self.stats.insert(stat_id.to_string(), value);
                value
            }
        };

        if !suppress_event {
            self.report_delta(stat_id, actual);
        }
        actual
    }

    fn report_delta(&mut self, stat_id: &str, delta: f64) {
        let pending = self.pending_deltas.entry(stat_id.to_string()).or_insert(0.0);
        *pending += delta;

        let whole = pending.floor();
        if whole != 0.0 {
            *pending -= whole;
            self.observers.notify(&StatEvent::Modified {
                stat_id: stat_id.to_string(),
                delta: whole as i64,
            });
        }
    }

    // === Modifiers ===

    /// Apply or start a modifier.
    ///
    /// Instantaneous modifiers apply at once and are dropped. Anything else
    /// joins the active list; listeners get one `Modified` event previewing
    /// its whole effect, since the per-tick changes are silent.
    pub fn add_modifier(&mut self, mut modifier: StatModifier) {
        if modifier.is_instant() {
            debug!(
                stat = %modifier.stat_id,
                source = %modifier.source_id,
                kind = ?modifier.modifier_type,
                value = modifier.value,
                "applying instant modifier"
            );
            modifier.apply(self, 0.0);
            return;
        }
        if modifier.is_expired() {
            debug!(
                stat = %modifier.stat_id,
                source = %modifier.source_id,
                "dropping modifier with no duration left"
            );
            return;
        }

        let preview = modifier.total_effect(&*self).floor();
        if preview != 0.0 {
            self.observers.notify(&StatEvent::Modified {
                stat_id: modifier.stat_id.clone(),
                delta: preview as i64,
            });
        }

        debug!(
            stat = %modifier.stat_id,
            source = %modifier.source_id,
            kind = ?modifier.modifier_type,
            value = modifier.value,
            duration = modifier.duration,
            "starting over-time modifier"
        );
        self.activate(modifier);
    }

    fn activate(&mut self, modifier: StatModifier) {
        self.begin_over_time(&modifier.stat_id);
        self.modifiers.push(modifier);
    }

    fn begin_over_time(&mut self, stat_id: &str) {
        let count = self.over_time_counts.entry(stat_id.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.observers.notify(&StatEvent::OverTimeActiveChanged {
                stat_id: stat_id.to_string(),
                active: true,
            });
        }
    }

    fn end_over_time(&mut self, stat_id: &str) {
        let Some(count) = self.over_time_counts.get_mut(stat_id) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.over_time_counts.remove(stat_id);
            self.observers.notify(&StatEvent::OverTimeActiveChanged {
                stat_id: stat_id.to_string(),
                active: false,
            });
        }
    }

    /// Advance every active modifier by `delta_time` seconds and drop the expired ones
    pub fn tick(&mut self, delta_time: f64) {
        let mut active = std::mem::take(&mut self.modifiers);

        // Reverse order so removal does not shift unvisited entries
        for index in (0..active.len()).rev() {
            let progress = active[index].apply(self, delta_time);
            if progress.expired {
                let expired = active.remove(index);
                debug!(
                    stat = %expired.stat_id,
                    source = %expired.source_id,
                    elapsed = progress.elapsed,
                    "over-time modifier expired"
                );
                self.end_over_time(&expired.stat_id);
            }
        }

        self.modifiers = active;
    }

    /// Remove every active modifier that came from `source_id`.
    ///
    /// A FlatOverTime modifier gives back the value it holds; drip effects keep
    /// what they already delivered. Returns the number removed.
    pub fn remove_modifiers_from_source(&mut self, source_id: SourceId) -> usize {
        let mut active = std::mem::take(&mut self.modifiers);
        let mut removed = 0;

        for index in (0..active.len()).rev() {
            if active[index].source_id == source_id {
                let mut modifier = active.remove(index);
                modifier.release(self);
                self.end_over_time(&modifier.stat_id);
                removed += 1;
            }
        }

        self.modifiers = active;
        if removed > 0 {
            debug!(source = %source_id, removed, "removed modifiers by source");
        }
        removed
    }

    pub fn has_over_time_modifier(&self, stat_id: &str) -> bool {
        self.over_time_count(stat_id) > 0
    }

    /// Number of active over-time modifiers on a stat
    pub fn over_time_count(&self, stat_id: &str) -> u32 {
        self.over_time_counts.get(stat_id).copied().unwrap_or(0)
    }

    pub fn active_modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    // === Events ===

    /// Listen to events of one stat
    pub fn subscribe(
        &mut self,
        stat_id: impl Into<String>,
        listener: impl FnMut(&StatEvent) + 'static,
    ) -> ListenerId {
        self.observers.subscribe(stat_id, Box::new(listener))
    }

    /// Listen to events of every stat
    pub fn subscribe_all(&mut self, listener: impl FnMut(&StatEvent) + 'static) -> ListenerId {
        self.observers.subscribe_all(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }

    // === Persistence ===

    /// One save record per active modifier
    pub fn export_save_data(&self) -> Vec<StatModifierSaveData> {
        self.modifiers.iter().map(StatModifierSaveData::from).collect()
    }

    /// Rebuild modifiers from save records and append them to the active list.
    ///
    /// All records are reconstructed before any is restored, so an unknown
    /// modifier type leaves the controller untouched. Restoring fires
    /// activation events but no preview. Returns the number restored.
    pub fn import_save_data(&mut self, records: &[StatModifierSaveData]) -> Result<usize, StatError> {
        let rebuilt = records
            .iter()
            .map(StatModifierFactory::from_save_data)
            .collect::<Result<Vec<_>, _>>()?;

        let mut restored = 0;
        for modifier in rebuilt {
            if modifier.is_instant() {
                warn!(
                    stat = %modifier.stat_id,
                    source = %modifier.source_id,
                    kind = ?modifier.modifier_type,
                    "skipping instantaneous modifier in save data"
                );
                continue;
            }
            if modifier.is_expired() {
                debug!(stat = %modifier.stat_id, source = %modifier.source_id, "skipping expired modifier in save data");
                continue;
            }
            debug!(
                stat = %modifier.stat_id,
                source = %modifier.source_id,
                elapsed = modifier.elapsed(),
                "restoring modifier"
            );
            self.activate(modifier);
            restored += 1;
        }
        Ok(restored)
    }

    /// Persist the active modifiers under `object_id`
    pub fn save(&self, store: &StatDataStore, object_id: &str) -> Result<(), StatError> {
        store.save_to_disk(object_id, &self.export_save_data())
    }

    /// Restore modifiers saved under `object_id`. Returns 0 when nothing was saved.
    pub fn load(&mut self, store: &StatDataStore, object_id: &str) -> Result<usize, StatError> {
        match store.load_from_disk(object_id)? {
            Some(records) => self.import_save_data(&records),
            None => Ok(0),
        }
    }
}

impl StatAccess for StatController {
    fn get_stat(&self, stat_id: &str) -> f64 {
        StatController::get_stat(self, stat_id)
    }

    fn get_base_value(&self, stat_id: &str) -> f64 {
        StatController::get_base_value(self, stat_id)
    }

    fn modify_stat(&mut self, stat_id: &str, delta: f64, suppress_event: bool) -> f64 {
        StatController::modify_stat(self, stat_id, delta, suppress_event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModifierType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record_events(controller: &mut StatController) -> Rc<RefCell<Vec<StatEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        controller.subscribe_all(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    fn hp_controller() -> StatController {
        let mut controller = StatController::new();
        controller.link_base_stat("hp", 100.0);
        controller.link_stat("hp", 100.0);
        controller
    }

    fn modified(stat_id: &str, delta: i64) -> StatEvent {
        StatEvent::Modified {
            stat_id: stat_id.to_string(),
            delta,
        }
    }

    fn active_changed(stat_id: &str, active: bool) -> StatEvent {
        StatEvent::OverTimeActiveChanged {
            stat_id: stat_id.to_string(),
            active,
        }
    }

    #[test]
    fn test_missing_stat_reads_zero() {
        let controller = StatController::new();
        assert_eq!(controller.get_stat("nothing"), 0.0);
        assert_eq!(controller.get_base_value("nothing"), 0.0);
    }

    #[test]
    fn test_modify_clamps_to_base() {
        let mut controller = hp_controller();
        controller.modify_stat("hp", -40.0, false);
        let applied = controller.modify_stat("hp", 70.0, false);

        assert!((applied - 40.0).abs() < f64::EPSILON);
        assert!((controller.get_stat("hp") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_modify_unknown_stat_creates_it() {
        let mut controller = StatController::new();
        controller.link_base_stat("shield", 25.0);
        let events = record_events(&mut controller);

        controller.modify_stat("shield", 40.5, false);
        assert!((controller.get_stat("shield") - 25.0).abs() < f64::EPSILON);

        controller.modify_stat("rage", 3.7, false);
        assert!((controller.get_stat("rage") - 3.7).abs() < f64::EPSILON);

        assert_eq!(*events.borrow(), vec![modified("shield", 25), modified("rage", 3)]);
    }

    #[test]
    fn test_fractional_deltas_reported_in_whole_units() {
        let mut controller = StatController::new();
        controller.link_stat("mana", 0.0);
        let events = record_events(&mut controller);

        controller.modify_stat("mana", 0.4, false);
        controller.modify_stat("mana", 0.4, false);
        assert!(events.borrow().is_empty());

        controller.modify_stat("mana", 0.4, false);
        assert_eq!(*events.borrow(), vec![modified("mana", 1)]);

        // 0.2 carried over; 0.9 more makes another whole unit
        controller.modify_stat("mana", 0.9, false);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_suppressed_modify_never_notifies() {
        let mut controller = hp_controller();
        let events = record_events(&mut controller);

        controller.modify_stat("hp", -55.0, true);
        controller.modify_stat("new_stat", 10.0, true);
        assert!(events.borrow().is_empty());
        assert!((controller.get_stat("hp") - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flat_modifier_is_never_stored() {
        let mut controller = hp_controller();
        controller.add_modifier(StatModifier::flat("hp", -30.0, SourceId::new()));

        assert!(controller.active_modifiers().is_empty());
        assert!((controller.get_stat("hp") - 70.0).abs() < f64::EPSILON);
        assert!(!controller.has_over_time_modifier("hp"));
    }

    #[test]
    fn test_instant_percent_modifier() {
        let mut controller = StatController::new();
        controller.link_base_stat("mana", 200.0);
        controller.link_stat("mana", 100.0);
        controller.add_modifier(StatModifier::percent("mana", 25.0, SourceId::new()));

        assert!(controller.active_modifiers().is_empty());
        assert!((controller.get_stat("mana") - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_over_time_preview_and_activation_events() {
        let mut controller = hp_controller();
        let events = record_events(&mut controller);

        controller.add_modifier(StatModifier::over_time("hp", -20.0, 5.0, SourceId::new()));
        assert_eq!(
            *events.borrow(),
            vec![modified("hp", -20), active_changed("hp", true)]
        );
        assert_eq!(controller.active_modifiers().len(), 1);
        assert!(controller.has_over_time_modifier("hp"));
    }

    #[test]
    fn test_percent_over_time_preview_uses_base() {
        let mut controller = hp_controller();
        let events = record_events(&mut controller);

        controller.add_modifier(StatModifier::percent_over_time("hp", 15.0, 3.0, SourceId::new()));
        assert_eq!(events.borrow()[0], modified("hp", 15));
    }

    #[test]
    fn test_activation_fires_once_per_transition() {
        let mut controller = hp_controller();
        controller.link_stat("hp", 50.0);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        controller.subscribe("hp", move |e| {
            if let StatEvent::OverTimeActiveChanged { active, .. } = e {
                sink.borrow_mut().push(*active);
            }
        });

        controller.add_modifier(StatModifier::over_time("hp", 10.0, 1.0, SourceId::new()));
        controller.add_modifier(StatModifier::over_time("hp", 10.0, 3.0, SourceId::new()));
        assert_eq!(controller.over_time_count("hp"), 2);

        controller.tick(1.0);
        assert_eq!(controller.over_time_count("hp"), 1);
        assert_eq!(*events.borrow(), vec![true]);

        controller.tick(2.0);
        assert_eq!(controller.over_time_count("hp"), 0);
        assert_eq!(*events.borrow(), vec![true, false]);
        assert!(controller.active_modifiers().is_empty());
    }

    #[test]
    fn test_tick_is_silent_for_over_time() {
        let mut controller = hp_controller();
        controller.add_modifier(StatModifier::over_time("hp", -50.0, 5.0, SourceId::new()));
        let events = record_events(&mut controller);

        for _ in 0..4 {
            controller.tick(1.0);
        }
        assert!(events.borrow().is_empty());
        assert!((controller.get_stat("hp") - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_over_time_round_trip_on_stat() {
        let mut controller = StatController::new();
        controller.link_stat("speed", 5.0);
        controller.add_modifier(StatModifier::flat_over_time("speed", 3.0, 2.0, SourceId::new()));

        controller.tick(0.5);
        assert!((controller.get_stat("speed") - 8.0).abs() < f64::EPSILON);
        controller.tick(0.5);
        controller.tick(1.0);
        assert!((controller.get_stat("speed") - 5.0).abs() < f64::EPSILON);
        assert!(controller.active_modifiers().is_empty());
    }

    #[test]
    fn test_zero_duration_flat_over_time_is_dropped() {
        let mut controller = hp_controller();
        let events = record_events(&mut controller);
        controller.add_modifier(StatModifier::flat_over_time("hp", 10.0, 0.0, SourceId::new()));

        assert!(controller.active_modifiers().is_empty());
        assert!(!controller.has_over_time_modifier("hp"));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_sub_epsilon_over_time_applies_immediately() {
        let mut controller = hp_controller();
        let events = record_events(&mut controller);
        controller.add_modifier(StatModifier::over_time("hp", -20.0, 5e-7, SourceId::new()));

        assert!(controller.active_modifiers().is_empty());
        assert!((controller.get_stat("hp") - 80.0).abs() < 1e-9);
        assert_eq!(*events.borrow(), vec![modified("hp", -20)]);
    }

    #[test]
    fn test_remove_modifiers_from_source() {
        let mut controller = StatController::new();
        controller.link_stat("speed", 5.0);
        controller.link_stat("hp", 100.0);
        let haste = SourceId::new();
        let poison = SourceId::new();

        controller.add_modifier(StatModifier::flat_over_time("speed", 3.0, 10.0, haste));
        controller.add_modifier(StatModifier::over_time("hp", -10.0, 10.0, poison));
        controller.tick(1.0);
        assert!((controller.get_stat("speed") - 8.0).abs() < f64::EPSILON);

        let events = record_events(&mut controller);
        assert_eq!(controller.remove_modifiers_from_source(haste), 1);
        assert!((controller.get_stat("speed") - 5.0).abs() < f64::EPSILON);
        assert!(!controller.has_over_time_modifier("speed"));
        assert!(controller.has_over_time_modifier("hp"));
        assert_eq!(*events.borrow(), vec![active_changed("speed", false)]);

        assert_eq!(controller.remove_modifiers_from_source(haste), 0);
    }

    #[test]
    fn test_export_import_save_data() {
        let mut controller = hp_controller();
        controller.add_modifier(StatModifier::over_time("hp", -20.0, 5.0, SourceId::new()));
        controller.add_modifier(StatModifier::new("hp", SourceId::new(), ModifierType::Percent, 10.0, 4.0));
        controller.tick(1.5);

        let records = controller.export_save_data();
        assert_eq!(records.len(), 2);

        let mut restored = hp_controller();
        let events = record_events(&mut restored);
        assert_eq!(restored.import_save_data(&records).unwrap(), 2);
        assert_eq!(restored.export_save_data(), records);
        // Activation only, no preview
        assert_eq!(*events.borrow(), vec![active_changed("hp", true)]);
        assert_eq!(restored.over_time_count("hp"), 2);
    }

    #[test]
    fn test_import_rejects_unknown_type_without_side_effects() {
        let mut controller = hp_controller();
        let known = StatModifierSaveData::from(&StatModifier::over_time(
            "hp",
            -20.0,
            5.0,
            SourceId::new(),
        ));
        let unknown = StatModifierSaveData {
            modifier_type: 17,
            ..known.clone()
        };
        let records = vec![known, unknown];

        let err = controller.import_save_data(&records).unwrap_err();
        assert!(matches!(err, StatError::UnsupportedModifierType(17)));
        assert!(controller.active_modifiers().is_empty());
    }

    #[test]
    fn test_import_skips_instant_and_expired_records() {
        let mut controller = hp_controller();
        let flat = StatModifierSaveData::from(&StatModifier::flat("hp", -5.0, SourceId::new()));
        let done = StatModifierSaveData::from(
            &StatModifier::over_time("hp", -5.0, 2.0, SourceId::new()).with_elapsed(2.0),
        );

        assert_eq!(controller.import_save_data(&[flat, done]).unwrap(), 0);
        assert!((controller.get_stat("hp") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_definitions() {
        let definitions = vec![
            StatDefinition {
                id: "hp".to_string(),
                base: Some(120.0),
                current: None,
            },
            StatDefinition {
                id: "gold".to_string(),
                base: None,
                current: Some(15.0),
            },
        ];
        let controller = StatController::from_definitions(&definitions);

        assert!((controller.get_stat("hp") - 120.0).abs() < f64::EPSILON);
        assert!((controller.get_base_value("hp") - 120.0).abs() < f64::EPSILON);
        assert!((controller.get_stat("gold") - 15.0).abs() < f64::EPSILON);
        assert_eq!(controller.get_base_value("gold"), 0.0);
    }
}
