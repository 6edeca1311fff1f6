//! StatModifier - Flat, percent and over-time effects on a single stat

mod factory;
mod preset;

pub use factory::StatModifierFactory;
pub use preset::{ModifierPreset, ModifierRegistry};

use crate::controller::StatAccess;
use crate::types::{ModifierType, SourceId};
use tracing::trace;

/// Slack allowed when comparing elapsed time against duration.
/// Many small frame deltas rarely sum to the duration exactly, so a step that
/// lands within this distance of the end is stretched to finish the modifier.
/// Durations shorter than this are instantaneous.
pub const EXPIRY_EPSILON: f64 = 1e-6;

/// How a modifier delivers its effect, derived from its type and duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Whole effect in a single application
    Instant,
    /// Effect spread linearly over the duration
    Drip,
    /// Whole effect applied up front and removed on expiry
    Hold,
}

/// State reported after applying a modifier for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierProgress {
    /// Seconds accumulated so far
    pub elapsed: f64,
    /// Whether the modifier has finished and should be discarded
    pub expired: bool,
}

/// A value-bearing effect on exactly one stat
#[derive(Debug, Clone, PartialEq)]
pub struct StatModifier {
    /// Target stat
    pub stat_id: String,
    /// Origin of the effect
    pub source_id: SourceId,
    pub modifier_type: ModifierType,
    /// Absolute amount, or percentage points of the base value for percent types
    pub value: f64,
    /// Seconds; zero for instantaneous modifiers
    pub duration: f64,
    elapsed: f64,
    /// FlatOverTime only: the value is currently applied to the stat
    holding: bool,
}

impl StatModifier {
    /// Create a modifier of any type
    pub fn new(
        stat_id: impl Into<String>,
        source_id: SourceId,
        modifier_type: ModifierType,
        value: f64,
        duration: f64,
    ) -> Self {
        StatModifier {
            stat_id: stat_id.into(),
            source_id,
            modifier_type,
            value,
            duration,
            elapsed: 0.0,
            holding: false,
        }
    }

    /// One-shot absolute change
    pub fn flat(stat_id: impl Into<String>, value: f64, source_id: SourceId) -> Self {
        Self::new(stat_id, source_id, ModifierType::Flat, value, 0.0)
    }

    /// One-shot change of `percent`% of the base value
    pub fn percent(stat_id: impl Into<String>, percent: f64, source_id: SourceId) -> Self {
        Self::new(stat_id, source_id, ModifierType::Percent, percent, 0.0)
    }

    /// `value` delivered evenly over `duration` seconds (damage or heal over time)
    pub fn over_time(
        stat_id: impl Into<String>,
        value: f64,
        duration: f64,
        source_id: SourceId,
    ) -> Self {
        Self::new(stat_id, source_id, ModifierType::OverTime, value, duration)
    }

    /// `percent`% of the base value delivered evenly over `duration` seconds
    pub fn percent_over_time(
        stat_id: impl Into<String>,
        percent: f64,
        duration: f64,
        source_id: SourceId,
    ) -> Self {
        Self::new(
            stat_id,
            source_id,
            ModifierType::PercentOverTime,
            percent,
            duration,
        )
    }

    /// Temporary buff/debuff: `value` is added on the first tick and removed on expiry
    pub fn flat_over_time(
        stat_id: impl Into<String>,
        value: f64,
        duration: f64,
        source_id: SourceId,
    ) -> Self {
        Self::new(
            stat_id,
            source_id,
            ModifierType::FlatOverTime,
            value,
            duration,
        )
    }

    /// Resume from a previously recorded elapsed time
    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = elapsed.max(0.0);
        self
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds left before expiry (zero for instantaneous modifiers)
    pub fn remaining(&self) -> f64 {
        match self.delivery() {
            Delivery::Instant => 0.0,
            _ => (self.duration - self.elapsed).max(0.0),
        }
    }

    /// Whether a FlatOverTime modifier currently has its value applied
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    fn delivery(&self) -> Delivery {
        match self.modifier_type {
            ModifierType::Flat => Delivery::Instant,
            ModifierType::Percent | ModifierType::OverTime | ModifierType::PercentOverTime
                if self.duration < EXPIRY_EPSILON =>
            {
                Delivery::Instant
            }
            ModifierType::Percent | ModifierType::OverTime | ModifierType::PercentOverTime => {
                Delivery::Drip
            }
            ModifierType::FlatOverTime => Delivery::Hold,
        }
    }

    /// Applies fully on the first application and is never stored
    pub fn is_instant(&self) -> bool {
        self.delivery() == Delivery::Instant
    }

    /// Lives in the controller's active list until it expires
    pub fn is_over_time(&self) -> bool {
        !self.is_instant()
    }

    pub fn is_expired(&self) -> bool {
        match self.delivery() {
            Delivery::Instant => true,
            Delivery::Drip => self.elapsed >= self.duration,
            Delivery::Hold => !self.holding && self.elapsed >= self.duration,
        }
    }

    /// Total change this modifier makes over its lifetime, resolved against the
    /// target's current base value. For FlatOverTime this is the held amount.
    pub fn total_effect<T: StatAccess + ?Sized>(&self, target: &T) -> f64 {
        if self.modifier_type.is_percent() {
            target.get_base_value(&self.stat_id) * (self.value / 100.0)
        } else {
            self.value
        }
    }

    /// Apply this modifier to `target` for `delta_time` seconds.
    ///
    /// Instantaneous modifiers report their change to listeners. Over-time
    /// modifiers change the stat silently; their aggregate was announced when
    /// they were added. Percent types re-read the base value on every call.
    pub fn apply<T: StatAccess + ?Sized>(
        &mut self,
        target: &mut T,
        delta_time: f64,
    ) -> ModifierProgress {
        match self.delivery() {
            Delivery::Instant => {
                let amount = self.total_effect(&*target);
                target.modify_stat(&self.stat_id, amount, false);
            }
            Delivery::Drip => {
                if !self.is_expired() {
                    let step = self.step(delta_time);
                    if step > 0.0 {
                        let rate = self.total_effect(&*target) / self.duration;
                        target.modify_stat(&self.stat_id, rate * step, true);
                        self.advance(step);
                        trace!(
                            stat = %self.stat_id,
                            amount = rate * step,
                            elapsed = self.elapsed,
                            "over-time modifier ticked"
                        );
                    }
                }
            }
            Delivery::Hold => {
                if !self.is_expired() {
                    if !self.holding {
                        target.modify_stat(&self.stat_id, self.value, true);
                        self.holding = true;
                    }
                    self.advance(self.step(delta_time));
                    if self.elapsed >= self.duration {
                        target.modify_stat(&self.stat_id, -self.value, true);
                        self.holding = false;
                    }
                }
            }
        }

        ModifierProgress {
            elapsed: self.elapsed,
            expired: self.is_expired(),
        }
    }

    /// Undo whatever part of this modifier is still held on the stat.
    /// Only FlatOverTime holds anything; drip effects already delivered stay.
    pub(crate) fn release<T: StatAccess + ?Sized>(&mut self, target: &mut T) {
        if self.holding {
            target.modify_stat(&self.stat_id, -self.value, true);
            self.holding = false;
        }
    }

    /// Portion of `delta_time` that still counts towards the duration.
    /// Leftovers shorter than `EXPIRY_EPSILON` are folded into this step.
    fn step(&self, delta_time: f64) -> f64 {
        let remaining = self.remaining();
        let step = delta_time.max(0.0).min(remaining);
        if remaining - step < EXPIRY_EPSILON {
            remaining
        } else {
            step
        }
    }

    fn advance(&mut self, step: f64) {
        self.elapsed += step;
        if self.duration - self.elapsed < EXPIRY_EPSILON {
            self.elapsed = self.duration;
        }
    }
}
