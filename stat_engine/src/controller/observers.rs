//! Listener registry for stat events

use crate::types::StatEvent;
use std::collections::HashMap;
use std::fmt;

/// Callback invoked with every event it is subscribed to
pub type StatListener = Box<dyn FnMut(&StatEvent)>;

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Observer lists keyed by stat id, plus listeners for every stat
#[derive(Default)]
pub struct StatObservers {
    next_id: u64,
    per_stat: HashMap<String, Vec<(ListenerId, StatListener)>>,
    global: Vec<(ListenerId, StatListener)>,
}

impl StatObservers {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Listen to events of a single stat
    pub fn subscribe(&mut self, stat_id: impl Into<String>, listener: StatListener) -> ListenerId {
        let id = self.next_id();
        self.per_stat
            .entry(stat_id.into())
            .or_default()
            .push((id, listener));
        id
    }

    /// Listen to events of every stat
    pub fn subscribe_all(&mut self, listener: StatListener) -> ListenerId {
        let id = self.next_id();
        self.global.push((id, listener));
        id
    }

    /// Drop a listener. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        if let Some(index) = self.global.iter().position(|(l, _)| *l == id) {
            self.global.remove(index);
            return true;
        }

        let mut emptied = None;
        let mut found = false;
        for (stat_id, listeners) in self.per_stat.iter_mut() {
            if let Some(index) = listeners.iter().position(|(l, _)| *l == id) {
                listeners.remove(index);
                if listeners.is_empty() {
                    emptied = Some(stat_id.clone());
                }
                found = true;
                break;
            }
        }
        if let Some(stat_id) = emptied {
            self.per_stat.remove(&stat_id);
        }
        found
    }

    /// Deliver an event to the stat's listeners, then to global listeners
    pub fn notify(&mut self, event: &StatEvent) {
        if let Some(listeners) = self.per_stat.get_mut(event.stat_id()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
        for (_, listener) in self.global.iter_mut() {
            listener(event);
        }
    }

    /// Total number of registered listeners
    pub fn len(&self) -> usize {
        self.global.len() + self.per_stat.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for StatObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatObservers")
            .field("global", &self.global.len())
            .field("per_stat", &self.per_stat.keys().collect::<Vec<_>>())
            .finish()
    }
}
