use std::collections::BTreeMap;

use crate::runtime::ComponentId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
struct TimerEntry {
    owner: ComponentId,
    deadline_s: f64,
}

/// One-shot timers (the `setTimeout` half of the runtime).
#[derive(Debug, Default)]
pub struct Timers {
    entries: BTreeMap<TimerId, TimerEntry>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, owner: ComponentId, deadline_s: f64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, TimerEntry { owner, deadline_s });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn cancel_owner(&mut self, owner: ComponentId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.owner != owner);
        before - self.entries.len()
    }

    pub fn pending_for(&self, owner: ComponentId) -> usize {
        self.entries.values().filter(|e| e.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.entries
            .values()
            .map(|e| e.deadline_s)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Removes and returns every timer due at `now_s`, earliest first.
    pub fn take_due(&mut self, now_s: f64) -> Vec<(TimerId, ComponentId)> {
        let mut due: Vec<(TimerId, TimerEntry)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline_s <= now_s)
            .map(|(id, e)| (*id, *e))
            .collect();
        due.sort_by(|a, b| a.1.deadline_s.total_cmp(&b.1.deadline_s).then(a.0.cmp(&b.0)));
        for (id, _) in &due {
            self.entries.remove(id);
        }
        due.into_iter().map(|(id, e)| (id, e.owner)).collect()
    }
}

/// Coalesces bursts of events into one firing after a quiet period.
#[derive(Debug)]
pub struct Debouncer {
    owner: ComponentId,
    quiet_s: f64,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(owner: ComponentId, quiet_s: f64) -> Self {
        Self {
            owner,
            quiet_s: quiet_s.max(0.0),
            pending: None,
        }
    }

    /// Restarts the quiet period.
    pub fn poke(&mut self, timers: &mut Timers, now_s: f64) {
        if let Some(prev) = self.pending.take() {
            timers.cancel(prev);
        }
        self.pending = Some(timers.schedule(self.owner, now_s + self.quiet_s));
    }

    /// True when `fired` is this debouncer's pending timer; clears it.
    pub fn accept(&mut self, fired: TimerId) -> bool {
        if self.pending == Some(fired) {
            self.pending = None;
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self, timers: &mut Timers) {
        if let Some(prev) = self.pending.take() {
            timers.cancel(prev);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/scheduler.rs"]
mod tests;
