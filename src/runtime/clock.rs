use std::collections::BTreeMap;

use crate::runtime::ComponentId;

/// Handle for one repeating frame subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameSubscription(u64);

/// The timestamp every animation evaluated in one tick reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub frame: u64,
    pub now_s: f64,
    pub dt_s: f64,
}

/// The single per-frame clock. A tick is only produced while at least one
/// subscription is live, so an idle page schedules no frames at all.
#[derive(Debug, Default)]
pub struct FrameClock {
    subscriptions: BTreeMap<FrameSubscription, ComponentId>,
    next_id: u64,
    frame: u64,
    last_now_s: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, owner: ComponentId) -> FrameSubscription {
        let sub = FrameSubscription(self.next_id);
        self.next_id += 1;
        self.subscriptions.insert(sub, owner);
        tracing::debug!(%owner, id = sub.0, "frame subscription added");
        sub
    }

    /// Returns `false` when the subscription was already gone.
    pub fn cancel(&mut self, sub: FrameSubscription) -> bool {
        self.subscriptions.remove(&sub).is_some()
    }

    pub fn cancel_owner(&mut self, owner: ComponentId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|_, o| *o != owner);
        before - self.subscriptions.len()
    }

    pub fn is_active(&self, sub: FrameSubscription) -> bool {
        self.subscriptions.contains_key(&sub)
    }

    pub fn active_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn active_for(&self, owner: ComponentId) -> usize {
        self.subscriptions.values().filter(|o| **o == owner).count()
    }

    /// Produces the tick for `now_s`, or `None` when nothing is subscribed.
    pub fn tick(&mut self, now_s: f64) -> Option<FrameTick> {
        if self.subscriptions.is_empty() {
            self.last_now_s = None;
            return None;
        }
        let dt_s = self
            .last_now_s
            .map(|last| (now_s - last).max(0.0))
            .unwrap_or(0.0);
        self.last_now_s = Some(now_s);
        let tick = FrameTick {
            frame: self.frame,
            now_s,
            dt_s,
        };
        self.frame += 1;
        Some(tick)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/clock.rs"]
mod tests;
