use crate::{
    foundation::core::Viewport,
    runtime::{
        ComponentId,
        scheduler::{Debouncer, TimerId, Timers},
    },
    stage::document::{Document, HostEventKind},
};

/// Collapses a burst of resize notifications into one re-measure after the
/// quiet period. Only the last viewport of a burst is applied.
#[derive(Debug)]
pub struct ResizeCoordinator {
    debouncer: Debouncer,
    pending: Option<Viewport>,
    applied: u64,
}

impl ResizeCoordinator {
    pub fn new(debounce_s: f64) -> Self {
        Self {
            debouncer: Debouncer::new(ComponentId::Resize, debounce_s),
            pending: None,
            applied: 0,
        }
    }

    pub fn init(&mut self, doc: &mut Document) {
        doc.listen(ComponentId::Resize, HostEventKind::Resize);
    }

    pub fn on_resize(&mut self, viewport: Viewport, timers: &mut Timers, now_s: f64) {
        self.pending = Some(viewport);
        self.debouncer.poke(timers, now_s);
    }

    /// Returns the viewport to apply when `fired` closes the quiet period.
    pub fn on_timer(&mut self, fired: TimerId) -> Option<Viewport> {
        if !self.debouncer.accept(fired) {
            return None;
        }
        let viewport = self.pending.take()?;
        self.applied += 1;
        tracing::debug!(width = viewport.width, height = viewport.height, "resize settled");
        Some(viewport)
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Number of settled bursts so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn teardown(&mut self, timers: &mut Timers, doc: &mut Document) {
        self.debouncer.cancel(timers);
        self.pending = None;
        doc.unlisten_owner(ComponentId::Resize);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/resize.rs"]
mod tests;
