use std::collections::BTreeMap;

use crate::{
    foundation::core::Rect,
    foundation::math::inverse_lerp,
    runtime::ComponentId,
    stage::document::{Document, RegionId},
};

/// Which edge of a region's bounding box a threshold measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Center,
    Bottom,
}

/// "Region `edge` meets the line `viewport_fraction` of the viewport height from its top."
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Threshold {
    pub edge: Edge,
    pub viewport_fraction: f64,
}

impl Threshold {
    pub fn new(edge: Edge, viewport_fraction: f64) -> Self {
        Self {
            edge,
            viewport_fraction,
        }
    }

    /// Scroll offset at which this threshold is met for `rect`.
    pub fn scroll_offset(self, rect: Rect, viewport_height: f64) -> f64 {
        let edge_y = match self.edge {
            Edge::Top => rect.y0,
            Edge::Center => rect.center().y,
            Edge::Bottom => rect.y1,
        };
        edge_y - self.viewport_fraction * viewport_height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerSpec {
    pub owner: ComponentId,
    pub start: Threshold,
    pub end: Threshold,
    /// Emit [`TriggerEventKind::Progress`] while active.
    pub progress: bool,
    /// Re-emit progress after a refresh so size-dependent owners recompute.
    pub invalidate_on_resize: bool,
    /// Drop the registration after its first enter.
    pub once: bool,
}

impl TriggerSpec {
    pub fn new(owner: ComponentId, start: Threshold, end: Threshold) -> Self {
        Self {
            owner,
            start,
            end,
            progress: false,
            invalidate_on_resize: false,
            once: false,
        }
    }

    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    pub fn invalidate_on_resize(mut self) -> Self {
        self.invalidate_on_resize = true;
        self
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

/// Positional state of one registration relative to its span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TriggerPhase {
    Before,
    Active,
    After,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerEventKind {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
    /// Normalized position within the span, in `[0, 1]`.
    Progress(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    pub handle: TriggerHandle,
    pub owner: ComponentId,
    pub kind: TriggerEventKind,
}

#[derive(Clone, Debug)]
struct Registration {
    region: RegionId,
    spec: TriggerSpec,
    /// `None` while the region measures zero-sized; such registrations never fire.
    span: Option<(f64, f64)>,
    rect: Rect,
    phase: TriggerPhase,
    last_progress: Option<f64>,
}

impl Registration {
    fn measure(&mut self, rect: Rect, viewport_height: f64) {
        self.rect = rect;
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            self.span = None;
            return;
        }
        let start = self.spec.start.scroll_offset(rect, viewport_height);
        let end = self
            .spec
            .end
            .scroll_offset(rect, viewport_height)
            .max(start);
        self.span = Some((start, end));
    }
}

/// Maps document regions to enter/leave/progress events.
///
/// Events are returned from [`TriggerRegistry::update`] rather than invoked as
/// callbacks; owners route them by [`TriggerHandle`]. A registration never
/// skips a state: jumping straight past a span yields the full enter/leave pair.
#[derive(Debug)]
pub struct TriggerRegistry {
    registrations: BTreeMap<TriggerHandle, Registration>,
    next_handle: u64,
    viewport_height: f64,
    last_scroll: f64,
}

impl TriggerRegistry {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            registrations: BTreeMap::new(),
            next_handle: 0,
            viewport_height,
            last_scroll: 0.0,
        }
    }

    /// Accepts zero-sized and missing regions; they stay idle until a refresh
    /// measures a real box.
    pub fn register(
        &mut self,
        doc: &Document,
        region: RegionId,
        spec: TriggerSpec,
    ) -> TriggerHandle {
        let handle = TriggerHandle(self.next_handle);
        self.next_handle += 1;
        let mut reg = Registration {
            region,
            spec,
            span: None,
            rect: Rect::ZERO,
            phase: TriggerPhase::Before,
            last_progress: None,
        };
        match doc.rect(region) {
            Some(rect) => reg.measure(rect, self.viewport_height),
            None => tracing::warn!(region = region.raw(), "trigger registered on a missing region"),
        }
        if reg.span.is_none() {
            tracing::debug!(region = region.raw(), "trigger region has no size yet");
        }
        self.registrations.insert(handle, reg);
        handle
    }

    pub fn unregister(&mut self, handle: TriggerHandle) -> bool {
        self.registrations.remove(&handle).is_some()
    }

    pub fn unregister_owner(&mut self, owner: ComponentId) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|_, r| r.spec.owner != owner);
        before - self.registrations.len()
    }

    pub fn contains(&self, handle: TriggerHandle) -> bool {
        self.registrations.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn count_for(&self, owner: ComponentId) -> usize {
        self.registrations
            .values()
            .filter(|r| r.spec.owner == owner)
            .count()
    }

    pub fn phase(&self, handle: TriggerHandle) -> Option<TriggerPhase> {
        self.registrations.get(&handle).map(|r| r.phase)
    }

    pub fn region(&self, handle: TriggerHandle) -> Option<RegionId> {
        self.registrations.get(&handle).map(|r| r.region)
    }

    /// Last measured bounding box.
    pub fn measured_rect(&self, handle: TriggerHandle) -> Option<Rect> {
        self.registrations.get(&handle).map(|r| r.rect)
    }

    /// Current normalized position within the span (unclamped phase aside).
    pub fn progress(&self, handle: TriggerHandle) -> Option<f64> {
        let reg = self.registrations.get(&handle)?;
        let (start, end) = reg.span?;
        Some(span_progress(start, end, self.last_scroll))
    }

    /// Re-measures every region; registrations whose region left the document
    /// are dropped silently.
    #[tracing::instrument(skip(self, doc))]
    pub fn refresh_all(&mut self, doc: &Document, viewport_height: f64) {
        self.viewport_height = viewport_height;
        let mut dropped = 0usize;
        self.registrations.retain(|_, reg| match doc.rect(reg.region) {
            Some(rect) => {
                reg.measure(rect, viewport_height);
                if reg.spec.invalidate_on_resize {
                    reg.last_progress = None;
                }
                true
            }
            None => {
                dropped += 1;
                false
            }
        });
        tracing::debug!(remaining = self.registrations.len(), dropped, "triggers refreshed");
    }

    /// Advances every registration to `scroll_y` and returns the events produced,
    /// grouped per registration in handle order.
    pub fn update(&mut self, scroll_y: f64) -> Vec<TriggerEvent> {
        self.last_scroll = scroll_y;
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for (handle, reg) in self.registrations.iter_mut() {
            let Some((start, end)) = reg.span else {
                continue;
            };
            let next = if scroll_y < start {
                TriggerPhase::Before
            } else if scroll_y > end {
                TriggerPhase::After
            } else {
                TriggerPhase::Active
            };
            let progress = span_progress(start, end, scroll_y);
            let owner = reg.spec.owner;
            let mut emit = |kind| {
                events.push(TriggerEvent {
                    handle: *handle,
                    owner,
                    kind,
                })
            };

            use TriggerEventKind::{Enter, EnterBack, Leave, LeaveBack, Progress};
            use TriggerPhase::{Active, After, Before};
            let transitions: &[TriggerEventKind] = match (reg.phase, next) {
                (Before, Active) => &[Enter],
                (Before, After) => &[Enter, Leave],
                (Active, After) => &[Leave],
                (After, Active) => &[EnterBack],
                (After, Before) => &[EnterBack, LeaveBack],
                (Active, Before) => &[LeaveBack],
                _ => &[],
            };

            for &kind in transitions {
                // Close out progress at the boundary being crossed.
                let boundary = match kind {
                    Leave => Some(1.0),
                    LeaveBack => Some(0.0),
                    _ => None,
                };
                if let Some(edge) = boundary.filter(|_| reg.spec.progress) {
                    if reg.last_progress != Some(edge) {
                        emit(Progress(edge));
                        reg.last_progress = Some(edge);
                    }
                }
                emit(kind);
                if matches!(kind, Enter | EnterBack) {
                    reg.last_progress = None;
                }
                tracing::debug!(handle = handle.0, ?kind, "trigger transition");
            }

            if reg.spec.progress && next == Active && reg.last_progress != Some(progress) {
                emit(Progress(progress));
                reg.last_progress = Some(progress);
            }

            let entered = matches!(reg.phase, Before) && next != Before;
            reg.phase = next;
            if reg.spec.once && entered {
                finished.push(*handle);
            }
        }

        for handle in finished {
            self.registrations.remove(&handle);
        }
        events
    }
}

fn span_progress(start: f64, end: f64, scroll_y: f64) -> f64 {
    if end <= start {
        return if scroll_y >= start { 1.0 } else { 0.0 };
    }
    inverse_lerp(start, end, scroll_y).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/registry.rs"]
mod tests;
