use std::collections::BTreeMap;

use crate::{
    foundation::core::Rect,
    runtime::ComponentId,
    theme::controller::ThemeName,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct RegionId(u64);

impl RegionId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RegionKind {
    TimelineContainer,
    Card,
    /// Slot inside a card hosting its secondary animation.
    EffectSlot,
    Ending,
    EndingText,
}

/// Queryable attributes: card id, ordinal and bound theme.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RegionAttrs {
    pub card_id: Option<String>,
    pub ordinal: Option<usize>,
    pub theme: Option<ThemeName>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Region {
    pub id: RegionId,
    pub kind: RegionKind,
    /// Bounding box in document coordinates (y grows downward).
    pub rect: Rect,
    pub parent: Option<RegionId>,
    pub attrs: RegionAttrs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Inserted(RegionId),
    Removed(RegionId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Control {
    MusicButton,
    BackToTop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostEventKind {
    Scroll,
    Resize,
    Click(Control),
    Mutation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// In-memory stand-in for the page's layout tree.
///
/// The host mirrors measured element boxes into it with [`Document::set_rect`];
/// orchestration code only ever reads this side table, never rendered output.
#[derive(Debug, Default)]
pub struct Document {
    regions: BTreeMap<RegionId, Region>,
    next_region: u64,
    mutations: Vec<Mutation>,
    listeners: BTreeMap<ListenerId, (ComponentId, HostEventKind)>,
    next_listener: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        kind: RegionKind,
        rect: Rect,
        parent: Option<RegionId>,
        attrs: RegionAttrs,
    ) -> RegionId {
        let id = RegionId(self.next_region);
        self.next_region += 1;
        self.regions.insert(
            id,
            Region {
                id,
                kind,
                rect,
                parent,
                attrs,
            },
        );
        self.mutations.push(Mutation::Inserted(id));
        id
    }

    /// Removes a region and all of its descendants.
    pub fn remove(&mut self, id: RegionId) -> bool {
        if self.regions.remove(&id).is_none() {
            return false;
        }
        self.mutations.push(Mutation::Removed(id));
        let children: Vec<RegionId> = self
            .regions
            .values()
            .filter(|r| r.parent == Some(id))
            .map(|r| r.id)
            .collect();
        for child in children {
            self.remove(child);
        }
        true
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.regions.contains_key(&id)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn rect(&self, id: RegionId) -> Option<Rect> {
        self.regions.get(&id).map(|r| r.rect)
    }

    pub fn set_rect(&mut self, id: RegionId, rect: Rect) -> bool {
        match self.regions.get_mut(&id) {
            Some(region) => {
                region.rect = rect;
                true
            }
            None => false,
        }
    }

    pub fn regions_of(&self, kind: RegionKind) -> impl Iterator<Item = &Region> {
        self.regions.values().filter(move |r| r.kind == kind)
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Region> {
        self.regions_of(RegionKind::Card)
            .find(|r| r.attrs.card_id.as_deref() == Some(card_id))
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    pub fn listen(&mut self, owner: ComponentId, kind: HostEventKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, (owner, kind));
        id
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn unlisten_owner(&mut self, owner: ComponentId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|_, (o, _)| *o != owner);
        before - self.listeners.len()
    }

    pub fn is_listening(&self, owner: ComponentId, kind: HostEventKind) -> bool {
        self.listeners.values().any(|(o, k)| *o == owner && *k == kind)
    }

    pub fn listener_count_for(&self, owner: ComponentId) -> usize {
        self.listeners.values().filter(|(o, _)| *o == owner).count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/document.rs"]
mod tests;
