use std::collections::BTreeMap;

use crate::{
    content::story::SecondaryEffect,
    env::capability::InitConfig,
    runtime::ComponentId,
    stage::document::{Document, RegionId},
    timeline::card::Card,
    trigger::registry::{
        Edge, Threshold, TriggerEvent, TriggerEventKind, TriggerHandle, TriggerRegistry,
        TriggerSpec,
    },
};

/// Procedural stand-in drawn for each effect tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Fallback {
    SparkleGlyph,
    SnowflakeGlyph,
    PulsingHeart,
}

impl From<SecondaryEffect> for Fallback {
    fn from(effect: SecondaryEffect) -> Self {
        match effect {
            SecondaryEffect::Sparkle => Self::SparkleGlyph,
            SecondaryEffect::Snowflake => Self::SnowflakeGlyph,
            SecondaryEffect::HeartBeat => Self::PulsingHeart,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectSlot {
    pub card_id: String,
    pub region: RegionId,
    pub effect: SecondaryEffect,
    pub fallback: Fallback,
    pub loaded: bool,
    /// Looping only when motion is allowed; otherwise drawn as a still.
    pub animated: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SecondaryStats {
    pub total: usize,
    pub loaded: usize,
    pub pending: usize,
}

/// Per-card secondary animations, loaded the first time their slot is
/// sufficiently visible and never unloaded.
#[derive(Debug, Default)]
pub struct SecondaryEffects {
    slots: BTreeMap<String, EffectSlot>,
    by_trigger: BTreeMap<TriggerHandle, String>,
    animated: bool,
}

impl SecondaryEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms one one-shot trigger per card slot. A slot loads once
    /// `visible_fraction` of its height has scrolled above the viewport bottom.
    #[tracing::instrument(skip_all)]
    pub fn init<'a>(
        &mut self,
        cards: impl IntoIterator<Item = &'a Card>,
        visible_fraction: f64,
        init: InitConfig,
        doc: &Document,
        triggers: &mut TriggerRegistry,
    ) -> usize {
        self.animated = !init.reduced_motion;
        let viewport_height = triggers.viewport_height();
        for card in cards {
            let (Some(effect), Some(region)) = (card.secondary, card.effect_slot) else {
                continue;
            };
            let slot_height = doc.rect(region).map(|r| r.height()).unwrap_or(0.0);
            let line = if viewport_height > 0.0 {
                1.0 - visible_fraction * slot_height / viewport_height
            } else {
                1.0
            };
            let spec = TriggerSpec::new(
                ComponentId::Secondary,
                Threshold::new(Edge::Top, line),
                Threshold::new(Edge::Bottom, 0.0),
            )
            .once();
            let handle = triggers.register(doc, region, spec);
            self.by_trigger.insert(handle, card.id.clone());
            self.slots.insert(
                card.id.clone(),
                EffectSlot {
                    card_id: card.id.clone(),
                    region,
                    effect,
                    fallback: effect.into(),
                    loaded: false,
                    animated: false,
                },
            );
        }
        tracing::info!(slots = self.slots.len(), "secondary effects armed");
        self.slots.len()
    }

    pub fn handle_event(&mut self, event: &TriggerEvent) -> Option<&EffectSlot> {
        if event.kind != TriggerEventKind::Enter {
            return None;
        }
        let id = self.by_trigger.remove(&event.handle)?;
        let slot = self.slots.get_mut(&id)?;
        slot.loaded = true;
        slot.animated = self.animated;
        tracing::debug!(card = %slot.card_id, effect = ?slot.effect, "secondary effect loaded");
        Some(slot)
    }

    pub fn slot(&self, card_id: &str) -> Option<&EffectSlot> {
        self.slots.get(card_id)
    }

    pub fn stats(&self) -> SecondaryStats {
        let total = self.slots.len();
        let loaded = self.slots.values().filter(|s| s.loaded).count();
        SecondaryStats {
            total,
            loaded,
            pending: total - loaded,
        }
    }

    pub fn teardown(&mut self, triggers: &mut TriggerRegistry) {
        triggers.unregister_owner(ComponentId::Secondary);
        self.by_trigger.clear();
        self.slots.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/secondary.rs"]
mod tests;
