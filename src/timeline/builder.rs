use std::collections::BTreeMap;

use crate::{
    config::CardConfig,
    content::story::Beat,
    env::capability::InitConfig,
    foundation::{
        core::{Rect, Viewport},
        error::{StarcardError, StarcardResult},
    },
    runtime::{
        ComponentId,
        clock::{FrameClock, FrameSubscription, FrameTick},
    },
    stage::document::{Document, RegionAttrs, RegionId, RegionKind},
    theme::controller::{ThemeCandidate, ThemeName},
    timeline::card::{Card, CardPhase, Side},
    trigger::registry::{
        Edge, Threshold, TriggerEvent, TriggerEventKind, TriggerHandle, TriggerRegistry,
        TriggerSpec,
    },
};

const EFFECT_SLOT_SIZE_PX: f64 = 64.0;
const EFFECT_SLOT_INSET_PX: f64 = 16.0;
/// Viewport line a card must straddle to hold the theme.
const THEME_LINE: f64 = 0.5;

/// What a theme-line crossing asks of the page's theme binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeBinding {
    Bind(ThemeName),
    Release,
}

/// Document-space box for the card at `ordinal`.
pub fn card_rect(ordinal: usize, viewport: Viewport, origin_y: f64, config: &CardConfig) -> Rect {
    let y0 = origin_y + ordinal as f64 * (config.card_height_px + config.card_gap_px);
    let x0 = match Side::for_ordinal(ordinal) {
        Side::Left => config.side_inset_px,
        Side::Right => (viewport.width - config.side_inset_px - config.card_width_px)
            .max(config.side_inset_px),
    };
    Rect::new(x0, y0, x0 + config.card_width_px, y0 + config.card_height_px)
}

fn effect_slot_rect(card: Rect) -> Rect {
    let x1 = card.x1 - EFFECT_SLOT_INSET_PX;
    let y0 = card.y0 + EFFECT_SLOT_INSET_PX;
    Rect::new(x1 - EFFECT_SLOT_SIZE_PX, y0, x1, y0 + EFFECT_SLOT_SIZE_PX)
}

/// Owns every card and routes their trigger events.
///
/// Cards live in a side table keyed by card id; the document only carries
/// the queryable attributes (id, ordinal, theme) overlays read back.
#[derive(Debug)]
pub struct Timeline {
    config: CardConfig,
    init: InitConfig,
    container: Option<RegionId>,
    cards: BTreeMap<String, Card>,
    order: Vec<String>,
    by_trigger: BTreeMap<TriggerHandle, String>,
    by_theme_trigger: BTreeMap<TriggerHandle, String>,
    subscription: Option<FrameSubscription>,
    built: bool,
}

impl Timeline {
    pub fn new(config: CardConfig, init: InitConfig) -> Self {
        Self {
            config,
            init,
            container: None,
            cards: BTreeMap::new(),
            order: Vec::new(),
            by_trigger: BTreeMap::new(),
            by_theme_trigger: BTreeMap::new(),
            subscription: None,
            built: false,
        }
    }

    /// Materializes one card per beat below `origin_y`. A second call without
    /// an intervening [`Timeline::teardown`] is rejected.
    #[tracing::instrument(skip_all, fields(beats = beats.len()))]
    pub fn build(
        &mut self,
        beats: &[Beat],
        viewport: Viewport,
        origin_y: f64,
        doc: &mut Document,
        triggers: &mut TriggerRegistry,
    ) -> StarcardResult<usize> {
        if self.built {
            return Err(StarcardError::validation(
                "timeline already built; tear it down before rebuilding",
            ));
        }
        self.built = true;
        if beats.is_empty() {
            tracing::info!("no beats to render");
            return Ok(0);
        }

        let last = card_rect(beats.len() - 1, viewport, origin_y, &self.config);
        let container = doc.insert(
            RegionKind::TimelineContainer,
            Rect::new(0.0, origin_y, viewport.width, last.y1),
            None,
            RegionAttrs::default(),
        );
        self.container = Some(container);

        for beat in beats {
            let rect = card_rect(beat.ordinal, viewport, origin_y, &self.config);
            let region = doc.insert(
                RegionKind::Card,
                rect,
                Some(container),
                RegionAttrs {
                    card_id: Some(beat.id.clone()),
                    ordinal: Some(beat.ordinal),
                    theme: Some(beat.theme),
                },
            );
            let effect_slot = beat.secondary.map(|_| {
                doc.insert(
                    RegionKind::EffectSlot,
                    effect_slot_rect(rect),
                    Some(region),
                    RegionAttrs {
                        card_id: Some(beat.id.clone()),
                        ..RegionAttrs::default()
                    },
                )
            });
            // Start measures the top edge, end the bottom edge.
            let trigger = triggers.register(
                doc,
                region,
                TriggerSpec::new(ComponentId::Timeline, self.config.start, self.config.end),
            );
            // Active while the card's box straddles the viewport center.
            let theme_trigger = triggers.register(
                doc,
                region,
                TriggerSpec::new(
                    ComponentId::Theme,
                    Threshold::new(Edge::Top, THEME_LINE),
                    Threshold::new(Edge::Bottom, THEME_LINE),
                ),
            );
            let card = Card::new(
                beat,
                region,
                effect_slot,
                trigger,
                &self.config,
                self.init.reduced_motion,
            );
            self.by_trigger.insert(trigger, beat.id.clone());
            self.by_theme_trigger.insert(theme_trigger, beat.id.clone());
            self.order.push(beat.id.clone());
            self.cards.insert(beat.id.clone(), card);
        }

        tracing::info!(
            cards = self.cards.len(),
            reduced_motion = self.init.reduced_motion,
            "timeline built"
        );
        Ok(self.cards.len())
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn container(&self) -> Option<RegionId> {
        self.container
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Cards in ordinal order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    pub fn float_loop_count(&self) -> usize {
        self.cards.values().filter(|c| c.has_float_loop()).count()
    }

    /// Routes an entry/exit trigger event to its card.
    pub fn handle_event(&mut self, event: &TriggerEvent, now_s: f64) {
        let Some(card) = self
            .by_trigger
            .get(&event.handle)
            .and_then(|id| self.cards.get_mut(id))
        else {
            return;
        };
        match event.kind {
            TriggerEventKind::Enter | TriggerEventKind::EnterBack => {
                card.begin_entry(now_s, &self.config);
            }
            TriggerEventKind::Leave => card.begin_exit(now_s, CardPhase::After, &self.config),
            TriggerEventKind::LeaveBack => card.begin_exit(now_s, CardPhase::Before, &self.config),
            TriggerEventKind::Progress(_) => {}
        }
    }

    /// Maps a theme-line event to a binding change for the card's theme.
    pub fn theme_binding(&self, event: &TriggerEvent) -> Option<ThemeBinding> {
        let card = self
            .by_theme_trigger
            .get(&event.handle)
            .and_then(|id| self.cards.get(id))?;
        match event.kind {
            TriggerEventKind::Enter | TriggerEventKind::EnterBack => {
                Some(ThemeBinding::Bind(card.theme))
            }
            TriggerEventKind::Leave | TriggerEventKind::LeaveBack => Some(ThemeBinding::Release),
            TriggerEventKind::Progress(_) => None,
        }
    }

    pub fn advance(&mut self, tick: &FrameTick) {
        for card in self.cards.values_mut() {
            card.advance(tick);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.cards.values().any(Card::is_animating)
    }

    /// Holds one frame subscription exactly while some card is animating.
    pub fn sync_frames(&mut self, clock: &mut FrameClock) {
        match (self.is_animating(), self.subscription) {
            (true, None) => self.subscription = Some(clock.subscribe(ComponentId::Timeline)),
            (false, Some(sub)) => {
                clock.cancel(sub);
                self.subscription = None;
            }
            _ => {}
        }
    }

    /// Cards with a measured box, for nearest-to-center theme selection.
    pub fn theme_candidates(&self, doc: &Document) -> Vec<ThemeCandidate> {
        self.cards()
            .filter_map(|card| {
                doc.rect(card.region).map(|rect| ThemeCandidate {
                    ordinal: card.ordinal,
                    rect,
                    theme: card.theme,
                })
            })
            .collect()
    }

    #[tracing::instrument(skip_all)]
    pub fn teardown(
        &mut self,
        doc: &mut Document,
        triggers: &mut TriggerRegistry,
        clock: &mut FrameClock,
    ) {
        if let Some(sub) = self.subscription.take() {
            clock.cancel(sub);
        }
        clock.cancel_owner(ComponentId::Timeline);
        triggers.unregister_owner(ComponentId::Timeline);
        triggers.unregister_owner(ComponentId::Theme);
        doc.unlisten_owner(ComponentId::Timeline);
        if let Some(container) = self.container.take() {
            doc.remove(container);
        }
        self.cards.clear();
        self.order.clear();
        self.by_trigger.clear();
        self.by_theme_trigger.clear();
        self.built = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
