use std::f64::consts::TAU;

use crate::{
    animation::{ease::Ease, tween::Tween},
    config::CardConfig,
    content::story::{Beat, SecondaryEffect},
    runtime::clock::FrameTick,
    stage::document::RegionId,
    theme::controller::ThemeName,
    trigger::registry::TriggerHandle,
};

/// Decorative stickers start their reveal this fraction of the entry duration late.
pub const STICKER_ENTRY_DELAY_RATIO: f64 = 0.3;
/// Decorative stickers finish their exit in this fraction of the card's exit duration.
pub const STICKER_EXIT_RATIO: f64 = 0.6;

/// Layout column; strictly alternates by ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn for_ordinal(ordinal: usize) -> Self {
        if ordinal % 2 == 0 { Self::Left } else { Self::Right }
    }
}

/// Animation lifecycle of one card. `Entering`/`Exiting` mean the reveal
/// interpolation is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum CardPhase {
    Before,
    Entering,
    Active,
    Exiting,
    After,
}

/// Idle vertical bob. Its offset is a separate channel added on top of the
/// reveal offset; pausing holds the current value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatLoop {
    amplitude_px: f64,
    period_s: f64,
    elapsed_s: f64,
    running: bool,
}

impl FloatLoop {
    pub fn new(amplitude_px: f64, period_s: f64) -> Self {
        Self {
            amplitude_px,
            period_s,
            elapsed_s: 0.0,
            running: false,
        }
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn advance(&mut self, dt_s: f64) {
        if self.running {
            self.elapsed_s += dt_s.max(0.0);
        }
    }

    pub fn offset_px(&self) -> f64 {
        if self.period_s <= 0.0 {
            return 0.0;
        }
        -self.amplitude_px * (TAU * self.elapsed_s / self.period_s).sin()
    }
}

/// What the host applies to a card's visual subtree.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CardVisual {
    pub opacity: f64,
    /// Reveal channel: slides in from below.
    pub entry_offset_px: f64,
    /// Float channel.
    pub float_offset_px: f64,
    pub blur_px: f64,
    pub sticker_opacity: f64,
    /// Host-side transition for direct state changes (reduced motion); zero
    /// when values are being driven per frame.
    pub transition_s: f64,
}

impl CardVisual {
    pub fn offset_px(&self) -> f64 {
        self.entry_offset_px + self.float_offset_px
    }
}

/// Rendered projection of a [`Beat`].
#[derive(Clone, Debug)]
pub struct Card {
    pub id: String,
    pub ordinal: usize,
    pub side: Side,
    pub theme: ThemeName,
    pub secondary: Option<SecondaryEffect>,
    pub region: RegionId,
    pub effect_slot: Option<RegionId>,
    pub trigger: TriggerHandle,
    float: Option<FloatLoop>,
    phase: CardPhase,
    settle: CardPhase,
    reveal: Tween<f64>,
    sticker: Tween<f64>,
    reveal_amount: f64,
    sticker_amount: f64,
    offset_px: f64,
    blur_px: f64,
    transition_s: f64,
    reduced_motion: bool,
}

impl Card {
    pub(crate) fn new(
        beat: &Beat,
        region: RegionId,
        effect_slot: Option<RegionId>,
        trigger: TriggerHandle,
        config: &CardConfig,
        reduced_motion: bool,
    ) -> Self {
        let idle = Tween::new(0.0, 0.0, 0.0, 0.0, Ease::Linear);
        Self {
            id: beat.id.clone(),
            ordinal: beat.ordinal,
            side: Side::for_ordinal(beat.ordinal),
            theme: beat.theme,
            secondary: beat.secondary,
            region,
            effect_slot,
            trigger,
            float: (!reduced_motion)
                .then(|| FloatLoop::new(config.float_amplitude_px, config.float_period_s)),
            phase: CardPhase::Before,
            settle: CardPhase::Before,
            reveal: idle.clone(),
            sticker: idle,
            reveal_amount: 0.0,
            sticker_amount: 0.0,
            offset_px: config.entry_offset_px,
            blur_px: config.entry_blur_px,
            transition_s: 0.0,
            reduced_motion,
        }
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    pub fn float_loop(&self) -> Option<&FloatLoop> {
        self.float.as_ref()
    }

    pub fn has_float_loop(&self) -> bool {
        self.float.is_some()
    }

    /// True while this card needs per-frame evaluation.
    pub fn is_animating(&self) -> bool {
        match self.phase {
            CardPhase::Entering | CardPhase::Exiting => true,
            CardPhase::Active => self.float.is_some_and(|f| f.is_running()),
            CardPhase::Before | CardPhase::After => false,
        }
    }

    pub fn begin_entry(&mut self, now_s: f64, config: &CardConfig) {
        self.pause_float();
        if self.reduced_motion {
            self.reveal_amount = 1.0;
            self.sticker_amount = 1.0;
            self.transition_s = config.reduced_motion_fade_s;
            self.set_phase(CardPhase::Active);
            return;
        }
        let duration = config.entry_duration_s;
        let delay = duration * STICKER_ENTRY_DELAY_RATIO;
        self.reveal = Tween::new(self.reveal_amount, 1.0, now_s, duration, Ease::OutQuad);
        self.sticker = Tween::new(self.sticker_amount, 1.0, now_s, duration - delay, Ease::OutQuad)
            .with_delay(delay);
        self.settle = CardPhase::Active;
        self.set_phase(CardPhase::Entering);
    }

    /// `rest` is where the card lands once hidden: `After` when scrolled past,
    /// `Before` when scrolled back above.
    pub fn begin_exit(&mut self, now_s: f64, rest: CardPhase, config: &CardConfig) {
        self.pause_float();
        if self.reduced_motion {
            // Content stays readable; only the lifecycle moves.
            self.set_phase(rest);
            return;
        }
        let duration = config.exit_duration_s;
        self.reveal = Tween::new(self.reveal_amount, 0.0, now_s, duration, Ease::InQuad);
        self.sticker = Tween::new(
            self.sticker_amount,
            0.0,
            now_s,
            duration * STICKER_EXIT_RATIO,
            Ease::InQuad,
        );
        self.settle = rest;
        self.set_phase(CardPhase::Exiting);
    }

    pub fn advance(&mut self, tick: &FrameTick) {
        match self.phase {
            CardPhase::Entering | CardPhase::Exiting => {
                self.reveal_amount = self.reveal.sample(tick.now_s);
                self.sticker_amount = self.sticker.sample(tick.now_s);
                if self.reveal.is_finished(tick.now_s) && self.sticker.is_finished(tick.now_s) {
                    let settle = self.settle;
                    self.set_phase(settle);
                    if settle == CardPhase::Active {
                        if let Some(float) = &mut self.float {
                            float.resume();
                        }
                    }
                }
            }
            CardPhase::Active => {
                if let Some(float) = &mut self.float {
                    float.advance(tick.dt_s);
                }
            }
            CardPhase::Before | CardPhase::After => {}
        }
    }

    pub fn visual(&self) -> CardVisual {
        let hidden = 1.0 - self.reveal_amount;
        CardVisual {
            opacity: self.reveal_amount,
            entry_offset_px: self.offset_px * hidden,
            float_offset_px: self.float.map(|f| f.offset_px()).unwrap_or(0.0),
            blur_px: self.blur_px * hidden,
            sticker_opacity: self.sticker_amount,
            transition_s: self.transition_s,
        }
    }

    fn pause_float(&mut self) {
        if let Some(float) = &mut self.float {
            float.pause();
        }
    }

    fn set_phase(&mut self, next: CardPhase) {
        if self.phase != next {
            tracing::debug!(card = %self.id, from = ?self.phase, to = ?next, "card phase");
            self.phase = next;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/card.rs"]
mod tests;
