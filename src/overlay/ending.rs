use std::f64::consts::TAU;

use crate::{
    animation::{ease::Ease, tween::Tween},
    config::EndingConfig,
    env::capability::InitConfig,
    foundation::{
        core::{Point, Rect, Rgba8, Vec2},
        math::Rng64,
    },
    runtime::{
        ComponentId,
        clock::{FrameClock, FrameSubscription, FrameTick},
    },
    stage::document::{Document, RegionId},
    theme::controller::ThemeSnapshot,
    trigger::registry::{
        Edge, Threshold, TriggerEvent, TriggerEventKind, TriggerHandle, TriggerRegistry,
        TriggerSpec,
    },
};

const FLOATING_STAR_RISE_PX: f64 = 30.0;
const FLOATING_STAR_PEAK_OPACITY: f64 = 0.6;
const FLOATING_STAR_REPEAT_DELAY_S: f64 = 1.0;
const FLOATING_STAR_STAGGER_S: f64 = 0.5;

/// One transient burst particle, flying from the origin to `target`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BurstParticle {
    pub angle_rad: f64,
    pub target: Vec2,
}

/// Sampled state of a burst particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    pub position: Point,
    pub opacity: f64,
}

/// Radial burst: `count` particles evenly spaced around a circle, lifted by
/// `y_offset`, fading out as they travel.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleBurst {
    pub origin: Point,
    pub color: Rgba8,
    particles: Vec<BurstParticle>,
    travel: Tween<f64>,
}

impl ParticleBurst {
    pub fn spawn(
        origin: Point,
        count: usize,
        spread: f64,
        y_offset: f64,
        duration_s: f64,
        color: Rgba8,
        now_s: f64,
    ) -> Self {
        let particles = (0..count)
            .map(|i| {
                let angle_rad = TAU * i as f64 / count as f64;
                BurstParticle {
                    angle_rad,
                    target: Vec2::new(
                        angle_rad.cos() * spread,
                        angle_rad.sin() * spread + y_offset,
                    ),
                }
            })
            .collect();
        Self {
            origin,
            color,
            particles,
            travel: Tween::new(0.0, 1.0, now_s, duration_s, Ease::OutQuad),
        }
    }

    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn sample(&self, now_s: f64) -> Vec<ParticleState> {
        let p = self.travel.sample(now_s);
        self.particles
            .iter()
            .map(|particle| ParticleState {
                position: self.origin + particle.target * p,
                opacity: 1.0 - p,
            })
            .collect()
    }

    pub fn is_finished(&self, now_s: f64) -> bool {
        self.travel.is_finished(now_s)
    }
}

/// Looping background star in the ending section.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FloatingStar {
    /// Position as fractions of the ending region.
    pub x_frac: f64,
    pub y_frac: f64,
    pub duration_s: f64,
    pub delay_s: f64,
}

impl FloatingStar {
    /// `(opacity, rise_px)` at `elapsed_s` since the loop started: fade up to
    /// the peak and back while rising, then rest before repeating.
    pub fn sample(&self, elapsed_s: f64) -> (f64, f64) {
        let local = elapsed_s - self.delay_s;
        if local < 0.0 || self.duration_s <= 0.0 {
            return (0.0, 0.0);
        }
        let cycle = self.duration_s + FLOATING_STAR_REPEAT_DELAY_S;
        let t = local % cycle;
        if t >= self.duration_s {
            return (0.0, 0.0);
        }
        let p = Ease::InOutSine.apply(t / self.duration_s);
        let opacity = FLOATING_STAR_PEAK_OPACITY * (1.0 - (2.0 * p - 1.0).abs());
        (opacity, -FLOATING_STAR_RISE_PX * p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum EndingPhase {
    Idle,
    /// Entered; waiting out the start delay.
    Waiting,
    Typing,
    Bursting,
    Done,
}

/// Ending sequence: typewriter reveal of the closing message, then a radial
/// particle burst from the text. Under reduced motion the text appears at once.
#[derive(Debug)]
pub struct EndingEffects {
    config: EndingConfig,
    init: InitConfig,
    message: Vec<char>,
    color: Rgba8,
    region: Option<RegionId>,
    text_region: Option<RegionId>,
    trigger: Option<TriggerHandle>,
    phase: EndingPhase,
    typing_start_s: f64,
    revealed: usize,
    burst: Option<ParticleBurst>,
    bursts_spawned: usize,
    stars: Vec<FloatingStar>,
    stars_start_s: Option<f64>,
    now_s: f64,
    subscription: Option<FrameSubscription>,
}

impl EndingEffects {
    pub fn new(
        config: EndingConfig,
        init: InitConfig,
        message: Option<String>,
        theme: &ThemeSnapshot,
    ) -> Self {
        Self {
            config,
            init,
            message: message.unwrap_or_default().chars().collect(),
            color: theme.tokens.burst_color,
            region: None,
            text_region: None,
            trigger: None,
            phase: EndingPhase::Idle,
            typing_start_s: 0.0,
            revealed: 0,
            burst: None,
            bursts_spawned: 0,
            stars: Vec::new(),
            stars_start_s: None,
            now_s: 0.0,
            subscription: None,
        }
    }

    /// Arms a one-shot trigger on the ending region and, with motion allowed,
    /// starts the floating stars.
    #[tracing::instrument(skip(self, doc, triggers, clock))]
    pub fn init(
        &mut self,
        region: RegionId,
        text_region: Option<RegionId>,
        seed: u64,
        now_s: f64,
        doc: &Document,
        triggers: &mut TriggerRegistry,
        clock: &mut FrameClock,
    ) {
        self.region = Some(region);
        self.text_region = text_region;
        let spec = TriggerSpec::new(
            ComponentId::Ending,
            self.config.start,
            Threshold::new(Edge::Bottom, 0.0),
        )
        .once();
        self.trigger = Some(triggers.register(doc, region, spec));

        if !self.init.reduced_motion {
            let mut rng = Rng64::new(seed);
            self.stars = (0..self.config.floating_stars)
                .map(|i| FloatingStar {
                    x_frac: rng.next_f64_01(),
                    y_frac: rng.next_f64_01(),
                    duration_s: rng.range(3.0, 5.0),
                    delay_s: i as f64 * FLOATING_STAR_STAGGER_S,
                })
                .collect();
            self.stars_start_s = Some(now_s);
        }
        self.now_s = now_s;
        self.sync_frames(clock);
        tracing::info!(
            chars = self.message.len(),
            floating_stars = self.stars.len(),
            "ending armed"
        );
    }

    pub fn phase(&self) -> EndingPhase {
        self.phase
    }

    pub fn visible_text(&self) -> String {
        self.message.iter().take(self.revealed).collect()
    }

    pub fn is_text_complete(&self) -> bool {
        self.revealed == self.message.len()
    }

    /// Fade the host applies when the text is shown in one step.
    pub fn text_transition_s(&self) -> f64 {
        if self.init.reduced_motion {
            self.config.reduced_motion_fade_s
        } else {
            0.0
        }
    }

    pub fn burst(&self) -> Option<&ParticleBurst> {
        self.burst.as_ref()
    }

    pub fn bursts_spawned(&self) -> usize {
        self.bursts_spawned
    }

    pub fn floating_stars(&self) -> &[FloatingStar] {
        &self.stars
    }

    /// `(opacity, rise_px)` for each floating star at the last evaluated tick.
    pub fn floating_star_states(&self) -> Vec<(f64, f64)> {
        let Some(start) = self.stars_start_s else {
            return Vec::new();
        };
        let elapsed = self.now_s - start;
        self.stars.iter().map(|s| s.sample(elapsed)).collect()
    }

    pub fn handle_event(
        &mut self,
        event: &TriggerEvent,
        now_s: f64,
        clock: &mut FrameClock,
    ) -> bool {
        if Some(event.handle) != self.trigger || event.kind != TriggerEventKind::Enter {
            return false;
        }
        self.trigger = None;
        if self.phase != EndingPhase::Idle {
            return false;
        }
        if self.init.reduced_motion {
            self.revealed = self.message.len();
            self.set_phase(EndingPhase::Done);
            return true;
        }
        self.typing_start_s = now_s + self.config.start_delay_s;
        self.set_phase(EndingPhase::Waiting);
        self.sync_frames(clock);
        true
    }

    pub fn advance(&mut self, tick: &FrameTick, doc: &Document, clock: &mut FrameClock) {
        self.now_s = tick.now_s;
        match self.phase {
            EndingPhase::Waiting | EndingPhase::Typing => {
                let elapsed = tick.now_s - self.typing_start_s;
                if elapsed < 0.0 {
                    return;
                }
                self.set_phase(EndingPhase::Typing);
                let interval = self.config.char_interval_s;
                // Character i appears at i * interval.
                let due = if interval > 0.0 {
                    (elapsed / interval).floor() as usize + 1
                } else {
                    self.message.len()
                };
                self.revealed = due.min(self.message.len());
                let last_at = self.message.len().saturating_sub(1) as f64 * interval;
                if self.is_text_complete() && elapsed >= last_at {
                    self.spawn_burst(doc, tick.now_s);
                }
            }
            EndingPhase::Bursting => {
                if self.burst.as_ref().is_none_or(|b| b.is_finished(tick.now_s)) {
                    self.burst = None;
                    self.set_phase(EndingPhase::Done);
                }
            }
            EndingPhase::Idle | EndingPhase::Done => {}
        }
        self.sync_frames(clock);
    }

    pub fn set_theme(&mut self, theme: &ThemeSnapshot) {
        self.color = theme.tokens.burst_color;
    }

    pub fn teardown(&mut self, triggers: &mut TriggerRegistry, clock: &mut FrameClock) {
        triggers.unregister_owner(ComponentId::Ending);
        self.trigger = None;
        if let Some(sub) = self.subscription.take() {
            clock.cancel(sub);
        }
        clock.cancel_owner(ComponentId::Ending);
        self.burst = None;
        self.stars.clear();
        self.stars_start_s = None;
    }

    fn spawn_burst(&mut self, doc: &Document, now_s: f64) {
        let origin = self
            .text_region
            .or(self.region)
            .and_then(|id| doc.rect(id))
            .map(|r: Rect| r.center())
            .unwrap_or(Point::ORIGIN);
        let burst = ParticleBurst::spawn(
            origin,
            self.config.burst_count(self.init.tier),
            self.config.burst_spread_px,
            self.config.burst_y_offset_px,
            self.config.burst_duration_s,
            self.color,
            now_s,
        );
        tracing::debug!(particles = burst.len(), "ending burst");
        self.burst = Some(burst);
        self.bursts_spawned += 1;
        self.set_phase(EndingPhase::Bursting);
    }

    fn needs_frames(&self) -> bool {
        !self.stars.is_empty()
            || matches!(
                self.phase,
                EndingPhase::Waiting | EndingPhase::Typing | EndingPhase::Bursting
            )
    }

    fn sync_frames(&mut self, clock: &mut FrameClock) {
        match (self.needs_frames(), self.subscription) {
            (true, None) => self.subscription = Some(clock.subscribe(ComponentId::Ending)),
            (false, Some(sub)) => {
                clock.cancel(sub);
                self.subscription = None;
            }
            _ => {}
        }
    }

    fn set_phase(&mut self, next: EndingPhase) {
        if self.phase != next {
            tracing::debug!(from = ?self.phase, to = ?next, "ending phase");
            self.phase = next;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/ending.rs"]
mod tests;
