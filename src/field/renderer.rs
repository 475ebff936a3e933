use crate::{
    config::FieldConfig,
    env::capability::InitConfig,
    field::layers::{LayerKind, StarLayer},
    foundation::{
        core::{Rgba8, Vec2, Viewport},
        error::StarcardResult,
        math::Rng64,
    },
    runtime::{
        ComponentId,
        clock::{FrameClock, FrameSubscription, FrameTick},
    },
    theme::controller::ThemeSnapshot,
};

/// Camera parameters; the only thing a resize changes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Projection {
    pub fov_deg: f64,
    pub aspect: f64,
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct FieldFrame<'a> {
    pub frame: u64,
    pub elapsed_s: f64,
    pub layers: &'a [StarLayer],
    pub tint: Rgba8,
    pub background: Rgba8,
}

/// Host drawing surface for the field (a GPU canvas, a software raster, a test recorder).
pub trait FieldBackend {
    /// Capability probe; `false` degrades the field to a flat fill.
    fn is_available(&self) -> bool;

    fn set_projection(&mut self, projection: Projection);

    fn draw(&mut self, frame: &FieldFrame<'_>) -> StarcardResult<()>;

    fn fill_flat(&mut self, color: Rgba8);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum FieldMode {
    Uninitialized,
    /// Frame subscription live; twinkle, drift and parallax per tick.
    Animated,
    /// Reduced motion: one frame drawn at init, nothing scheduled.
    Static,
    /// No rendering backend: flat background fill.
    Flat,
    TornDown,
}

pub struct FieldRenderer {
    config: FieldConfig,
    backend: Box<dyn FieldBackend>,
    mode: FieldMode,
    layers: Vec<StarLayer>,
    projection: Projection,
    tint: Rgba8,
    background: Rgba8,
    start_s: Option<f64>,
    subscription: Option<FrameSubscription>,
    frames_drawn: u64,
}

impl std::fmt::Debug for FieldRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRenderer")
            .field("mode", &self.mode)
            .field("layers", &self.layers.len())
            .field("projection", &self.projection)
            .field("frames_drawn", &self.frames_drawn)
            .finish()
    }
}

impl FieldRenderer {
    pub fn new(
        config: FieldConfig,
        backend: Box<dyn FieldBackend>,
        viewport: Viewport,
        theme: &ThemeSnapshot,
    ) -> Self {
        let projection = Projection {
            fov_deg: config.fov_deg,
            aspect: viewport.aspect(),
        };
        Self {
            config,
            backend,
            mode: FieldMode::Uninitialized,
            layers: Vec::new(),
            projection,
            tint: theme.tokens.star_tint,
            background: theme.tokens.palette.background,
            start_s: None,
            subscription: None,
            frames_drawn: 0,
        }
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn layers(&self) -> &[StarLayer] {
        &self.layers
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&StarLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn tint(&self) -> Rgba8 {
        self.tint
    }

    /// Never fails: a missing backend or a failed first frame degrades to a
    /// flat fill and the page carries on.
    #[tracing::instrument(skip(self, clock))]
    pub fn init(&mut self, init: InitConfig, clock: &mut FrameClock) -> FieldMode {
        if self.mode != FieldMode::Uninitialized {
            return self.mode;
        }
        if !self.backend.is_available() {
            tracing::warn!("field backend unavailable, using flat background");
            self.degrade();
            return self.mode;
        }

        let counts = self.config.counts(init.tier);
        let mut rng = Rng64::new(self.config.seed);
        self.layers = LayerKind::ALL
            .iter()
            .map(|&kind| StarLayer::generate(kind, kind.count(counts), &self.config, &mut rng))
            .collect();
        self.backend.set_projection(self.projection);

        if init.reduced_motion {
            self.mode = FieldMode::Static;
            if let Err(err) = self.draw(0, 0.0) {
                tracing::warn!(error = %err, "static field frame failed");
                self.degrade();
            }
        } else {
            self.mode = FieldMode::Animated;
            self.subscription = Some(clock.subscribe(ComponentId::Field));
        }
        tracing::info!(
            mode = ?self.mode,
            stars = counts.total(),
            tier = %init.tier,
            "field initialized"
        );
        self.mode
    }

    /// Per-frame update; a no-op unless animated.
    pub fn render(&mut self, tick: &FrameTick, clock: &mut FrameClock) {
        if self.mode != FieldMode::Animated {
            return;
        }
        let start = *self.start_s.get_or_insert(tick.now_s);
        let elapsed = (tick.now_s - start).max(0.0);
        for layer in &mut self.layers {
            layer.animate(elapsed);
        }
        if let Err(err) = self.draw(tick.frame, elapsed) {
            tracing::warn!(error = %err, "field frame failed, degrading to flat background");
            self.stop(clock);
            self.degrade();
        }
    }

    pub fn apply_parallax(&mut self, scroll_offset: f64, pointer: Vec2) {
        if self.mode != FieldMode::Animated {
            return;
        }
        for layer in &mut self.layers {
            layer.apply_parallax(scroll_offset, pointer);
        }
    }

    pub fn set_theme(&mut self, theme: &ThemeSnapshot) {
        self.tint = theme.tokens.star_tint;
        self.background = theme.tokens.palette.background;
        if self.mode == FieldMode::Flat {
            self.backend.fill_flat(self.background);
        }
    }

    /// Recomputes projection only; particle buffers are kept.
    pub fn resize(&mut self, viewport: Viewport) {
        self.projection.aspect = viewport.aspect();
        if matches!(self.mode, FieldMode::Animated | FieldMode::Static) {
            self.backend.set_projection(self.projection);
        }
    }

    pub fn teardown(&mut self, clock: &mut FrameClock) {
        self.stop(clock);
        clock.cancel_owner(ComponentId::Field);
        self.layers.clear();
        self.mode = FieldMode::TornDown;
    }

    fn draw(&mut self, frame: u64, elapsed_s: f64) -> StarcardResult<()> {
        self.backend.draw(&FieldFrame {
            frame,
            elapsed_s,
            layers: &self.layers,
            tint: self.tint,
            background: self.background,
        })?;
        self.frames_drawn += 1;
        Ok(())
    }

    fn degrade(&mut self) {
        self.mode = FieldMode::Flat;
        self.layers.clear();
        self.backend.fill_flat(self.background);
    }

    fn stop(&mut self, clock: &mut FrameClock) {
        if let Some(sub) = self.subscription.take() {
            clock.cancel(sub);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/renderer.rs"]
mod tests;
