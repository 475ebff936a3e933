//! Page orchestration: wires every component to one document, one trigger
//! registry, one frame clock and one theme.
//!
//! The host drives a [`Page`] with four kinds of input:
//!
//! - [`Page::scroll_to`] / [`Page::scroll_by`] for wheel and touch input,
//! - [`Page::resize`] for viewport changes,
//! - [`Page::click`] for the two page controls,
//! - [`Page::advance`] from its frame callback.
//!
//! Component failures during [`Page::init`] are contained: each one is logged
//! and the rest of the page still comes up. Only an invalid setup (bad
//! viewport or config) aborts, which [`Page::boot`] turns into a loading
//! screen carrying [`welcome::LOAD_FAILURE_MESSAGE`].

pub mod resize;
pub mod welcome;

use std::sync::Arc;

use crate::{
    audio::toggle::{AudioSink, AudioToggle},
    config::PageConfig,
    content::story::Story,
    env::capability::{Environment, InitConfig},
    field::renderer::{FieldBackend, FieldRenderer},
    foundation::{
        core::{Rect, Vec2, Viewport},
        error::StarcardResult,
        math::seed_from_str,
    },
    overlay::{borders::Borders, ending::EndingEffects, secondary::SecondaryEffects, vine::Vine},
    page::{
        resize::ResizeCoordinator,
        welcome::{LOAD_FAILURE_MESSAGE, LoadingScreen, WelcomeIntro},
    },
    runtime::{ComponentId, clock::FrameClock, scheduler::Timers},
    scroll::signal::ScrollSignal,
    stage::document::{Control, Document, HostEventKind, RegionAttrs, RegionKind},
    theme::controller::{
        ThemeController, ThemeListenerId, ThemeName, ThemeQueue, ThemeSnapshot, nearest_to_center,
    },
    timeline::builder::{ThemeBinding, Timeline},
    trigger::registry::{TriggerHandle, TriggerRegistry},
};

/// Platform services the page renders and plays through.
pub struct PageBackends {
    pub field: Box<dyn FieldBackend>,
    /// `None` when the platform has no audio output.
    pub audio: Option<Box<dyn AudioSink>>,
}

/// Everything [`Page::init`] needs.
pub struct PageSetup {
    pub story: Story,
    pub environment: Environment,
    pub config: PageConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub backends: PageBackends,
}

/// Outstanding runtime resources. All zero after [`Page::teardown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResourceCounts {
    pub frame_subscriptions: usize,
    pub listeners: usize,
    pub triggers: usize,
    pub timers: usize,
}

impl ResourceCounts {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// The assembled page.
pub struct Page {
    init: InitConfig,
    viewport: Viewport,
    doc: Document,
    triggers: TriggerRegistry,
    clock: FrameClock,
    timers: Timers,
    theme: ThemeController,
    scroll: ScrollSignal,
    timeline: Timeline,
    field: FieldRenderer,
    borders: Borders,
    vine: Vine,
    ending: EndingEffects,
    secondary: SecondaryEffects,
    audio: AudioToggle,
    resize: ResizeCoordinator,
    welcome: Option<WelcomeIntro>,
    loading: LoadingScreen,
    /// Card straddling the viewport center line, which holds the theme.
    bound: Option<(TriggerHandle, ThemeName)>,
    pointer: Vec2,
    torn_down: bool,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("init", &self.init)
            .field("viewport", &self.viewport)
            .field("theme", &self.theme.current_name())
            .field("cards", &self.timeline.len())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl Page {
    /// Boots the page, or returns the loading screen showing the failure.
    pub fn boot(setup: PageSetup, now_s: f64) -> Result<Self, LoadingScreen> {
        Self::init(setup, now_s).map_err(|err| {
            tracing::error!(error = %err, "page failed to start");
            LoadingScreen::failed(LOAD_FAILURE_MESSAGE)
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(width = setup.viewport_width, height = setup.viewport_height)
    )]
    pub fn init(setup: PageSetup, now_s: f64) -> StarcardResult<Self> {
        let PageSetup {
            story,
            environment,
            config,
            viewport_width,
            viewport_height,
            backends,
        } = setup;
        config.validate()?;
        let viewport = Viewport::new(viewport_width, viewport_height)?;
        let init = environment.detect();

        let mut doc = Document::new();
        let mut triggers = TriggerRegistry::new(viewport.height);
        let mut clock = FrameClock::new();
        let timers = Timers::new();
        let theme = ThemeController::default();
        let snapshot = theme.current();
        let beats = story.beats();

        let scroll = ScrollSignal::new(&config.scroll, init);
        doc.listen(ComponentId::Scroll, HostEventKind::Scroll);
        doc.listen(ComponentId::Scroll, HostEventKind::Click(Control::BackToTop));

        let mut field =
            FieldRenderer::new(config.field.clone(), backends.field, viewport, &snapshot);
        field.init(init, &mut clock);

        // Cards start one screen down, below the welcome section.
        let mut timeline = Timeline::new(config.cards.clone(), init);
        if let Err(err) =
            timeline.build(&beats, viewport, viewport.height, &mut doc, &mut triggers)
        {
            tracing::warn!(error = %err, "timeline unavailable");
        }

        let ending_top = timeline
            .container()
            .and_then(|c| doc.rect(c))
            .map(|r| r.y1 + config.cards.card_gap_px)
            .unwrap_or(viewport.height);
        let ending_region = doc.insert(
            RegionKind::Ending,
            Rect::new(0.0, ending_top, viewport.width, ending_top + viewport.height),
            None,
            RegionAttrs::default(),
        );
        let text_region = doc.insert(
            RegionKind::EndingText,
            Rect::new(
                viewport.width * 0.2,
                ending_top + viewport.height * 0.35,
                viewport.width * 0.8,
                ending_top + viewport.height * 0.65,
            ),
            Some(ending_region),
            RegionAttrs::default(),
        );

        let mut vine = Vine::new(config.vine.clone(), beats.len(), &snapshot);
        vine.init(timeline.container(), init, &doc, &mut triggers);

        let mut borders = Borders::new(config.borders.clone(), &snapshot);
        borders.init(&mut doc);
        // Everything inserted so far has just been drawn.
        doc.take_mutations();

        let mut secondary = SecondaryEffects::new();
        secondary.init(
            timeline.cards(),
            config.cards.effect_visible_fraction,
            init,
            &doc,
            &mut triggers,
        );

        let mut ending = EndingEffects::new(
            config.ending.clone(),
            init,
            story.ending_message(),
            &snapshot,
        );
        ending.init(
            ending_region,
            Some(text_region),
            config.field.seed ^ seed_from_str("ending"),
            now_s,
            &doc,
            &mut triggers,
            &mut clock,
        );

        let mut audio = AudioToggle::new(config.audio.clone());
        audio.init(story.music_src().as_deref(), backends.audio, init, &mut doc);

        let mut resize = ResizeCoordinator::new(config.resize.debounce_s);
        resize.init(&mut doc);

        let welcome = match WelcomeIntro::new(&story, init, now_s) {
            Ok(intro) => Some(intro),
            Err(err) => {
                tracing::warn!(error = %err, "welcome intro unavailable");
                None
            }
        };
        let mut loading = LoadingScreen::new();
        loading.hide(now_s);

        let mut page = Self {
            init,
            viewport,
            doc,
            triggers,
            clock,
            timers,
            theme,
            scroll,
            timeline,
            field,
            borders,
            vine,
            ending,
            secondary,
            audio,
            resize,
            welcome,
            loading,
            bound: None,
            pointer: Vec2::ZERO,
            torn_down: false,
        };
        page.on_scroll(0.0, now_s);
        page.timeline.sync_frames(&mut page.clock);
        tracing::info!(
            cards = page.timeline.len(),
            tier = %init.tier,
            reduced_motion = init.reduced_motion,
            "page ready"
        );
        Ok(page)
    }

    pub fn init_config(&self) -> InitConfig {
        self.init
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Host-side layout sync; structural changes reach the overlays on the next
    /// [`Page::advance`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn theme(&self) -> Arc<ThemeSnapshot> {
        self.theme.current()
    }

    pub fn on_theme_change(
        &mut self,
        listener: impl FnMut(&ThemeSnapshot, &mut ThemeQueue) + 'static,
    ) -> ThemeListenerId {
        self.theme.on_change(listener)
    }

    pub fn remove_theme_listener(&mut self, id: ThemeListenerId) -> bool {
        self.theme.remove_listener(id)
    }

    /// Manual theme switch by name; unknown names are ignored.
    pub fn set_theme(&mut self, name: &str) {
        match ThemeName::parse(name) {
            Some(theme) => self.apply_theme(theme),
            None => tracing::warn!(name, "unknown theme ignored"),
        }
    }

    pub fn scroll(&self) -> &ScrollSignal {
        &self.scroll
    }

    pub fn scroll_position(&self) -> f64 {
        self.scroll.position()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn field(&self) -> &FieldRenderer {
        &self.field
    }

    pub fn borders(&self) -> &Borders {
        &self.borders
    }

    pub fn vine(&self) -> &Vine {
        &self.vine
    }

    pub fn ending(&self) -> &EndingEffects {
        &self.ending
    }

    pub fn secondary(&self) -> &SecondaryEffects {
        &self.secondary
    }

    pub fn audio(&self) -> &AudioToggle {
        &self.audio
    }

    pub fn welcome(&self) -> Option<&WelcomeIntro> {
        self.welcome.as_ref()
    }

    pub fn loading(&self) -> &LoadingScreen {
        &self.loading
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn resources(&self) -> ResourceCounts {
        ResourceCounts {
            frame_subscriptions: self.clock.active_count(),
            listeners: self.doc.listener_count(),
            triggers: self.triggers.len(),
            timers: self.timers.len(),
        }
    }

    /// Requests a scroll to `y`. With smoothing the position glides there over
    /// subsequent frames; otherwise it applies now.
    pub fn scroll_to(&mut self, y: f64, now_s: f64) {
        if self.torn_down {
            return;
        }
        if let Some(position) = self.scroll.set_target(&mut self.clock, y, now_s) {
            self.on_scroll(position, now_s);
            self.timeline.sync_frames(&mut self.clock);
        }
    }

    pub fn scroll_by(&mut self, dy: f64, now_s: f64) {
        let target = self.scroll.raw() + dy;
        self.scroll_to(target, now_s);
    }

    /// Debounced; the re-measure happens in a later [`Page::advance`].
    pub fn resize(&mut self, width: f64, height: f64, now_s: f64) -> StarcardResult<()> {
        let viewport = Viewport::new(width, height)?;
        if !self.torn_down {
            self.resize.on_resize(viewport, &mut self.timers, now_s);
        }
        Ok(())
    }

    pub fn click(&mut self, control: Control, now_s: f64) {
        if self.torn_down {
            return;
        }
        match control {
            Control::MusicButton => {
                self.audio.toggle(&mut self.timers, now_s);
            }
            Control::BackToTop => self.scroll_to(0.0, now_s),
        }
    }

    /// Pointer position normalized to `[-1, 1]` on both axes.
    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
        self.field.apply_parallax(self.scroll.position(), pointer);
    }

    /// One host frame: due timers, pending document mutations, then every
    /// frame subscriber against the same timestamp.
    pub fn advance(&mut self, now_s: f64) {
        if self.torn_down {
            return;
        }
        for (fired, owner) in self.timers.take_due(now_s) {
            match owner {
                ComponentId::Resize => {
                    if let Some(viewport) = self.resize.on_timer(fired) {
                        self.apply_resize(viewport, now_s);
                    }
                }
                ComponentId::Audio => {
                    self.audio.on_timer(fired, now_s);
                }
                other => tracing::debug!(owner = %other, "stray timer ignored"),
            }
        }

        let mutations = self.doc.take_mutations();
        if !mutations.is_empty() {
            self.borders.on_mutations(&self.doc, &mutations);
        }

        if let Some(tick) = self.clock.tick(now_s) {
            if let Some(position) = self.scroll.advance(&mut self.clock, &tick) {
                self.on_scroll(position, now_s);
            }
            self.timeline.advance(&tick);
            self.field.render(&tick, &mut self.clock);
            self.ending.advance(&tick, &self.doc, &mut self.clock);
        }
        self.timeline.sync_frames(&mut self.clock);
    }

    /// Releases every subscription, listener, trigger and timer. Safe to call
    /// more than once.
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self) {
        self.timeline
            .teardown(&mut self.doc, &mut self.triggers, &mut self.clock);
        self.field.teardown(&mut self.clock);
        self.borders.teardown(&mut self.doc);
        self.vine.teardown(&mut self.triggers);
        self.ending.teardown(&mut self.triggers, &mut self.clock);
        self.secondary.teardown(&mut self.triggers);
        self.audio.teardown(&mut self.timers, &mut self.doc);
        self.resize.teardown(&mut self.timers, &mut self.doc);
        self.scroll.teardown(&mut self.clock);
        self.doc.unlisten_owner(ComponentId::Scroll);
        self.bound = None;
        if !self.torn_down {
            tracing::info!(resources = ?self.resources(), "page torn down");
        }
        self.torn_down = true;
    }

    /// Routes trigger events for the new scroll position, then settles the theme.
    fn on_scroll(&mut self, position: f64, now_s: f64) {
        let events = self.triggers.update(position);
        for event in &events {
            match event.owner {
                ComponentId::Timeline => self.timeline.handle_event(event, now_s),
                ComponentId::Theme => match self.timeline.theme_binding(event) {
                    Some(ThemeBinding::Bind(theme)) => self.bound = Some((event.handle, theme)),
                    Some(ThemeBinding::Release)
                        if self.bound.is_some_and(|(handle, _)| handle == event.handle) =>
                    {
                        self.bound = None;
                    }
                    _ => {}
                },
                ComponentId::Vine => {
                    self.vine.handle_event(event);
                }
                ComponentId::Ending => {
                    self.ending.handle_event(event, now_s, &mut self.clock);
                }
                ComponentId::Secondary => {
                    self.secondary.handle_event(event);
                }
                other => tracing::debug!(owner = %other, "unrouted trigger event"),
            }
        }

        let target = self.bound.map(|(_, theme)| theme).or_else(|| {
            let candidates = self.timeline.theme_candidates(&self.doc);
            nearest_to_center(&candidates, self.viewport.center_y(position)).map(|c| c.theme)
        });
        if let Some(theme) = target {
            self.apply_theme(theme);
        }
        self.field.apply_parallax(position, self.pointer);
    }

    /// Overlays receive each snapshot before theme listeners, and before any
    /// follow-up a listener requests is applied.
    fn apply_theme(&mut self, theme: ThemeName) {
        let Self {
            theme: controller,
            doc,
            borders,
            field,
            vine,
            ending,
            ..
        } = self;
        let doc = &*doc;
        controller.set_with(theme, |snapshot| {
            borders.set_theme(snapshot, doc);
            field.set_theme(snapshot);
            vine.set_theme(snapshot);
            ending.set_theme(snapshot);
        });
    }

    fn apply_resize(&mut self, viewport: Viewport, now_s: f64) {
        self.viewport = viewport;
        self.triggers.refresh_all(&self.doc, viewport.height);
        if self
            .bound
            .is_some_and(|(handle, _)| !self.triggers.contains(handle))
        {
            tracing::debug!("theme binding released with its region");
            self.bound = None;
        }
        self.borders.redraw_all(&self.doc);
        self.field.resize(viewport);
        tracing::info!(width = viewport.width, height = viewport.height, "layout re-measured");
        self.on_scroll(self.scroll.position(), now_s);
        self.timeline.sync_frames(&mut self.clock);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/page.rs"]
mod tests;
