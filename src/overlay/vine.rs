use kurbo::ParamCurveArclen;

use crate::{
    config::VineConfig,
    env::capability::InitConfig,
    foundation::core::{BezPath, Rect, Rgba8},
    runtime::ComponentId,
    stage::document::{Document, RegionId},
    theme::controller::ThemeSnapshot,
    trigger::registry::{
        TriggerEvent, TriggerEventKind, TriggerHandle, TriggerRegistry, TriggerSpec,
    },
};

/// Width of the vine's coordinate space; height is `beats * segment_height`.
pub const VINE_VIEW_WIDTH: f64 = 100.0;
/// Beat count assumed when the story has none.
pub const DEFAULT_VINE_BEATS: usize = 6;

const ARCLEN_ACCURACY: f64 = 1e-3;

/// A trunk curving through one knot per beat, each knot sprouting a short
/// branch toward the side its card sits on.
pub fn vine_path(beats: usize, segment_height: f64) -> BezPath {
    let mid = VINE_VIEW_WIDTH / 2.0;
    let mut path = BezPath::new();
    path.move_to((mid, 0.0));
    for i in 0..beats {
        let y = i as f64 * segment_height + segment_height / 2.0;
        let (control_x, end_x) = if i % 2 == 0 { (20.0, 30.0) } else { (80.0, 70.0) };
        path.quad_to((control_x, y - 30.0), (mid, y));
        path.quad_to((control_x, y + 10.0), (end_x, y + 20.0));
        path.move_to((mid, y));
    }
    path
}

pub fn path_length(path: &BezPath) -> f64 {
    path.segments().map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum()
}

/// Connecting path whose drawn fraction follows scroll progress through the
/// timeline container. Backward scrolling shrinks it through the same progress
/// events, so there is no snapping.
#[derive(Debug)]
pub struct Vine {
    config: VineConfig,
    beats: usize,
    path: BezPath,
    length: f64,
    stroke: Rgba8,
    trigger: Option<TriggerHandle>,
    fraction: f64,
}

impl Vine {
    pub fn new(config: VineConfig, beats: usize, theme: &ThemeSnapshot) -> Self {
        let beats = if beats == 0 { DEFAULT_VINE_BEATS } else { beats };
        let path = vine_path(beats, config.segment_height);
        let length = path_length(&path);
        Self {
            config,
            beats,
            path,
            length,
            stroke: theme.tokens.vine_stroke,
            trigger: None,
            fraction: 0.0,
        }
    }

    /// Without a container there is nothing to track; the vine stays hidden.
    #[tracing::instrument(skip(self, doc, triggers))]
    pub fn init(
        &mut self,
        container: Option<RegionId>,
        init: InitConfig,
        doc: &Document,
        triggers: &mut TriggerRegistry,
    ) -> bool {
        if init.reduced_motion {
            self.fraction = 1.0;
            return true;
        }
        let Some(container) = container else {
            tracing::info!("no timeline container, vine not tracked");
            return false;
        };
        let spec = TriggerSpec::new(ComponentId::Vine, self.config.start, self.config.end)
            .with_progress()
            .invalidate_on_resize();
        self.trigger = Some(triggers.register(doc, container, spec));
        tracing::info!(beats = self.beats, length = self.length, "vine tracking scroll");
        true
    }

    pub fn handle_event(&mut self, event: &TriggerEvent) -> bool {
        if Some(event.handle) != self.trigger {
            return false;
        }
        match event.kind {
            TriggerEventKind::Progress(p) => {
                let changed = p != self.fraction;
                self.fraction = p;
                changed
            }
            _ => false,
        }
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    pub fn view_box(&self) -> Rect {
        Rect::new(0.0, 0.0, VINE_VIEW_WIDTH, self.beats as f64 * self.config.segment_height)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn drawn_fraction(&self) -> f64 {
        self.fraction
    }

    pub fn drawn_length(&self) -> f64 {
        self.length * self.fraction
    }

    /// Stroke dash offset that hides the undrawn tail.
    pub fn dash_offset(&self) -> f64 {
        self.length - self.drawn_length()
    }

    pub fn stroke(&self) -> Rgba8 {
        self.stroke
    }

    pub fn stroke_width(&self) -> f64 {
        self.config.stroke_width
    }

    pub fn set_theme(&mut self, theme: &ThemeSnapshot) {
        self.stroke = theme.tokens.vine_stroke;
    }

    pub fn teardown(&mut self, triggers: &mut TriggerRegistry) {
        triggers.unregister_owner(ComponentId::Vine);
        self.trigger = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/vine.rs"]
mod tests;
