use std::collections::BTreeMap;

use crate::{
    animation::tween::Lerp,
    config::BorderConfig,
    foundation::{
        core::{BezPath, Point, Rect, Rgba8, Vec2},
        math::{Rng64, seed_from_str},
    },
    runtime::ComponentId,
    stage::document::{Document, HostEventKind, Mutation, Region, RegionId, RegionKind},
    theme::controller::{ThemeName, ThemeSnapshot, ThemeTokens},
};

/// Each outline is stroked this many times with independent jitter.
pub const STROKE_PASSES: usize = 2;

/// Jittered outline of `rect` inset by `config.padding_px`: four slightly bowed
/// edges per pass. Deterministic for a given `seed`.
pub fn rough_rectangle(rect: Rect, config: &BorderConfig, seed: u64) -> Vec<BezPath> {
    let r = rect.inset(-config.padding_px);
    let corners = [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x1, r.y1),
        Point::new(r.x0, r.y1),
    ];
    let mut rng = Rng64::new(seed);
    (0..STROKE_PASSES)
        .map(|_| {
            let mut path = BezPath::new();
            for i in 0..corners.len() {
                rough_edge(
                    &mut path,
                    corners[i],
                    corners[(i + 1) % corners.len()],
                    config,
                    &mut rng,
                );
            }
            path
        })
        .collect()
}

fn rough_edge(path: &mut BezPath, a: Point, b: Point, config: &BorderConfig, rng: &mut Rng64) {
    let d = b - a;
    let len = d.hypot();
    if len <= 0.0 {
        return;
    }
    let normal = Vec2::new(-d.y, d.x) / len;
    let jitter = |rng: &mut Rng64| Vec2::new(rng.signed(), rng.signed()) * config.roughness;
    let bow = normal * (config.bowing * config.roughness * len * 0.01 * rng.signed());

    let start = a + jitter(rng);
    let end = b + jitter(rng);
    let c1 = a + d * (1.0 / 3.0) + bow + jitter(rng);
    let c2 = a + d * (2.0 / 3.0) + bow + jitter(rng);
    path.move_to(start);
    path.curve_to(c1, c2, end);
}

/// One card's outline as handed to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderStroke {
    pub region: RegionId,
    pub card_id: Option<String>,
    pub paths: Vec<BezPath>,
    pub color: Rgba8,
    pub stroke_width: f64,
}

/// Card theme hue, pulled halfway toward the page's current border color.
fn stroke_color(card_theme: Option<ThemeName>, current: &ThemeTokens) -> Rgba8 {
    match card_theme {
        Some(theme) => Rgba8::lerp(
            &ThemeTokens::derive(theme).border_stroke,
            &current.border_stroke,
            0.5,
        ),
        None => current.border_stroke,
    }
}

/// Hand-drawn outlines for every card in the document.
#[derive(Debug)]
pub struct Borders {
    config: BorderConfig,
    tokens: ThemeTokens,
    strokes: BTreeMap<RegionId, BorderStroke>,
    draws: u64,
}

impl Borders {
    pub fn new(config: BorderConfig, theme: &ThemeSnapshot) -> Self {
        Self {
            config,
            tokens: theme.tokens,
            strokes: BTreeMap::new(),
            draws: 0,
        }
    }

    /// Watches resize and document mutations, then draws every card present.
    pub fn init(&mut self, doc: &mut Document) -> usize {
        doc.listen(ComponentId::Borders, HostEventKind::Resize);
        doc.listen(ComponentId::Borders, HostEventKind::Mutation);
        self.redraw_all(doc)
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn stroke(&self, region: RegionId) -> Option<&BorderStroke> {
        self.strokes.get(&region)
    }

    pub fn strokes(&self) -> impl Iterator<Item = &BorderStroke> {
        self.strokes.values()
    }

    /// Total outlines drawn since creation, redraws included.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Rebuilds every outline from current card boxes. Cards that left the
    /// document lose theirs.
    #[tracing::instrument(skip_all)]
    pub fn redraw_all(&mut self, doc: &Document) -> usize {
        self.strokes.clear();
        for region in doc.regions_of(RegionKind::Card) {
            self.draw(region);
        }
        tracing::debug!(borders = self.strokes.len(), "borders redrawn");
        self.strokes.len()
    }

    /// Replaces any existing outline for `region`. Zero-sized cards are skipped.
    pub fn draw(&mut self, region: &Region) -> bool {
        self.strokes.remove(&region.id);
        if region.rect.width() <= 0.0 || region.rect.height() <= 0.0 {
            tracing::warn!(region = region.id.raw(), "card has no size, border skipped");
            return false;
        }
        let seed = match &region.attrs.card_id {
            Some(id) => seed_from_str(id),
            None => region.id.raw(),
        };
        self.strokes.insert(
            region.id,
            BorderStroke {
                region: region.id,
                card_id: region.attrs.card_id.clone(),
                paths: rough_rectangle(region.rect, &self.config, seed),
                color: stroke_color(region.attrs.theme, &self.tokens),
                stroke_width: self.config.stroke_width,
            },
        );
        self.draws += 1;
        true
    }

    pub fn on_mutations(&mut self, doc: &Document, mutations: &[Mutation]) {
        for mutation in mutations {
            match *mutation {
                Mutation::Inserted(id) => {
                    if let Some(region) = doc.region(id).filter(|r| r.kind == RegionKind::Card) {
                        self.draw(region);
                    }
                }
                Mutation::Removed(id) => {
                    self.strokes.remove(&id);
                }
            }
        }
    }

    pub fn set_theme(&mut self, theme: &ThemeSnapshot, doc: &Document) {
        self.tokens = theme.tokens;
        self.redraw_all(doc);
    }

    pub fn teardown(&mut self, doc: &mut Document) {
        doc.unlisten_owner(ComponentId::Borders);
        self.strokes.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/borders.rs"]
mod tests;
