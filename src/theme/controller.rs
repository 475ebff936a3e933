use std::{collections::BTreeMap, collections::VecDeque, fmt, sync::Arc};

use crate::foundation::core::{Rect, Rgba8};

/// The closed set of themes.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Baseline night-sky theme.
    #[default]
    Galaxy,
    Christmas,
}

impl ThemeName {
    pub const ALL: [ThemeName; 2] = [Self::Galaxy, Self::Christmas];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "galaxy" => Some(Self::Galaxy),
            "christmas" => Some(Self::Christmas),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Galaxy => "galaxy",
            Self::Christmas => "christmas",
        }
    }

    fn palette(self) -> Palette {
        match self {
            Self::Galaxy => Palette {
                background: Rgba8::rgb(0x05, 0x06, 0x14),
                surface: Rgba8::rgba(0x0A, 0x0C, 0x1C, 140),
                text: Rgba8::rgb(0xE9, 0xF7, 0xFF),
                accent: Rgba8::rgb(0xBF, 0xA7, 0xFF),
                accent_alt: Rgba8::rgb(0x7E, 0xE7, 0xFF),
                highlight: Rgba8::rgb(0xFF, 0xB7, 0xE1),
            },
            Self::Christmas => Palette {
                background: Rgba8::rgb(0x0B, 0x1A, 0x14),
                surface: Rgba8::rgba(0x14, 0x24, 0x1C, 150),
                text: Rgba8::rgb(0xFF, 0xF8, 0xE7),
                accent: Rgba8::rgb(0xD7, 0x26, 0x3D),
                accent_alt: Rgba8::rgb(0x2E, 0x8B, 0x57),
                highlight: Rgba8::rgb(0xFF, 0xD7, 0x00),
            },
        }
    }

    fn filter(self) -> FilterParams {
        match self {
            Self::Galaxy => FilterParams {
                hue_rotate_deg: 0.0,
                saturate: 1.0,
                brightness: 1.0,
            },
            Self::Christmas => FilterParams {
                hue_rotate_deg: -15.0,
                saturate: 1.15,
                brightness: 1.05,
            },
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Palette {
    pub background: Rgba8,
    pub surface: Rgba8,
    pub text: Rgba8,
    pub accent: Rgba8,
    pub accent_alt: Rgba8,
    pub highlight: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FilterParams {
    pub hue_rotate_deg: f64,
    pub saturate: f64,
    pub brightness: f64,
}

/// Derived visual tokens for one theme.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ThemeTokens {
    pub palette: Palette,
    pub filter: FilterParams,
    pub border_stroke: Rgba8,
    pub star_tint: Rgba8,
    pub burst_color: Rgba8,
    pub vine_stroke: Rgba8,
    pub transition_s: f64,
}

const THEME_TRANSITION_S: f64 = 0.8;

/// Listener-requested transitions applied per [`ThemeController::set`] call.
pub const MAX_FOLLOW_UP_ROUNDS: usize = ThemeName::ALL.len();

impl ThemeTokens {
    pub fn derive(name: ThemeName) -> Self {
        let palette = name.palette();
        let filter = name.filter();
        Self {
            palette,
            filter,
            border_stroke: palette.text.with_alpha(0.3),
            star_tint: palette.text.scale_rgb(filter.brightness),
            burst_color: palette.highlight,
            vine_stroke: palette.accent.with_alpha(0.4),
            transition_s: THEME_TRANSITION_S,
        }
    }
}

/// What every listener sees for one transition: name and the full token set together.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ThemeSnapshot {
    pub name: ThemeName,
    pub tokens: ThemeTokens,
    /// Increments once per applied transition.
    pub generation: u64,
}

/// Requests raised by listeners while a broadcast is in flight. They are applied
/// only after every listener has seen the current snapshot.
#[derive(Debug, Default)]
pub struct ThemeQueue {
    requests: Vec<ThemeName>,
}

impl ThemeQueue {
    pub fn request(&mut self, name: ThemeName) {
        self.requests.push(name);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThemeListenerId(u64);

type ThemeListener = Box<dyn FnMut(&ThemeSnapshot, &mut ThemeQueue)>;

/// Holds the one current theme and broadcasts transitions.
pub struct ThemeController {
    current: Arc<ThemeSnapshot>,
    listeners: BTreeMap<ThemeListenerId, ThemeListener>,
    next_listener: u64,
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("current", &self.current.name)
            .field("generation", &self.current.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for ThemeController {
    fn default() -> Self {
        Self::new(ThemeName::default())
    }
}

impl ThemeController {
    pub fn new(initial: ThemeName) -> Self {
        Self {
            current: Arc::new(ThemeSnapshot {
                name: initial,
                tokens: ThemeTokens::derive(initial),
                generation: 0,
            }),
            listeners: BTreeMap::new(),
            next_listener: 0,
        }
    }

    pub fn current(&self) -> Arc<ThemeSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn current_name(&self) -> ThemeName {
        self.current.name
    }

    pub fn on_change(
        &mut self,
        listener: impl FnMut(&ThemeSnapshot, &mut ThemeQueue) + 'static,
    ) -> ThemeListenerId {
        let id = ThemeListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn remove_listener(&mut self, id: ThemeListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Applies `name` and any follow-up requests listeners raise, one complete
    /// broadcast at a time. Returns every snapshot that became current, in order.
    pub fn set(&mut self, name: ThemeName) -> Vec<Arc<ThemeSnapshot>> {
        self.set_with(name, |_| {})
    }

    /// Like [`ThemeController::set`], but hands each snapshot to `deliver`
    /// before any listener sees it and before the next request is applied.
    ///
    /// At most [`MAX_FOLLOW_UP_ROUNDS`] follow-ups are applied per call; the
    /// rest are dropped with a warning.
    pub fn set_with(
        &mut self,
        name: ThemeName,
        mut deliver: impl FnMut(&ThemeSnapshot),
    ) -> Vec<Arc<ThemeSnapshot>> {
        let mut pending = VecDeque::from([name]);
        let mut applied: Vec<Arc<ThemeSnapshot>> = Vec::new();

        while let Some(next) = pending.pop_front() {
            if next == self.current.name {
                continue;
            }
            if applied.len() > MAX_FOLLOW_UP_ROUNDS {
                tracing::warn!(
                    dropped = pending.len() + 1,
                    current = %self.current.name,
                    "theme follow-up requests capped"
                );
                break;
            }
            let snapshot = Arc::new(ThemeSnapshot {
                name: next,
                tokens: ThemeTokens::derive(next),
                generation: self.current.generation + 1,
            });
            self.current = Arc::clone(&snapshot);
            tracing::debug!(theme = %next, generation = snapshot.generation, "theme changed");

            deliver(&snapshot);
            let mut queue = ThemeQueue::default();
            for listener in self.listeners.values_mut() {
                listener(&snapshot, &mut queue);
            }
            pending.extend(queue.requests);
            applied.push(snapshot);
        }
        applied
    }
}

/// A card considered for nearest-to-center theme selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeCandidate {
    pub ordinal: usize,
    pub rect: Rect,
    pub theme: ThemeName,
}

/// Picks the candidate whose center is closest to `center_y`; ties go to the lower ordinal.
pub fn nearest_to_center(candidates: &[ThemeCandidate], center_y: f64) -> Option<ThemeCandidate> {
    candidates
        .iter()
        .filter(|c| c.rect.height() > 0.0)
        .min_by(|a, b| {
            let da = (a.rect.center().y - center_y).abs();
            let db = (b.rect.center().y - center_y).abs();
            da.total_cmp(&db).then(a.ordinal.cmp(&b.ordinal))
        })
        .copied()
}

#[cfg(test)]
#[path = "../../tests/unit/theme/controller.rs"]
mod tests;
