use std::f64::consts::TAU;

use crate::{
    config::{FieldConfig, LayerMotion, TierCounts},
    foundation::{core::Vec2, math::Rng64},
};

/// Screen-space scale applied to a normalized pointer offset before the
/// per-layer parallax coefficient.
pub const POINTER_PARALLAX_SCALE: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum LayerKind {
    Far,
    Mid,
    Near,
}

impl LayerKind {
    /// Back to front.
    pub const ALL: [LayerKind; 3] = [Self::Far, Self::Mid, Self::Near];

    pub fn motion(self, config: &FieldConfig) -> LayerMotion {
        match self {
            Self::Far => config.far,
            Self::Mid => config.mid,
            Self::Near => config.near,
        }
    }

    pub fn count(self, counts: TierCounts) -> usize {
        match self {
            Self::Far => counts.far,
            Self::Mid => counts.mid,
            Self::Near => counts.near,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub size: f64,
    pub base_opacity: f64,
    pub phase: f64,
    pub frequency_hz: f64,
    /// Current opacity after twinkle.
    pub opacity: f64,
}

/// Periodic twinkle; each star's own phase and frequency keep the field from
/// blinking in sync.
pub fn twinkle_opacity(base: f64, elapsed_s: f64, phase: f64, frequency_hz: f64) -> f64 {
    base * (0.6 + 0.4 * (TAU * frequency_hz * elapsed_s + phase).sin())
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StarLayer {
    pub kind: LayerKind,
    pub motion: LayerMotion,
    stars: Vec<Star>,
    rotation_rad: f64,
    parallax: Vec2,
}

impl StarLayer {
    pub fn generate(kind: LayerKind, count: usize, config: &FieldConfig, rng: &mut Rng64) -> Self {
        let motion = kind.motion(config);
        let half = config.field_extent / 2.0;
        let stars = (0..count)
            .map(|_| {
                let base_opacity = motion.base_opacity * rng.range(0.7, 1.0);
                Star {
                    x: rng.range(-half, half),
                    y: rng.range(-half, half),
                    z: rng.range(motion.depth_min, motion.depth_max),
                    size: motion.size * rng.range(0.6, 1.4),
                    base_opacity,
                    phase: rng.range(0.0, TAU),
                    frequency_hz: rng.range(config.twinkle_hz_min, config.twinkle_hz_max),
                    opacity: base_opacity,
                }
            })
            .collect();
        Self {
            kind,
            motion,
            stars,
            rotation_rad: 0.0,
            parallax: Vec2::ZERO,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_rad
    }

    pub fn parallax(&self) -> Vec2 {
        self.parallax
    }

    /// Recomputes opacity and drift rotation for `elapsed_s` since start.
    pub fn animate(&mut self, elapsed_s: f64) {
        for star in &mut self.stars {
            star.opacity =
                twinkle_opacity(star.base_opacity, elapsed_s, star.phase, star.frequency_hz);
        }
        self.rotation_rad = elapsed_s * self.motion.drift;
    }

    /// `pointer` is normalized to `[-1, 1]` on each axis.
    pub fn apply_parallax(&mut self, scroll_offset: f64, pointer: Vec2) {
        let k = self.motion.parallax;
        self.parallax = Vec2::new(
            pointer.x * POINTER_PARALLAX_SCALE * k,
            scroll_offset * k + pointer.y * POINTER_PARALLAX_SCALE * k,
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/layers.rs"]
mod tests;
