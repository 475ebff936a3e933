//! Tunable parameters. Every field has a default so partial JSON overrides work.

use std::path::Path;

use anyhow::Context;

use crate::{
    env::capability::PerformanceTier,
    foundation::error::{StarcardError, StarcardResult},
    trigger::registry::{Edge, Threshold},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub scroll: ScrollConfig,
    pub cards: CardConfig,
    pub field: FieldConfig,
    pub borders: BorderConfig,
    pub vine: VineConfig,
    pub ending: EndingConfig,
    pub resize: ResizeConfig,
    pub audio: AudioConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub smooth: bool,
    pub smoothing_duration_s: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            smoothing_duration_s: 1.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Card enters when its top crosses this line.
    pub start: Threshold,
    /// Card has fully exited when its bottom crosses this line.
    pub end: Threshold,
    pub entry_duration_s: f64,
    pub exit_duration_s: f64,
    pub entry_offset_px: f64,
    pub entry_blur_px: f64,
    pub float_amplitude_px: f64,
    pub float_period_s: f64,
    pub reduced_motion_fade_s: f64,
    pub card_width_px: f64,
    pub card_height_px: f64,
    pub card_gap_px: f64,
    pub side_inset_px: f64,
    /// Fraction of the visibility span a card's effect slot must cover before
    /// its secondary animation loads.
    pub effect_visible_fraction: f64,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            start: Threshold::new(Edge::Top, 0.85),
            end: Threshold::new(Edge::Bottom, 0.15),
            entry_duration_s: 1.0,
            exit_duration_s: 0.6,
            entry_offset_px: 50.0,
            entry_blur_px: 8.0,
            float_amplitude_px: 10.0,
            float_period_s: 3.0,
            reduced_motion_fade_s: 0.3,
            card_width_px: 384.0,
            card_height_px: 420.0,
            card_gap_px: 160.0,
            side_inset_px: 96.0,
            effect_visible_fraction: 0.3,
        }
    }
}

/// Per-layer motion coefficients.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerMotion {
    /// Radians per second.
    pub drift: f64,
    /// World units per scrolled pixel.
    pub parallax: f64,
    pub base_opacity: f64,
    pub size: f64,
    pub depth_min: f64,
    pub depth_max: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TierCounts {
    pub far: usize,
    pub mid: usize,
    pub near: usize,
}

impl TierCounts {
    pub fn total(self) -> usize {
        self.far + self.mid + self.near
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub low: TierCounts,
    pub medium: TierCounts,
    pub high: TierCounts,
    pub far: LayerMotion,
    pub mid: LayerMotion,
    pub near: LayerMotion,
    pub twinkle_hz_min: f64,
    pub twinkle_hz_max: f64,
    pub field_extent: f64,
    pub fov_deg: f64,
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            low: TierCounts {
                far: 250,
                mid: 150,
                near: 100,
            },
            medium: TierCounts {
                far: 500,
                mid: 300,
                near: 200,
            },
            high: TierCounts {
                far: 1000,
                mid: 600,
                near: 400,
            },
            far: LayerMotion {
                drift: 0.0002,
                parallax: 0.0005,
                base_opacity: 0.5,
                size: 0.015,
                depth_min: -10.0,
                depth_max: -6.0,
            },
            mid: LayerMotion {
                drift: 0.0006,
                parallax: 0.0012,
                base_opacity: 0.7,
                size: 0.02,
                depth_min: -6.0,
                depth_max: -2.0,
            },
            near: LayerMotion {
                drift: 0.0012,
                parallax: 0.0025,
                base_opacity: 0.85,
                size: 0.03,
                depth_min: -2.0,
                depth_max: 2.0,
            },
            twinkle_hz_min: 0.15,
            twinkle_hz_max: 0.6,
            field_extent: 20.0,
            fov_deg: 75.0,
            seed: 0x5747_4152_4649_454C,
        }
    }
}

impl FieldConfig {
    pub fn counts(&self, tier: PerformanceTier) -> TierCounts {
        match tier {
            PerformanceTier::Low => self.low,
            PerformanceTier::Medium => self.medium,
            PerformanceTier::High => self.high,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub padding_px: f64,
    pub roughness: f64,
    pub bowing: f64,
    pub stroke_width: f64,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            padding_px: 4.0,
            roughness: 1.5,
            bowing: 1.0,
            stroke_width: 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VineConfig {
    pub start: Threshold,
    pub end: Threshold,
    pub segment_height: f64,
    pub stroke_width: f64,
}

impl Default for VineConfig {
    fn default() -> Self {
        Self {
            start: Threshold::new(Edge::Top, 0.5),
            end: Threshold::new(Edge::Bottom, 0.5),
            segment_height: 150.0,
            stroke_width: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EndingConfig {
    pub start: Threshold,
    pub char_interval_s: f64,
    pub start_delay_s: f64,
    pub burst_duration_s: f64,
    pub burst_spread_px: f64,
    pub burst_y_offset_px: f64,
    pub burst_low: usize,
    pub burst_medium: usize,
    pub burst_high: usize,
    pub floating_stars: usize,
    pub reduced_motion_fade_s: f64,
}

impl Default for EndingConfig {
    fn default() -> Self {
        Self {
            start: Threshold::new(Edge::Top, 0.5),
            char_interval_s: 0.04,
            start_delay_s: 0.5,
            burst_duration_s: 1.8,
            burst_spread_px: 200.0,
            burst_y_offset_px: -50.0,
            burst_low: 10,
            burst_medium: 20,
            burst_high: 30,
            floating_stars: 5,
            reduced_motion_fade_s: 0.5,
        }
    }
}

impl EndingConfig {
    pub fn burst_count(&self, tier: PerformanceTier) -> usize {
        match tier {
            PerformanceTier::Low => self.burst_low,
            PerformanceTier::Medium => self.burst_medium,
            PerformanceTier::High => self.burst_high,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub debounce_s: f64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self { debounce_s: 0.25 }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub volume: f64,
    pub looped: bool,
    /// Clicks inside this window share one feedback pulse.
    pub feedback_debounce_s: f64,
    pub feedback_duration_s: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            looped: true,
            feedback_debounce_s: 0.3,
            feedback_duration_s: 0.6,
        }
    }
}

fn check_duration(name: &str, v: f64) -> StarcardResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(StarcardError::validation(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}

impl PageConfig {
    pub fn from_json_str(s: &str) -> StarcardResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> StarcardResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read page config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> StarcardResult<()> {
        check_duration("scroll.smoothing_duration_s", self.scroll.smoothing_duration_s)?;
        for (name, v) in [
            ("cards.entry_duration_s", self.cards.entry_duration_s),
            ("cards.exit_duration_s", self.cards.exit_duration_s),
            ("cards.reduced_motion_fade_s", self.cards.reduced_motion_fade_s),
            ("ending.char_interval_s", self.ending.char_interval_s),
            ("ending.start_delay_s", self.ending.start_delay_s),
            ("ending.burst_duration_s", self.ending.burst_duration_s),
            ("resize.debounce_s", self.resize.debounce_s),
            ("audio.feedback_debounce_s", self.audio.feedback_debounce_s),
        ] {
            check_duration(name, v)?;
        }
        if !(self.cards.float_period_s.is_finite() && self.cards.float_period_s > 0.0) {
            return Err(StarcardError::validation(
                "cards.float_period_s must be finite and > 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(StarcardError::validation("audio.volume must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.cards.effect_visible_fraction) {
            return Err(StarcardError::validation(
                "cards.effect_visible_fraction must be in [0, 1]",
            ));
        }

        let f = &self.field;
        if !(f.far.drift < f.mid.drift && f.mid.drift < f.near.drift) {
            return Err(StarcardError::validation(
                "field drift must increase strictly from far to near",
            ));
        }
        if !(f.far.parallax < f.mid.parallax && f.mid.parallax < f.near.parallax) {
            return Err(StarcardError::validation(
                "field parallax must increase strictly from far to near",
            ));
        }
        if !(f.twinkle_hz_min > 0.0 && f.twinkle_hz_min <= f.twinkle_hz_max) {
            return Err(StarcardError::validation(
                "field twinkle frequency range is invalid",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
