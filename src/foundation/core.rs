use crate::foundation::error::{StarcardError, StarcardResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Visible viewport in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> StarcardResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(StarcardError::validation(
                "Viewport width and height must be finite and > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// Document-space y of the viewport's vertical center at the given scroll offset.
    pub fn center_y(self, scroll_y: f64) -> f64 {
        scroll_y + self.height * 0.5
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Scales the RGB channels by `factor`, leaving alpha untouched.
    pub fn scale_rgb(self, factor: f64) -> Self {
        let f = |c: u8| (f64::from(c) * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: self.a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
