use crate::{
    animation::ease::Ease,
    foundation::core::Rgba8,
    foundation::error::{StarcardError, StarcardResult},
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Rgba8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

/// A single time-based interpolation. Times are in seconds on the frame clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start_s: f64,
    pub delay_s: f64,
    pub duration_s: f64,
    pub ease: Ease,
}

impl<T> Tween<T>
where
    T: Lerp + Clone,
{
    pub fn new(from: T, to: T, start_s: f64, duration_s: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            start_s,
            delay_s: 0.0,
            duration_s: duration_s.max(0.0),
            ease,
        }
    }

    pub fn with_delay(mut self, delay_s: f64) -> Self {
        self.delay_s = delay_s.max(0.0);
        self
    }

    pub fn end_s(&self) -> f64 {
        self.start_s + self.delay_s + self.duration_s
    }

    /// Linear progress in `[0, 1]` at `now_s`.
    pub fn progress(&self, now_s: f64) -> f64 {
        let local = now_s - self.start_s - self.delay_s;
        if self.duration_s <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        (local / self.duration_s).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now_s: f64) -> T {
        let p = self.progress(now_s);
        if p >= 1.0 {
            return self.to.clone();
        }
        T::lerp(&self.from, &self.to, self.ease.apply(p))
    }

    pub fn is_finished(&self, now_s: f64) -> bool {
        now_s >= self.end_s()
    }
}

/// One named step in a [`Sequence`].
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceStep {
    pub label: String,
    pub offset_s: f64,
    pub duration_s: f64,
    pub ease: Ease,
}

/// Relative-positioned schedule of steps (each step may overlap the previous one).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence {
    pub delay_s: f64,
    pub steps: Vec<SequenceStep>,
    cursor_s: f64,
}

impl Sequence {
    pub fn new(delay_s: f64) -> Self {
        Self {
            delay_s: delay_s.max(0.0),
            steps: Vec::new(),
            cursor_s: 0.0,
        }
    }

    /// Appends a step starting `overlap_s` before the previous step ends
    /// (negative overlap leaves a gap).
    pub fn then(
        mut self,
        label: impl Into<String>,
        duration_s: f64,
        overlap_s: f64,
        ease: Ease,
    ) -> StarcardResult<Self> {
        if !duration_s.is_finite() || duration_s < 0.0 {
            return Err(StarcardError::validation(
                "sequence step duration must be finite and >= 0",
            ));
        }
        let offset_s = (self.cursor_s - overlap_s).max(0.0);
        self.steps.push(SequenceStep {
            label: label.into(),
            offset_s,
            duration_s,
            ease,
        });
        self.cursor_s = self.cursor_s.max(offset_s + duration_s);
        Ok(self)
    }

    pub fn total_s(&self) -> f64 {
        self.delay_s + self.cursor_s
    }

    pub fn step(&self, label: &str) -> Option<&SequenceStep> {
        self.steps.iter().find(|s| s.label == label)
    }

    /// Eased progress of the named step at `local_s` seconds since the sequence started.
    pub fn step_progress(&self, label: &str, local_s: f64) -> Option<f64> {
        let step = self.step(label)?;
        let t = local_s - self.delay_s - step.offset_s;
        let p = if step.duration_s <= 0.0 {
            if t >= 0.0 { 1.0 } else { 0.0 }
        } else {
            (t / step.duration_s).clamp(0.0, 1.0)
        };
        Some(step.ease.apply(p))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
