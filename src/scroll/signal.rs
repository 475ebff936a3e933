use crate::{
    config::ScrollConfig,
    env::capability::InitConfig,
    runtime::{
        ComponentId,
        clock::{FrameClock, FrameSubscription, FrameTick},
    },
};

/// Exponential-out damping curve used for smooth scrolling.
pub fn glide_ease(t: f64) -> f64 {
    (1.001 - 2f64.powf(-10.0 * t.max(0.0))).min(1.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Glide {
    from: f64,
    to: f64,
    start_s: f64,
}

/// Smoothed scroll position.
///
/// `raw` is where the host says the page is (or was asked to go); `position`
/// is the damped value every scroll-linked animation reads. Smoothing holds a
/// frame subscription only while a glide is in flight, and is disabled
/// entirely under reduced motion.
#[derive(Debug)]
pub struct ScrollSignal {
    smoothing_s: Option<f64>,
    raw: f64,
    position: f64,
    glide: Option<Glide>,
    subscription: Option<FrameSubscription>,
}

impl ScrollSignal {
    pub fn new(config: &ScrollConfig, init: InitConfig) -> Self {
        let smoothing_s =
            (config.smooth && !init.reduced_motion && config.smoothing_duration_s > 0.0)
                .then_some(config.smoothing_duration_s);
        Self {
            smoothing_s,
            raw: 0.0,
            position: 0.0,
            glide: None,
            subscription: None,
        }
    }

    pub fn is_smoothing(&self) -> bool {
        self.smoothing_s.is_some()
    }

    pub fn raw(&self) -> f64 {
        self.raw
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_animating(&self) -> bool {
        self.glide.is_some()
    }

    /// Points the stream at `y`. Returns the new position when it changed
    /// immediately (smoothing off); otherwise the glide advances on frame ticks.
    pub fn set_target(&mut self, clock: &mut FrameClock, y: f64, now_s: f64) -> Option<f64> {
        let y = y.max(0.0);
        self.raw = y;
        if self.smoothing_s.is_none() {
            return self.jump(clock, y);
        }
        if (y - self.position).abs() < f64::EPSILON {
            self.stop(clock);
            return None;
        }
        self.glide = Some(Glide {
            from: self.position,
            to: y,
            start_s: now_s,
        });
        if self.subscription.is_none() {
            self.subscription = Some(clock.subscribe(ComponentId::Scroll));
        }
        None
    }

    /// Moves to `y` with no damping, cancelling any glide.
    pub fn jump(&mut self, clock: &mut FrameClock, y: f64) -> Option<f64> {
        self.raw = y.max(0.0);
        self.stop(clock);
        if self.position == self.raw {
            return None;
        }
        self.position = self.raw;
        Some(self.position)
    }

    /// Advances an in-flight glide. Returns the position when it moved.
    pub fn advance(&mut self, clock: &mut FrameClock, tick: &FrameTick) -> Option<f64> {
        let glide = self.glide?;
        let duration = self.smoothing_s.unwrap_or(0.0);
        let t = if duration > 0.0 {
            (tick.now_s - glide.start_s) / duration
        } else {
            1.0
        };
        let next = if t >= 1.0 {
            self.stop(clock);
            glide.to
        } else {
            glide.from + (glide.to - glide.from) * glide_ease(t)
        };
        if next == self.position {
            return None;
        }
        self.position = next;
        Some(next)
    }

    fn stop(&mut self, clock: &mut FrameClock) {
        self.glide = None;
        if let Some(sub) = self.subscription.take() {
            clock.cancel(sub);
        }
    }

    pub fn teardown(&mut self, clock: &mut FrameClock) {
        self.stop(clock);
        clock.cancel_owner(ComponentId::Scroll);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/signal.rs"]
mod tests;
