use crate::{
    animation::{ease::Ease, tween::Tween},
    config::AudioConfig,
    env::capability::InitConfig,
    foundation::error::StarcardResult,
    runtime::{
        ComponentId,
        scheduler::{Debouncer, TimerId, Timers},
    },
    stage::document::{Control, Document, HostEventKind},
};

/// Host audio element.
pub trait AudioSink {
    /// Starts playback; hosts report blocked autoplay as an error.
    fn play(&mut self) -> StarcardResult<()>;

    fn pause(&mut self);

    fn configure(&mut self, volume: f64, looped: bool);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// What the music button offers next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Affordance {
    /// No source configured; the control never attempts playback.
    Disabled,
    Play,
    Pause,
    /// The last play attempt was refused.
    Retry,
}

pub struct AudioToggle {
    config: AudioConfig,
    sink: Option<Box<dyn AudioSink>>,
    state: PlaybackState,
    retry: bool,
    feedback: Debouncer,
    pulse: Option<Tween<f64>>,
    animate_feedback: bool,
}

impl std::fmt::Debug for AudioToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioToggle")
            .field("enabled", &self.sink.is_some())
            .field("state", &self.state)
            .field("retry", &self.retry)
            .finish()
    }
}

impl AudioToggle {
    pub fn new(config: AudioConfig) -> Self {
        let feedback = Debouncer::new(ComponentId::Audio, config.feedback_debounce_s);
        Self {
            config,
            sink: None,
            state: PlaybackState::Paused,
            retry: false,
            feedback,
            pulse: None,
            animate_feedback: false,
        }
    }

    /// Without a source the sink is dropped and the control stays disabled.
    #[tracing::instrument(skip(self, sink, doc))]
    pub fn init(
        &mut self,
        src: Option<&str>,
        sink: Option<Box<dyn AudioSink>>,
        init: InitConfig,
        doc: &mut Document,
    ) -> Affordance {
        self.animate_feedback = !init.reduced_motion;
        match (src, sink) {
            (Some(_), Some(mut sink)) => {
                sink.configure(self.config.volume, self.config.looped);
                self.sink = Some(sink);
                doc.listen(
                    ComponentId::Audio,
                    HostEventKind::Click(Control::MusicButton),
                );
                tracing::info!("music control ready");
            }
            (None, _) => tracing::info!("no music source, control disabled"),
            (Some(_), None) => {
                tracing::warn!("music source set but no audio sink, control disabled")
            }
        }
        self.affordance()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn affordance(&self) -> Affordance {
        match (&self.sink, self.state) {
            (None, _) => Affordance::Disabled,
            (Some(_), PlaybackState::Playing) => Affordance::Pause,
            (Some(_), PlaybackState::Paused) if self.retry => Affordance::Retry,
            (Some(_), PlaybackState::Paused) => Affordance::Play,
        }
    }

    pub fn toggle(&mut self, timers: &mut Timers, now_s: f64) -> PlaybackState {
        let Some(sink) = self.sink.as_mut() else {
            return self.state;
        };
        match self.state {
            PlaybackState::Playing => {
                sink.pause();
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => match sink.play() {
                Ok(()) => {
                    self.state = PlaybackState::Playing;
                    self.retry = false;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "music playback refused");
                    self.retry = true;
                }
            },
        }
        if self.animate_feedback {
            self.feedback.poke(timers, now_s);
        }
        tracing::debug!(state = ?self.state, "music toggled");
        self.state
    }

    /// Starts the feedback pulse when `fired` is the debounce timer.
    pub fn on_timer(&mut self, fired: TimerId, now_s: f64) -> bool {
        if !self.feedback.accept(fired) {
            return false;
        }
        self.pulse = Some(Tween::new(
            1.0,
            0.0,
            now_s,
            self.config.feedback_duration_s,
            Ease::OutQuad,
        ));
        true
    }

    /// Feedback strength in `[0, 1]`; zero when no pulse is running.
    pub fn feedback_intensity(&self, now_s: f64) -> f64 {
        self.pulse
            .as_ref()
            .filter(|p| !p.is_finished(now_s))
            .map(|p| p.sample(now_s))
            .unwrap_or(0.0)
    }

    pub fn teardown(&mut self, timers: &mut Timers, doc: &mut Document) {
        if self.state == PlaybackState::Playing {
            if let Some(sink) = self.sink.as_mut() {
                sink.pause();
            }
            self.state = PlaybackState::Paused;
        }
        self.feedback.cancel(timers);
        timers.cancel_owner(ComponentId::Audio);
        doc.unlisten_owner(ComponentId::Audio);
        self.pulse = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/toggle.rs"]
mod tests;
