use crate::{
    animation::{ease::Ease, tween::{Sequence, Tween}},
    content::story::Story,
    env::capability::InitConfig,
    foundation::error::StarcardResult,
};

const INTRO_DELAY_S: f64 = 0.5;
const REDUCED_FADE_S: f64 = 0.3;
const LOADING_FADE_S: f64 = 0.5;

/// Message shown on the loading screen when the page cannot start at all.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load. Please refresh the page.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum WelcomeItem {
    Title,
    Subtitle,
    StickerLeft,
    StickerRight,
    MusicButton,
    ScrollHint,
}

impl WelcomeItem {
    pub const ALL: [WelcomeItem; 6] = [
        Self::Title,
        Self::Subtitle,
        Self::StickerLeft,
        Self::StickerRight,
        Self::MusicButton,
        Self::ScrollHint,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::StickerLeft => "sticker-left",
            Self::StickerRight => "sticker-right",
            Self::MusicButton => "music",
            Self::ScrollHint => "hint",
        }
    }
}

/// Staggered reveal of the first screen. Steps overlap their predecessor;
/// under reduced motion everything shares one short fade.
#[derive(Clone, Debug, PartialEq)]
pub struct WelcomeIntro {
    sequence: Sequence,
    start_s: f64,
    reduced_motion: bool,
    title: Option<String>,
    subtitle: Option<String>,
    stickers: (bool, bool),
}

impl WelcomeIntro {
    pub fn new(story: &Story, init: InitConfig, start_s: f64) -> StarcardResult<Self> {
        let sequence = Sequence::new(INTRO_DELAY_S)
            .then(WelcomeItem::Title.label(), 1.0, 0.0, Ease::OutQuad)?
            .then(WelcomeItem::Subtitle.label(), 0.8, 0.5, Ease::OutQuad)?
            .then(WelcomeItem::StickerLeft.label(), 0.8, 0.6, Ease::OutBack)?
            .then(WelcomeItem::StickerRight.label(), 0.8, 0.6, Ease::OutBack)?
            .then(WelcomeItem::MusicButton.label(), 0.6, 0.4, Ease::OutBack)?
            .then(WelcomeItem::ScrollHint.label(), 0.6, 0.3, Ease::Linear)?;
        let stickers = story
            .site
            .stickers
            .as_ref()
            .map(|s| (s.left.is_some(), s.right.is_some()))
            .unwrap_or((false, false));
        let title = story.title();
        let subtitle = story.subtitle();
        if title.is_none() {
            tracing::info!("no site title, heading omitted");
        }
        Ok(Self {
            sequence,
            start_s,
            reduced_motion: init.reduced_motion,
            title,
            subtitle,
            stickers,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn is_present(&self, item: WelcomeItem) -> bool {
        match item {
            WelcomeItem::Title => self.title.is_some(),
            WelcomeItem::Subtitle => self.subtitle.is_some(),
            WelcomeItem::StickerLeft => self.stickers.0,
            WelcomeItem::StickerRight => self.stickers.1,
            WelcomeItem::MusicButton | WelcomeItem::ScrollHint => true,
        }
    }

    /// Reveal progress of `item` at `now_s`; `None` when the item is omitted.
    /// Values past 1.0 are the overshoot of springy steps.
    pub fn progress(&self, item: WelcomeItem, now_s: f64) -> Option<f64> {
        if !self.is_present(item) {
            return None;
        }
        let local = now_s - self.start_s;
        if self.reduced_motion {
            return Some(if local >= INTRO_DELAY_S { 1.0 } else { 0.0 });
        }
        self.sequence.step_progress(item.label(), local)
    }

    /// Host-side fade applied to stepwise changes (reduced motion only).
    pub fn transition_s(&self) -> f64 {
        if self.reduced_motion { REDUCED_FADE_S } else { 0.0 }
    }

    pub fn duration_s(&self) -> f64 {
        if self.reduced_motion {
            INTRO_DELAY_S + REDUCED_FADE_S
        } else {
            self.sequence.total_s()
        }
    }

    pub fn is_finished(&self, now_s: f64) -> bool {
        now_s - self.start_s >= self.duration_s()
    }
}

/// Cover shown until the page is ready.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadingScreen {
    fade: Option<Tween<f64>>,
    error: Option<String>,
}

impl LoadingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            fade: None,
            error: Some(message.into()),
        }
    }

    pub fn hide(&mut self, now_s: f64) {
        if self.error.is_none() && self.fade.is_none() {
            self.fade = Some(Tween::new(1.0, 0.0, now_s, LOADING_FADE_S, Ease::Linear));
        }
    }

    pub fn opacity(&self, now_s: f64) -> f64 {
        self.fade.as_ref().map(|f| f.sample(now_s)).unwrap_or(1.0)
    }

    /// Fully faded and removed from layout.
    pub fn is_hidden(&self, now_s: f64) -> bool {
        self.fade.as_ref().is_some_and(|f| f.is_finished(now_s))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/welcome.rs"]
mod tests;
