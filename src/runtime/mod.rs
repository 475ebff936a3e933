//! Cooperative runtime: one frame clock, one-shot timers, debouncing.
//!
//! Nothing here blocks; the host calls [`crate::Page::advance`] from its frame
//! callback (or a timer) and every continuation is evaluated against the same
//! timestamp.

pub mod clock;
pub mod scheduler;

use std::fmt;

/// Owner tag for frame subscriptions, timers and host listeners, so teardown can
/// account for everything a component left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentId {
    Scroll,
    Timeline,
    Field,
    Borders,
    Vine,
    Ending,
    Secondary,
    Audio,
    Resize,
    Theme,
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scroll => "scroll",
            Self::Timeline => "timeline",
            Self::Field => "field",
            Self::Borders => "borders",
            Self::Vine => "vine",
            Self::Ending => "ending",
            Self::Secondary => "secondary",
            Self::Audio => "audio",
            Self::Resize => "resize",
            Self::Theme => "theme",
        };
        f.write_str(name)
    }
}
