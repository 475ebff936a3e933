#![forbid(unsafe_code)]
//! Scroll-driven orchestration for an animated greeting page.
//!
//! A [`Page`] assembles a layered starfield, a timeline of memory cards, a
//! scroll-drawn vine, hand-drawn card borders, per-card secondary effects, a
//! typewriter ending and a music toggle, all reacting to one scroll position
//! and one theme. Rendering and audio go through host traits
//! ([`FieldBackend`], [`AudioSink`]); everything else is plain state the host
//! reads back each frame.

pub mod animation;
pub mod audio;
pub mod config;
pub mod content;
pub mod env;
pub mod field;
pub mod foundation;
pub mod overlay;
pub mod page;
pub mod runtime;
pub mod scroll;
pub mod stage;
pub mod theme;
pub mod timeline;
pub mod trigger;

pub use audio::toggle::{Affordance, AudioSink, AudioToggle, PlaybackState};
pub use config::PageConfig;
pub use content::story::{Beat, SecondaryEffect, Story};
pub use env::capability::{Environment, GpuProbe, InitConfig, PerformanceTier};
pub use field::renderer::{FieldBackend, FieldFrame, FieldMode, Projection};
pub use foundation::core::{Rgba8, Vec2, Viewport};
pub use foundation::error::{StarcardError, StarcardResult};
pub use page::{
    Page, PageBackends, PageSetup, ResourceCounts,
    welcome::{LoadingScreen, WelcomeIntro, WelcomeItem},
};
pub use stage::document::Control;
pub use theme::controller::{ThemeName, ThemeSnapshot};
