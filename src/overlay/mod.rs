//! Decorative layers drawn over the timeline.
//!
//! - [`borders`]: hand-jittered card outlines
//! - [`vine`]: the connecting path that draws itself with scroll progress
//! - [`ending`]: typewriter reveal, particle burst and floating stars
//! - [`secondary`]: lazily activated per-card effects

pub mod borders;
pub mod ending;
pub mod secondary;
pub mod vine;
