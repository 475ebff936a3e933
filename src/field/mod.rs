//! Layered star field behind the page.
//!
//! [`layers`] owns particle generation and the per-frame motion model
//! (twinkle, drift, parallax); [`renderer`] drives it from the frame clock and
//! hands finished frames to a host [`renderer::FieldBackend`].

pub mod layers;
pub mod renderer;
