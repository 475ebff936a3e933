//! Environment probing: performance tier and reduced-motion preference.

pub mod capability;
