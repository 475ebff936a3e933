//! Visibility triggers keyed by document region.

pub mod registry;
