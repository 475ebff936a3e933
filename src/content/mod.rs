//! Content document model and fallback.

pub mod story;
