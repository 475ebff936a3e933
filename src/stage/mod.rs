//! Layout side table the orchestration layer reads instead of a live DOM.

pub mod document;
