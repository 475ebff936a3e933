//! Card timeline: one card per beat, entry/exit reveal, idle float.

pub mod builder;
pub mod card;
