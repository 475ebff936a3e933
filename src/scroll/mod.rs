//! The page's single scroll-position stream.

pub mod signal;
