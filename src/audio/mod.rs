//! Background music control.

pub mod toggle;
