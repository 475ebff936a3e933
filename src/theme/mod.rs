//! Theme state machine and derived tokens.

pub mod controller;
