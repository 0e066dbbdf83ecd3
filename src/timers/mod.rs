//! Timing utilities for measuring solver phases.

#[allow(clippy::module_inception)]
mod timers;
pub use timers::*;
