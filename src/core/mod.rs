//! Core types, constants and time sources for the location subsystem

pub mod types;
pub mod constants;
pub mod clock;

pub use types::*;
pub use constants::*;
pub use clock::{Clock, ManualClock, SystemClock};
