//! Handler types for the request coordinator

use crate::core::{Location, SignalStrength};
use crate::validation::LocationError;

/// Receives signal strength updates
pub type StrengthHandler = Box<dyn FnMut(SignalStrength)>;

/// Receives fixes
pub type LocationHandler = Box<dyn FnMut(&Location)>;

/// Receives sensor-level failures
pub type ErrorHandler = Box<dyn FnMut(&LocationError)>;
