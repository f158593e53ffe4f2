//! Location Hub
//!
//! Multiplexes one positioning sensor between independent consumers. Each
//! consumer subscribes to a mode (signal monitoring, current location, live
//! tracking); the sensor runs only while some mode is active and is always
//! configured for the most demanding one.

pub mod core;
pub mod provider;
pub mod sensor;
pub mod validation;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use core::{
    AuthorizationStatus, Clock, Coordinate, DesiredAccuracy, Location, ManualClock, SignalStrength,
    SubscriptionMode, SystemClock, DONT_VALIDATE_LOCATION_AGE,
};
pub use provider::{LocationProvider, MockLocationProvider, ProviderEvent, ProviderSettings, SensorError};
pub use sensor::{SensorController, SensorEvent, SharedController};
pub use validation::LocationError;
pub use api::{
    ErrorHandler, LifecycleSignal, LocationHandler, PollingState, RequestCoordinator, StrengthHandler,
};
pub use utils::{init_logging, ConfigError, LocationConfig};
