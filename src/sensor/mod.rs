//! Shared sensor controller
//!
//! Reference-counted mode subscriptions over a single location provider,
//! and the event bus fixes and strength changes are republished on.

pub mod controller;
pub mod events;
pub mod subscriptions;

pub use controller::{DeferredReleases, SensorController, SharedController};
pub use events::{SensorEvent, SensorEventBus};
pub use subscriptions::{ModeSubscriptionCount, ModeTransition};
