//! Application-facing location API
//!
//! Callback-based coordinator for signal monitoring, one-shot current
//! location resolution and live tracking, plus the small state machines it
//! is built from.

pub mod coordinator;
pub mod polling;
pub mod resolution;
pub mod tracking;
pub mod lifecycle;
pub mod types;

// Re-export commonly used API types
pub use coordinator::RequestCoordinator;
pub use polling::PollingState;
pub use resolution::{ResolutionOutcome, ResolutionRequest, ResolutionState};
pub use tracking::TrackingSession;
pub use lifecycle::LifecycleSignal;
pub use types::{ErrorHandler, LocationHandler, StrengthHandler};
