//! Positioning sensor abstraction
//!
//! The sensor itself lives outside this crate. This module defines the
//! contract the subscription core drives, plus a mock implementation for
//! tests and demos.

pub mod location_provider;
pub mod mock;
pub mod error;

pub use location_provider::{LocationProvider, ProviderEvent, ProviderSettings};
pub use mock::MockLocationProvider;
pub use error::{ProviderResult, SensorError};
