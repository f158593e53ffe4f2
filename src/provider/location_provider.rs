//! Location provider trait and settings

use crate::core::{AuthorizationStatus, DesiredAccuracy, Location};
use crate::provider::{ProviderResult, SensorError};
use serde::{Deserialize, Serialize};

/// Abstraction over the positioning sensor.
///
/// Implementations are driven from a single execution context. Results of
/// `start` and `request_location` arrive later through `poll_event`.
pub trait LocationProvider {
    /// Start delivering fixes with the given settings. Idempotent.
    fn start(&mut self, settings: &ProviderSettings) -> ProviderResult<()>;

    /// Stop delivering fixes. Idempotent.
    fn stop(&mut self);

    /// Request a single fresh fix, whether or not the provider is running
    fn request_location(&mut self) -> ProviderResult<()>;

    /// Change the requested accuracy while running
    fn set_desired_accuracy(&mut self, accuracy: DesiredAccuracy);

    /// Change the minimum movement (meters) between reported fixes
    fn set_distance_filter(&mut self, distance_m: f64);

    /// Allow or forbid the provider to pause updates when the device looks idle
    fn set_auto_pause_enabled(&mut self, enabled: bool);

    /// Next pending event, if any (non-blocking)
    fn poll_event(&mut self) -> Option<ProviderEvent>;

    /// Current permission state
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Whether continuous updates are currently on
    fn is_running(&self) -> bool;
}

/// Events emitted asynchronously by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Fix(Location),
    AuthorizationChanged(AuthorizationStatus),
    Error(SensorError),
}

/// Provider configuration derived from the set of active modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub desired_accuracy: DesiredAccuracy,
    /// Minimum movement in meters before a new fix is reported
    pub distance_filter_m: f64,
    pub auto_pause_enabled: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            desired_accuracy: DesiredAccuracy::HundredMeters,
            distance_filter_m: crate::core::DEFAULT_DISTANCE_FILTER_M,
            auto_pause_enabled: true,
        }
    }
}

impl ProviderSettings {
    /// Push every setting that differs from `previous` to a running provider
    pub fn apply_changes(&self, previous: &ProviderSettings, provider: &mut dyn LocationProvider) {
        if self.desired_accuracy != previous.desired_accuracy {
            provider.set_desired_accuracy(self.desired_accuracy);
        }
        if self.distance_filter_m != previous.distance_filter_m {
            provider.set_distance_filter(self.distance_filter_m);
        }
        if self.auto_pause_enabled != previous.auto_pause_enabled {
            provider.set_auto_pause_enabled(self.auto_pause_enabled);
        }
    }
}
