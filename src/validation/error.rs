//! Errors surfaced to the application

use crate::core::AuthorizationStatus;
use crate::provider::SensorError;
use thiserror::Error;

/// Sensor-level failures delivered through the error passthrough. None of
/// these are fatal to the subscription core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// Location access denied or restricted; subscriptions stay registered
    #[error("Location access not permitted ({status})")]
    PermissionDenied { status: AuthorizationStatus },
    /// Provider failure
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
}

impl LocationError {
    pub fn is_permission_error(&self) -> bool {
        matches!(self, LocationError::PermissionDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sensor_error() {
        let err: LocationError = SensorError::SignalLost.into();
        assert_eq!(err, LocationError::Sensor(SensorError::SignalLost));
        assert!(!err.is_permission_error());
    }

    #[test]
    fn test_permission_display() {
        let err = LocationError::PermissionDenied { status: AuthorizationStatus::Denied };
        assert!(err.is_permission_error());
        assert_eq!(err.to_string(), "Location access not permitted (Denied)");
    }
}
