//! Provider error types

use thiserror::Error;

/// Failures reported by a location provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// The provider could not determine a position right now
    #[error("Location currently unknown")]
    LocationUnknown,
    /// Signal was lost mid-session
    #[error("Signal lost")]
    SignalLost,
    /// The provider refused to start
    #[error("Provider failed to start: {reason}")]
    StartFailed { reason: String },
    /// Positioning hardware is not available on this host
    #[error("Provider unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, SensorError>;

impl SensorError {
    /// Transient errors are expected to clear up on their own; the session keeps going
    pub fn is_transient(&self) -> bool {
        matches!(self, SensorError::LocationUnknown | SensorError::SignalLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SensorError::SignalLost.is_transient());
        assert!(SensorError::LocationUnknown.is_transient());
        assert!(!SensorError::StartFailed { reason: "busy".to_string() }.is_transient());
    }

    #[test]
    fn test_display() {
        let err = SensorError::StartFailed { reason: "hardware busy".to_string() };
        assert_eq!(err.to_string(), "Provider failed to start: hardware busy");
    }
}
