use crate::core::{
    DesiredAccuracy, DEFAULT_DISTANCE_FILTER_M, DEFAULT_HEALTHY_RECHECK_INTERVAL_MS,
    DEFAULT_MAX_LOCATION_AGE_MS, DEFAULT_WEAK_RECHECK_INTERVAL_MS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Operator-tunable parameters for the location subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Signal recheck interval while the last strength was Fair or Great (milliseconds)
    pub healthy_recheck_interval_ms: u64,
    /// Signal recheck interval while the last strength was Poor or None (milliseconds)
    pub weak_recheck_interval_ms: u64,
    /// Accuracy requested in every mode but live tracking; also the
    /// completion criterion for current-location resolution
    pub desired_accuracy: DesiredAccuracy,
    /// Accuracy requested during live tracking
    pub desired_accuracy_live_tracking: DesiredAccuracy,
    /// Distance filter used in all modes (meters)
    pub distance_filter_m: f64,
    /// Fixes older than this are dropped (milliseconds). `None` disables the check.
    pub max_location_age_ms: Option<u64>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid {parameter} = {value}: {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("Config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            healthy_recheck_interval_ms: DEFAULT_HEALTHY_RECHECK_INTERVAL_MS,
            weak_recheck_interval_ms: DEFAULT_WEAK_RECHECK_INTERVAL_MS,
            desired_accuracy: DesiredAccuracy::HundredMeters,
            desired_accuracy_live_tracking: DesiredAccuracy::Best,
            distance_filter_m: DEFAULT_DISTANCE_FILTER_M,
            max_location_age_ms: Some(DEFAULT_MAX_LOCATION_AGE_MS),
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_interval(parameter: &str, interval_ms: u64) -> ConfigResult<()> {
    if interval_ms == 0 {
        return Err(invalid(parameter, interval_ms, "Recheck interval must be positive"));
    }
    Ok(())
}

fn check_accuracy(parameter: &str, accuracy: DesiredAccuracy) -> ConfigResult<()> {
    let threshold = accuracy.threshold_m();
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(invalid(parameter, threshold, "Accuracy must be a non-negative distance"));
    }
    Ok(())
}

fn check_distance_filter(distance_m: f64) -> ConfigResult<()> {
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(invalid(
            "distance_filter_m",
            distance_m,
            "Distance filter must be a non-negative distance",
        ));
    }
    Ok(())
}

fn check_max_age(max_age_ms: Option<u64>) -> ConfigResult<()> {
    if max_age_ms == Some(0) {
        return Err(invalid(
            "max_location_age_ms",
            0,
            "A zero age limit would reject every fix; use None to disable the check",
        ));
    }
    Ok(())
}

impl LocationConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: LocationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check every parameter, returning the first problem found
    pub fn validate(&self) -> ConfigResult<()> {
        check_interval("healthy_recheck_interval_ms", self.healthy_recheck_interval_ms)?;
        check_interval("weak_recheck_interval_ms", self.weak_recheck_interval_ms)?;
        check_accuracy("desired_accuracy", self.desired_accuracy)?;
        check_accuracy("desired_accuracy_live_tracking", self.desired_accuracy_live_tracking)?;
        check_distance_filter(self.distance_filter_m)?;
        check_max_age(self.max_location_age_ms)?;
        Ok(())
    }

    /// Recheck interval appropriate for a healthy or weak last-known signal
    pub fn recheck_interval_ms(&self, healthy: bool) -> u64 {
        if healthy {
            self.healthy_recheck_interval_ms
        } else {
            self.weak_recheck_interval_ms
        }
    }

    // Runtime parameter adjustment. Each setter returns the previous value.

    pub fn set_healthy_recheck_interval(&mut self, interval_ms: u64) -> ConfigResult<u64> {
        check_interval("healthy_recheck_interval_ms", interval_ms)?;
        Ok(std::mem::replace(&mut self.healthy_recheck_interval_ms, interval_ms))
    }

    pub fn set_weak_recheck_interval(&mut self, interval_ms: u64) -> ConfigResult<u64> {
        check_interval("weak_recheck_interval_ms", interval_ms)?;
        Ok(std::mem::replace(&mut self.weak_recheck_interval_ms, interval_ms))
    }

    pub fn set_desired_accuracy(&mut self, accuracy: DesiredAccuracy) -> ConfigResult<DesiredAccuracy> {
        check_accuracy("desired_accuracy", accuracy)?;
        Ok(std::mem::replace(&mut self.desired_accuracy, accuracy))
    }

    pub fn set_desired_accuracy_live_tracking(
        &mut self,
        accuracy: DesiredAccuracy,
    ) -> ConfigResult<DesiredAccuracy> {
        check_accuracy("desired_accuracy_live_tracking", accuracy)?;
        Ok(std::mem::replace(&mut self.desired_accuracy_live_tracking, accuracy))
    }

    pub fn set_distance_filter(&mut self, distance_m: f64) -> ConfigResult<f64> {
        check_distance_filter(distance_m)?;
        Ok(std::mem::replace(&mut self.distance_filter_m, distance_m))
    }

    /// Pass `DONT_VALIDATE_LOCATION_AGE` to disable age filtering
    pub fn set_max_location_age(&mut self, max_age_ms: Option<u64>) -> ConfigResult<Option<u64>> {
        check_max_age(max_age_ms)?;
        Ok(std::mem::replace(&mut self.max_location_age_ms, max_age_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DONT_VALIDATE_LOCATION_AGE;

    #[test]
    fn test_default_config() {
        let config = LocationConfig::default();
        assert_eq!(config.healthy_recheck_interval_ms, 15_000);
        assert_eq!(config.weak_recheck_interval_ms, 3_000);
        assert_eq!(config.desired_accuracy, DesiredAccuracy::HundredMeters);
        assert_eq!(config.desired_accuracy_live_tracking, DesiredAccuracy::Best);
        assert_eq!(config.distance_filter_m, 10.0);
        assert!(config.max_location_age_ms.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_recheck_interval_selection() {
        let config = LocationConfig::default();
        assert_eq!(config.recheck_interval_ms(true), 15_000);
        assert_eq!(config.recheck_interval_ms(false), 3_000);
    }

    #[test]
    fn test_setters_return_previous_value() {
        let mut config = LocationConfig::default();
        assert_eq!(config.set_weak_recheck_interval(1_000).unwrap(), 3_000);
        assert_eq!(config.weak_recheck_interval_ms, 1_000);
        assert_eq!(config.set_distance_filter(0.0).unwrap(), 10.0);
        assert_eq!(
            config.set_max_location_age(DONT_VALIDATE_LOCATION_AGE).unwrap(),
            Some(DEFAULT_MAX_LOCATION_AGE_MS)
        );
        assert!(config.max_location_age_ms.is_none());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut config = LocationConfig::default();
        assert!(config.set_healthy_recheck_interval(0).is_err());
        assert!(config.set_distance_filter(-5.0).is_err());
        assert!(config.set_distance_filter(f64::NAN).is_err());
        assert!(config.set_max_location_age(Some(0)).is_err());
        assert!(config.set_desired_accuracy(DesiredAccuracy::Meters(-1.0)).is_err());

        // Failed setters leave the configuration untouched
        assert_eq!(config, LocationConfig::default());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location.json");

        let mut config = LocationConfig::default();
        config.set_desired_accuracy(DesiredAccuracy::Meters(50.0)).unwrap();
        config.set_max_location_age(DONT_VALIDATE_LOCATION_AGE).unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = LocationConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "weak_recheck_interval_ms": 1500 }"#).unwrap();

        let loaded = LocationConfig::from_file(&path).unwrap();
        assert_eq!(loaded.weak_recheck_interval_ms, 1_500);
        assert_eq!(loaded.healthy_recheck_interval_ms, 15_000);
    }

    #[test]
    fn test_invalid_config_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "healthy_recheck_interval_ms": 0 }"#).unwrap();
        assert!(matches!(
            LocationConfig::from_file(&path),
            Err(ConfigError::InvalidParameter { .. })
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            LocationConfig::from_file(&path),
            Err(ConfigError::Serialization(_))
        ));

        assert!(matches!(
            LocationConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
