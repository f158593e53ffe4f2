//! Signal thresholds and configuration defaults

/// Horizontal accuracy (meters) at or beyond which a fix is graded Poor
pub const POOR_ACCURACY_THRESHOLD_M: f64 = 163.0;

/// Horizontal accuracy (meters) beyond which a fix is graded Fair instead of Great
pub const FAIR_ACCURACY_THRESHOLD_M: f64 = 48.0;

/// Recheck interval used while the last known strength is Fair or Great (milliseconds)
pub const DEFAULT_HEALTHY_RECHECK_INTERVAL_MS: u64 = 15_000;

/// Recheck interval used while the last known strength is Poor or None (milliseconds)
pub const DEFAULT_WEAK_RECHECK_INTERVAL_MS: u64 = 3_000;

/// Default distance filter (meters)
pub const DEFAULT_DISTANCE_FILTER_M: f64 = 10.0;

/// Default maximum age of an admitted fix (milliseconds)
pub const DEFAULT_MAX_LOCATION_AGE_MS: u64 = 5 * 60 * 1000;

/// Value for `max_location_age_ms` that disables age filtering
pub const DONT_VALIDATE_LOCATION_AGE: Option<u64> = None;

/// WGS84 semi-major axis (meters)
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
