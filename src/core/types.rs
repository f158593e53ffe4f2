//! Core data types for the location subscription system

use crate::core::constants::{
    FAIR_ACCURACY_THRESHOLD_M, POOR_ACCURACY_THRESHOLD_M, WGS84_FLATTENING,
    WGS84_SEMI_MAJOR_AXIS_M,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic position (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Height above the ellipsoid in meters
    pub altitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    /// Convert to Earth-Centered, Earth-Fixed coordinates
    pub fn to_ecef(&self) -> Vector3<f64> {
        let lat_rad = self.latitude.to_radians();
        let lon_rad = self.longitude.to_radians();
        let e_squared = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

        // Radius of curvature in the prime vertical
        let n = WGS84_SEMI_MAJOR_AXIS_M / (1.0 - e_squared * lat_rad.sin().powi(2)).sqrt();

        let x = (n + self.altitude) * lat_rad.cos() * lon_rad.cos();
        let y = (n + self.altitude) * lat_rad.cos() * lon_rad.sin();
        let z = (n * (1.0 - e_squared) + self.altitude) * lat_rad.sin();

        Vector3::new(x, y, z)
    }

    /// Straight-line distance in meters. Accurate to well under a meter for
    /// the short hops a distance filter cares about.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (self.to_ecef() - other.to_ecef()).norm()
    }
}

/// A single position fix reported by the sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinate: Coordinate,
    /// Radius of uncertainty in meters; negative means the fix is invalid
    pub horizontal_accuracy_m: f64,
    /// Time the fix was taken (milliseconds since epoch)
    pub timestamp_ms: u64,
}

impl Location {
    pub fn new(coordinate: Coordinate, horizontal_accuracy_m: f64, timestamp_ms: u64) -> Self {
        Self {
            coordinate,
            horizontal_accuracy_m,
            timestamp_ms,
        }
    }

    /// Whether the reported accuracy is usable at all
    pub fn has_valid_accuracy(&self) -> bool {
        self.horizontal_accuracy_m.is_finite() && self.horizontal_accuracy_m >= 0.0
    }

    /// Age of the fix relative to `now_ms`. Fixes from the future have age zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }
}

/// Usage patterns the sensor can serve; several may be active at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubscriptionMode {
    /// Timer-based polling for signal strength
    SignalMonitoring,
    /// One-shot resolution of the current position
    CurrentLocation,
    /// Continuous movement tracking
    LiveTracking,
}

impl SubscriptionMode {
    pub const ALL: [SubscriptionMode; 3] = [
        SubscriptionMode::SignalMonitoring,
        SubscriptionMode::CurrentLocation,
        SubscriptionMode::LiveTracking,
    ];

    /// Human-readable label, for diagnostics only
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionMode::SignalMonitoring => "Signal Monitoring",
            SubscriptionMode::CurrentLocation => "Current Location",
            SubscriptionMode::LiveTracking => "Live Tracking",
        }
    }
}

impl fmt::Display for SubscriptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Signal quality grade derived from horizontal accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum SignalStrength {
    /// No fix yet, or location access denied
    #[default]
    None,
    /// Off by 163 meters or more
    Poor,
    /// Off by more than 48 meters
    Fair,
    /// Within 48 meters
    Great,
}

impl SignalStrength {
    /// Grade a horizontal accuracy. Invalid (negative or NaN) accuracies grade as None.
    pub fn from_accuracy(horizontal_accuracy_m: f64) -> Self {
        if horizontal_accuracy_m.is_nan() || horizontal_accuracy_m < 0.0 {
            SignalStrength::None
        } else if horizontal_accuracy_m >= POOR_ACCURACY_THRESHOLD_M {
            SignalStrength::Poor
        } else if horizontal_accuracy_m > FAIR_ACCURACY_THRESHOLD_M {
            SignalStrength::Fair
        } else {
            SignalStrength::Great
        }
    }

    /// Fair and Great are healthy enough for the slow polling cadence
    pub fn is_healthy(&self) -> bool {
        matches!(self, SignalStrength::Fair | SignalStrength::Great)
    }

    /// Human-readable label, for diagnostics only
    pub fn display_name(&self) -> &'static str {
        match self {
            SignalStrength::None => "None",
            SignalStrength::Poor => "Poor",
            SignalStrength::Fair => "Fair",
            SignalStrength::Great => "Great",
        }
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Location permission state as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    /// Denied or restricted; the provider cannot deliver fixes
    pub fn is_blocked(&self) -> bool {
        matches!(self, AuthorizationStatus::Denied | AuthorizationStatus::Restricted)
    }

    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AuthorizationStatus::NotDetermined => "Not Determined",
            AuthorizationStatus::Restricted => "Restricted",
            AuthorizationStatus::Denied => "Denied",
            AuthorizationStatus::AuthorizedAlways => "Authorized Always",
            AuthorizationStatus::AuthorizedWhenInUse => "Authorized When In Use",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Accuracy requested from the sensor. Also the completion criterion for
/// one-shot resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DesiredAccuracy {
    /// Highest accuracy the hardware offers
    Best,
    NearestTenMeters,
    #[default]
    HundredMeters,
    Kilometer,
    ThreeKilometers,
    /// Explicit radius in meters
    Meters(f64),
}

impl DesiredAccuracy {
    /// Threshold in meters a fix must meet (at or below) to satisfy this accuracy
    pub fn threshold_m(&self) -> f64 {
        match self {
            DesiredAccuracy::Best => 0.0,
            DesiredAccuracy::NearestTenMeters => 10.0,
            DesiredAccuracy::HundredMeters => 100.0,
            DesiredAccuracy::Kilometer => 1_000.0,
            DesiredAccuracy::ThreeKilometers => 3_000.0,
            DesiredAccuracy::Meters(m) => *m,
        }
    }

    /// The more demanding of two accuracies
    pub fn best_of(self, other: DesiredAccuracy) -> DesiredAccuracy {
        if other.threshold_m() < self.threshold_m() {
            other
        } else {
            self
        }
    }

    /// Whether a fix meets this accuracy
    pub fn is_satisfied_by(&self, location: &Location) -> bool {
        location.has_valid_accuracy() && location.horizontal_accuracy_m <= self.threshold_m()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_classification() {
        assert_eq!(SignalStrength::from_accuracy(500.0), SignalStrength::Poor);
        assert_eq!(SignalStrength::from_accuracy(100.0), SignalStrength::Fair);
        assert_eq!(SignalStrength::from_accuracy(20.0), SignalStrength::Great);
        assert_eq!(SignalStrength::from_accuracy(0.0), SignalStrength::Great);
    }

    #[test]
    fn test_strength_boundaries() {
        assert_eq!(SignalStrength::from_accuracy(163.0), SignalStrength::Poor);
        assert_eq!(SignalStrength::from_accuracy(162.9), SignalStrength::Fair);
        assert_eq!(SignalStrength::from_accuracy(48.0), SignalStrength::Great);
        assert_eq!(SignalStrength::from_accuracy(48.1), SignalStrength::Fair);
    }

    #[test]
    fn test_invalid_accuracy_grades_none() {
        assert_eq!(SignalStrength::from_accuracy(-1.0), SignalStrength::None);
        assert_eq!(SignalStrength::from_accuracy(f64::NAN), SignalStrength::None);
    }

    #[test]
    fn test_strength_ordering() {
        assert!(SignalStrength::None < SignalStrength::Poor);
        assert!(SignalStrength::Poor < SignalStrength::Fair);
        assert!(SignalStrength::Fair < SignalStrength::Great);
        assert!(!SignalStrength::Poor.is_healthy());
        assert!(SignalStrength::Fair.is_healthy());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(SubscriptionMode::LiveTracking.to_string(), "Live Tracking");
        assert_eq!(SubscriptionMode::SignalMonitoring.display_name(), "Signal Monitoring");
        assert_eq!(SignalStrength::Great.to_string(), "Great");
        assert_eq!(SignalStrength::None.display_name(), "None");
    }

    #[test]
    fn test_desired_accuracy_best_of() {
        let best = DesiredAccuracy::HundredMeters.best_of(DesiredAccuracy::Best);
        assert_eq!(best, DesiredAccuracy::Best);

        let tighter = DesiredAccuracy::Kilometer.best_of(DesiredAccuracy::Meters(50.0));
        assert_eq!(tighter, DesiredAccuracy::Meters(50.0));
    }

    #[test]
    fn test_desired_accuracy_satisfied() {
        let fix = Location::new(Coordinate::new(0.0, 0.0), 50.0, 0);
        assert!(DesiredAccuracy::Meters(50.0).is_satisfied_by(&fix));
        assert!(!DesiredAccuracy::Meters(49.0).is_satisfied_by(&fix));

        let invalid = Location::new(Coordinate::new(0.0, 0.0), -1.0, 0);
        assert!(!DesiredAccuracy::Kilometer.is_satisfied_by(&invalid));
    }

    #[test]
    fn test_distance_between_coordinates() {
        let a = Coordinate::new(45.0, -122.0);
        let b = Coordinate::new(45.0, -122.0);
        assert!(a.distance_to(&b) < 1e-6);

        // One thousandth of a degree of latitude is roughly 111 meters
        let c = Coordinate::new(45.001, -122.0);
        let d = a.distance_to(&c);
        assert!(d > 105.0 && d < 117.0, "unexpected distance {}", d);
    }

    #[test]
    fn test_location_age() {
        let fix = Location::new(Coordinate::new(0.0, 0.0), 10.0, 1_000);
        assert_eq!(fix.age_ms(4_000), 3_000);
        assert_eq!(fix.age_ms(500), 0);
    }

    #[test]
    fn test_authorization_status() {
        assert!(AuthorizationStatus::Denied.is_blocked());
        assert!(AuthorizationStatus::Restricted.is_blocked());
        assert!(!AuthorizationStatus::NotDetermined.is_blocked());
        assert!(AuthorizationStatus::AuthorizedWhenInUse.is_authorized());
    }
}
