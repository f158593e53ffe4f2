//! Admission filtering for incoming fixes

use crate::core::Location;
use thiserror::Error;

/// Reasons a fix is dropped before it reaches any subscriber. Drops are
/// silent to the application and only show up in logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Stale fix: {age_ms} ms old, limit {max_age_ms} ms")]
    Stale { age_ms: u64, max_age_ms: u64 },
    #[error("Invalid horizontal accuracy: {accuracy_m}")]
    InvalidAccuracy { accuracy_m: f64 },
}

/// Age and accuracy gate applied to every provider fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissionFilter {
    /// `None` disables age filtering
    pub max_location_age_ms: Option<u64>,
}

impl AdmissionFilter {
    pub fn new(max_location_age_ms: Option<u64>) -> Self {
        Self { max_location_age_ms }
    }

    /// Check a fix against the filter at time `now_ms`
    pub fn check(&self, location: &Location, now_ms: u64) -> Result<(), Rejection> {
        if !location.has_valid_accuracy() {
            return Err(Rejection::InvalidAccuracy {
                accuracy_m: location.horizontal_accuracy_m,
            });
        }

        if let Some(max_age_ms) = self.max_location_age_ms {
            let age_ms = location.age_ms(now_ms);
            if age_ms > max_age_ms {
                return Err(Rejection::Stale { age_ms, max_age_ms });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Coordinate, DONT_VALIDATE_LOCATION_AGE};

    const NOW: u64 = 1_700_000_000_000;

    fn fix(accuracy: f64, timestamp_ms: u64) -> Location {
        Location::new(Coordinate::new(51.5, -0.12), accuracy, timestamp_ms)
    }

    #[test]
    fn test_fresh_fix_accepted() {
        let filter = AdmissionFilter::new(Some(60_000));
        assert!(filter.check(&fix(20.0, NOW - 1_000), NOW).is_ok());
    }

    #[test]
    fn test_stale_fix_rejected() {
        let filter = AdmissionFilter::new(Some(60_000));
        let result = filter.check(&fix(20.0, NOW - 60_000 - 1_000), NOW);
        assert_eq!(
            result,
            Err(Rejection::Stale { age_ms: 61_000, max_age_ms: 60_000 })
        );
    }

    #[test]
    fn test_exact_max_age_accepted() {
        let filter = AdmissionFilter::new(Some(60_000));
        assert!(filter.check(&fix(20.0, NOW - 60_000), NOW).is_ok());
    }

    #[test]
    fn test_age_filter_disabled() {
        let filter = AdmissionFilter::new(DONT_VALIDATE_LOCATION_AGE);
        assert!(filter.check(&fix(20.0, 0), NOW).is_ok());
    }

    #[test]
    fn test_invalid_accuracy_rejected() {
        let filter = AdmissionFilter::new(DONT_VALIDATE_LOCATION_AGE);
        assert!(matches!(
            filter.check(&fix(-1.0, NOW), NOW),
            Err(Rejection::InvalidAccuracy { .. })
        ));
        assert!(filter.check(&fix(f64::NAN, NOW), NOW).is_err());
        assert!(filter.check(&fix(0.0, NOW), NOW).is_ok());
    }
}
