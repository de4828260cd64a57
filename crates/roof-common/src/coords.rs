//! Geographic coordinate types.

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair, validating the latitude and longitude ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Check whether the point lies inside a (min_lat, min_lng, max_lat, max_lng) box.
    pub fn within(&self, min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> bool {
        self.latitude >= min_lat
            && self.latitude <= max_lat
            && self.longitude >= min_lng
            && self.longitude <= max_lng
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let c = Coordinates::new(37.3318, -122.0312).unwrap();
        assert_eq!(c.latitude, 37.3318);
        assert_eq!(c.longitude, -122.0312);
    }

    #[test]
    fn test_new_out_of_range() {
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinates::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_within_bbox() {
        let c = Coordinates::new(40.6413, -111.8868).unwrap();
        assert!(c.within(40.60, -111.95, 40.70, -111.80));
        assert!(!c.within(37.30, -122.05, 37.35, -122.00));
    }

    #[test]
    fn test_display() {
        let c = Coordinates::new(1.5, -2.25).unwrap();
        assert_eq!(c.to_string(), "1.500000,-2.250000");
    }
}
