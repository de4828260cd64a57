//! Ground resolution of a raster (meters per pixel edge).

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Meters represented by one pixel edge. Isotropic: the same value applies to
/// both axes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct GroundResolution(f64);

impl GroundResolution {
    /// Pixel size requested for Solar API roof masks unless configured.
    pub const DEFAULT_MASK: GroundResolution = GroundResolution(0.5);

    /// Validate and wrap a meters-per-pixel value. Must be finite and > 0.
    pub fn new(meters_per_pixel: f64) -> Result<Self, ServiceError> {
        if meters_per_pixel.is_finite() && meters_per_pixel > 0.0 {
            Ok(Self(meters_per_pixel))
        } else {
            Err(ServiceError::InvalidGroundResolution(format!(
                "ground resolution must be a positive number of meters per pixel, got {}",
                meters_per_pixel
            )))
        }
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.0
    }

    /// Convert a length in pixels to meters.
    pub fn to_meters(&self, pixels: f64) -> f64 {
        pixels * self.0
    }

    /// Convert an area in square pixels to square meters.
    pub fn to_square_meters(&self, square_pixels: f64) -> f64 {
        square_pixels * self.0 * self.0
    }
}

impl TryFrom<f64> for GroundResolution {
    type Error = ServiceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroundResolution> for f64 {
    fn from(value: GroundResolution) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert!(GroundResolution::new(0.0).is_err());
        assert!(GroundResolution::new(-0.5).is_err());
        assert!(GroundResolution::new(f64::NAN).is_err());
        assert!(GroundResolution::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_default_mask_is_valid() {
        let r = GroundResolution::DEFAULT_MASK;
        assert_eq!(GroundResolution::new(r.meters_per_pixel()).unwrap(), r);
    }

    #[test]
    fn test_conversions() {
        let r = GroundResolution::new(0.25).unwrap();
        assert_eq!(r.to_meters(80.0), 20.0);
        assert_eq!(r.to_square_meters(400.0), 25.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: GroundResolution = serde_json::from_str("0.5").unwrap();
        assert_eq!(ok.meters_per_pixel(), 0.5);
        assert!(serde_json::from_str::<GroundResolution>("-1.0").is_err());
    }
}
