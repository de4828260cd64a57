//! Estimator error types.

use roof_common::ServiceError;
use thiserror::Error;

/// Errors raised while estimating gutter length from a raster.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Invalid ground resolution: {0}")]
    InvalidGroundResolution(String),

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("No contour above {min_area_px} px² found ({contours_found} boundaries detected)")]
    NoContourFound {
        min_area_px: f64,
        contours_found: usize,
    },
}

impl From<image::ImageError> for EstimateError {
    fn from(err: image::ImageError) -> Self {
        EstimateError::ImageDecode(err.to_string())
    }
}

impl From<EstimateError> for ServiceError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::InvalidGroundResolution(msg) => {
                ServiceError::InvalidGroundResolution(msg)
            }
            EstimateError::ImageDecode(msg) => ServiceError::ImageDecode(msg),
            e @ EstimateError::NoContourFound { .. } => ServiceError::NoContourFound(e.to_string()),
        }
    }
}
