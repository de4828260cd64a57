//! Gutter length estimation from roof mask rasters.
//!
//! Given an encoded raster and its ground resolution (meters per pixel), the
//! estimator finds the largest roof outline in the image and reports its
//! perimeter (the gutter run) and enclosed area in real-world units.
//!
//! ```ignore
//! use gutter_estimator::{estimate, EstimatorConfig};
//!
//! let est = estimate(&png_bytes, 0.25, &EstimatorConfig::default())?;
//! println!("{} m of gutter", est.total_length_m);
//! ```

pub mod contour;
pub mod error;
pub mod estimate;
pub mod raster;

pub use contour::{Contour, Point};
pub use error::EstimateError;
pub use estimate::{
    estimate, estimate_image, estimate_mask, round_measurement, ContourDetail, EstimatorConfig,
    GutterEstimate, DEFAULT_COST_PER_METER_USD, DEFAULT_MIN_AREA_PX, ROUND_DECIMALS,
};
pub use raster::{BinaryMask, ThresholdMode};
