//! Gutter length estimation from a roof raster.
//!
//! Pipeline: grayscale → binary mask → outer boundary contours → noise/size
//! filter → largest contour → perimeter and area in pixels → meters using the
//! ground resolution.

use image::DynamicImage;
use roof_common::GroundResolution;
use serde::Serialize;

use crate::contour::{find_outer_contours, Contour};
use crate::error::EstimateError;
use crate::raster::{self, BinaryMask, ThresholdMode};

/// Decimal places used for every reported measurement.
pub const ROUND_DECIMALS: i32 = 2;

/// Default noise-rejection threshold in square pixels.
pub const DEFAULT_MIN_AREA_PX: f64 = 16.0;

/// Default installed gutter cost in USD per meter.
pub const DEFAULT_COST_PER_METER_USD: f64 = 20.0;

/// Estimator tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// How luma values become foreground.
    pub threshold: ThresholdMode,
    /// Contours enclosing fewer square pixels are treated as noise.
    pub min_area_px: f64,
    /// Contours enclosing more square meters are ignored (neighbouring
    /// buildings merged into one blob, parking lots, ...).
    pub max_area_m2: Option<f64>,
    /// Used for the cost estimate attached to the result.
    pub cost_per_meter_usd: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMode::Mask,
            min_area_px: DEFAULT_MIN_AREA_PX,
            max_area_m2: None,
            cost_per_meter_usd: DEFAULT_COST_PER_METER_USD,
        }
    }
}

/// Measurements of a single contour.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContourDetail {
    /// Position among the outer boundaries found in the raster.
    pub contour_index: usize,
    pub area_m2: f64,
    pub perimeter_m: f64,
    pub num_points: usize,
    /// Polygon corners as `[x, y]` pixel-corner coordinates.
    pub points: Vec<[i64; 2]>,
}

/// Result of a gutter estimate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GutterEstimate {
    pub total_length_m: f64,
    pub total_area_m2: f64,
    pub estimated_cost_usd: f64,
    pub cost_per_meter_usd: f64,
    pub ground_resolution_m: f64,
    pub contours_found: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub contour_details: Vec<ContourDetail>,
}

/// Round to [`ROUND_DECIMALS`] places.
pub fn round_measurement(value: f64) -> f64 {
    let factor = 10f64.powi(ROUND_DECIMALS);
    (value * factor).round() / factor
}

fn validate_resolution(meters_per_pixel: f64) -> Result<GroundResolution, EstimateError> {
    GroundResolution::new(meters_per_pixel)
        .map_err(|e| EstimateError::InvalidGroundResolution(e.to_string()))
}

/// Estimate gutter length from encoded image bytes.
///
/// The ground resolution is validated before the image is decoded.
pub fn estimate(
    bytes: &[u8],
    meters_per_pixel: f64,
    config: &EstimatorConfig,
) -> Result<GutterEstimate, EstimateError> {
    let resolution = validate_resolution(meters_per_pixel)?;
    let image = raster::decode(bytes)?;
    estimate_image(&image, resolution, config)
}

/// Estimate gutter length from an already decoded image.
pub fn estimate_image(
    image: &DynamicImage,
    resolution: GroundResolution,
    config: &EstimatorConfig,
) -> Result<GutterEstimate, EstimateError> {
    let gray = raster::to_grayscale(image);
    let mask = raster::binarize(&gray, config.threshold);
    estimate_mask(&mask, resolution, config)
}

/// Estimate gutter length from a binary mask.
pub fn estimate_mask(
    mask: &BinaryMask,
    resolution: GroundResolution,
    config: &EstimatorConfig,
) -> Result<GutterEstimate, EstimateError> {
    let contours = find_outer_contours(mask);
    let contours_found = contours.len();

    let selected = select_largest(&contours, resolution, config).ok_or(
        EstimateError::NoContourFound {
            min_area_px: config.min_area_px,
            contours_found,
        },
    )?;

    let contour = &contours[selected];
    let perimeter_px = contour.perimeter();
    let area_px = contour.area();

    let length_m = resolution.to_meters(perimeter_px);
    let area_m2 = resolution.to_square_meters(area_px);

    tracing::info!(
        contours_found,
        selected,
        perimeter_px,
        area_px,
        meters_per_pixel = resolution.meters_per_pixel(),
        length_m,
        area_m2,
        "Gutter estimate computed"
    );

    let detail = ContourDetail {
        contour_index: selected,
        area_m2: round_measurement(area_m2),
        perimeter_m: round_measurement(length_m),
        num_points: contour.points.len(),
        points: contour.points.iter().map(|p| [p.x, p.y]).collect(),
    };

    Ok(GutterEstimate {
        total_length_m: round_measurement(length_m),
        total_area_m2: round_measurement(area_m2),
        estimated_cost_usd: round_measurement(length_m * config.cost_per_meter_usd),
        cost_per_meter_usd: config.cost_per_meter_usd,
        ground_resolution_m: resolution.meters_per_pixel(),
        contours_found,
        image_width: mask.width(),
        image_height: mask.height(),
        contour_details: vec![detail],
    })
}

/// Index of the contour with the largest area that passes the size filters.
fn select_largest(
    contours: &[Contour],
    resolution: GroundResolution,
    config: &EstimatorConfig,
) -> Option<usize> {
    contours
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            let area_px = c.area();
            if area_px < config.min_area_px {
                tracing::debug!(contour = i, area_px, "Skipping contour below noise threshold");
                return false;
            }
            if let Some(max_m2) = config.max_area_m2 {
                let area_m2 = resolution.to_square_meters(area_px);
                if area_m2 > max_m2 {
                    tracing::debug!(contour = i, area_m2, max_m2, "Skipping oversized contour");
                    return false;
                }
            }
            true
        })
        .fold(None, |best: Option<(usize, f64)>, (i, c)| {
            let area = c.area();
            match best {
                Some((_, best_area)) if best_area >= area => best,
                _ => Some((i, area)),
            }
        })
        .map(|(i, _)| i)
}
