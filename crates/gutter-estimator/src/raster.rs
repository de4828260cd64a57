//! Raster decoding and binarization.
//!
//! Coordinate convention used by the whole crate: origin at the top-left
//! corner, `x` grows to the right (columns), `y` grows downward (rows).
//! Pixel `(x, y)` covers the unit square `[x, x+1] × [y, y+1]`. Decoded images
//! are converted to this convention here and nowhere else.

use std::str::FromStr;

use image::{DynamicImage, GrayImage};

use crate::error::EstimateError;

/// How luma values are split into foreground (roof) and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// Roof masks: any non-zero pixel is foreground.
    #[default]
    Mask,
    /// Otsu's global threshold; pixels brighter than the level are foreground.
    Otsu,
    /// Pixels brighter than the given level are foreground.
    Fixed(u8),
}

impl FromStr for ThresholdMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "mask" => Ok(ThresholdMode::Mask),
            "otsu" => Ok(ThresholdMode::Otsu),
            _ => {
                if let Some(level) = s.strip_prefix("fixed:") {
                    level
                        .parse()
                        .map(ThresholdMode::Fixed)
                        .map_err(|_| format!("invalid fixed threshold level: {}", level))
                } else {
                    Err(format!(
                        "unknown threshold mode '{}', expected mask, otsu or fixed:<0-255>",
                        s
                    ))
                }
            }
        }
    }
}

/// A foreground/background mask in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryMask {
    /// Build a mask from row-major foreground flags.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<bool>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Foreground flag at `(x, y)`. Anything outside the raster is background.
    pub fn is_foreground(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Decode an encoded raster (PNG, TIFF, JPEG, ...) into an image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, EstimateError> {
    if bytes.is_empty() {
        return Err(EstimateError::ImageDecode("empty image payload".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Convert to a single 8-bit intensity channel.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Split a grayscale image into foreground and background.
///
/// A uniform image has no edges and always produces an empty mask, whatever
/// the mode.
pub fn binarize(gray: &GrayImage, mode: ThresholdMode) -> BinaryMask {
    let (width, height) = gray.dimensions();
    let raw = gray.as_raw();

    let uniform = match raw.first() {
        Some(&first) => raw.iter().all(|&v| v == first),
        None => true,
    };
    if uniform {
        return BinaryMask {
            width,
            height,
            data: vec![false; raw.len()],
        };
    }

    let level = match mode {
        ThresholdMode::Mask => 0,
        ThresholdMode::Otsu => imageproc::contrast::otsu_level(gray),
        ThresholdMode::Fixed(level) => level,
    };

    tracing::debug!(width, height, ?mode, level, "Binarizing raster");

    BinaryMask {
        width,
        height,
        data: raw.iter().map(|&v| v > level).collect(),
    }
}
