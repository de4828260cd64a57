//! Ground resolution embedded in Solar API GeoTIFFs.
//!
//! The data layer endpoint may serve a coarser raster than requested (it
//! never upsamples past the layer's native resolution), so the mask's own
//! `ModelPixelScaleTag` is the authority on meters per pixel.

use std::io::Cursor;

use roof_common::GroundResolution;
use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::debug;

/// Reads the X pixel scale from a GeoTIFF's `ModelPixelScaleTag`.
///
/// Returns `None` for non-TIFF bytes, a missing tag, or a scale that is not a
/// valid ground resolution.
pub fn pixel_scale(bytes: &[u8]) -> Option<GroundResolution> {
    let mut decoder = Decoder::new(Cursor::new(bytes)).ok()?;
    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)
        .ok()??
        .into_f64_vec()
        .ok()?;

    let x = scale.first().copied()?.abs();
    match GroundResolution::new(x) {
        Ok(resolution) => Some(resolution),
        Err(e) => {
            debug!(scale = x, error = %e, "Ignoring unusable GeoTIFF pixel scale");
            None
        }
    }
}

/// Resolution of a downloaded mask: the embedded scale when present,
/// otherwise the size that was requested.
pub fn mask_resolution(bytes: &[u8], requested: GroundResolution) -> GroundResolution {
    pixel_scale(bytes).unwrap_or(requested)
}
