//! Synthetic roof raster generators.
//!
//! These generators create predictable roof masks whose exact outline length
//! and area are known, so estimator results can be checked by hand.
//!
//! All images use the estimator's convention: origin top-left, x right,
//! y down.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgb, RgbImage};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Value written for roof pixels in generated masks.
pub const ROOF: u8 = 255;

/// Creates an all-background mask.
pub fn create_blank_mask(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

/// Fills an axis-aligned rectangle with `value`, clipped to the image.
pub fn fill_rect(image: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    let x_end = (x + w).min(image.width());
    let y_end = (y + h).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, Luma([value]));
        }
    }
}

/// Creates a mask holding one square roof of `side` pixels at `(x, y)`.
///
/// # Example
///
/// ```
/// use test_utils::create_square_mask;
///
/// let mask = create_square_mask(64, 64, 10, 10, 20);
/// assert_eq!(mask.get_pixel(10, 10)[0], 255);
/// assert_eq!(mask.get_pixel(30, 30)[0], 0);
/// ```
pub fn create_square_mask(width: u32, height: u32, x: u32, y: u32, side: u32) -> GrayImage {
    let mut mask = create_blank_mask(width, height);
    fill_rect(&mut mask, x, y, side, side, ROOF);
    mask
}

/// Creates a 120x80 mask with two disjoint roofs:
/// a 20x25 block (500 px²) and a 40x50 block (2000 px², perimeter 180 px).
pub fn create_two_building_mask() -> GrayImage {
    let mut mask = create_blank_mask(120, 80);
    fill_rect(&mut mask, 5, 5, 20, 25, ROOF);
    fill_rect(&mut mask, 60, 10, 40, 50, ROOF);
    mask
}

/// Creates an L-shaped roof: a 30x10 bar on top of a 10x20 leg.
///
/// Area is 500 px², perimeter is 120 px. Not symmetric under rotation, so it
/// is useful for rotation-invariance checks.
pub fn create_l_shape_mask(width: u32, height: u32, x: u32, y: u32) -> GrayImage {
    let mut mask = create_blank_mask(width, height);
    fill_rect(&mut mask, x, y, 30, 10, ROOF);
    fill_rect(&mut mask, x, y + 10, 10, 20, ROOF);
    mask
}

/// Creates an image with every pixel set to `value`.
pub fn create_uniform_image(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Creates an RGB aerial-like image: grey-green terrain with one bright
/// rectangular roof. Suitable for Otsu thresholding.
pub fn create_rgb_roof_image(width: u32, height: u32, x: u32, y: u32, w: u32, h: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([60, 90, 50]));
    for py in y..(y + h).min(height) {
        for px in x..(x + w).min(width) {
            img.put_pixel(px, py, Rgb([230, 225, 220]));
        }
    }
    img
}

/// Encodes an image as PNG bytes.
pub fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .expect("PNG encoding of a generated image cannot fail");
    cursor.into_inner()
}

/// Encodes an image as TIFF bytes (the Solar API mask format).
pub fn encode_tiff(image: DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageOutputFormat::Tiff)
        .expect("TIFF encoding of a generated image cannot fail");
    cursor.into_inner()
}

/// Encodes a grayscale mask as a GeoTIFF carrying `ModelPixelScaleTag`,
/// the way the Solar API serves `dataLayers` masks.
pub fn encode_geotiff(mask: &GrayImage, meters_per_pixel: f64) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder =
            TiffEncoder::new(&mut cursor).expect("TIFF encoder over a Vec cannot fail");
        let mut image = encoder
            .new_image::<colortype::Gray8>(mask.width(), mask.height())
            .expect("Failed to start TIFF image");
        image
            .encoder()
            .write_tag(
                Tag::ModelPixelScaleTag,
                &[meters_per_pixel, meters_per_pixel, 0.0][..],
            )
            .expect("Failed to write pixel scale tag");
        image
            .write_data(mask.as_raw())
            .expect("Failed to write TIFF data");
    }
    cursor.into_inner()
}

/// Shorthand for PNG-encoding a grayscale mask.
pub fn mask_png(mask: GrayImage) -> Vec<u8> {
    encode_png(DynamicImage::ImageLuma8(mask))
}
