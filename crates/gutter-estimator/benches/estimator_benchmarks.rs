//! Benchmarks for roof outline extraction and gutter estimation.
//!
//! Run with: cargo bench --package gutter-estimator --bench estimator_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gutter_estimator::contour::{boundary_segments, connect_segments, find_contours};
use gutter_estimator::raster::{binarize, to_grayscale};
use gutter_estimator::{estimate, estimate_mask, BinaryMask, EstimatorConfig, ThresholdMode};
use image::DynamicImage;
use roof_common::GroundResolution;
use test_utils::{create_rgb_roof_image, create_square_mask, encode_png, fill_rect, mask_png, ROOF};

/// Builds a mask with a grid of rectangular roofs, some with courtyards.
fn generate_neighbourhood(size: u32) -> image::GrayImage {
    let mut mask = image::GrayImage::new(size, size);
    let lot = 32;
    for gy in 0..size / lot {
        for gx in 0..size / lot {
            let w = 12 + (gx * 7 + gy * 3) % 16;
            let h = 10 + (gx * 5 + gy * 11) % 18;
            fill_rect(&mut mask, gx * lot + 2, gy * lot + 2, w, h, ROOF);
            if (gx + gy) % 3 == 0 {
                fill_rect(&mut mask, gx * lot + 5, gy * lot + 5, 3, 3, 0);
            }
        }
    }
    mask
}

fn to_binary(mask: &image::GrayImage) -> BinaryMask {
    binarize(mask, ThresholdMode::Mask)
}

// =============================================================================
// CONTOUR EXTRACTION BENCHMARKS
// =============================================================================

fn bench_find_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_contours");

    for size in [128u32, 256, 512, 1024] {
        let mask = to_binary(&generate_neighbourhood(size));
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("neighbourhood", size), &mask, |b, mask| {
            b.iter(|| black_box(find_contours(black_box(mask))));
        });
    }

    group.finish();
}

fn bench_segment_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_stages");
    let mask = to_binary(&generate_neighbourhood(512));
    let segments = boundary_segments(&mask);

    group.bench_function("boundary_segments_512", |b| {
        b.iter(|| black_box(boundary_segments(black_box(&mask))));
    });

    group.bench_function("connect_segments_512", |b| {
        b.iter(|| black_box(connect_segments(black_box(&segments))));
    });

    group.finish();
}

// =============================================================================
// FULL PIPELINE BENCHMARKS
// =============================================================================

fn bench_estimate_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_png");
    let config = EstimatorConfig::default();

    for size in [256u32, 512] {
        let bytes = mask_png(create_square_mask(size, size, size / 4, size / 4, size / 2));
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("single_roof", size), &bytes, |b, bytes| {
            b.iter(|| black_box(estimate(black_box(bytes), 0.25, &config)));
        });
    }

    group.finish();
}

fn bench_estimate_otsu(c: &mut Criterion) {
    let img = create_rgb_roof_image(512, 512, 100, 120, 220, 180);
    let bytes = encode_png(DynamicImage::ImageRgb8(img));
    let config = EstimatorConfig {
        threshold: ThresholdMode::Otsu,
        ..Default::default()
    };

    c.bench_function("estimate_otsu_rgb_512", |b| {
        b.iter(|| black_box(estimate(black_box(&bytes), 0.1, &config)));
    });
}

fn bench_estimate_mask_only(c: &mut Criterion) {
    let gray = to_grayscale(&DynamicImage::ImageLuma8(generate_neighbourhood(1024)));
    let mask = to_binary(&gray);
    let resolution = GroundResolution::new(0.5).unwrap();
    let config = EstimatorConfig::default();

    c.bench_function("estimate_mask_1024", |b| {
        b.iter(|| black_box(estimate_mask(black_box(&mask), resolution, &config)));
    });
}

criterion_group!(
    benches,
    bench_find_contours,
    bench_segment_stages,
    bench_estimate_png,
    bench_estimate_otsu,
    bench_estimate_mask_only,
);

criterion_main!(benches);
