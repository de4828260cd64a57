//! End-to-end pipeline tests: real clients against the in-process fake
//! Google endpoints, and an opt-in live test.

use std::time::Duration;

use axum::http::StatusCode;
use gutter_estimator::EstimatorConfig;
use measurements_api::config::ServiceConfig;
use measurements_api::orchestrator::{measure, METHOD_BUILDING_INSIGHTS, METHOD_DATA_LAYERS};
use measurements_api::state::AppState;
use roof_common::GroundResolution;
use solar_client::auth::DEFAULT_SCOPE;
use solar_client::{Geocoder, SolarOptions};
use test_utils::{
    addresses, assert_approx_eq, bbox, create_square_mask, encode_geotiff, require_env,
    write_service_account_file, FakeGoogle, FakeGoogleConfig,
};

fn config_for(fake: &FakeGoogle, credentials_path: std::path::PathBuf) -> ServiceConfig {
    ServiceConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        google_api_key: "test-key".to_string(),
        credentials_path,
        scopes: vec![DEFAULT_SCOPE.to_string()],
        project_id: "test-project".to_string(),
        upstream_timeout: Duration::from_secs(5),
        geocode_base_url: fake.geocode_base_url(),
        solar: SolarOptions {
            base_url: fake.solar_base_url(),
            ..Default::default()
        },
        estimator: EstimatorConfig::default(),
    }
}

// ============================================================================
// Fake upstream
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_against_fake_google() {
    let fake = FakeGoogle::start(FakeGoogleConfig::default()).await;
    let (_dir, path) = write_service_account_file(&fake.token_uri());
    let state = AppState::from_config(&config_for(&fake, path)).unwrap();

    let response = measure(&state, addresses::INFINITE_LOOP).await.unwrap();

    assert_eq!(response.method, METHOD_BUILDING_INSIGHTS);
    let solar = response.solar_data.unwrap();
    assert_eq!(solar["roofSummary"]["num_roof_segments"], 2);

    // 20 px square in the fake mask at 0.5 m/px
    let gutter = response.gutter_estimate.unwrap();
    assert_approx_eq!(gutter.total_length_m, 40.0, 0.01);
    assert_approx_eq!(gutter.total_area_m2, 100.0, 0.01);
    assert_eq!(gutter.ground_resolution_m, 0.5);

    // One token exchange shared by both Solar calls
    assert_eq!(fake.count("/token"), 1);
    assert_eq!(fake.count("/v1/buildingInsights:findClosest"), 1);
    assert_eq!(fake.count("/v1/dataLayers:get"), 1);
}

#[tokio::test]
async fn test_pipeline_falls_back_when_insights_missing() {
    let fake = FakeGoogle::start(FakeGoogleConfig {
        insights_status: StatusCode::NOT_FOUND,
        ..Default::default()
    })
    .await;
    let (_dir, path) = write_service_account_file(&fake.token_uri());
    let state = AppState::from_config(&config_for(&fake, path)).unwrap();

    let response = measure(&state, addresses::INFINITE_LOOP).await.unwrap();
    assert_eq!(response.method, METHOD_DATA_LAYERS);
    assert!(response.solar_data.is_none());
    assert!(response.gutter_estimate.is_some());
}

#[tokio::test]
async fn test_pipeline_with_finer_pixel_size() {
    let fake = FakeGoogle::start(FakeGoogleConfig::default()).await;
    let (_dir, path) = write_service_account_file(&fake.token_uri());
    let mut config = config_for(&fake, path);
    config.solar.pixel_size = GroundResolution::new(0.25).unwrap();
    let state = AppState::from_config(&config).unwrap();

    let gutter = measure(&state, addresses::INFINITE_LOOP)
        .await
        .unwrap()
        .gutter_estimate
        .unwrap();
    assert_approx_eq!(gutter.total_length_m, 20.0, 0.01);
    assert_approx_eq!(gutter.total_area_m2, 25.0, 0.01);
}

#[tokio::test]
async fn test_pipeline_measures_at_served_resolution() {
    let fake = FakeGoogle::start(FakeGoogleConfig {
        mask: encode_geotiff(&create_square_mask(100, 100, 30, 30, 20), 1.0),
        ..Default::default()
    })
    .await;
    let (_dir, path) = write_service_account_file(&fake.token_uri());
    let mut config = config_for(&fake, path);
    config.solar.pixel_size = GroundResolution::new(0.1).unwrap();
    let state = AppState::from_config(&config).unwrap();

    let gutter = measure(&state, addresses::INFINITE_LOOP)
        .await
        .unwrap()
        .gutter_estimate
        .unwrap();
    assert_eq!(gutter.ground_resolution_m, 1.0);
    assert_approx_eq!(gutter.total_length_m, 80.0, 0.01);
    assert_approx_eq!(gutter.total_area_m2, 400.0, 0.01);
}

#[tokio::test]
async fn test_pipeline_rejected_token() {
    let fake = FakeGoogle::start(FakeGoogleConfig {
        token_status: StatusCode::UNAUTHORIZED,
        ..Default::default()
    })
    .await;
    let (_dir, path) = write_service_account_file(&fake.token_uri());
    let state = AppState::from_config(&config_for(&fake, path)).unwrap();

    let err = measure(&state, addresses::INFINITE_LOOP).await.unwrap_err();
    assert_eq!(err.error_code(), "AuthenticationError");
    assert_eq!(fake.count("/v1/"), 0);
}

#[tokio::test]
async fn test_pipeline_unknown_address() {
    let fake = FakeGoogle::start(FakeGoogleConfig::default()).await;
    let (_dir, path) = write_service_account_file(&fake.token_uri());
    let state = AppState::from_config(&config_for(&fake, path)).unwrap();

    let err = measure(&state, "1 Nowhere Street").await.unwrap_err();
    assert_eq!(err.error_code(), "AddressNotFound");
    assert_eq!(fake.count("/token"), 0);
}

// ============================================================================
// Live Google APIs (opt-in)
// ============================================================================

#[tokio::test]
#[ignore = "calls the live Google APIs"]
async fn test_live_infinite_loop() {
    let api_key = require_env!("GOOGLE_API_KEY");
    let credentials_path = require_env!("GOOGLE_CREDENTIALS_PATH");
    let project_id = require_env!("PROJECT_ID");

    let config = ServiceConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        google_api_key: api_key,
        credentials_path: credentials_path.into(),
        scopes: vec![DEFAULT_SCOPE.to_string()],
        project_id,
        upstream_timeout: Duration::from_secs(30),
        geocode_base_url: solar_client::geocoding::DEFAULT_GEOCODE_BASE_URL.to_string(),
        solar: SolarOptions::default(),
        estimator: EstimatorConfig::default(),
    };
    let state = AppState::from_config(&config).unwrap();

    let location = state.geocoder.geocode(addresses::INFINITE_LOOP).await.unwrap();
    let (min_lat, min_lng, max_lat, max_lng) = bbox::INFINITE_LOOP;
    assert!(location.within(min_lat, min_lng, max_lat, max_lng), "{}", location);

    let response = measure(&state, addresses::INFINITE_LOOP).await.unwrap();
    if response.method == METHOD_BUILDING_INSIGHTS {
        let solar = response.solar_data.expect("building insights method carries solar_data");
        assert!(!solar["buildingInsights"].is_null());
    } else {
        assert_eq!(response.method, METHOD_DATA_LAYERS);
        assert!(response.solar_data.is_none());
        assert!(response.gutter_estimate.is_some());
    }
}
