//! Common test fixtures for roof measurement tests.
//!
//! This module provides canned upstream payloads shaped like the Google
//! Geocoding and Solar API responses, plus a disposable service-account key.

use std::path::PathBuf;

use serde_json::{json, Value};

/// Common bounding boxes as (min_lat, min_lng, max_lat, max_lng).
pub mod bbox {
    /// Apple's former campus at 1 Infinite Loop, Cupertino, CA
    pub const INFINITE_LOOP: (f64, f64, f64, f64) = (37.30, -122.05, 37.35, -122.00);

    /// Salt Lake valley (the original sample address in Murray, UT)
    pub const MURRAY_UT: (f64, f64, f64, f64) = (40.60, -111.95, 40.70, -111.80);
}

/// Well-known test addresses.
pub mod addresses {
    pub const INFINITE_LOOP: &str = "1 Infinite Loop, Cupertino, CA";
    pub const MURRAY_UT: &str = "766 E Creekwood Ln, Murray, UT 84107, USA";
}

/// RSA-2048 PKCS#8 key generated for tests only. Never valid against Google.
pub const TEST_SERVICE_ACCOUNT_KEY_PEM: &str =
    include_str!("../testdata/test_service_account_key.pem");

/// Test service account email.
pub const TEST_CLIENT_EMAIL: &str = "roof-tests@test-project.iam.gserviceaccount.com";

/// A Geocoding API response with a single result.
pub fn geocode_response(lat: f64, lng: f64) -> Value {
    json!({
        "results": [{
            "formatted_address": "1 Infinite Loop, Cupertino, CA 95014, USA",
            "geometry": {
                "location": { "lat": lat, "lng": lng },
                "location_type": "ROOFTOP"
            },
            "place_id": "ChIJHTRqF7e1j4ARzZ_Fv8VA4Eo"
        }],
        "status": "OK"
    })
}

/// A Geocoding API response for an address that does not exist.
pub fn geocode_zero_results() -> Value {
    json!({ "results": [], "status": "ZERO_RESULTS" })
}

/// A trimmed `buildingInsights:findClosest` response with two roof segments.
///
/// Segment areas are 100 m² and 64 m², so the square-segment approximation
/// gives a total gutter length of 4·10 + 4·8 = 72 m.
pub fn building_insights_response() -> Value {
    json!({
        "name": "buildings/ChIJh0CMPQW1j4ARLyt4F_1Vr1s",
        "center": { "latitude": 37.3318, "longitude": -122.0302 },
        "imageryQuality": "HIGH",
        "solarPotential": {
            "maxArrayPanelsCount": 42,
            "maxSunshineHoursPerYear": 1802.5,
            "roofSegmentStats": [
                {
                    "pitchDegrees": 22.4,
                    "azimuthDegrees": 178.2,
                    "stats": { "areaMeters2": 100.0, "groundAreaMeters2": 92.5 }
                },
                {
                    "pitchDegrees": 21.9,
                    "azimuthDegrees": 358.0,
                    "stats": { "areaMeters2": 64.0, "groundAreaMeters2": 59.4 }
                }
            ]
        }
    })
}

/// A trimmed `dataLayers:get` response pointing at `mask_url`.
pub fn data_layers_response(mask_url: &str) -> Value {
    json!({
        "imageryQuality": "HIGH",
        "dsmUrl": "https://solar.googleapis.com/v1/geoTiff:get?id=dsm",
        "rgbUrl": "https://solar.googleapis.com/v1/geoTiff:get?id=rgb",
        "maskUrl": mask_url,
        "annualFluxUrl": "https://solar.googleapis.com/v1/geoTiff:get?id=flux"
    })
}

/// A service-account JSON document using the test key.
pub fn service_account_json(token_uri: &str) -> Value {
    json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "0123456789abcdef",
        "private_key": TEST_SERVICE_ACCOUNT_KEY_PEM,
        "client_email": TEST_CLIENT_EMAIL,
        "client_id": "100000000000000000000",
        "token_uri": token_uri
    })
}

/// Writes a service-account file into a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the path is used.
pub fn write_service_account_file(token_uri: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("roof-test-")
        .tempdir()
        .expect("Failed to create temp directory");
    let path = dir.path().join("service-account.json");
    std::fs::write(&path, service_account_json(token_uri).to_string())
        .expect("Failed to write service account file");
    (dir, path)
}
