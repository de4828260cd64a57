//! In-process stand-in for the Google Geocoding, OAuth and Solar endpoints.
//!
//! Binds an ephemeral localhost port and answers with the canned payloads
//! from [`crate::fixtures`]. Solar endpoints require the bearer token the
//! fake token endpoint hands out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use image::DynamicImage;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::fixtures::{
    building_insights_response, data_layers_response, geocode_response, geocode_zero_results,
};
use crate::generators::{create_square_mask, encode_tiff};

/// Token issued by the fake OAuth endpoint.
pub const FAKE_ACCESS_TOKEN: &str = "ya29.fake-test-token";

/// Addresses containing this marker geocode to ZERO_RESULTS.
pub const UNKNOWN_ADDRESS_MARKER: &str = "Nowhere";

/// Location returned for every other address.
pub const FAKE_LOCATION: (f64, f64) = (37.3318, -122.0302);

/// Knobs for the fake endpoints.
#[derive(Debug, Clone)]
pub struct FakeGoogleConfig {
    pub token_status: StatusCode,
    pub insights_status: StatusCode,
    pub insights_delay: Option<Duration>,
    pub data_layers_status: StatusCode,
    /// Encoded mask served from the `maskUrl`.
    pub mask: Vec<u8>,
}

impl Default for FakeGoogleConfig {
    /// Everything succeeds; the mask is a 20 px square (80 px outline,
    /// 400 px²) in a 100x100 TIFF.
    fn default() -> Self {
        Self {
            token_status: StatusCode::OK,
            insights_status: StatusCode::OK,
            insights_delay: None,
            data_layers_status: StatusCode::OK,
            mask: encode_tiff(DynamicImage::ImageLuma8(create_square_mask(100, 100, 30, 30, 20))),
        }
    }
}

struct Shared {
    config: FakeGoogleConfig,
    base_url: String,
    requests: Mutex<Vec<String>>,
}

/// A running fake server. Aborted on drop.
pub struct FakeGoogle {
    base_url: String,
    shared: Arc<Shared>,
    handle: JoinHandle<()>,
}

impl FakeGoogle {
    pub async fn start(config: FakeGoogleConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake server");
        let addr = listener.local_addr().expect("Failed to read local address");
        let base_url = format!("http://{}", addr);

        let shared = Arc::new(Shared {
            config,
            base_url: base_url.clone(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(shared.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            shared,
            handle,
        }
    }

    pub fn geocode_base_url(&self) -> String {
        format!("{}/geocode", self.base_url)
    }

    pub fn solar_base_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    /// Request paths and queries received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.shared.requests.lock().expect("request log poisoned").clone()
    }

    /// Number of received requests whose path starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.starts_with(prefix)).count()
    }
}

impl Drop for FakeGoogle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", FAKE_ACCESS_TOKEN);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
        && headers.contains_key("x-goog-user-project")
}

fn status_error(status: StatusCode) -> Response {
    let body = json!({
        "error": { "code": status.as_u16(), "message": "fake upstream failure", "status": "FAILED" }
    });
    (status, Json(body)).into_response()
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or("").to_string();
    shared
        .requests
        .lock()
        .expect("request log poisoned")
        .push(format!("{}?{}", path, query));

    let config = &shared.config;

    match (method, path.as_str()) {
        (Method::GET, "/geocode/json") => {
            if !query.contains("key=") {
                return Json(json!({ "status": "REQUEST_DENIED", "results": [] })).into_response();
            }
            if query.contains(UNKNOWN_ADDRESS_MARKER) {
                return Json(geocode_zero_results()).into_response();
            }
            Json(geocode_response(FAKE_LOCATION.0, FAKE_LOCATION.1)).into_response()
        }
        (Method::POST, "/token") => {
            let grant_ok =
                body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer");
            let assertion_ok = body
                .split('&')
                .find_map(|kv| kv.strip_prefix("assertion="))
                .map(|jwt| jwt.split('.').count() == 3)
                .unwrap_or(false);
            if !grant_ok || !assertion_ok {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_grant", "error_description": "bad assertion" })),
                )
                    .into_response();
            }
            if config.token_status != StatusCode::OK {
                return (
                    config.token_status,
                    Json(json!({ "error": "invalid_client", "error_description": "disabled" })),
                )
                    .into_response();
            }
            Json(json!({
                "access_token": FAKE_ACCESS_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer"
            }))
            .into_response()
        }
        (Method::GET, "/v1/buildingInsights:findClosest") => {
            if !authorized(&headers) {
                return status_error(StatusCode::UNAUTHORIZED);
            }
            if let Some(delay) = config.insights_delay {
                tokio::time::sleep(delay).await;
            }
            if config.insights_status != StatusCode::OK {
                return status_error(config.insights_status);
            }
            Json(building_insights_response()).into_response()
        }
        (Method::GET, "/v1/dataLayers:get") => {
            if !authorized(&headers) {
                return status_error(StatusCode::UNAUTHORIZED);
            }
            if config.data_layers_status != StatusCode::OK {
                return status_error(config.data_layers_status);
            }
            let mask_url = format!("{}/v1/geoTiff:get?id=mask", shared.base_url);
            Json(data_layers_response(&mask_url)).into_response()
        }
        (Method::GET, "/v1/geoTiff:get") => {
            if !authorized(&headers) {
                return status_error(StatusCode::UNAUTHORIZED);
            }
            Response::builder()
                .header(header::CONTENT_TYPE, "image/tiff")
                .body(Body::from(config.mask.clone()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        _ => status_error(StatusCode::NOT_FOUND),
    }
}
