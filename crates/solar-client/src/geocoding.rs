//! Google Geocoding API client.

use async_trait::async_trait;
use reqwest::Client;
use roof_common::{Coordinates, ServiceError, ServiceResult};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::http::{check_status, request_error};
use crate::Geocoder;

pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

const SERVICE: &str = "Geocoding API";

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Pick the first result of a geocoding response.
pub fn parse_geocode_response(address: &str, response: GeocodeResponse) -> ServiceResult<Coordinates> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(ServiceError::AddressNotFound(address.to_string())),
        other => {
            let detail = response.error_message.unwrap_or_default();
            return Err(ServiceError::upstream(
                SERVICE,
                format!("status {} {}", other, detail).trim_end().to_string(),
            ));
        }
    }

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::AddressNotFound(address.to_string()))?;

    let location = first.geometry.location;
    let coords = Coordinates::new(location.lat, location.lng)
        .map_err(|e| ServiceError::upstream(SERVICE, e.to_string()))?;

    debug!(
        formatted_address = first.formatted_address.as_deref().unwrap_or(""),
        place_id = first.place_id.as_deref().unwrap_or(""),
        "Geocoded address"
    );

    Ok(coords)
}

/// Geocoder backed by the Google Geocoding API.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> ServiceResult<Coordinates> {
        let url = format!("{}/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let response = check_status(SERVICE, response).await?;
        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream(SERVICE, format!("invalid response: {}", e)))?;

        let coords = parse_geocode_response(address, body)?;
        info!(latitude = coords.latitude, longitude = coords.longitude, "Location found");
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{geocode_response, geocode_zero_results};

    fn parse(value: serde_json::Value) -> GeocodeResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_first_result() {
        let coords =
            parse_geocode_response("1 Infinite Loop", parse(geocode_response(37.3318, -122.0302)))
                .unwrap();
        assert_eq!(coords.latitude, 37.3318);
        assert_eq!(coords.longitude, -122.0302);
    }

    #[test]
    fn test_zero_results_is_address_not_found() {
        let err = parse_geocode_response("nowhere", parse(geocode_zero_results())).unwrap_err();
        assert!(matches!(err, ServiceError::AddressNotFound(ref a) if a == "nowhere"));
    }

    #[test]
    fn test_ok_with_empty_results_is_address_not_found() {
        let body = parse(serde_json::json!({ "status": "OK", "results": [] }));
        let err = parse_geocode_response("x", body).unwrap_err();
        assert_eq!(err.error_code(), "AddressNotFound");
    }

    #[test]
    fn test_denied_is_upstream_error() {
        let body = parse(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }));
        let err = parse_geocode_response("x", body).unwrap_err();
        assert_eq!(err.error_code(), "UpstreamError");
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn test_out_of_range_location_is_upstream_error() {
        let err = parse_geocode_response("x", parse(geocode_response(123.0, 0.0))).unwrap_err();
        assert_eq!(err.error_code(), "UpstreamError");
    }
}
