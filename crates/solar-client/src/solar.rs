//! Google Solar API client: building insights and roof mask imagery.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use roof_common::{Coordinates, GroundResolution, ServiceError, ServiceResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::AccessToken;
use crate::geotiff::mask_resolution;
use crate::http::{check_status, request_error};
use crate::{Imagery, ImagerySource, InsightSource};

pub const DEFAULT_SOLAR_BASE_URL: &str = "https://solar.googleapis.com/v1";

const INSIGHTS_SERVICE: &str = "Solar buildingInsights";
const DATA_LAYERS_SERVICE: &str = "Solar dataLayers";
const MASK_SERVICE: &str = "Solar mask download";

/// `pixelSizeMeters` values accepted by `dataLayers:get`.
pub const SUPPORTED_PIXEL_SIZES: [f64; 4] = [0.1, 0.25, 0.5, 1.0];

/// Request parameters for the Solar API.
#[derive(Debug, Clone)]
pub struct SolarOptions {
    pub base_url: String,
    /// Radius of the data layer window around the location.
    pub radius_meters: f64,
    /// Requested mask resolution. Used for the mask only when the GeoTIFF
    /// carries no pixel scale of its own.
    pub pixel_size: GroundResolution,
    /// `requiredQuality` for both endpoints.
    pub required_quality: String,
}

impl Default for SolarOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOLAR_BASE_URL.to_string(),
            radius_meters: 50.0,
            pixel_size: GroundResolution::DEFAULT_MASK,
            required_quality: "HIGH".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataLayersResponse {
    mask_url: Option<String>,
    imagery_quality: Option<String>,
}

/// Client for the `buildingInsights` and `dataLayers` endpoints.
#[derive(Clone)]
pub struct SolarClient {
    client: Client,
    project_id: String,
    options: SolarOptions,
}

impl SolarClient {
    pub fn new(client: Client, project_id: impl Into<String>, options: SolarOptions) -> Self {
        let mut options = options;
        options.base_url = options.base_url.trim_end_matches('/').to_string();
        Self {
            client,
            project_id: project_id.into(),
            options,
        }
    }

    pub fn options(&self) -> &SolarOptions {
        &self.options
    }

    fn authorized(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .header("x-goog-user-project", &self.project_id)
    }

    fn location_query(location: Coordinates) -> [(&'static str, String); 2] {
        [
            ("location.latitude", location.latitude.to_string()),
            ("location.longitude", location.longitude.to_string()),
        ]
    }

    async fn data_layers(&self, location: Coordinates, token: &AccessToken) -> ServiceResult<String> {
        let url = format!("{}/dataLayers:get", self.options.base_url);
        let request = self
            .client
            .get(&url)
            .query(&Self::location_query(location))
            .query(&[
                ("radiusMeters", self.options.radius_meters.to_string()),
                ("view", "IMAGERY_AND_ANNUAL_FLUX_LAYERS".to_string()),
                ("requiredQuality", self.options.required_quality.clone()),
                (
                    "pixelSizeMeters",
                    self.options.pixel_size.meters_per_pixel().to_string(),
                ),
            ]);

        let response = self
            .authorized(request, token)
            .send()
            .await
            .map_err(|e| request_error(DATA_LAYERS_SERVICE, e))?;
        let response = check_status(DATA_LAYERS_SERVICE, response).await?;

        let layers: DataLayersResponse = response.json().await.map_err(|e| {
            ServiceError::upstream(DATA_LAYERS_SERVICE, format!("invalid response: {}", e))
        })?;

        debug!(quality = layers.imagery_quality.as_deref().unwrap_or("unknown"), "Data layers found");

        layers
            .mask_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ServiceError::upstream(DATA_LAYERS_SERVICE, "response has no maskUrl"))
    }
}

#[async_trait]
impl InsightSource for SolarClient {
    #[instrument(skip(self, token))]
    async fn building_insights(
        &self,
        location: Coordinates,
        token: &AccessToken,
    ) -> ServiceResult<Value> {
        let url = format!("{}/buildingInsights:findClosest", self.options.base_url);
        let request = self
            .client
            .get(&url)
            .query(&Self::location_query(location))
            .query(&[("requiredQuality", self.options.required_quality.as_str())]);

        let response = self
            .authorized(request, token)
            .send()
            .await
            .map_err(|e| request_error(INSIGHTS_SERVICE, e))?;
        let response = check_status(INSIGHTS_SERVICE, response).await?;

        let insights: Value = response.json().await.map_err(|e| {
            ServiceError::upstream(INSIGHTS_SERVICE, format!("invalid response: {}", e))
        })?;

        info!(
            building = insights.get("name").and_then(|v| v.as_str()).unwrap_or(""),
            "Building insights found"
        );
        Ok(insights)
    }
}

#[async_trait]
impl ImagerySource for SolarClient {
    #[instrument(skip(self, token))]
    async fn roof_mask(&self, location: Coordinates, token: &AccessToken) -> ServiceResult<Imagery> {
        let mask_url = self.data_layers(location, token).await?;
        debug!(mask_url = %mask_url, "Downloading roof mask");

        let response = self
            .authorized(self.client.get(&mask_url), token)
            .send()
            .await
            .map_err(|e| request_error(MASK_SERVICE, e))?;
        let response = check_status(MASK_SERVICE, response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(MASK_SERVICE, e))?;

        let ground_resolution = mask_resolution(&bytes, self.options.pixel_size);
        if ground_resolution != self.options.pixel_size {
            warn!(
                requested = self.options.pixel_size.meters_per_pixel(),
                served = ground_resolution.meters_per_pixel(),
                "Roof mask served at a different resolution than requested"
            );
        }

        info!(
            bytes = bytes.len(),
            meters_per_pixel = ground_resolution.meters_per_pixel(),
            "Roof mask downloaded"
        );
        Ok(Imagery {
            bytes,
            ground_resolution,
        })
    }
}
