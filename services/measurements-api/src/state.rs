//! Application state for the measurements API.

use std::sync::Arc;

use gutter_estimator::EstimatorConfig;
use roof_common::ServiceResult;
use solar_client::{
    build_http_client, Geocoder, GoogleGeocoder, ImagerySource, InsightSource,
    ServiceAccountTokenProvider, SolarClient, TokenProvider,
};

use crate::config::ServiceConfig;

/// Shared, immutable application state.
pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    pub tokens: Arc<dyn TokenProvider>,
    pub insights: Arc<dyn InsightSource>,
    pub imagery: Arc<dyn ImagerySource>,
    pub estimator: EstimatorConfig,
}

impl AppState {
    /// Wire the Google-backed collaborators from configuration. All of them
    /// share one HTTP client.
    pub fn from_config(config: &ServiceConfig) -> ServiceResult<Self> {
        let client = build_http_client(config.upstream_timeout)?;

        let geocoder = GoogleGeocoder::new(client.clone(), config.google_api_key.clone())
            .with_base_url(config.geocode_base_url.clone());
        let tokens = ServiceAccountTokenProvider::new(
            client.clone(),
            config.credentials_path.clone(),
            config.scopes.clone(),
        );
        let solar = Arc::new(SolarClient::new(
            client,
            config.project_id.clone(),
            config.solar.clone(),
        ));

        Ok(Self {
            geocoder: Arc::new(geocoder),
            tokens: Arc::new(tokens),
            insights: solar.clone(),
            imagery: solar,
            estimator: config.estimator.clone(),
        })
    }
}
