//! Clients for the upstream Google services used by the measurement pipeline.
//!
//! - [`geocoding`]: free-text address to coordinates
//! - [`auth`]: service-account JWT exchange for an OAuth2 access token
//! - [`solar`]: building insights and roof mask imagery
//! - [`geotiff`]: ground resolution embedded in downloaded masks
//!
//! Each collaborator sits behind a trait so the orchestrator can be driven
//! by in-process stubs in tests.

pub mod auth;
pub mod geocoding;
pub mod geotiff;
pub mod http;
pub mod solar;

use async_trait::async_trait;
use bytes::Bytes;
use roof_common::{Coordinates, GroundResolution, ServiceResult};
use serde_json::Value;

pub use auth::{parse_scopes, AccessToken, ServiceAccountKey, ServiceAccountTokenProvider};
pub use geocoding::GoogleGeocoder;
pub use http::build_http_client;
pub use solar::{SolarClient, SolarOptions, SUPPORTED_PIXEL_SIZES};

/// Resolves a free-text address to a single location.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> ServiceResult<Coordinates>;
}

/// Supplies bearer tokens for the Solar API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_access_token(&self) -> ServiceResult<AccessToken>;
}

/// Fetches building insight metadata for a location.
#[async_trait]
pub trait InsightSource: Send + Sync {
    /// Returns the upstream payload unmodified.
    async fn building_insights(
        &self,
        location: Coordinates,
        token: &AccessToken,
    ) -> ServiceResult<Value>;
}

/// Fetches a roof mask raster for a location.
#[async_trait]
pub trait ImagerySource: Send + Sync {
    async fn roof_mask(&self, location: Coordinates, token: &AccessToken)
        -> ServiceResult<Imagery>;
}

/// An encoded roof mask raster and the resolution it was rendered at.
#[derive(Debug, Clone)]
pub struct Imagery {
    pub bytes: Bytes,
    pub ground_resolution: GroundResolution,
}
