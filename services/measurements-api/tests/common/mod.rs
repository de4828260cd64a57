//! In-process stubs for the upstream collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use gutter_estimator::EstimatorConfig;
use measurements_api::state::AppState;
use roof_common::{Coordinates, GroundResolution, ServiceError, ServiceResult};
use serde_json::Value;
use solar_client::{AccessToken, Geocoder, Imagery, ImagerySource, InsightSource, TokenProvider};
use test_utils::{building_insights_response, create_square_mask, mask_png};

/// How a stubbed upstream call should behave.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok,
    NotFound,
    AuthFailure,
    Timeout,
}

impl Outcome {
    fn error(&self, service: &str) -> ServiceError {
        match self {
            Outcome::Ok => unreachable!("Ok outcome has no error"),
            Outcome::NotFound => ServiceError::upstream(service, "HTTP 404: not found"),
            Outcome::AuthFailure => ServiceError::Authentication(format!("{} said 403", service)),
            Outcome::Timeout => ServiceError::UpstreamTimeout(service.to_string()),
        }
    }
}

pub struct StubGeocoder {
    pub found: bool,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> ServiceResult<Coordinates> {
        if self.found {
            Ok(Coordinates::new(37.3318, -122.0302)?)
        } else {
            Err(ServiceError::AddressNotFound(address.to_string()))
        }
    }
}

pub struct StubTokens {
    pub outcome: Outcome,
}

#[async_trait]
impl TokenProvider for StubTokens {
    async fn get_access_token(&self) -> ServiceResult<AccessToken> {
        match self.outcome {
            Outcome::Ok => Ok(AccessToken::new("stub-token")),
            ref other => Err(other.error("token")),
        }
    }
}

pub struct StubInsights {
    pub outcome: Outcome,
    pub calls: AtomicUsize,
}

#[async_trait]
impl InsightSource for StubInsights {
    async fn building_insights(
        &self,
        _location: Coordinates,
        _token: &AccessToken,
    ) -> ServiceResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Ok => Ok(building_insights_response()),
            ref other => Err(other.error("Solar buildingInsights")),
        }
    }
}

/// Imagery stub. `Ok` serves `mask` at `resolution`.
pub struct StubImagery {
    pub outcome: Outcome,
    pub mask: Vec<u8>,
    pub resolution: f64,
}

#[async_trait]
impl ImagerySource for StubImagery {
    async fn roof_mask(&self, _location: Coordinates, _token: &AccessToken) -> ServiceResult<Imagery> {
        match self.outcome {
            Outcome::Ok => Ok(Imagery {
                bytes: Bytes::from(self.mask.clone()),
                ground_resolution: GroundResolution::new(self.resolution)?,
            }),
            ref other => Err(other.error("Solar dataLayers")),
        }
    }
}

/// A 20 px square at 0.5 m/px: 40 m of gutter around 100 m².
pub fn square_mask() -> Vec<u8> {
    mask_png(create_square_mask(64, 64, 10, 10, 20))
}

pub struct Scenario {
    pub geocode_found: bool,
    pub tokens: Outcome,
    pub insights: Outcome,
    pub imagery: Outcome,
    pub mask: Vec<u8>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            geocode_found: true,
            tokens: Outcome::Ok,
            insights: Outcome::Ok,
            imagery: Outcome::Ok,
            mask: square_mask(),
        }
    }
}

impl Scenario {
    pub fn into_state(self) -> AppState {
        AppState {
            geocoder: Arc::new(StubGeocoder {
                found: self.geocode_found,
            }),
            tokens: Arc::new(StubTokens {
                outcome: self.tokens,
            }),
            insights: Arc::new(StubInsights {
                outcome: self.insights,
                calls: AtomicUsize::new(0),
            }),
            imagery: Arc::new(StubImagery {
                outcome: self.imagery,
                mask: self.mask,
                resolution: 0.5,
            }),
            estimator: EstimatorConfig::default(),
        }
    }
}
