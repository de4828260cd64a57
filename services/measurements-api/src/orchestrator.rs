//! One address, one pipeline: geocode, then building insights and the roof
//! mask in parallel, then the gutter estimator over the mask.
//!
//! Partial failures are tolerated. A missing mask or a failed estimate gives
//! `gutter_estimate: null`; failed insights with a usable estimate fall back
//! to the mask measurement alone. Authentication failures abort.

use std::time::Instant;

use gutter_estimator::{estimate, EstimatorConfig, GutterEstimate};
use metrics::{counter, histogram};
use roof_common::{ServiceError, ServiceResult};
use serde::Serialize;
use serde_json::Value;
use solar_client::Imagery;
use tracing::{info, instrument, warn};

use crate::state::AppState;
use crate::summary::solar_data;

pub const METHOD_BUILDING_INSIGHTS: &str = "buildingInsights";
pub const METHOD_DATA_LAYERS: &str = "dataLayers";

/// Response body for a measurement request.
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementResponse {
    pub solar_data: Option<Value>,
    pub gutter_estimate: Option<GutterEstimate>,
    pub method: &'static str,
}

/// Run the measurement pipeline for `address`.
#[instrument(skip(state))]
pub async fn measure(state: &AppState, address: &str) -> ServiceResult<MeasurementResponse> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ServiceError::MissingParameter("address".to_string()));
    }

    let started = Instant::now();
    counter!("measurement_requests_total").increment(1);

    let result = run_pipeline(state, address).await;

    histogram!("measurement_duration_seconds").record(started.elapsed().as_secs_f64());
    match &result {
        Ok(response) => {
            counter!("measurement_responses_total", "method" => response.method).increment(1)
        }
        Err(e) => counter!("measurement_errors_total", "code" => e.error_code()).increment(1),
    }

    result
}

async fn run_pipeline(state: &AppState, address: &str) -> ServiceResult<MeasurementResponse> {
    let location = state.geocoder.geocode(address).await?;
    let token = state.tokens.get_access_token().await?;

    let (insights, imagery) = tokio::join!(
        state.insights.building_insights(location, &token),
        state.imagery.roof_mask(location, &token),
    );

    let insights = abort_on_auth(insights)?;
    let imagery = abort_on_auth(imagery)?;

    let gutter_estimate = match imagery {
        Ok(imagery) => run_estimator(imagery, state.estimator.clone()).await,
        Err(e) => {
            warn!(error = %e, "Roof mask unavailable, skipping gutter estimate");
            counter!("upstream_failures_total", "source" => "imagery").increment(1);
            None
        }
    };

    match insights {
        Ok(insights) => {
            info!(
                has_gutter_estimate = gutter_estimate.is_some(),
                "Measured with building insights"
            );
            Ok(MeasurementResponse {
                solar_data: Some(solar_data(insights, state.estimator.cost_per_meter_usd)),
                gutter_estimate,
                method: METHOD_BUILDING_INSIGHTS,
            })
        }
        Err(e) => {
            counter!("upstream_failures_total", "source" => "insights").increment(1);
            match gutter_estimate {
                Some(estimate) => {
                    warn!(error = %e, "Building insights unavailable, using mask measurement only");
                    Ok(MeasurementResponse {
                        solar_data: None,
                        gutter_estimate: Some(estimate),
                        method: METHOD_DATA_LAYERS,
                    })
                }
                None => Err(e),
            }
        }
    }
}

/// Lift authentication failures out so `?` aborts the request; every other
/// outcome stays in the inner result.
fn abort_on_auth<T>(result: ServiceResult<T>) -> ServiceResult<ServiceResult<T>> {
    match result {
        Err(ServiceError::Authentication(msg)) => Err(ServiceError::Authentication(msg)),
        other => Ok(other),
    }
}

/// Run the CPU-bound estimator off the async workers. Failures are logged and
/// yield `None`.
async fn run_estimator(imagery: Imagery, config: EstimatorConfig) -> Option<GutterEstimate> {
    let meters_per_pixel = imagery.ground_resolution.meters_per_pixel();
    let joined = tokio::task::spawn_blocking(move || {
        estimate(&imagery.bytes, meters_per_pixel, &config)
    })
    .await;

    match joined {
        Ok(Ok(estimate)) => {
            counter!("gutter_estimates_total", "outcome" => "ok").increment(1);
            Some(estimate)
        }
        Ok(Err(e)) => {
            let e = ServiceError::from(e);
            warn!(error = %e, code = e.error_code(), "Gutter estimate failed");
            counter!("gutter_estimates_total", "outcome" => "failed").increment(1);
            None
        }
        Err(e) => {
            warn!(error = %e, "Gutter estimator task panicked");
            counter!("gutter_estimates_total", "outcome" => "failed").increment(1);
            None
        }
    }
}
