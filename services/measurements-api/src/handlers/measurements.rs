//! Measurement handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query};
use axum::Json;
use roof_common::ServiceError;
use serde::Deserialize;

use super::ApiError;
use crate::orchestrator::{measure, MeasurementResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MeasurementQuery {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub address: Option<String>,
}

fn required_address(address: Option<String>) -> Result<String, ApiError> {
    match address {
        Some(a) if !a.trim().is_empty() => Ok(a),
        _ => Err(ServiceError::MissingParameter("address".to_string()).into()),
    }
}

/// GET /measurements?address=...
pub async fn get_measurements(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<MeasurementQuery>, QueryRejection>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let Query(params) = query.map_err(|rejection| ServiceError::InvalidParameter {
        param: "query".to_string(),
        message: rejection.body_text(),
    })?;
    let address = required_address(params.address)?;
    Ok(Json(measure(&state, &address).await?))
}

/// POST /api/solar/estimate with `{"address": "..."}`
pub async fn post_estimate(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ServiceError::InvalidParameter {
        param: "body".to_string(),
        message: rejection.body_text(),
    })?;
    let address = required_address(request.address)?;
    Ok(Json(measure(&state, &address).await?))
}
