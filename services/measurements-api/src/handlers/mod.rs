//! HTTP request handlers for the measurements API.

pub mod health;
pub mod measurements;
pub mod metrics;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roof_common::ServiceError;

/// A [`ServiceError`] rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            tracing::warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        (status, Json(self.0.to_body())).into_response()
    }
}
