//! Error types for the roof measurement services.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using ServiceError.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Primary error type for measurement operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Upstream Errors ===
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String },

    #[error("{0} request timed out")]
    UpstreamTimeout(String),

    // === Estimator Errors ===
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Invalid ground resolution: {0}")]
    InvalidGroundResolution(String),

    #[error("No roof contour found: {0}")]
    NoContourFound(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Build an upstream failure for the named service.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::MissingParameter(_) => "MissingParameter",
            ServiceError::InvalidParameter { .. } => "InvalidParameter",
            ServiceError::AddressNotFound(_) => "AddressNotFound",
            ServiceError::Authentication(_) => "AuthenticationError",
            ServiceError::Upstream { .. } => "UpstreamError",
            ServiceError::UpstreamTimeout(_) => "UpstreamTimeout",
            ServiceError::ImageDecode(_) => "ImageDecodeError",
            ServiceError::InvalidGroundResolution(_) => "InvalidGroundResolution",
            ServiceError::NoContourFound(_) => "NoContourFound",
            ServiceError::Internal(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ServiceError::MissingParameter(_) | ServiceError::InvalidParameter { .. } => 422,

            ServiceError::AddressNotFound(_) | ServiceError::NoContourFound(_) => 404,

            ServiceError::Authentication(_)
            | ServiceError::Upstream { .. }
            | ServiceError::ImageDecode(_) => 502,

            ServiceError::UpstreamTimeout(_) => 504,

            ServiceError::InvalidGroundResolution(_) | ServiceError::Internal(_) => 500,
        }
    }

    /// Convert to the JSON error body returned to clients.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code().to_string(),
            message: self.to_string(),
            status: self.http_status_code(),
        }
    }
}

/// JSON error payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl From<crate::coords::CoordinateError> for ServiceError {
    fn from(err: crate::coords::CoordinateError) -> Self {
        ServiceError::InvalidParameter {
            param: "coordinates".to_string(),
            message: err.to_string(),
        }
    }
}
