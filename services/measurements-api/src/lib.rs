//! Roof measurements HTTP service.
//!
//! Turns a street address into building insights from the Solar API and a
//! gutter length estimate measured from the roof mask raster.

pub mod config;
pub mod handlers;
pub mod orchestrator;
pub mod state;
pub mod summary;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router with its middleware stack.
pub fn build_router(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        // Measurements
        .route("/measurements", get(handlers::measurements::get_measurements))
        .route(
            "/api/solar/estimate",
            post(handlers::measurements::post_estimate),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/api/solar/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::metrics::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
