//! Roof Measurements API Server
//!
//! Address to building insights and gutter length estimates.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use measurements_api::build_router;
use measurements_api::config::{Args, ServiceConfig};
use measurements_api::state::AppState;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting measurements API server");

    let config = ServiceConfig::from_args(&args).context("Invalid configuration")?;

    // Initialize Prometheus metrics exporter
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let state = Arc::new(AppState::from_config(&config).context("Failed to initialize state")?);

    let app = build_router(state, prometheus_handle);

    info!(
        project_id = %config.project_id,
        timeout_secs = config.upstream_timeout.as_secs(),
        pixel_size_m = config.solar.pixel_size.meters_per_pixel(),
        "Measurements API listening on {}",
        config.listen
    );

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
