//! Service configuration.
//!
//! Command-line flags with environment fallbacks (a `.env` file is loaded
//! first by `main`). [`ServiceConfig`] is the validated form, built once at
//! startup and shared with every component.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use gutter_estimator::{
    EstimatorConfig, ThresholdMode, DEFAULT_COST_PER_METER_USD, DEFAULT_MIN_AREA_PX,
};
use roof_common::{GroundResolution, ServiceError, ServiceResult};
use solar_client::auth::DEFAULT_SCOPE;
use solar_client::geocoding::DEFAULT_GEOCODE_BASE_URL;
use solar_client::solar::DEFAULT_SOLAR_BASE_URL;
use solar_client::{parse_scopes, SolarOptions, SUPPORTED_PIXEL_SIZES};

/// Roof measurements API server
#[derive(Parser, Debug, Clone)]
#[command(name = "measurements-api")]
#[command(about = "Address to roof measurements and gutter length estimates")]
pub struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "MEASUREMENTS_LISTEN_ADDR")]
    pub listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Number of worker threads
    #[arg(long, env = "MEASUREMENTS_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Google Maps Platform API key (Geocoding API)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Path to the service-account JSON key used for the Solar API
    #[arg(long, env = "GOOGLE_CREDENTIALS_PATH")]
    pub google_credentials_path: PathBuf,

    /// Comma-separated OAuth scopes
    #[arg(long, default_value = DEFAULT_SCOPE, env = "GOOGLE_SCOPES")]
    pub google_scopes: String,

    /// Project billed for Solar API calls (x-goog-user-project)
    #[arg(long, env = "PROJECT_ID")]
    pub project_id: String,

    /// Per-call timeout for every upstream request, in seconds
    #[arg(long, default_value_t = 10, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: u64,

    /// Radius of the data layer window around the address
    #[arg(long, default_value_t = 50.0, env = "SOLAR_RADIUS_METERS")]
    pub solar_radius_meters: f64,

    /// Requested roof mask resolution in meters per pixel (0.1, 0.25, 0.5 or 1.0)
    #[arg(long, default_value_t = 0.5, env = "MASK_PIXEL_SIZE_METERS")]
    pub mask_pixel_size_meters: f64,

    /// Contours smaller than this many square pixels are noise
    #[arg(long, default_value_t = DEFAULT_MIN_AREA_PX, env = "GUTTER_MIN_AREA_PX")]
    pub gutter_min_area_px: f64,

    /// Ignore contours larger than this many square meters
    #[arg(long, env = "GUTTER_MAX_AREA_M2")]
    pub gutter_max_area_m2: Option<f64>,

    /// Installed gutter cost in USD per meter
    #[arg(long, default_value_t = DEFAULT_COST_PER_METER_USD, env = "GUTTER_COST_PER_METER")]
    pub gutter_cost_per_meter: f64,

    /// Mask binarization: mask, otsu or fixed:<0-255>
    #[arg(long, default_value = "mask", env = "GUTTER_THRESHOLD")]
    pub gutter_threshold: ThresholdMode,

    #[arg(long, default_value = DEFAULT_GEOCODE_BASE_URL, env = "GOOGLE_GEOCODE_BASE_URL", hide = true)]
    pub geocode_base_url: String,

    #[arg(long, default_value = DEFAULT_SOLAR_BASE_URL, env = "SOLAR_API_BASE_URL", hide = true)]
    pub solar_base_url: String,
}

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen: SocketAddr,
    pub google_api_key: String,
    pub credentials_path: PathBuf,
    pub scopes: Vec<String>,
    pub project_id: String,
    pub upstream_timeout: Duration,
    pub geocode_base_url: String,
    pub solar: SolarOptions,
    pub estimator: EstimatorConfig,
}

fn invalid(param: &str, message: impl Into<String>) -> ServiceError {
    ServiceError::InvalidParameter {
        param: param.to_string(),
        message: message.into(),
    }
}

fn positive(param: &str, value: f64) -> ServiceResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(param, format!("must be a positive number, got {}", value)))
    }
}

fn mask_pixel_size(value: f64) -> ServiceResult<GroundResolution> {
    let resolution = GroundResolution::new(value)?;
    if SUPPORTED_PIXEL_SIZES.contains(&value) {
        Ok(resolution)
    } else {
        Err(invalid(
            "mask_pixel_size_meters",
            format!("must be one of {:?}, got {}", SUPPORTED_PIXEL_SIZES, value),
        ))
    }
}

impl ServiceConfig {
    pub fn from_args(args: &Args) -> ServiceResult<Self> {
        let listen: SocketAddr = args
            .listen
            .parse()
            .map_err(|e| invalid("listen", format!("{}: {}", args.listen, e)))?;

        if args.upstream_timeout_secs == 0 {
            return Err(invalid("upstream_timeout_secs", "must be at least 1"));
        }

        let min_area_px = args.gutter_min_area_px;
        if !min_area_px.is_finite() || min_area_px < 0.0 {
            return Err(invalid("gutter_min_area_px", "must be zero or positive"));
        }

        let max_area_m2 = args
            .gutter_max_area_m2
            .map(|v| positive("gutter_max_area_m2", v))
            .transpose()?;

        let cost = args.gutter_cost_per_meter;
        if !cost.is_finite() || cost < 0.0 {
            return Err(invalid("gutter_cost_per_meter", "must be zero or positive"));
        }

        let scopes = parse_scopes(&args.google_scopes);
        if scopes.is_empty() {
            return Err(invalid("google_scopes", "at least one scope is required"));
        }

        Ok(Self {
            listen,
            google_api_key: args.google_api_key.clone(),
            credentials_path: args.google_credentials_path.clone(),
            scopes,
            project_id: args.project_id.clone(),
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
            geocode_base_url: args.geocode_base_url.clone(),
            solar: SolarOptions {
                base_url: args.solar_base_url.clone(),
                radius_meters: positive("solar_radius_meters", args.solar_radius_meters)?,
                pixel_size: mask_pixel_size(args.mask_pixel_size_meters)?,
                ..Default::default()
            },
            estimator: EstimatorConfig {
                threshold: args.gutter_threshold,
                min_area_px,
                max_area_m2,
                cost_per_meter_usd: cost,
            },
        })
    }
}
