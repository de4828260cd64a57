//! Shared test utilities for the roof-measurements workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic roof mask generators
//! - Canned upstream API payloads (geocoding, solar)
//! - A throwaway service-account key for auth tests
//! - An in-process fake of the Google endpoints
//! - Skip macros for live tests that need credentials
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fake_google;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fake_google::{FakeGoogle, FakeGoogleConfig, FAKE_ACCESS_TOKEN, FAKE_LOCATION};
pub use fixtures::*;
pub use generators::*;

/// Macro to skip a test if a required environment variable is not set.
///
/// Live tests against the real Google APIs use this so they quietly pass in
/// CI without credentials.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_env;
///
/// #[tokio::test]
/// async fn test_live_geocode() {
///     let key = require_env!("GOOGLE_API_KEY");
///     // Test code using key...
/// }
/// ```
#[macro_export]
macro_rules! require_env {
    ($name:expr) => {{
        match std::env::var($name) {
            Ok(value) if !value.is_empty() => value,
            _ => {
                eprintln!("SKIPPED: environment variable '{}' is not set.", $name);
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
