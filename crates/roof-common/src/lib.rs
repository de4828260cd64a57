//! Common types and utilities shared across the roof measurement crates.

pub mod coords;
pub mod error;
pub mod resolution;

pub use coords::{CoordinateError, Coordinates};
pub use error::{ErrorBody, ServiceError, ServiceResult};
pub use resolution::GroundResolution;
