//! Core functionality for the GeoFix location pipeline.
//!
//! This crate provides the fundamental position types, the error taxonomy,
//! configuration loading and logging initialization shared by the
//! acquisition and analysis crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{AcquisitionConfig, GeoFixConfig, LiveRequestConfig, LoggingConfig, UpdatePriority};
pub use error::{GeoError, GeoResult};
pub use types::{Coordinate, Fix, FixSource, EARTH_RADIUS_M};
