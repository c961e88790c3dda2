//! Geospatial analysis for GeoFix.
//!
//! Every function here is a pure computation over a [`Coordinate`]:
//! - [`encoder`]: block codes, grid sectors, hash tokens, timezone and
//!   piecewise classifications
//! - [`scorer`]: bounded heuristic scores and categorical assessments
//! - [`validation`]: the pass/fail verdict with itemized reasons
//! - [`pipeline`]: a resolved [`Fix`] run through all of the above
//!
//! Rendering ([`report`], [`share`]) and the reverse geocoding seam
//! ([`geocode`]) sit on top of those results.
//!
//! The encodings are simplified identifiers, not true Geohash or GIS output,
//! and the compliance rules are illustrative constants.
//!
//! [`Coordinate`]: geofix_core::Coordinate
//! [`Fix`]: geofix_core::Fix

#![warn(missing_docs)]

pub mod analysis;
pub mod encoder;
pub mod geocode;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod share;
pub mod validation;

pub use analysis::{analyze, SpatialAnalysis};
pub use encoder::{decode_block_info, encode, BlockInfo, GeoCode};
pub use geocode::{Address, GeocodeError, RemoteGeocoder};
pub use pipeline::{evaluate_fix, FixAssessment};
pub use scorer::{score, BlockchainZone, EnvironmentalImpact, GeoScoreBundle};
pub use validation::{validate, ValidationReason, ValidationVerdict};
