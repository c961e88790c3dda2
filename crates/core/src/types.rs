//! Position types shared by acquisition and analysis.

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in meters used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geographic coordinate in decimal degrees.
///
/// Built with [`Coordinate::new`] the value is guaranteed finite and in range.
/// [`Coordinate::unchecked`] keeps the raw pair so that out-of-range input can
/// be reported as an invalid verdict downstream instead of being rejected at
/// the edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    ///
    /// # Returns
    /// * `Ok(Coordinate)` - Valid coordinate
    /// * `Err(GeoError::InvalidCoordinate)` - Non-finite or out of range
    pub fn new(latitude: f64, longitude: f64) -> GeoResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::InvalidCoordinate(format!(
                "Coordinate must be finite, got ({}, {})",
                latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "Latitude must be between -90 and 90, got {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "Longitude must be between -180 and 180, got {}",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without range checks.
    pub const fn unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Calculate haversine distance to another coordinate in meters
    ///
    /// Identical points yield exactly `0.0`.
    pub fn haversine_distance(&self, other: &Coordinate) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        // Rounding can push near-antipodal points past 1.0
        let a = a.min(1.0);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Where a fix came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixSource {
    /// Last known position held by the provider
    Cached,
    /// First update of a live subscription
    Live,
}

/// A resolved position with accuracy and provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Resolved coordinate
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters (never negative)
    pub accuracy_m: f32,
    /// Provenance
    pub source: FixSource,
}

impl Fix {
    /// Create a fix, clamping negative or non-finite accuracy to zero.
    pub fn new(coordinate: Coordinate, accuracy_m: f32, source: FixSource) -> Self {
        let accuracy_m = if accuracy_m.is_finite() && accuracy_m > 0.0 {
            accuracy_m
        } else {
            0.0
        };
        Self {
            coordinate,
            accuracy_m,
            source,
        }
    }

    /// Same position re-tagged with a different provenance.
    pub fn with_source(mut self, source: FixSource) -> Self {
        self.source = source;
        self
    }
}
