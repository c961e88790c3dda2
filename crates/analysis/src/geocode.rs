//! Reverse geocoding seam.
//!
//! The HTTP transport is supplied by the embedding application through
//! [`RemoteGeocoder`]. This module owns the request URL and the response
//! parsing for the Nominatim reverse endpoint so every transport agrees on
//! them.

use async_trait::async_trait;
use geofix_core::Coordinate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nominatim reverse endpoint
pub const NOMINATIM_REVERSE_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

/// Reverse geocoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Coordinate rejected before any request was made
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// A resolved postal address. Empty strings mean the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// `road[, suburb]`
    pub display: String,
    /// Suburb or neighbourhood
    pub suburb: String,
    /// City, or town when no city is reported
    pub city: String,
    /// Country name
    pub country: String,
}

/// External reverse geocoding service.
#[async_trait]
pub trait RemoteGeocoder: Send + Sync {
    /// Resolve `coordinate` to an address
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Address, GeocodeError>;
}

/// Reverse lookup URL for `c`. Rejects out-of-range coordinates.
pub fn nominatim_reverse_url(c: &Coordinate) -> Result<String, GeocodeError> {
    if !c.is_valid() {
        return Err(GeocodeError::InvalidCoordinate(c.to_string()));
    }
    Ok(format!(
        "{}?format=json&lat={:.6}&lon={:.6}&zoom=18&addressdetails=1",
        NOMINATIM_REVERSE_ENDPOINT,
        c.latitude(),
        c.longitude()
    ))
}

#[derive(Deserialize)]
struct NominatimResponse {
    address: NominatimAddress,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct NominatimAddress {
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    country: Option<String>,
}

/// Parse a Nominatim reverse response body.
pub fn parse_nominatim_response(body: &str) -> Result<Address, GeocodeError> {
    let response: NominatimResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;
    let address = response.address;

    let road = address.road.unwrap_or_default();
    let suburb = address.suburb.unwrap_or_default();
    let city = address.city.or(address.town).unwrap_or_default();
    let country = address.country.unwrap_or_default();

    let display = [road.as_str(), suburb.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Address {
        display,
        suburb,
        city,
        country,
    })
}
