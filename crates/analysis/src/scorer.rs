//! Heuristic location scoring.
//!
//! This module scores a coordinate on:
//! - Mining suitability (climate, energy cost, infrastructure)
//! - Network proximity to reference nodes
//! - Renewable energy efficiency
//! - Security risk
//!
//! and classifies it into a zone, an environmental impact band and a
//! regulatory compliance flag. Scores are clamped into their documented
//! ranges for every input, non-finite ones included. Rules are illustrative
//! constants, not regulatory data.

use crate::encoder::is_in_china;
use geofix_core::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference nodes for network proximity: Bay Area, Berlin, Tokyo.
pub const REFERENCE_NODES: [(f64, f64); 3] = [(37.0, -122.0), (52.0, 13.0), (35.0, 139.0)];

/// Distance at which network proximity drops to zero, in meters.
pub const PROXIMITY_RANGE_M: f64 = 10_000.0;

/// Upper bound of the energy efficiency score.
pub const MAX_ENERGY_EFFICIENCY: f64 = 0.9;

/// Coarse climate/region label used as a scoring feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockchainZone {
    /// |latitude| above 60
    Polar,
    /// |latitude| above 40
    Temperate,
    /// |latitude| below 20
    Tropical,
    /// lon in (100, 140), lat in (20, 50)
    AsiaPacific,
    /// lon in (-80, -40), lat in (25, 50)
    NorthAmerica,
    /// Everything else
    General,
    /// Reserved; no classification rule produces it
    Restricted,
}

impl BlockchainZone {
    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockchainZone::Polar => "POLAR",
            BlockchainZone::Temperate => "TEMPERATE",
            BlockchainZone::Tropical => "TROPICAL",
            BlockchainZone::AsiaPacific => "ASIA_PACIFIC",
            BlockchainZone::NorthAmerica => "NORTH_AMERICA",
            BlockchainZone::General => "GENERAL",
            BlockchainZone::Restricted => "RESTRICTED",
        }
    }
}

impl fmt::Display for BlockchainZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environmental impact band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentalImpact {
    /// Polar regions
    Low,
    /// Tropics
    Moderate,
    /// Everything else
    Standard,
}

impl EnvironmentalImpact {
    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentalImpact::Low => "LOW",
            EnvironmentalImpact::Moderate => "MODERATE",
            EnvironmentalImpact::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for EnvironmentalImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All scores and assessments of one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoScoreBundle {
    /// Mining suitability (0.0 to 1.0)
    pub mining_suitability: f64,
    /// Network proximity (0.0 to 1.0)
    pub network_proximity: f64,
    /// Energy efficiency (0.0 to 0.9)
    pub energy_efficiency: f64,
    /// Security risk (0.0 to 1.0)
    pub security_risk: f64,
    /// Zone classification
    pub blockchain_zone: BlockchainZone,
    /// Environmental impact band
    pub environmental_impact: EnvironmentalImpact,
    /// Whether the jurisdiction passes the compliance rules
    pub regulatory_compliant: bool,
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
fn bounded(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Great-circle distance in meters.
pub fn distance_m(a: &Coordinate, b: &Coordinate) -> f64 {
    a.haversine_distance(b)
}

/// Suitability from temperature, energy cost and infrastructure terms.
pub fn mining_suitability(c: &Coordinate) -> f64 {
    let lat = c.latitude().abs();
    let lon = c.longitude().abs();

    let mut score = 0.5;

    // Temperature: best around 35 degrees
    let temperature_factor = 1.0 - ((lat - 35.0).abs() / 35.0).min(1.0);
    score += temperature_factor * 0.2;

    // Energy cost: cheaper toward the equator
    let energy_factor = 1.0 - lat / 90.0;
    score += energy_factor * 0.15;

    // Infrastructure
    score += if lat < 45.0 && lon < 135.0 { 0.2 } else { 0.1 };

    bounded(score, 0.0, 1.0)
}

/// Distance to the nearest reference node in meters.
pub fn nearest_node_distance_m(c: &Coordinate) -> f64 {
    REFERENCE_NODES
        .iter()
        .map(|&(lat, lon)| distance_m(c, &Coordinate::unchecked(lat, lon)))
        .fold(f64::INFINITY, f64::min)
}

/// 1.0 at a reference node, falling linearly to 0.0 at [`PROXIMITY_RANGE_M`].
pub fn network_proximity(c: &Coordinate) -> f64 {
    let distance = nearest_node_distance_m(c);
    bounded(1.0 - (distance / PROXIMITY_RANGE_M).min(1.0), 0.0, 1.0)
}

/// Renewable availability: solar toward the equator plus a coastal wind term.
pub fn energy_efficiency(c: &Coordinate) -> f64 {
    let mut efficiency = 0.6;

    efficiency += (1.0 - c.latitude().abs() / 90.0) * 0.2;

    // `%` keeps the dividend's sign, so take the magnitude afterwards
    if (c.longitude() % 10.0).abs() < 2.0 {
        efficiency += 0.1;
    }

    bounded(efficiency, 0.0, MAX_ENERGY_EFFICIENCY)
}

/// Base risk adjusted for region stability and seismic exposure.
pub fn security_risk(c: &Coordinate) -> f64 {
    let lat = c.latitude();
    let lon = c.longitude();

    let mut risk = 0.3;

    if lon > 70.0 && lon < 140.0 && lat > 10.0 && lat < 55.0 {
        risk += 0.2;
    }
    if lon > -20.0 && lon < 40.0 && lat > 35.0 && lat < 70.0 {
        risk -= 0.1;
    }
    // Pacific ring
    if lat.abs() < 30.0 && lon.abs() > 120.0 && lon.abs() < 180.0 {
        risk += 0.2;
    }

    bounded(risk, 0.0, 1.0)
}

/// Zone classification; latitude bands first, then regional boxes.
pub fn blockchain_zone(c: &Coordinate) -> BlockchainZone {
    let lat = c.latitude();
    let lon = c.longitude();

    if lat.abs() > 60.0 {
        return BlockchainZone::Polar;
    }
    if lat.abs() > 40.0 {
        return BlockchainZone::Temperate;
    }
    if lat.abs() < 20.0 {
        return BlockchainZone::Tropical;
    }
    if lon > 100.0 && lon < 140.0 && lat > 20.0 && lat < 50.0 {
        return BlockchainZone::AsiaPacific;
    }
    if lon > -80.0 && lon < -40.0 && lat > 25.0 && lat < 50.0 {
        return BlockchainZone::NorthAmerica;
    }
    BlockchainZone::General
}

/// Environmental impact band
pub fn environmental_impact(c: &Coordinate) -> EnvironmentalImpact {
    let lat = c.latitude().abs();
    if lat > 60.0 {
        EnvironmentalImpact::Low
    } else if lat < 23.5 {
        EnvironmentalImpact::Moderate
    } else {
        EnvironmentalImpact::Standard
    }
}

/// False inside the restricted-jurisdiction boxes.
pub fn regulatory_compliant(c: &Coordinate) -> bool {
    if is_in_china(c) {
        return false;
    }

    let lat = c.latitude();
    let lon = c.longitude();
    !(lon > 55.0 && lon < 75.0 && lat > 20.0 && lat < 40.0)
}

/// Compute the full score bundle of `c`.
pub fn score(c: &Coordinate) -> GeoScoreBundle {
    GeoScoreBundle {
        mining_suitability: mining_suitability(c),
        network_proximity: network_proximity(c),
        energy_efficiency: energy_efficiency(c),
        security_risk: security_risk(c),
        blockchain_zone: blockchain_zone(c),
        environmental_impact: environmental_impact(c),
        regulatory_compliant: regulatory_compliant(c),
    }
}
