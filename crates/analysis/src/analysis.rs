//! Spatial analysis bundle: validity, encodings and the full score set.

use crate::encoder::{geo_hash, is_in_china, spatial_hash};
use crate::scorer::{self, GeoScoreBundle};
use geofix_core::Coordinate;
use serde::{Deserialize, Serialize};

/// Everything the spatial report shows for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialAnalysis {
    /// Analyzed coordinate
    pub coordinate: Coordinate,
    /// Inside [-90,90] x [-180,180]
    pub is_valid_coordinate: bool,
    /// Inside the China approximation box
    pub is_in_china: bool,
    /// `GH-` token
    pub geo_hash: String,
    /// `BLCK-` token derived from the geo hash
    pub spatial_hash: String,
    /// Scores and classifications
    pub scores: GeoScoreBundle,
}

/// Run the full analysis of `c`.
pub fn analyze(c: &Coordinate) -> SpatialAnalysis {
    SpatialAnalysis {
        coordinate: *c,
        is_valid_coordinate: c.is_valid(),
        is_in_china: is_in_china(c),
        geo_hash: geo_hash(c),
        spatial_hash: spatial_hash(c),
        scores: scorer::score(c),
    }
}
