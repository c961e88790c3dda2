//! Turns a resolved fix into encodings and a verdict.

use crate::encoder::{self, GeoCode};
use crate::scorer;
use crate::validation::{verdict_from, ValidationVerdict};
use geofix_core::Fix;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Encodings and verdict for one resolved fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixAssessment {
    /// Fix the assessment was derived from
    pub fix: Fix,
    /// Encodings of the fix coordinate
    pub geo_code: GeoCode,
    /// Validation outcome with its score bundle
    pub verdict: ValidationVerdict,
}

impl FixAssessment {
    /// Whether the fix passed validation
    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid
    }
}

/// Encode, score and validate `fix`.
///
/// Encoding and scoring are independent pure computations; the score bundle
/// is computed once and shared with the verdict.
pub fn evaluate_fix(fix: &Fix) -> FixAssessment {
    let coordinate = fix.coordinate;
    let geo_code = encoder::encode(&coordinate);
    let verdict = verdict_from(coordinate.is_valid(), scorer::score(&coordinate));

    info!(
        coordinate = %coordinate,
        source = ?fix.source,
        accuracy_m = fix.accuracy_m,
        block_code = %geo_code.block_code,
        is_valid = verdict.is_valid,
        "Evaluated fix"
    );

    FixAssessment {
        fix: *fix,
        geo_code,
        verdict,
    }
}
