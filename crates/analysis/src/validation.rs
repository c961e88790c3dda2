//! Pass/fail geo-validation composed from encoder and scorer outputs.

use crate::scorer::{self, BlockchainZone, GeoScoreBundle};
use geofix_core::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Mining suitability below this adds an advisory.
pub const LOW_MINING_SUITABILITY: f64 = 0.3;

/// Security risk above this adds an advisory.
pub const HIGH_SECURITY_RISK: f64 = 0.7;

/// One itemized validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// Coordinate outside [-90,90] x [-180,180] or not finite
    InvalidCoordinate,
    /// Zone classified as restricted; reserved, no zone rule emits it
    RestrictedZone,
    /// Mining suitability below [`LOW_MINING_SUITABILITY`]
    LowMiningSuitability,
    /// Inside a restricted jurisdiction box
    NonCompliantJurisdiction,
    /// Security risk above [`HIGH_SECURITY_RISK`]
    HighSecurityRisk,
    /// No other reason applied
    Passed,
}

impl ValidationReason {
    /// Human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            ValidationReason::InvalidCoordinate => "invalid coordinate",
            ValidationReason::RestrictedZone => "restricted zone",
            ValidationReason::LowMiningSuitability => "low mining suitability",
            ValidationReason::NonCompliantJurisdiction => "non-compliant jurisdiction",
            ValidationReason::HighSecurityRisk => "high security risk",
            ValidationReason::Passed => "validation passed",
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::InvalidCoordinate => "INVALID_COORDINATE",
            ValidationReason::RestrictedZone => "RESTRICTED_ZONE",
            ValidationReason::LowMiningSuitability => "LOW_MINING_SUITABILITY",
            ValidationReason::NonCompliantJurisdiction => "NON_COMPLIANT_JURISDICTION",
            ValidationReason::HighSecurityRisk => "HIGH_SECURITY_RISK",
            ValidationReason::Passed => "PASSED",
        }
    }

    /// Whether this reason makes the verdict invalid
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ValidationReason::InvalidCoordinate
                | ValidationReason::RestrictedZone
                | ValidationReason::NonCompliantJurisdiction
        )
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// False if any blocking reason applied
    pub is_valid: bool,
    /// Reasons in evaluation order; never empty
    pub reasons: Vec<ValidationReason>,
    /// Scores the verdict was derived from
    pub data: GeoScoreBundle,
}

impl ValidationVerdict {
    /// Reason messages joined with `"; "`
    pub fn message(&self) -> String {
        self.reasons
            .iter()
            .map(ValidationReason::message)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Reasons that invalidated the verdict
    pub fn blocking_reasons(&self) -> Vec<ValidationReason> {
        self.reasons.iter().copied().filter(ValidationReason::is_blocking).collect()
    }

    /// Reasons reported without affecting validity
    pub fn advisories(&self) -> Vec<ValidationReason> {
        self.reasons
            .iter()
            .copied()
            .filter(|r| !r.is_blocking() && *r != ValidationReason::Passed)
            .collect()
    }

    /// Whether `reason` was reported
    pub fn has_reason(&self, reason: ValidationReason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Validate `c`. Never fails; out-of-range input yields an invalid verdict.
pub fn validate(c: &Coordinate) -> ValidationVerdict {
    let data = scorer::score(c);
    let verdict = verdict_from(c.is_valid(), data);
    debug!(
        coordinate = %c,
        is_valid = verdict.is_valid,
        reasons = %verdict.message(),
        "Validated location"
    );
    verdict
}

/// Apply the validation rules to an already computed bundle.
pub(crate) fn verdict_from(coordinate_valid: bool, data: GeoScoreBundle) -> ValidationVerdict {
    let mut is_valid = true;
    let mut reasons = Vec::new();

    if !coordinate_valid {
        is_valid = false;
        reasons.push(ValidationReason::InvalidCoordinate);
    }

    if data.blockchain_zone == BlockchainZone::Restricted {
        is_valid = false;
        reasons.push(ValidationReason::RestrictedZone);
    }

    if data.mining_suitability < LOW_MINING_SUITABILITY {
        reasons.push(ValidationReason::LowMiningSuitability);
    }

    if !data.regulatory_compliant {
        is_valid = false;
        reasons.push(ValidationReason::NonCompliantJurisdiction);
    }

    if data.security_risk > HIGH_SECURITY_RISK {
        reasons.push(ValidationReason::HighSecurityRisk);
    }

    if reasons.is_empty() {
        reasons.push(ValidationReason::Passed);
    }

    ValidationVerdict {
        is_valid,
        reasons,
        data,
    }
}
