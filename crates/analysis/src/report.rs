//! Plain-text rendering of analysis results and display helpers.

use crate::analysis::SpatialAnalysis;
use crate::encoder::BlockInfo;
use crate::validation::ValidationVerdict;
use geofix_core::Coordinate;

const RULE: &str = "====================";

/// `Lat: 12.345678, Lng: -98.765432`
pub fn format_coordinates(c: &Coordinate) -> String {
    format!("Lat: {:.6}, Lng: {:.6}", c.latitude(), c.longitude())
}

/// `±5.0m`
pub fn format_accuracy(accuracy_m: f32) -> String {
    format!("±{:.1}m", accuracy_m)
}

/// Meters below 1 km, kilometers with two decimals above.
pub fn format_distance(distance_m: f64) -> String {
    if distance_m < 1000.0 {
        format!("{:.0}m", distance_m)
    } else {
        format!("{:.2}km", distance_m / 1000.0)
    }
}

fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Block analysis report: basic, geographic and administrative sections.
pub fn block_report(info: &BlockInfo) -> String {
    let code = &info.geo_code;
    [
        "Block Analysis Report".to_string(),
        RULE.to_string(),
        String::new(),
        "Basic information:".to_string(),
        format!("• Latitude: {:.6}", info.coordinate.latitude()),
        format!("• Longitude: {:.6}", info.coordinate.longitude()),
        format!("• Block code: {}", code.block_code),
        String::new(),
        "Geographic information:".to_string(),
        format!("• Grid sector: {}", code.grid_sector),
        format!("• Timezone: {}", code.timezone),
        format!("• Elevation zone: {}", code.elevation_zone),
        format!("• Land type: {}", code.land_type),
        String::new(),
        "Administrative information:".to_string(),
        format!("• Region code: {}", code.region_code),
        format!("• Admin level: {}", code.admin_level),
        String::new(),
        "Conclusion:".to_string(),
        format!("• Block lies in region {}", code.region_code),
        format!("• Climate type {}", code.land_type),
        format!("• Admin level: {}", code.admin_level),
    ]
    .join("\n")
}

/// Spatial analysis report with percentage scores.
pub fn spatial_report(analysis: &SpatialAnalysis) -> String {
    let scores = &analysis.scores;
    [
        "Spatial Analysis Report".to_string(),
        RULE.to_string(),
        String::new(),
        "Validation:".to_string(),
        format!("• Valid coordinate: {}", yes_no(analysis.is_valid_coordinate)),
        format!("• Inside China: {}", yes_no(analysis.is_in_china)),
        String::new(),
        "Encodings:".to_string(),
        format!("• Geo hash: {}", analysis.geo_hash),
        format!("• Spatial hash: {}", analysis.spatial_hash),
        String::new(),
        "Zone features:".to_string(),
        format!("• Blockchain zone: {}", scores.blockchain_zone),
        format!("• Mining suitability: {}", percent(scores.mining_suitability)),
        format!("• Network proximity: {}", percent(scores.network_proximity)),
        String::new(),
        "Environment:".to_string(),
        format!("• Energy efficiency: {}", percent(scores.energy_efficiency)),
        format!("• Environmental impact: {}", scores.environmental_impact),
        String::new(),
        "Security:".to_string(),
        format!("• Security risk: {:.1}/1.0", scores.security_risk),
        format!("• Regulatory compliance: {}", yes_no(scores.regulatory_compliant)),
    ]
    .join("\n")
}

/// One-paragraph verdict summary.
pub fn verdict_report(verdict: &ValidationVerdict) -> String {
    let status = if verdict.is_valid { "PASSED" } else { "FAILED" };
    let mut out = format!("Geo-validation {}: {}", status, verdict.message());
    for reason in verdict.blocking_reasons() {
        out.push_str(&format!("\n• blocking [{}] {}", reason.code(), reason));
    }
    for reason in verdict.advisories() {
        out.push_str(&format!("\n• advisory [{}] {}", reason.code(), reason));
    }
    out
}
