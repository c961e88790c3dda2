//! Deterministic geographic encodings.
//!
//! Every function here is a pure function of the coordinate: no network, no
//! randomness, byte-identical output across calls. The encodings are simplified
//! identifiers, not true Geohash or GIS data.

use geofix_core::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse elevation band estimated from latitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElevationZone {
    /// Latitude above 45
    NorthHighland,
    /// Latitude below -45
    SouthHighland,
    /// |latitude| below 30
    TropicalLowland,
    /// Everything else
    TemperateZone,
}

impl ElevationZone {
    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            ElevationZone::NorthHighland => "NORTH_HIGHLAND",
            ElevationZone::SouthHighland => "SOUTH_HIGHLAND",
            ElevationZone::TropicalLowland => "TROPICAL_LOWLAND",
            ElevationZone::TemperateZone => "TEMPERATE_ZONE",
        }
    }
}

/// Land/climate type estimated from latitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandType {
    /// |latitude| above 60
    Polar,
    /// |latitude| above 40
    Temperate,
    /// |latitude| below 20
    Tropical,
    /// Everything else
    Subtropical,
}

impl LandType {
    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            LandType::Polar => "POLAR",
            LandType::Temperate => "TEMPERATE",
            LandType::Tropical => "TROPICAL",
            LandType::Subtropical => "SUBTROPICAL",
        }
    }
}

/// Continental region estimated from longitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionCode {
    /// Longitude above 130
    AsiaEast,
    /// Longitude above 70
    AsiaCentral,
    /// Longitude above -10
    EuropeAfrica,
    /// Longitude above -80
    AmericaSouth,
    /// Everything else
    AmericaNorth,
}

impl RegionCode {
    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCode::AsiaEast => "ASIA_EAST",
            RegionCode::AsiaCentral => "ASIA_CENTRAL",
            RegionCode::EuropeAfrica => "EUROPE_AFRICA",
            RegionCode::AmericaSouth => "AMERICA_SOUTH",
            RegionCode::AmericaNorth => "AMERICA_NORTH",
        }
    }
}

/// Settlement density estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminLevel {
    /// |lat| < 30 and |lon| < 120
    UrbanCore,
    /// |lat| < 50 and |lon| < 150
    Suburban,
    /// Everything else
    Rural,
}

impl AdminLevel {
    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::UrbanCore => "URBAN_CORE",
            AdminLevel::Suburban => "SUBURBAN",
            AdminLevel::Rural => "RURAL",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ElevationZone, LandType, RegionCode, AdminLevel);

/// All encodings of one coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCode {
    /// `BLK-LLLL-GGGG` block identifier
    pub block_code: String,
    /// Two-letter 10 degree sector, e.g. `MS-SECTOR`
    pub grid_sector: String,
    /// `GH-XXXXXXXX-XXXXXXXX` hex token
    pub geo_hash: String,
    /// `BLCK-...-SPT` token derived from the geo hash
    pub spatial_hash: String,
    /// `UTC+N` estimate
    pub timezone: String,
    /// Hour offset behind `timezone`
    pub utc_offset_hours: i32,
    /// Elevation band
    pub elevation_zone: ElevationZone,
    /// Land type
    pub land_type: LandType,
    /// Region
    pub region_code: RegionCode,
    /// Settlement density
    pub admin_level: AdminLevel,
}

/// Block decoding result: the coordinate with its encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Decoded coordinate
    pub coordinate: Coordinate,
    /// Encodings
    pub geo_code: GeoCode,
}

/// Offset and scale a component, floored to an integer grid index.
fn scaled(value: f64, offset: f64, scale: f64) -> i64 {
    ((value + offset) * scale).floor() as i64
}

/// `BLK-` + 0.01 degree latitude and longitude indices.
pub fn block_code(c: &Coordinate) -> String {
    format!(
        "BLK-{:04}-{:04}",
        scaled(c.latitude(), 90.0, 100.0),
        scaled(c.longitude(), 180.0, 100.0)
    )
}

fn sector_letter(value: f64, offset: f64, max_index: i64) -> char {
    let index = ((value + offset) / 10.0).floor() as i64;
    char::from(b'A' + index.clamp(0, max_index) as u8)
}

/// One character per axis for each 10 degree band, offset from `'A'`.
pub fn grid_sector(c: &Coordinate) -> String {
    format!(
        "{}{}-SECTOR",
        sector_letter(c.latitude(), 90.0, 18),
        sector_letter(c.longitude(), 180.0, 36)
    )
}

/// 1e-4 degree index; saturates at the `i32` bounds for out-of-range input.
fn hash_index(value: f64, offset: f64) -> i32 {
    ((value + offset) * 10_000.0).floor() as i32
}

/// Fixed-width hex encoding of 1e-4 degree latitude and longitude indices.
pub fn geo_hash(c: &Coordinate) -> String {
    let lat = hash_index(c.latitude(), 90.0);
    let lon = hash_index(c.longitude(), 180.0);
    format!("GH-{:08X}-{:08X}", lat, lon)
}

/// Derived from [`geo_hash`]: `BLCK-` + hash without its `GH-` prefix + `-SPT`.
pub fn spatial_hash(c: &Coordinate) -> String {
    let base = geo_hash(c);
    format!("BLCK-{}-SPT", &base[3..])
}

/// Signed hour offset, one zone per 15 degrees of longitude.
pub fn timezone_offset(c: &Coordinate) -> i32 {
    (c.longitude() / 15.0).floor() as i32
}

/// `UTC+N` / `UTC-N` rendering of [`timezone_offset`].
pub fn timezone(c: &Coordinate) -> String {
    format!("UTC{:+}", timezone_offset(c))
}

/// Elevation band
pub fn elevation_zone(c: &Coordinate) -> ElevationZone {
    let lat = c.latitude();
    if lat > 45.0 {
        ElevationZone::NorthHighland
    } else if lat < -45.0 {
        ElevationZone::SouthHighland
    } else if lat.abs() < 30.0 {
        ElevationZone::TropicalLowland
    } else {
        ElevationZone::TemperateZone
    }
}

/// Land type
pub fn land_type(c: &Coordinate) -> LandType {
    let lat = c.latitude().abs();
    if lat > 60.0 {
        LandType::Polar
    } else if lat > 40.0 {
        LandType::Temperate
    } else if lat < 20.0 {
        LandType::Tropical
    } else {
        LandType::Subtropical
    }
}

/// Region
pub fn region_code(c: &Coordinate) -> RegionCode {
    let lon = c.longitude();
    if lon > 130.0 {
        RegionCode::AsiaEast
    } else if lon > 70.0 {
        RegionCode::AsiaCentral
    } else if lon > -10.0 {
        RegionCode::EuropeAfrica
    } else if lon > -80.0 {
        RegionCode::AmericaSouth
    } else {
        RegionCode::AmericaNorth
    }
}

/// Settlement density
pub fn admin_level(c: &Coordinate) -> AdminLevel {
    let lat = c.latitude().abs();
    let lon = c.longitude().abs();
    if lat < 30.0 && lon < 120.0 {
        AdminLevel::UrbanCore
    } else if lat < 50.0 && lon < 150.0 {
        AdminLevel::Suburban
    } else {
        AdminLevel::Rural
    }
}

/// Compute every encoding of `c`.
pub fn encode(c: &Coordinate) -> GeoCode {
    GeoCode {
        block_code: block_code(c),
        grid_sector: grid_sector(c),
        geo_hash: geo_hash(c),
        spatial_hash: spatial_hash(c),
        timezone: timezone(c),
        utc_offset_hours: timezone_offset(c),
        elevation_zone: elevation_zone(c),
        land_type: land_type(c),
        region_code: region_code(c),
        admin_level: admin_level(c),
    }
}

/// Decode a coordinate into its block information.
pub fn decode_block_info(c: &Coordinate) -> BlockInfo {
    BlockInfo {
        coordinate: *c,
        geo_code: encode(c),
    }
}

/// Approximate mainland-China bounding box.
pub fn is_in_china(c: &Coordinate) -> bool {
    (18.0..=53.5).contains(&c.latitude()) && (73.0..=135.0).contains(&c.longitude())
}

/// Fixed-offset WGS84 to GCJ-02 shift.
///
/// A constant approximation only; it does not implement the real obfuscation
/// algorithm.
pub fn wgs84_to_gcj02(c: &Coordinate) -> Coordinate {
    const DELTA_LAT: f64 = 0.0060;
    const DELTA_LON: f64 = 0.0065;
    Coordinate::unchecked(c.latitude() + DELTA_LAT, c.longitude() + DELTA_LON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_block_code_known_values() {
        assert_eq!(block_code(&coord(0.0, 0.0)), "BLK-9000-18000");
        assert_eq!(block_code(&coord(-90.0, -180.0)), "BLK-0000-0000");
        assert_eq!(block_code(&coord(-89.99, -179.95)), "BLK-0001-0005");
        assert_eq!(block_code(&coord(90.0, 180.0)), "BLK-18000-36000");
    }

    #[test]
    fn test_grid_sector_known_values() {
        assert_eq!(grid_sector(&coord(0.0, 0.0)), "JS-SECTOR");
        assert_eq!(grid_sector(&coord(-90.0, -180.0)), "AA-SECTOR");
        // Beijing: lat band 12 -> 'M', lon band 29 -> '^'
        assert_eq!(grid_sector(&coord(39.9, 116.4)), "M^-SECTOR");
        assert_eq!(grid_sector(&coord(90.0, 180.0)), "Se-SECTOR");
    }

    #[test]
    fn test_grid_sector_clamps_out_of_range() {
        assert_eq!(grid_sector(&Coordinate::unchecked(500.0, -900.0)), "SA-SECTOR");
    }

    #[test]
    fn test_geo_hash_known_values() {
        assert_eq!(geo_hash(&coord(0.0, 0.0)), "GH-000DBBA0-001B7740");
        assert_eq!(geo_hash(&coord(-90.0, -180.0)), "GH-00000000-00000000");
        assert_eq!(geo_hash(&coord(90.0, 180.0)), "GH-001B7740-0036EE80");
    }

    #[test]
    fn test_geo_hash_saturates_huge_components() {
        let c = Coordinate::unchecked(1e300, -1e300);
        assert_eq!(geo_hash(&c), "GH-7FFFFFFF-80000000");
        assert_eq!(spatial_hash(&c), "BLCK-7FFFFFFF-80000000-SPT");
    }

    #[test]
    fn test_spatial_hash_known_value() {
        assert_eq!(spatial_hash(&coord(0.0, 0.0)), "BLCK-000DBBA0-001B7740-SPT");
    }

    #[test]
    fn test_timezone() {
        assert_eq!(timezone(&coord(39.9, 116.4)), "UTC+7");
        assert_eq!(timezone(&coord(0.0, 0.0)), "UTC+0");
        assert_eq!(timezone(&coord(40.7, -74.0)), "UTC-5");
        assert_eq!(timezone(&coord(0.0, -7.0)), "UTC-1");
        assert_eq!(timezone_offset(&coord(0.0, 180.0)), 12);
        assert_eq!(timezone_offset(&coord(0.0, -180.0)), -12);
    }

    #[test]
    fn test_elevation_zone_rules() {
        assert_eq!(elevation_zone(&coord(50.0, 0.0)), ElevationZone::NorthHighland);
        assert_eq!(elevation_zone(&coord(-50.0, 0.0)), ElevationZone::SouthHighland);
        assert_eq!(elevation_zone(&coord(10.0, 0.0)), ElevationZone::TropicalLowland);
        assert_eq!(elevation_zone(&coord(35.0, 0.0)), ElevationZone::TemperateZone);
        // Boundary values fall through to the next rule
        assert_eq!(elevation_zone(&coord(45.0, 0.0)), ElevationZone::TemperateZone);
        assert_eq!(elevation_zone(&coord(30.0, 0.0)), ElevationZone::TemperateZone);
    }

    #[test]
    fn test_land_type_rules() {
        assert_eq!(land_type(&coord(-70.0, 0.0)), LandType::Polar);
        assert_eq!(land_type(&coord(45.0, 0.0)), LandType::Temperate);
        assert_eq!(land_type(&coord(-5.0, 0.0)), LandType::Tropical);
        assert_eq!(land_type(&coord(25.0, 0.0)), LandType::Subtropical);
        assert_eq!(land_type(&coord(60.0, 0.0)), LandType::Temperate);
    }

    #[test]
    fn test_region_code_rules() {
        assert_eq!(region_code(&coord(0.0, 139.0)), RegionCode::AsiaEast);
        assert_eq!(region_code(&coord(0.0, 100.0)), RegionCode::AsiaCentral);
        assert_eq!(region_code(&coord(0.0, 13.0)), RegionCode::EuropeAfrica);
        assert_eq!(region_code(&coord(0.0, -60.0)), RegionCode::AmericaSouth);
        assert_eq!(region_code(&coord(0.0, -122.0)), RegionCode::AmericaNorth);
        assert_eq!(region_code(&coord(0.0, 130.0)), RegionCode::AsiaCentral);
    }

    #[test]
    fn test_admin_level_rules() {
        assert_eq!(admin_level(&coord(10.0, 100.0)), AdminLevel::UrbanCore);
        assert_eq!(admin_level(&coord(40.0, 140.0)), AdminLevel::Suburban);
        assert_eq!(admin_level(&coord(60.0, 0.0)), AdminLevel::Rural);
        assert_eq!(admin_level(&coord(10.0, 160.0)), AdminLevel::Rural);
    }

    #[test]
    fn test_labels_serialize_screaming_snake() {
        let json = serde_json::to_string(&encode(&coord(39.9, 116.4))).unwrap();
        assert!(json.contains("\"elevation_zone\":\"TEMPERATE_ZONE\""));
        assert!(json.contains("\"region_code\":\"ASIA_CENTRAL\""));
        assert!(json.contains("\"admin_level\":\"SUBURBAN\""));
        assert_eq!(AdminLevel::UrbanCore.to_string(), "URBAN_CORE");
    }

    #[test]
    fn test_china_box_and_gcj_shift() {
        assert!(is_in_china(&coord(35.0, 105.0)));
        assert!(is_in_china(&coord(18.0, 73.0)));
        assert!(!is_in_china(&coord(35.0, 139.0)));

        let shifted = wgs84_to_gcj02(&coord(39.9, 116.4));
        assert!((shifted.latitude() - 39.906).abs() < 1e-9);
        assert!((shifted.longitude() - 116.4065).abs() < 1e-9);
    }

    #[test]
    fn test_decode_block_info() {
        let c = coord(-33.86, 151.21);
        let info = decode_block_info(&c);
        assert_eq!(info.coordinate, c);
        assert_eq!(info.geo_code, encode(&c));
        assert_eq!(info.geo_code.region_code, RegionCode::AsiaEast);
    }

    proptest! {
        #[test]
        fn prop_encodings_deterministic(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = coord(lat, lon);
            prop_assert_eq!(encode(&c), encode(&c));
        }

        #[test]
        fn prop_spatial_hash_derives_from_geo_hash(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = coord(lat, lon);
            let expected = format!("BLCK-{}-SPT", &geo_hash(&c)[3..]);
            prop_assert_eq!(spatial_hash(&c), expected);
        }

        #[test]
        fn prop_geo_hash_fixed_width(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let hash = geo_hash(&coord(lat, lon));
            prop_assert_eq!(hash.len(), 3 + 8 + 1 + 8);
            prop_assert!(hash.starts_with("GH-"));
        }

        #[test]
        fn prop_grid_sector_shape(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let sector = grid_sector(&coord(lat, lon));
            prop_assert!(sector.ends_with("-SECTOR"));
            prop_assert_eq!(sector.chars().count(), 9);
        }
    }
}
