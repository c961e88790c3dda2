//! Links and share text for a position.

use crate::report::format_coordinates;
use geofix_core::Coordinate;

/// Google Maps link for `c`.
pub fn maps_link(c: &Coordinate) -> String {
    format!("https://maps.google.com/?q={},{}", c.latitude(), c.longitude())
}

/// Static map image URL centered on `c` with a red marker at zoom 15.
pub fn static_map_url(c: &Coordinate, width: u32, height: u32) -> String {
    format!(
        "https://maps.googleapis.com/maps/api/staticmap?center={lat:.6},{lon:.6}&zoom=15&size={width}x{height}&markers=color:red%7C{lat:.6},{lon:.6}",
        lat = c.latitude(),
        lon = c.longitude(),
    )
}

/// RFC 5870 `geo:` URI with a query pin.
pub fn geo_uri(c: &Coordinate) -> String {
    format!(
        "geo:{lat},{lon}?q={lat},{lon}",
        lat = c.latitude(),
        lon = c.longitude()
    )
}

/// Multi-line share message; the address line is skipped when absent or blank.
pub fn share_text(c: &Coordinate, address: Option<&str>) -> String {
    let mut text = String::from("📍 Current location\n");
    text.push_str(&format_coordinates(c));
    text.push('\n');
    if let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) {
        text.push_str("Address: ");
        text.push_str(address);
        text.push('\n');
    }
    text.push_str("Google Maps: ");
    text.push_str(&maps_link(c));
    text
}
