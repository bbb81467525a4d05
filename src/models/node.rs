//! Network node model.

use geo_types::Point;

/// A point location in the gas network (compressor station, storage site,
/// border point or hub) carrying a country code.
#[derive(Debug, Clone)]
pub struct GridNode {
    /// Dataset identifier, e.g. "INET_N_245"
    pub id: String,

    /// ISO 3166-1 alpha-2 country code, e.g. "DE"
    pub country_code: String,

    /// Node location (lon/lat, WGS84)
    pub geometry: Point<f64>,
}

impl GridNode {
    pub fn new(id: impl Into<String>, country_code: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            country_code: country_code.into(),
            geometry: Point::new(lon, lat),
        }
    }
}
