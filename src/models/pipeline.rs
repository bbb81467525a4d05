//! Pipeline segment model.

use geo_types::LineString;

/// A pipeline segment connecting two nodes of the transmission network.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Dataset identifier, e.g. "INET_PL_102"
    pub id: String,

    /// Identifier of the start node
    pub bus0: String,

    /// Identifier of the end node
    pub bus1: String,

    /// Maximum capacity in million cubic meters per day
    pub max_cap_m_m3_per_d: f64,

    /// Maximum rated pressure in bar
    pub max_pressure_bar: f64,

    /// Whether the pipeline supports flow in both directions
    pub is_bidirectional: bool,

    /// Line geometry (lon/lat, WGS84)
    pub geometry: LineString<f64>,
}

impl Pipeline {
    /// True when both endpoints reference the same node.
    pub fn is_self_loop(&self) -> bool {
        self.bus0 == self.bus1
    }
}
