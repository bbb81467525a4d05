//! GeoJSON FeatureCollection decoding for the dataset exports.
//!
//! The nodes export carries Point features, the pipelines export LineString
//! features, and the countries basemap Polygon/MultiPolygon features. Only
//! the property columns the analysis needs are decoded; everything else in
//! `properties` is ignored.

use anyhow::{bail, Result};
use geo_types::{Coord, LineString};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::models::{GridNode, Pipeline};

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Value,
}

/// Geometry variants present across the three exports.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

#[derive(Debug, Deserialize)]
struct NodeProperties {
    id: String,
    country_code: String,
}

#[derive(Debug, Deserialize)]
struct PipelineProperties {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    index: Option<i64>,
    bus0: String,
    bus1: String,
    #[serde(rename = "max_cap_M_m3_per_d")]
    max_cap_m_m3_per_d: f64,
    max_pressure_bar: f64,
    // Shipped as 0/1 in the source data
    #[serde(rename = "is_bothDirection", default, deserialize_with = "flag_from_number")]
    is_both_direction: bool,
}

impl PipelineProperties {
    /// Prefer the string id; the pipelines export sometimes only carries
    /// the numeric frame index.
    fn identifier(&self) -> String {
        match (&self.id, self.index) {
            (Some(id), _) => id.clone(),
            (None, Some(index)) => index.to_string(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// Accepts `true`/`false` as well as the dataset's 0/1 encoding.
fn flag_from_number<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().map(|x| x != 0.0).unwrap_or(false)),
        _ => Ok(false),
    }
}

fn ensure_feature_collection(collection: &FeatureCollection) -> Result<()> {
    if collection.collection_type != "FeatureCollection" {
        bail!(
            "expected a FeatureCollection, got '{}'",
            collection.collection_type
        );
    }
    Ok(())
}

fn line_from_coords(coordinates: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::new(
        coordinates
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect(),
    )
}

/// Decode the nodes export into grid nodes.
///
/// Features without a Point geometry or with unreadable properties are
/// skipped with a warning rather than failing the whole load.
pub fn parse_nodes(collection: FeatureCollection) -> Result<Vec<GridNode>> {
    ensure_feature_collection(&collection)?;

    let mut nodes = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let props: NodeProperties = match serde_json::from_value(feature.properties) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping node feature with unreadable properties: {}", e);
                continue;
            }
        };

        match feature.geometry {
            Some(Geometry::Point { coordinates }) => nodes.push(GridNode::new(
                props.id,
                props.country_code,
                coordinates[0],
                coordinates[1],
            )),
            _ => warn!("Node {} has no point geometry, skipping", props.id),
        }
    }

    Ok(nodes)
}

/// Decode the pipelines export into pipeline segments.
pub fn parse_pipelines(collection: FeatureCollection) -> Result<Vec<Pipeline>> {
    ensure_feature_collection(&collection)?;

    let mut pipelines = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let props: PipelineProperties = match serde_json::from_value(feature.properties) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping pipeline feature with unreadable properties: {}", e);
                continue;
            }
        };

        let geometry = match feature.geometry {
            Some(Geometry::LineString { coordinates }) => line_from_coords(coordinates),
            Some(Geometry::MultiLineString { mut coordinates }) if !coordinates.is_empty() => {
                // A handful of segments ship split into parts; keep the longest
                coordinates.sort_by_key(|part| part.len());
                line_from_coords(coordinates.pop().unwrap_or_default())
            }
            _ => {
                warn!(
                    "Pipeline {} has no line geometry, skipping",
                    props.identifier()
                );
                continue;
            }
        };

        pipelines.push(Pipeline {
            id: props.identifier(),
            bus0: props.bus0,
            bus1: props.bus1,
            max_cap_m_m3_per_d: props.max_cap_m_m3_per_d,
            max_pressure_bar: props.max_pressure_bar,
            is_bidirectional: props.is_both_direction,
            geometry,
        });
    }

    Ok(pipelines)
}

/// Decode a countries export into outline rings for the basemap.
///
/// Only exterior rings are kept; the outlines are drawn, not filled, so
/// holes add nothing at continental scale.
pub fn parse_country_outlines(collection: FeatureCollection) -> Result<Vec<LineString<f64>>> {
    ensure_feature_collection(&collection)?;

    let mut outlines = Vec::new();
    for feature in collection.features {
        match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                if let Some(exterior) = coordinates.into_iter().next() {
                    outlines.push(line_from_coords(exterior));
                }
            }
            Some(Geometry::MultiPolygon { coordinates }) => {
                for polygon in coordinates {
                    if let Some(exterior) = polygon.into_iter().next() {
                        outlines.push(line_from_coords(exterior));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(outlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes_fixture() -> FeatureCollection {
        serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "geometry": {"type": "Point", "coordinates": [13.4, 52.5]},
                        "properties": {"id": "N_1", "country_code": "DE"}
                    },
                    {
                        "geometry": null,
                        "properties": {"id": "N_2", "country_code": "FR"}
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_nodes_skips_missing_geometry() {
        let nodes = parse_nodes(nodes_fixture()).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "N_1");
        assert_eq!(nodes[0].country_code, "DE");
        assert_eq!(nodes[0].geometry.x(), 13.4);
    }

    #[test]
    fn test_parse_pipelines_decodes_flags_and_geometry() {
        let collection: FeatureCollection = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "geometry": {"type": "LineString", "coordinates": [[13.4, 52.5], [2.35, 48.85]]},
                        "properties": {
                            "id": "PL_1",
                            "bus0": "N_1",
                            "bus1": "N_2",
                            "max_cap_M_m3_per_d": 42.5,
                            "max_pressure_bar": 84.0,
                            "is_bothDirection": 1
                        }
                    },
                    {
                        "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
                        "properties": {
                            "index": 7,
                            "bus0": "N_2",
                            "bus1": "N_3",
                            "max_cap_M_m3_per_d": 10.0,
                            "max_pressure_bar": 50.0,
                            "is_bothDirection": 0
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let pipelines = parse_pipelines(collection).unwrap();
        assert_eq!(pipelines.len(), 2);
        assert!(pipelines[0].is_bidirectional);
        assert_eq!(pipelines[0].geometry.0.len(), 2);
        assert!(!pipelines[1].is_bidirectional);
        assert_eq!(pipelines[1].id, "7");
    }

    #[test]
    fn test_rejects_non_feature_collection() {
        let collection: FeatureCollection = serde_json::from_str(
            r#"{"type": "GeometryCollection", "features": []}"#,
        )
        .unwrap();
        assert!(parse_nodes(collection).is_err());
    }

    #[test]
    fn test_parse_country_outlines_keeps_exterior_rings() {
        let collection: FeatureCollection = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "geometry": {
                            "type": "MultiPolygon",
                            "coordinates": [
                                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                                [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]
                            ]
                        },
                        "properties": {"NAME": "Atlantis"}
                    }
                ]
            }"#,
        )
        .unwrap();

        let outlines = parse_country_outlines(collection).unwrap();
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].0.len(), 4);
    }
}
