//! SciGRID_gas dataset acquisition and decoding.

pub mod fetcher;
pub mod geojson;

pub use fetcher::{DatasetFetcher, COUNTRIES_URL, NODES_URL, PIPELINES_URL};
pub use geojson::{parse_country_outlines, parse_nodes, parse_pipelines, FeatureCollection};
