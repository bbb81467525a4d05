//! Remote dataset fetcher for the GeoJSON exports.

use anyhow::{Context, Result};
use geo_types::LineString;
use reqwest::Client;
use tracing::info;

use super::geojson::{self, FeatureCollection};
use crate::models::{GridNode, Pipeline};

/// SciGRID_gas nodes export (points with country codes).
pub const NODES_URL: &str =
    "https://tubcloud.tu-berlin.de/s/8SMwwWQyn6GiPez/download/scigrid-gas-nodes.geojson";

/// SciGRID_gas pipelines export (lines with capacity/pressure ratings).
pub const PIPELINES_URL: &str =
    "https://tubcloud.tu-berlin.de/s/fF6KKpWtJyS3BmD/download/scigrid-gas-pipelines.geojson";

/// Natural Earth 1:110m country polygons, drawn as the basemap.
pub const COUNTRIES_URL: &str =
    "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_110m_admin_0_countries.geojson";

/// Fetches and decodes the remote datasets.
pub struct DatasetFetcher {
    client: Client,
}

impl DatasetFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Alder/0.1 (gas network analysis)")
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn fetch_collection(&self, url: &str) -> Result<FeatureCollection> {
        info!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Dataset request failed with status {}: {}",
                response.status(),
                url
            );
        }

        response
            .json::<FeatureCollection>()
            .await
            .with_context(|| format!("Failed to decode GeoJSON from {}", url))
    }

    /// Fetch and decode the nodes dataset.
    pub async fn fetch_nodes(&self, url: &str) -> Result<Vec<GridNode>> {
        let collection = self.fetch_collection(url).await?;
        let nodes = geojson::parse_nodes(collection)?;
        info!("Loaded {} nodes", nodes.len());
        Ok(nodes)
    }

    /// Fetch and decode the pipelines dataset.
    pub async fn fetch_pipelines(&self, url: &str) -> Result<Vec<Pipeline>> {
        let collection = self.fetch_collection(url).await?;
        let pipelines = geojson::parse_pipelines(collection)?;
        info!("Loaded {} pipelines", pipelines.len());
        Ok(pipelines)
    }

    /// Fetch and decode country outlines for the basemap layer.
    pub async fn fetch_country_outlines(&self, url: &str) -> Result<Vec<LineString<f64>>> {
        let collection = self.fetch_collection(url).await?;
        let outlines = geojson::parse_country_outlines(collection)?;
        info!("Loaded {} country outline rings", outlines.len());
        Ok(outlines)
    }
}

impl Default for DatasetFetcher {
    fn default() -> Self {
        Self::new()
    }
}
