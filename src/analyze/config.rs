use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub basemap: Option<BasemapConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetsConfig {
    pub nodes_url: String,
    pub pipelines_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BasemapConfig {
    pub countries_url: String,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
