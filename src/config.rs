use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub http_json: Option<HttpJsonConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    pub input_dir: String,
    pub output_dir: String,
    #[serde(default = "default_create_dirs")]
    pub create_dirs: bool,
}

#[derive(Debug, Deserialize)]
pub struct HttpJsonConfig {
    pub url: String,
    pub dataset: String,
}

fn default_create_dirs() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
