use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::render::{RenderMode, SchemaPolicy, TableRenderer};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub fetch: FetchConfig,
    pub trigger: TriggerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub schema: SchemaPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Base for relative fetch targets such as `/api/v1/products`.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub control_id: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("tablecast/", env!("CARGO_PKG_VERSION")).to_string(),
            base_url: None,
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            control_id: "list".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RenderConfig {
    pub fn renderer(&self) -> TableRenderer {
        TableRenderer::new(self.mode, self.schema)
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&text)
    }
}
