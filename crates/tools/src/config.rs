use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use formats::{ConfigError, IngestConfig};
use gpu::RendererConfig;

/// Contents of `--config <file.json>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ingest: IngestConfig,
    pub renderer: RendererConfig,
}

impl ToolsConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: ToolsConfig = serde_json::from_str(payload)?;
        config.ingest.validate()?;
        config.renderer.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let payload = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = Self::from_json_str(&payload)
            .with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
