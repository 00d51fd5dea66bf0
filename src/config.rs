use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::layout::{ForceConfig, SimulationConfig, ViewportConfig};

/// Tunables for the layout engine and viewport. Every field is optional in
/// the JSON form; omitted values keep their defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub forces: ForceConfig,
    pub simulation: SimulationConfig,
    pub viewport: ViewportConfig,
}

impl LayoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("failed to parse layout config {}", path.display()))?;
        info!(path = %path.display(), "layout config loaded");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid layout config JSON")
    }
}
