//! Configuration management.

use anyhow::{Context, Result};
use cnvs_hw::RenderSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::effects::Effect;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Render interval in milliseconds
    #[serde(default = "default_refresh")]
    pub refresh: u64,

    /// Device selection
    #[serde(default)]
    pub device: DeviceConfig,

    /// Lighting mode and colors
    #[serde(default)]
    pub lighting: RenderSettings,

    /// Built-in color source
    #[serde(default)]
    pub effect: Effect,
}

/// Device selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Serial port path or "auto" to find the CNVS by USB ID
    #[serde(default = "default_port")]
    pub port: String,
}

impl DeviceConfig {
    /// Returns the explicit port, or `None` for auto-detection.
    pub fn explicit_port(&self) -> Option<&str> {
        if self.port.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(&self.port)
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_refresh() -> u64 {
    33
}

fn default_port() -> String {
    "auto".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        if config.refresh == 0 {
            anyhow::bail!("refresh must be at least 1 ms");
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            device: DeviceConfig::default(),
            lighting: RenderSettings::default(),
            effect: Effect::default(),
        }
    }
}
