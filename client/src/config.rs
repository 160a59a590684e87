use std::{fs, path::Path};

use anyhow::Context;
use liblife::ControllerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cols: usize,
    pub rows: usize,

    /// Whether the renderer colors alive cells.
    pub color: bool,

    pub controller: ControllerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: 25,
            rows: 25,
            color: true,
            controller: ControllerConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let config_serialized = fs::read(path).context("Couldn't read config")?;
        let config =
            serde_json::from_slice(&config_serialized).context("Couldn't deserialize config")?;
        Ok(config)
    }
}
