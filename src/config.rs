//! Engine configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Optimizer configuration.
    pub optimizer: OptimizerConfig,
}

impl EngineConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid engine configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

/// Optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Whether IN filters with literal candidates are rewritten to hash lookups.
    pub enable_hash_in: bool,
    /// Maximum number of passes over the rule list before stopping.
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enable_hash_in: true,
            max_passes: 8,
        }
    }
}

impl OptimizerConfig {
    pub fn with_hash_in(mut self, enable: bool) -> Self {
        self.enable_hash_in = enable;
        self
    }

    pub fn with_max_passes(mut self, max: usize) -> Self {
        self.max_passes = max;
        self
    }
}
