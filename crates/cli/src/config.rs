//! Configuration file support for runs

use anyhow::{Context, Result};
use propdedup_core::{DedupPolicy, EngineConfig, SplitBoundary};
use propdedup_formats::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Sort modes 1-4 output by key instead of insertion order
    pub sorted: bool,
}

/// Split-merge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub boundary: SplitBoundary,
    pub ingest_policy: DedupPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            boundary: SplitBoundary::Full,
            ingest_policy: DedupPolicy::KeepFirst,
        }
    }
}

impl RunConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Apply command-line overrides on top of the file settings
    pub fn with_overrides(
        mut self,
        format: Option<OutputFormat>,
        sorted: bool,
        legacy_boundary: bool,
    ) -> Self {
        if let Some(format) = format {
            self.output.format = format;
        }
        if sorted {
            self.output.sorted = true;
        }
        if legacy_boundary {
            self.pipeline.boundary = SplitBoundary::Legacy;
        }
        self
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            split_boundary: self.pipeline.boundary,
            split_ingest_policy: self.pipeline.ingest_policy,
        }
    }
}

#[cfg(test)]
impl RunConfig {
    fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                    extension
                ))
            }
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
