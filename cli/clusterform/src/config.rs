//! Cluster config files.
//!
//! The config is YAML or TOML, picked by file extension. It carries the
//! cluster's IAM settings and one IAM section per node group; `cform collect`
//! writes the same file format back out.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clusterform_arn::Partition;
use clusterform_iam::{ClusterIam, NodeGroupIam};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Region used when the config does not name one.
const DEFAULT_REGION: &str = "us-west-2";

/// On-disk format of a cluster config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension. Anything but `.toml` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Cluster config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub metadata: ClusterMeta,

    #[serde(default)]
    pub iam: ClusterIam,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_groups: Vec<NodeGroupConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMeta {
    pub name: String,

    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGroupConfig {
    pub name: String,

    #[serde(default)]
    pub iam: NodeGroupIam,
}

impl ClusterConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster config: {}", path.display()))?;
        Self::parse(&contents, ConfigFormat::from_path(path))
            .with_context(|| format!("failed to load cluster config: {}", path.display()))
    }

    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self> {
        let config: ClusterConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents).context("invalid YAML")?,
            ConfigFormat::Toml => toml::from_str(contents).context("invalid TOML")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_string(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self).context("failed to render YAML"),
            ConfigFormat::Toml => toml::to_string_pretty(self).context("failed to render TOML"),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_string(ConfigFormat::from_path(path))?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write cluster config: {}", path.display()))
    }

    pub fn partition(&self) -> Partition {
        Partition::for_region(&self.metadata.region)
    }

    pub fn node_group(&self, name: &str) -> Option<&NodeGroupConfig> {
        self.node_groups.iter().find(|ng| ng.name == name)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.metadata.name.is_empty() {
            return Err(CliError::InvalidConfig(
                "metadata.name must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for ng in &self.node_groups {
            if ng.name.is_empty() {
                return Err(CliError::InvalidConfig(
                    "node group name must not be empty".to_string(),
                ));
            }
            if !seen.insert(ng.name.as_str()) {
                return Err(CliError::InvalidConfig(format!(
                    "duplicate node group: {}",
                    ng.name
                )));
            }
        }
        Ok(())
    }
}
