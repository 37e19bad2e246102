//! Collect command (record stack outputs in the cluster config).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{ClusterConfig, ConfigFormat};
use crate::output::{print_json, print_success, OutputFormat};
use crate::plan::{self, NodeGroupOutputs};

use super::CommandContext;

/// Record resolved stack outputs in the cluster config.
#[derive(Debug, Args)]
pub struct CollectCommand {
    /// Path to the cluster config (YAML or TOML).
    #[arg(short = 'f', long = "file", env = "CLUSTERFORM_CONFIG")]
    file: PathBuf,

    /// JSON object of stack outputs keyed by node group name.
    #[arg(long)]
    outputs: PathBuf,

    /// Write the updated config back to the config file.
    #[arg(long)]
    write: bool,
}

impl CollectCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let mut config = ClusterConfig::load(&self.file)?;
        let outputs = load_outputs(&self.outputs)?;

        let collected = plan::collect(&mut config, &outputs)?;

        if self.write {
            config.save(&self.file)?;
            print_success(&format!(
                "Recorded {} output(s) in {}",
                collected,
                self.file.display()
            ));
            return Ok(());
        }

        match ctx.format {
            OutputFormat::Json => print_json(&config),
            OutputFormat::Table => {
                print!("{}", config.to_string(ConfigFormat::from_path(&self.file))?);
            }
        }

        Ok(())
    }
}

fn load_outputs(path: &Path) -> Result<NodeGroupOutputs> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read stack outputs: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse stack outputs: {}", path.display()))
}
