//! Compose command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use clusterform_iam::RoleArnSource;

use crate::config::ClusterConfig;
use crate::output::{print_info, print_json, print_table, print_warning, OutputFormat};
use crate::plan::{self, StackRow};

use super::CommandContext;

/// Compose the IAM resources of every stack in a cluster config.
#[derive(Debug, Args)]
pub struct ComposeCommand {
    /// Path to the cluster config (YAML or TOML).
    #[arg(short = 'f', long = "file", env = "CLUSTERFORM_CONFIG")]
    file: PathBuf,
}

impl ComposeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let config = ClusterConfig::load(&self.file)?;
        let plans = plan::compose(&config)?;

        match ctx.format {
            OutputFormat::Json => print_json(&plans),
            OutputFormat::Table => {
                let rows: Vec<StackRow> = plans.iter().map(StackRow::from).collect();
                print_table(&rows);

                for p in &plans {
                    if p.role_arn == Some(RoleArnSource::Unknown) {
                        print_warning(&format!(
                            "node group {} uses an existing instance profile; its role ARN is not published",
                            p.owner
                        ));
                    }
                    for output in &p.collected_outputs {
                        print_info(&format!(
                            "{} resolves after apply; run `cform collect` to record it",
                            output
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
