//! CLI commands.

mod collect;
mod compose;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// clusterform CLI - Compose IAM stacks for a managed cluster.
#[derive(Debug, Parser)]
#[command(name = "cform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table", env = "CLUSTERFORM_FORMAT")]
    format: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "CLUSTERFORM_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compose the cluster and node group stacks.
    Compose(compose::ComposeCommand),

    /// Record stack outputs back into the cluster config.
    Collect(collect::CollectCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    pub fn log_json(&self) -> bool {
        self.log_json
    }

    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let ctx = CommandContext {
            format: OutputFormat::parse(&self.format),
        };

        match self.command {
            Commands::Compose(cmd) => cmd.run(ctx),
            Commands::Collect(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("cform {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub format: OutputFormat,
}
