//! clusterform (cform) - compose IAM stacks for a managed cluster
//!
//! Reads a cluster config, decides which IAM resources each stack must create
//! or reuse, and prints the resulting templates with the stack capabilities
//! they require. After the stacks are applied, `cform collect` records the
//! created role ARNs back into the config.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod plan;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json());

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
