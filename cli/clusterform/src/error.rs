//! Error handling and display for the CLI.

use clusterform_iam::IamError;
use clusterform_template::TemplateError;
use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid cluster config: {0}")]
    InvalidConfig(String),

    #[error("no stack outputs for node group {0}")]
    MissingStackOutputs(String),

    #[error("unknown node group in stack outputs: {0}")]
    UnknownNodeGroup(String),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = hint(err) {
        eprintln!("\n{}", format!("Hint: {}", hint).yellow());
    }
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::MissingStackOutputs(_) => {
                Some("Pass the outputs of every node group stack that created a role.")
            }
            CliError::UnknownNodeGroup(_) => {
                Some("Stack outputs are keyed by node group name; check for typos.")
            }
            CliError::InvalidConfig(_) => None,
        };
    }

    if let Some(iam_err) = err.chain().find_map(|e| e.downcast_ref::<IamError>()) {
        return match iam_err {
            IamError::ConflictingIdentity(_) => Some(
                "Set either instanceProfileARN, or instanceRoleARN/instanceRoleName, not both.",
            ),
            IamError::InvalidArn { .. } => {
                Some("ARNs look like arn:<partition>:iam::<account>:<kind>/<name>.")
            }
            IamError::InstanceRoleUnknown(_) => Some(
                "The role inside an existing instance profile is not known; map it into the cluster by hand.",
            ),
            _ => None,
        };
    }

    match err.chain().find_map(|e| e.downcast_ref::<TemplateError>()) {
        Some(TemplateError::UnresolvedOutput(_)) => {
            Some("Collect only after the stack has been applied and its outputs are available.")
        }
        _ => None,
    }
}
