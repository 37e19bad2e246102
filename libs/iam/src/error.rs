//! Error types for IAM composition.

use clusterform_arn::ArnError;
use clusterform_template::TemplateError;
use thiserror::Error;

/// Errors that abandon an IAM composition.
#[derive(Debug, Error)]
pub enum IamError {
    /// Resource registration or output binding failed in the template builder.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A configured ARN does not parse as the expected IAM resource.
    #[error("invalid {field}: {source}")]
    InvalidArn {
        field: &'static str,
        #[source]
        source: ArnError,
    },

    /// Fields for more than one identity source were supplied.
    #[error("conflicting IAM settings: {0}")]
    ConflictingIdentity(String),

    /// The explicit instance role name is not a valid IAM role name.
    #[error("invalid instance role name '{name}': {reason}")]
    InvalidRoleName { name: String, reason: &'static str },

    /// The resource set was already composed in this invocation.
    #[error("IAM resources already composed for {0}")]
    AlreadyComposed(String),

    /// The node group's role is hidden behind an externally supplied instance profile.
    #[error("instance role ARN of node group {0} is unknown: it uses an externally supplied instance profile")]
    InstanceRoleUnknown(String),
}

impl IamError {
    pub(crate) fn invalid_arn(field: &'static str) -> impl FnOnce(ArnError) -> Self {
        move |source| IamError::InvalidArn { field, source }
    }

    /// Returns true if the error comes from the operator's configuration
    /// rather than from template assembly.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            IamError::InvalidArn { .. }
                | IamError::ConflictingIdentity(_)
                | IamError::InvalidRoleName { .. }
        )
    }
}
