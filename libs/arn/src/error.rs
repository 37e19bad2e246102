//! Error types for ARN parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating ARNs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArnError {
    /// The ARN string is empty.
    #[error("ARN cannot be empty")]
    Empty,

    /// The string does not start with `arn:`.
    #[error("ARN missing 'arn:' prefix: '{0}'")]
    MissingPrefix(String),

    /// The partition is not one clusterform knows how to target.
    #[error("unknown ARN partition: '{0}'")]
    InvalidPartition(String),

    /// The ARN belongs to a different service.
    #[error("wrong ARN service: expected '{expected}', got '{actual}'")]
    WrongService {
        expected: &'static str,
        actual: String,
    },

    /// The resource portion names a different resource type.
    #[error("wrong ARN resource type: expected '{expected}/...', got '{actual}'")]
    WrongResourceType {
        expected: &'static str,
        actual: String,
    },

    /// The account ID is not twelve digits (or `aws` for managed policies).
    #[error("invalid ARN account: '{0}'")]
    InvalidAccount(String),

    /// The ARN format is invalid.
    #[error("invalid ARN format: {message}")]
    InvalidFormat { message: String },
}

impl ArnError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, ArnError::Empty)
    }

    /// Returns true if the ARN was well-formed but named the wrong kind of resource.
    pub fn is_kind_mismatch(&self) -> bool {
        matches!(
            self,
            ArnError::WrongService { .. } | ArnError::WrongResourceType { .. }
        )
    }
}
