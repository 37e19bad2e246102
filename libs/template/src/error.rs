//! Error types for template assembly and output collection.

use thiserror::Error;

/// Errors raised while building a template or collecting its outputs.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A resource with this logical name is already registered.
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    /// The logical name cannot be used in a template.
    #[error("invalid logical name '{name}': {reason}")]
    InvalidLogicalName { name: String, reason: String },

    /// An output with this name is already defined.
    #[error("duplicate output: {0}")]
    DuplicateOutput(String),

    /// A reference points at a resource that was never registered.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// An attribute reference is not of the form `Resource.Attribute`.
    #[error("invalid attribute reference: {0}")]
    InvalidAttribute(String),

    /// A collected output has no value in the stack outputs.
    #[error("output not resolved: {0}")]
    UnresolvedOutput(String),

    /// A collector rejected the resolved value.
    #[error("collecting output {output}: {source}")]
    Collector {
        output: String,
        #[source]
        source: CollectorError,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::Serialization(err.to_string())
    }
}

/// Error returned by a collector write-back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CollectorError(String);

impl CollectorError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
