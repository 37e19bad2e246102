//! # clusterform-arn
//!
//! Typed Amazon Resource Names for the IAM objects clusterform composes.
//!
//! ## Design Principles
//!
//! - ARNs supplied by operators are parsed once, at the configuration boundary
//! - Each IAM resource kind has its own type so a profile ARN can never be
//!   passed where a role ARN is expected
//! - ARNs roundtrip through their canonical string form (parse → format → parse)
//!
//! ## ARN Format
//!
//! `arn:{partition}:{service}:{region}:{account}:{resource}`
//!
//! Examples:
//! - `arn:aws:iam::123456789012:role/eks-nodes`
//! - `arn:aws:iam::123456789012:instance-profile/eks-nodes`
//! - `arn:aws:iam::aws:policy/AmazonEKSWorkerNodePolicy`

mod error;
mod macros;
mod types;

pub use error::ArnError;
pub use types::*;
