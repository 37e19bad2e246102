//! IAM resource composition for cluster and node group stacks.
//!
//! Each stack gets a resource set. Composition decides whether the stack
//! reuses operator-supplied IAM resources or creates its own, registers the
//! roles, instance profiles and inline policies it needs, and records two
//! flags the stack provider must be told about:
//!
//! - **with_iam**: the template creates IAM resources.
//! - **with_named_iam**: the template creates IAM resources whose names the
//!   provider derives.
//!
//! # Invariants
//!
//! - Conflicting identity settings are rejected, never silently prioritized
//! - Composition runs once per resource set and does not modify its input
//! - A created node role carries exactly one container registry policy

mod api;
mod cluster;
mod document;
mod error;
mod identity;
mod nodegroup;
mod outputs;
mod policies;
mod resource_set;
mod resources;

pub use api::{AddonPolicies, ClusterIam, NodeGroupIam};
pub use cluster::{ClusterResourceSet, SERVICE_ROLE};
pub use document::{
    assume_role_policy_document, policy_document, Effect, PolicyDocument, Principal, Statement,
    ASSUME_ROLE_ACTION, POLICY_DOCUMENT_VERSION,
};
pub use error::IamError;
pub use identity::{cluster_service_role, IamStrategy, ManagedRole, NodeGroupIdentity};
pub use nodegroup::{
    NodeGroupIamOutcome, NodeGroupResourceSet, RoleArnSource, NODE_INSTANCE_PROFILE,
    NODE_INSTANCE_ROLE,
};
pub use outputs::{CLUSTER_SERVICE_ROLE_ARN, NODE_GROUP_INSTANCE_ROLE_ARN};
pub use policies::*;
pub use resource_set::{IamFlags, ResourceSet, CAPABILITY_IAM, CAPABILITY_NAMED_IAM};
pub use resources::{IamInstanceProfile, IamPolicy, IamRole};
