//! Parsing IAM settings into the identity source a stack will use.
//!
//! The node group settings allow three mutually exclusive shapes. They are
//! parsed once into [`NodeGroupIdentity`], and the composer matches on the
//! variant instead of re-inspecting string fields.

use clusterform_arn::{InstanceProfileArn, PolicyArn, RoleArn};
use serde::Serialize;

use crate::api::{AddonPolicies, ClusterIam, NodeGroupIam};
use crate::IamError;

/// Longest IAM role name accepted by the provider.
const MAX_ROLE_NAME_LEN: usize = 64;

/// Which IAM strategy composition picked for a node group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IamStrategy {
    /// Launch with an operator-supplied instance profile.
    ReuseProfile,
    /// Wrap an operator-supplied role in a new instance profile.
    ReuseRole,
    /// Create the role and instance profile.
    CreateRole,
}

impl std::fmt::Display for IamStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IamStrategy::ReuseProfile => "reuse-profile",
            IamStrategy::ReuseRole => "reuse-role",
            IamStrategy::CreateRole => "create-role",
        };
        f.write_str(s)
    }
}

/// Settings for a role composition creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRole {
    /// Literal role name; `None` lets the provider derive one.
    pub role_name: Option<String>,
    /// Configured managed policies, possibly empty.
    pub attach_policy_arns: Vec<PolicyArn>,
    pub addons: AddonPolicies,
}

/// Where a node group's instance identity comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeGroupIdentity {
    ExternalProfile(InstanceProfileArn),
    ExternalRole(RoleArn),
    Managed(ManagedRole),
}

impl NodeGroupIdentity {
    /// Parse node group IAM settings.
    ///
    /// An instance profile excludes every role setting, the policy list and
    /// enabled add-ons. A role ARN may sit
    /// next to a role name and policy list: that is the shape a completed
    /// write-back leaves behind, and the ARN wins.
    pub fn from_spec(spec: &NodeGroupIam) -> Result<Self, IamError> {
        if !spec.instance_profile_arn.is_empty() {
            if !spec.instance_role_arn.is_empty() {
                return Err(IamError::ConflictingIdentity(
                    "instanceProfileARN and instanceRoleARN are mutually exclusive".to_string(),
                ));
            }
            if !spec.instance_role_name.is_empty() {
                return Err(IamError::ConflictingIdentity(
                    "instanceRoleName cannot be used with instanceProfileARN".to_string(),
                ));
            }
            if !spec.attach_policy_arns.is_empty() {
                return Err(IamError::ConflictingIdentity(
                    "attachPolicyARNs cannot be used with instanceProfileARN".to_string(),
                ));
            }
            if spec.with_addon_policies.any_enabled() {
                return Err(IamError::ConflictingIdentity(
                    "withAddonPolicies cannot be enabled with instanceProfileARN".to_string(),
                ));
            }

            let arn = InstanceProfileArn::parse(&spec.instance_profile_arn)
                .map_err(IamError::invalid_arn("instanceProfileARN"))?;
            return Ok(Self::ExternalProfile(arn));
        }

        if !spec.instance_role_arn.is_empty() {
            let arn = RoleArn::parse(&spec.instance_role_arn)
                .map_err(IamError::invalid_arn("instanceRoleARN"))?;
            return Ok(Self::ExternalRole(arn));
        }

        let role_name = if spec.instance_role_name.is_empty() {
            None
        } else {
            validate_role_name(&spec.instance_role_name)?;
            Some(spec.instance_role_name.clone())
        };

        let attach_policy_arns = spec
            .attach_policy_arns
            .iter()
            .map(|arn| PolicyArn::parse(arn).map_err(IamError::invalid_arn("attachPolicyARNs")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Managed(ManagedRole {
            role_name,
            attach_policy_arns,
            addons: spec.with_addon_policies,
        }))
    }

    pub fn strategy(&self) -> IamStrategy {
        match self {
            NodeGroupIdentity::ExternalProfile(_) => IamStrategy::ReuseProfile,
            NodeGroupIdentity::ExternalRole(_) => IamStrategy::ReuseRole,
            NodeGroupIdentity::Managed(_) => IamStrategy::CreateRole,
        }
    }
}

/// Parse the cluster's service role, if one was supplied.
pub fn cluster_service_role(spec: &ClusterIam) -> Result<Option<RoleArn>, IamError> {
    if spec.service_role_arn.is_empty() {
        return Ok(None);
    }
    RoleArn::parse(&spec.service_role_arn)
        .map(Some)
        .map_err(IamError::invalid_arn("serviceRoleARN"))
}

fn validate_role_name(name: &str) -> Result<(), IamError> {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c);

    let reason = if name.len() > MAX_ROLE_NAME_LEN {
        "must be at most 64 characters"
    } else if !name.chars().all(valid_char) {
        "may only contain alphanumerics and '+=,.@_-'"
    } else {
        return Ok(());
    };

    Err(IamError::InvalidRoleName {
        name: name.to_string(),
        reason,
    })
}
