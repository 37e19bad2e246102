//! IAM sections of the cluster configuration.
//!
//! Empty strings mean "not supplied", matching the configuration file format.

use serde::{Deserialize, Serialize};

/// Cluster-level IAM settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIam {
    /// Existing control-plane service role; when set no role is created.
    #[serde(rename = "serviceRoleARN", default, skip_serializing_if = "String::is_empty")]
    pub service_role_arn: String,
}

/// Node-group-level IAM settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupIam {
    /// Existing instance profile to launch nodes with.
    #[serde(rename = "instanceProfileARN", default, skip_serializing_if = "String::is_empty")]
    pub instance_profile_arn: String,

    /// Existing instance role; written back after a role is created.
    #[serde(rename = "instanceRoleARN", default, skip_serializing_if = "String::is_empty")]
    pub instance_role_arn: String,

    /// Explicit name for a created instance role.
    #[serde(rename = "instanceRoleName", default, skip_serializing_if = "String::is_empty")]
    pub instance_role_name: String,

    /// Managed policies attached to a created instance role.
    #[serde(rename = "attachPolicyARNs", default, skip_serializing_if = "Vec::is_empty")]
    pub attach_policy_arns: Vec<String>,

    #[serde(rename = "withAddonPolicies", default)]
    pub with_addon_policies: AddonPolicies,
}

/// Optional permission bundles for a created instance role.
///
/// Each toggle is tri-state; only an explicit `true` enables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonPolicies {
    #[serde(rename = "autoScaler", default, skip_serializing_if = "Option::is_none")]
    pub auto_scaler: Option<bool>,

    #[serde(rename = "externalDNS", default, skip_serializing_if = "Option::is_none")]
    pub external_dns: Option<bool>,

    #[serde(rename = "imageBuilder", default, skip_serializing_if = "Option::is_none")]
    pub image_builder: Option<bool>,
}

impl AddonPolicies {
    pub fn auto_scaler_enabled(&self) -> bool {
        self.auto_scaler == Some(true)
    }

    pub fn external_dns_enabled(&self) -> bool {
        self.external_dns == Some(true)
    }

    pub fn image_builder_enabled(&self) -> bool {
        self.image_builder == Some(true)
    }

    /// Returns true if any toggle is explicitly enabled.
    pub fn any_enabled(&self) -> bool {
        self.auto_scaler_enabled() || self.external_dns_enabled() || self.image_builder_enabled()
    }
}
