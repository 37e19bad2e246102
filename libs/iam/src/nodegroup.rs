//! IAM resources for node group stacks.
//!
//! Composition reads the node group settings without modifying them and
//! returns a [`NodeGroupIamOutcome`]. The caller applies the outcome to its
//! configuration with [`NodeGroupIamOutcome::apply_to`], and after the stack
//! is applied runs the output collectors to record the created role's ARN.

use clusterform_arn::{Partition, PolicyArn, RoleArn};
use clusterform_template::{CollectorError, OutputCollectors, Template, Value};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::NodeGroupIam;
use crate::document::assume_role_policy_document;
use crate::identity::{IamStrategy, ManagedRole, NodeGroupIdentity};
use crate::outputs::NODE_GROUP_INSTANCE_ROLE_ARN;
use crate::policies::{
    hosted_zone_pattern, managed_policy_arn, AUTOSCALER_ACTIONS, DEFAULT_NODE_POLICIES,
    EC2_SERVICE_PRINCIPAL, ECR_POWER_USER_POLICY, ECR_READ_ONLY_POLICY, EXTERNAL_DNS_ACTIONS,
};
use crate::resource_set::{IamFlags, ResourceSet};
use crate::resources::{IamInstanceProfile, IamRole};
use crate::IamError;

/// Logical name of the created node instance role.
pub const NODE_INSTANCE_ROLE: &str = "NodeInstanceRole";

/// Logical name of the created node instance profile.
pub const NODE_INSTANCE_PROFILE: &str = "NodeInstanceProfile";

const IAM_PATH: &str = "/";

/// Where the node group's role ARN can be read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "value")]
pub enum RoleArnSource {
    /// Supplied by the operator and published as a known output.
    Supplied(RoleArn),

    /// Created by the stack; resolved through the named output after apply.
    Synthesized { output: String },

    /// Hidden behind an operator-supplied instance profile. Nothing can be
    /// published, and consumers needing the role must be told so.
    Unknown,
}

/// The decisions of one node group IAM composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeGroupIamOutcome {
    pub strategy: IamStrategy,
    pub flags: IamFlags,

    /// Instance profile to launch nodes with: a literal ARN, or a reference to
    /// the profile registered in the template.
    pub instance_profile: Value,

    /// Managed policies of the created role; empty unless a role was created.
    pub attach_policy_arns: Vec<String>,

    pub role_arn: RoleArnSource,
}

impl NodeGroupIamOutcome {
    /// Record the resolved policy list in the node group settings.
    ///
    /// Only a created role changes the settings; reuse leaves them as is.
    pub fn apply_to(&self, spec: &mut NodeGroupIam) {
        if self.strategy == IamStrategy::CreateRole {
            spec.attach_policy_arns = self.attach_policy_arns.clone();
        }
    }
}

/// Resource set of a node group stack.
#[derive(Debug)]
pub struct NodeGroupResourceSet {
    rs: ResourceSet<NodeGroupIam>,
    spec: NodeGroupIam,
    outcome: Option<NodeGroupIamOutcome>,
}

impl NodeGroupResourceSet {
    pub fn new(node_group: &str, partition: Partition, spec: &NodeGroupIam) -> Self {
        Self {
            rs: ResourceSet::new(
                node_group,
                partition,
                &format!("IAM resources for node group {}", node_group),
            ),
            spec: spec.clone(),
            outcome: None,
        }
    }

    /// Decide the node group's IAM strategy and register its resources.
    ///
    /// A supplied instance profile is used as is, a supplied role is wrapped in
    /// a new instance profile, and otherwise the role and profile are created.
    ///
    /// The IAM flags are recorded only once every resource and output is
    /// registered; a failed composition leaves them unset.
    pub fn add_resources_for_iam(&mut self) -> Result<&NodeGroupIamOutcome, IamError> {
        if self.rs.iam().is_some() {
            return Err(IamError::AlreadyComposed(self.rs.owner().to_string()));
        }

        let identity = NodeGroupIdentity::from_spec(&self.spec)?;
        let outcome = match identity {
            NodeGroupIdentity::ExternalProfile(profile) => {
                self.rs.record_iam(IamFlags::reused())?;
                warn!(
                    node_group = %self.rs.owner(),
                    instance_profile = %profile,
                    "instance role ARN cannot be derived from an instance profile; \
                     {} will not be published",
                    NODE_GROUP_INSTANCE_ROLE_ARN
                );

                NodeGroupIamOutcome {
                    strategy: IamStrategy::ReuseProfile,
                    flags: IamFlags::reused(),
                    instance_profile: Value::literal(profile.to_string()),
                    attach_policy_arns: Vec::new(),
                    role_arn: RoleArnSource::Unknown,
                }
            }
            NodeGroupIdentity::ExternalRole(role) => self.add_profile_for_role(role)?,
            NodeGroupIdentity::Managed(managed) => self.add_role_and_profile(managed)?,
        };

        info!(
            node_group = %self.rs.owner(),
            strategy = %outcome.strategy,
            with_iam = outcome.flags.with_iam(),
            with_named_iam = outcome.flags.with_named_iam(),
            "composed node group IAM"
        );
        Ok(&*self.outcome.insert(outcome))
    }

    fn add_profile_for_role(&mut self, role: RoleArn) -> Result<NodeGroupIamOutcome, IamError> {
        let instance_profile = self.rs.new_resource(
            NODE_INSTANCE_PROFILE,
            &IamInstanceProfile {
                path: Some(IAM_PATH.to_string()),
                roles: vec![Value::literal(role.resource_name())],
            },
        )?;
        self.rs.define_output(
            NODE_GROUP_INSTANCE_ROLE_ARN,
            Value::literal(role.to_string()),
            true,
        )?;

        let flags = IamFlags::created(false);
        self.rs.record_iam(flags)?;

        Ok(NodeGroupIamOutcome {
            strategy: IamStrategy::ReuseRole,
            flags,
            instance_profile,
            attach_policy_arns: Vec::new(),
            role_arn: RoleArnSource::Supplied(role),
        })
    }

    fn add_role_and_profile(
        &mut self,
        managed: ManagedRole,
    ) -> Result<NodeGroupIamOutcome, IamError> {
        let partition = self.rs.partition();
        let attach_policy_arns = node_policy_arns(partition, &managed);

        let role = IamRole {
            path: Some(IAM_PATH.to_string()),
            role_name: managed.role_name.clone(),
            assume_role_policy_document: assume_role_policy_document(EC2_SERVICE_PRINCIPAL),
            managed_policy_arns: attach_policy_arns
                .iter()
                .map(|arn| Value::literal(arn.as_str()))
                .collect(),
        };
        let ref_ir = self.rs.new_resource(NODE_INSTANCE_ROLE, &role)?;

        let instance_profile = self.rs.new_resource(
            NODE_INSTANCE_PROFILE,
            &IamInstanceProfile {
                path: Some(IAM_PATH.to_string()),
                roles: vec![ref_ir.clone()],
            },
        )?;

        if managed.addons.auto_scaler_enabled() {
            self.rs
                .attach_allow_policy("PolicyAutoScaling", &ref_ir, "*", &AUTOSCALER_ACTIONS)?;
        }

        if managed.addons.external_dns_enabled() {
            self.rs.attach_allow_policy(
                "PolicyExternalDNS",
                &ref_ir,
                hosted_zone_pattern(partition),
                &EXTERNAL_DNS_ACTIONS,
            )?;
        }

        self.rs.define_output_from_att(
            NODE_GROUP_INSTANCE_ROLE_ARN,
            &format!("{}.Arn", NODE_INSTANCE_ROLE),
            true,
            collect_instance_role_arn,
        )?;

        let flags = IamFlags::created(managed.role_name.is_none());
        self.rs.record_iam(flags)?;

        Ok(NodeGroupIamOutcome {
            strategy: IamStrategy::CreateRole,
            flags,
            instance_profile,
            attach_policy_arns,
            role_arn: RoleArnSource::Synthesized {
                output: NODE_GROUP_INSTANCE_ROLE_ARN.to_string(),
            },
        })
    }

    /// States if IAM roles will be created or not.
    pub fn with_iam(&self) -> bool {
        self.rs.with_iam()
    }

    /// States if specifically named IAM roles will be created or not.
    pub fn with_named_iam(&self) -> bool {
        self.rs.with_named_iam()
    }

    pub fn outcome(&self) -> Option<&NodeGroupIamOutcome> {
        self.outcome.as_ref()
    }

    /// The resolved instance profile, once composition has run.
    pub fn instance_profile(&self) -> Option<&Value> {
        self.outcome.as_ref().map(|o| &o.instance_profile)
    }

    /// The node role's ARN for consumers such as cluster authentication.
    ///
    /// Fails when the node group uses an externally supplied instance profile,
    /// since the role behind it is not known.
    pub fn instance_role_arn(&self) -> Result<Value, IamError> {
        let unknown = || IamError::InstanceRoleUnknown(self.rs.owner().to_string());
        match self.outcome.as_ref().map(|o| &o.role_arn) {
            Some(RoleArnSource::Supplied(arn)) => Ok(Value::literal(arn.to_string())),
            Some(RoleArnSource::Synthesized { .. }) => {
                Ok(Value::get_att(NODE_INSTANCE_ROLE, "Arn"))
            }
            Some(RoleArnSource::Unknown) | None => Err(unknown()),
        }
    }

    pub fn template(&self) -> &Template {
        self.rs.template()
    }

    pub fn into_parts(self) -> (Template, OutputCollectors<NodeGroupIam>) {
        self.rs.into_parts()
    }
}

/// Managed policies for a created node role.
///
/// Starts from the configured list or the defaults, then ends with exactly one
/// container registry policy: power-user when the image builder add-on is
/// enabled, read-only otherwise. Configured registry policies are dropped by
/// name, whichever partition their ARN names.
fn node_policy_arns(partition: Partition, managed: &ManagedRole) -> Vec<String> {
    let mut arns: Vec<String> = if managed.attach_policy_arns.is_empty() {
        DEFAULT_NODE_POLICIES
            .iter()
            .map(|name| managed_policy_arn(partition, name))
            .collect()
    } else {
        managed
            .attach_policy_arns
            .iter()
            .filter(|arn| !is_registry_policy(arn))
            .map(ToString::to_string)
            .collect()
    };

    let registry_policy = if managed.addons.image_builder_enabled() {
        ECR_POWER_USER_POLICY
    } else {
        ECR_READ_ONLY_POLICY
    };
    arns.push(managed_policy_arn(partition, registry_policy));
    arns
}

fn is_registry_policy(arn: &PolicyArn) -> bool {
    arn.is_aws_managed()
        && matches!(
            arn.resource_name(),
            ECR_POWER_USER_POLICY | ECR_READ_ONLY_POLICY
        )
}

/// Write the created role's ARN back into the node group settings.
fn collect_instance_role_arn(spec: &mut NodeGroupIam, value: &str) -> Result<(), CollectorError> {
    let arn = RoleArn::parse(value)
        .map_err(|e| CollectorError::new(format!("invalid instance role ARN: {}", e)))?;
    spec.instance_role_arn = arn.to_string();
    Ok(())
}
