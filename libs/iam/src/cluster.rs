//! IAM resources for the cluster control plane stack.

use clusterform_arn::Partition;
use clusterform_template::{Template, Value};
use tracing::info;

use crate::api::ClusterIam;
use crate::document::assume_role_policy_document;
use crate::identity::cluster_service_role;
use crate::outputs::CLUSTER_SERVICE_ROLE_ARN;
use crate::policies::{
    managed_policy_arn, CLOUDWATCH_METRICS_ACTIONS, CLUSTER_SERVICE_POLICIES,
    EKS_SERVICE_PRINCIPAL, NLB_ACTIONS,
};
use crate::resource_set::{IamFlags, ResourceSet};
use crate::resources::IamRole;
use crate::IamError;

/// Logical name of the created control-plane service role.
pub const SERVICE_ROLE: &str = "ServiceRole";

/// Resource set of a cluster stack.
#[derive(Debug)]
pub struct ClusterResourceSet {
    rs: ResourceSet<ClusterIam>,
    spec: ClusterIam,
    service_role_arn: Option<Value>,
}

impl ClusterResourceSet {
    pub fn new(cluster_name: &str, partition: Partition, spec: &ClusterIam) -> Self {
        Self {
            rs: ResourceSet::new(
                cluster_name,
                partition,
                &format!("IAM resources for cluster {}", cluster_name),
            ),
            spec: spec.clone(),
            service_role_arn: None,
        }
    }

    /// Reuse the configured service role, or create one with the policies the
    /// control plane needs. The IAM flags are recorded once the last resource
    /// and output is registered.
    pub fn add_resources_for_iam(&mut self) -> Result<(), IamError> {
        if self.rs.iam().is_some() {
            return Err(IamError::AlreadyComposed(self.rs.owner().to_string()));
        }

        if let Some(role) = cluster_service_role(&self.spec)? {
            self.rs.record_iam(IamFlags::reused())?;
            info!(cluster = %self.rs.owner(), service_role = %role, "reusing cluster service role");

            self.service_role_arn = Some(Value::literal(role.to_string()));
            return Ok(());
        }

        info!(cluster = %self.rs.owner(), "creating cluster service role");

        let partition = self.rs.partition();
        let role = IamRole {
            path: None,
            role_name: None,
            assume_role_policy_document: assume_role_policy_document(EKS_SERVICE_PRINCIPAL),
            managed_policy_arns: CLUSTER_SERVICE_POLICIES
                .iter()
                .map(|name| Value::literal(managed_policy_arn(partition, name)))
                .collect(),
        };
        let ref_sr = self.rs.new_resource(SERVICE_ROLE, &role)?;

        self.rs
            .attach_allow_policy("PolicyNLB", &ref_sr, "*", &NLB_ACTIONS)?;
        self.rs.attach_allow_policy(
            "PolicyCloudWatchMetrics",
            &ref_sr,
            "*",
            &CLOUDWATCH_METRICS_ACTIONS,
        )?;

        let arn = Value::get_att(SERVICE_ROLE, "Arn");
        self.rs
            .define_output(CLUSTER_SERVICE_ROLE_ARN, arn.clone(), true)?;
        self.rs.record_iam(IamFlags::created(false))?;
        self.service_role_arn = Some(arn);
        Ok(())
    }

    /// States if IAM roles will be created or not.
    pub fn with_iam(&self) -> bool {
        self.rs.with_iam()
    }

    /// States if specifically named IAM roles will be created or not.
    pub fn with_named_iam(&self) -> bool {
        self.rs.with_named_iam()
    }

    /// The flags, once composition has run.
    pub fn iam(&self) -> Option<IamFlags> {
        self.rs.iam()
    }

    /// ARN of the control-plane service role, for the cluster resource.
    pub fn service_role_arn(&self) -> Option<&Value> {
        self.service_role_arn.as_ref()
    }

    pub fn template(&self) -> &Template {
        self.rs.template()
    }

    pub fn into_template(self) -> Template {
        self.rs.into_parts().0
    }
}
