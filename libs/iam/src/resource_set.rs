//! Per-stack resource set shared by the cluster and node group composers.

use clusterform_arn::Partition;
use clusterform_template::{Collector, OutputCollectors, Resource, Template, Value};
use serde::Serialize;
use tracing::debug;

use crate::document::{policy_document, Statement};
use crate::resources::IamPolicy;
use crate::IamError;

/// Capability needed to apply a stack that creates IAM resources.
pub const CAPABILITY_IAM: &str = "CAPABILITY_IAM";

/// Capability needed to apply a stack that creates named IAM resources.
pub const CAPABILITY_NAMED_IAM: &str = "CAPABILITY_NAMED_IAM";

/// The IAM decisions of one composition.
///
/// `with_named_iam` implies `with_iam`; the constructors are the only way to
/// build flags, so the combination `(false, true)` cannot exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IamFlags {
    with_iam: bool,
    with_named_iam: bool,
}

impl IamFlags {
    /// No IAM resources are created; operator-supplied ones are reused.
    pub const fn reused() -> Self {
        Self {
            with_iam: false,
            with_named_iam: false,
        }
    }

    /// IAM resources are created.
    pub const fn created(named: bool) -> Self {
        Self {
            with_iam: true,
            with_named_iam: named,
        }
    }

    pub const fn with_iam(&self) -> bool {
        self.with_iam
    }

    pub const fn with_named_iam(&self) -> bool {
        self.with_named_iam
    }

    /// Stack capabilities the provider must be granted to apply the template.
    pub fn capabilities(&self) -> Vec<&'static str> {
        let mut caps = Vec::new();
        if self.with_iam {
            caps.push(CAPABILITY_IAM);
        }
        if self.with_named_iam {
            caps.push(CAPABILITY_NAMED_IAM);
        }
        caps
    }
}

/// A template under construction plus the IAM decisions made for it.
///
/// `T` is the settings type output collectors write back into.
#[derive(Debug)]
pub struct ResourceSet<T> {
    owner: String,
    partition: Partition,
    template: Template,
    collectors: OutputCollectors<T>,
    iam: Option<IamFlags>,
}

impl<T> ResourceSet<T> {
    pub fn new(owner: impl Into<String>, partition: Partition, description: &str) -> Self {
        Self {
            owner: owner.into(),
            partition,
            template: Template::new().with_description(description),
            collectors: OutputCollectors::new(),
            iam: None,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// The IAM decisions, once composition has made them.
    pub fn iam(&self) -> Option<IamFlags> {
        self.iam
    }

    /// False until composition has recorded its decision.
    pub fn with_iam(&self) -> bool {
        self.iam.is_some_and(|f| f.with_iam())
    }

    /// False until composition has recorded its decision.
    pub fn with_named_iam(&self) -> bool {
        self.iam.is_some_and(|f| f.with_named_iam())
    }

    /// Record the IAM decision. It can be made once per resource set.
    pub(crate) fn record_iam(&mut self, flags: IamFlags) -> Result<(), IamError> {
        if self.iam.is_some() {
            return Err(IamError::AlreadyComposed(self.owner.clone()));
        }
        self.iam = Some(flags);
        Ok(())
    }

    pub(crate) fn new_resource<R: Resource>(
        &mut self,
        name: &str,
        resource: &R,
    ) -> Result<Value, IamError> {
        Ok(self.template.new_resource(name, resource)?)
    }

    /// Register an inline policy allowing `actions` on `resources` for a role.
    pub fn attach_allow_policy<S: AsRef<str>>(
        &mut self,
        name: &str,
        role: &Value,
        resources: impl Into<Value>,
        actions: &[S],
    ) -> Result<(), IamError> {
        let policy = IamPolicy {
            policy_name: Value::stack_scoped(name),
            roles: vec![role.clone()],
            policy_document: policy_document(Statement::allow(actions).with_resource(resources)),
        };
        self.new_resource(name, &policy)?;
        debug!(owner = %self.owner, policy = %name, role = %role, "attached allow policy");
        Ok(())
    }

    pub(crate) fn define_output(
        &mut self,
        name: &str,
        value: Value,
        export: bool,
    ) -> Result<(), IamError> {
        Ok(self.template.define_output(name, value, export)?)
    }

    /// Define an attribute output and bind a collector to it.
    pub(crate) fn define_output_from_att(
        &mut self,
        name: &str,
        att: &str,
        export: bool,
        collector: Collector<T>,
    ) -> Result<(), IamError> {
        self.template.define_output_from_att(name, att, export)?;
        self.collectors.register(name, collector)?;
        Ok(())
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn collectors(&self) -> &OutputCollectors<T> {
        &self.collectors
    }

    pub fn into_parts(self) -> (Template, OutputCollectors<T>) {
        (self.template, self.collectors)
    }
}
