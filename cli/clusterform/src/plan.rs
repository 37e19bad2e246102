//! Composing every stack of a cluster config and collecting their outputs.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clusterform_iam::{
    ClusterResourceSet, IamFlags, IamStrategy, NodeGroupResourceSet, RoleArnSource,
};
use clusterform_template::{StackOutputs, TemplateFingerprint};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::error::CliError;

/// Stack outputs keyed by node group name.
pub type NodeGroupOutputs = BTreeMap<String, StackOutputs>;

/// What kind of stack a plan describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackKind {
    Cluster,
    NodeGroup,
}

/// One composed stack.
#[derive(Debug, Clone, Serialize)]
pub struct StackPlan {
    pub stack_name: String,
    pub kind: StackKind,
    pub owner: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<IamStrategy>,

    pub flags: IamFlags,
    pub capabilities: Vec<&'static str>,

    /// Outputs whose values are known before the stack is applied.
    pub known_outputs: BTreeMap<String, String>,

    /// Outputs collected back into the config after apply.
    pub collected_outputs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<RoleArnSource>,

    pub fingerprint: TemplateFingerprint,
    pub template: serde_json::Value,
}

/// Table row summarizing a stack plan.
#[derive(Debug, Tabled)]
pub struct StackRow {
    #[tabled(rename = "Stack")]
    stack: String,

    #[tabled(rename = "Strategy")]
    strategy: String,

    #[tabled(rename = "IAM")]
    with_iam: bool,

    #[tabled(rename = "Named IAM")]
    with_named_iam: bool,

    #[tabled(rename = "Capabilities")]
    capabilities: String,

    #[tabled(rename = "Resources")]
    resources: usize,

    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
}

impl From<&StackPlan> for StackRow {
    fn from(plan: &StackPlan) -> Self {
        let resources = plan.template["Resources"]
            .as_object()
            .map_or(0, |r| r.len());
        Self {
            stack: plan.stack_name.clone(),
            strategy: match plan.strategy {
                Some(s) => s.to_string(),
                None if plan.flags.with_iam() => "create-role".to_string(),
                None => "reuse-role".to_string(),
            },
            with_iam: plan.flags.with_iam(),
            with_named_iam: plan.flags.with_named_iam(),
            capabilities: if plan.capabilities.is_empty() {
                "-".to_string()
            } else {
                plan.capabilities.join(",")
            },
            resources,
            fingerprint: plan.fingerprint.to_string(),
        }
    }
}

pub fn cluster_stack_name(cluster: &str) -> String {
    format!("clusterform-{}-cluster", cluster)
}

pub fn node_group_stack_name(cluster: &str, node_group: &str) -> String {
    format!("clusterform-{}-nodegroup-{}", cluster, node_group)
}

/// Compose the cluster stack and every node group stack.
pub fn compose(config: &ClusterConfig) -> Result<Vec<StackPlan>> {
    let cluster = &config.metadata.name;
    let partition = config.partition();
    let mut plans = Vec::with_capacity(config.node_groups.len() + 1);

    let mut cluster_rs = ClusterResourceSet::new(cluster, partition, &config.iam);
    cluster_rs
        .add_resources_for_iam()
        .with_context(|| format!("composing IAM for cluster {}", cluster))?;
    let flags = cluster_rs.iam().unwrap_or_default();
    let template = cluster_rs.into_template();

    plans.push(StackPlan {
        stack_name: cluster_stack_name(cluster),
        kind: StackKind::Cluster,
        owner: cluster.clone(),
        strategy: None,
        flags,
        capabilities: flags.capabilities(),
        known_outputs: template.known_outputs(),
        collected_outputs: Vec::new(),
        role_arn: None,
        fingerprint: template.fingerprint()?,
        template: template.to_json()?,
    });

    for ng in &config.node_groups {
        let mut rs = NodeGroupResourceSet::new(&ng.name, partition, &ng.iam);
        let outcome = rs
            .add_resources_for_iam()
            .with_context(|| format!("composing IAM for node group {}", ng.name))?
            .clone();
        let (template, collectors) = rs.into_parts();

        plans.push(StackPlan {
            stack_name: node_group_stack_name(cluster, &ng.name),
            kind: StackKind::NodeGroup,
            owner: ng.name.clone(),
            strategy: Some(outcome.strategy),
            flags: outcome.flags,
            capabilities: outcome.flags.capabilities(),
            known_outputs: template.known_outputs(),
            collected_outputs: collectors.outputs().map(String::from).collect(),
            role_arn: Some(outcome.role_arn),
            fingerprint: template.fingerprint()?,
            template: template.to_json()?,
        });
    }

    info!(cluster = %cluster, stacks = plans.len(), "composed cluster stacks");
    Ok(plans)
}

/// Record composition results and resolved stack outputs in the config.
///
/// Every node group is composed again, its outcome applied, and its
/// collectors run against that node group's stack outputs. Node groups that
/// bind no collected outputs need no entry in `outputs`. The config is only
/// updated if every node group succeeds. Returns the number of outputs
/// written back.
pub fn collect(config: &mut ClusterConfig, outputs: &NodeGroupOutputs) -> Result<usize> {
    if let Some(unknown) = outputs.keys().find(|name| config.node_group(name).is_none()) {
        return Err(CliError::UnknownNodeGroup(unknown.clone()).into());
    }

    let partition = config.partition();
    let empty = StackOutputs::new();
    let mut updated = config.clone();
    let mut collected = 0;

    for ng in &mut updated.node_groups {
        let mut rs = NodeGroupResourceSet::new(&ng.name, partition, &ng.iam);
        let outcome = rs
            .add_resources_for_iam()
            .with_context(|| format!("composing IAM for node group {}", ng.name))?
            .clone();
        let (_, collectors) = rs.into_parts();

        let stack_outputs = match outputs.get(&ng.name) {
            Some(o) => o,
            None if collectors.is_empty() => &empty,
            None => return Err(CliError::MissingStackOutputs(ng.name.clone()).into()),
        };

        outcome.apply_to(&mut ng.iam);
        let n = collectors
            .collect(&mut ng.iam, stack_outputs)
            .with_context(|| format!("collecting outputs for node group {}", ng.name))?;
        debug!(node_group = %ng.name, collected = n, "collected node group outputs");
        collected += n;
    }

    info!(cluster = %updated.metadata.name, collected, "collected stack outputs");
    *config = updated;
    Ok(collected)
}
