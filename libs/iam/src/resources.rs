//! IAM resource definitions registered into templates.

use clusterform_template::{Resource, Value};
use serde::Serialize;

use crate::document::PolicyDocument;

/// `AWS::IAM::Role`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,

    pub assume_role_policy_document: PolicyDocument,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Value>,
}

impl Resource for IamRole {
    const TYPE: &'static str = "AWS::IAM::Role";
}

/// `AWS::IAM::InstanceProfile`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamInstanceProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub roles: Vec<Value>,
}

impl Resource for IamInstanceProfile {
    const TYPE: &'static str = "AWS::IAM::InstanceProfile";
}

/// `AWS::IAM::Policy`, an inline policy attached to roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamPolicy {
    pub policy_name: Value,
    pub roles: Vec<Value>,
    pub policy_document: PolicyDocument,
}

impl Resource for IamPolicy {
    const TYPE: &'static str = "AWS::IAM::Policy";
}
