//! Policy and trust document construction.

use clusterform_template::Value;
use serde::Serialize;

/// Version tag of the IAM policy language.
pub const POLICY_DOCUMENT_VERSION: &str = "2012-10-17";

/// Action that lets a principal assume a role.
pub const ASSUME_ROLE_ACTION: &str = "sts:AssumeRole";

/// Whether a statement grants or denies its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Who a trust statement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Principal {
    /// AWS service principals, e.g. `ec2.amazonaws.com`.
    Service(Vec<String>),

    /// An account or role, literal or referenced.
    #[serde(rename = "AWS")]
    Aws(Value),
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    pub action: Vec<String>,
}

impl Statement {
    /// An `Allow` statement over the given actions.
    pub fn allow<S: AsRef<str>>(actions: &[S]) -> Self {
        Self {
            effect: Effect::Allow,
            principal: None,
            resource: None,
            action: actions.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<Value>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }
}

/// A versioned policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

/// Wrap a single statement into a policy document.
pub fn policy_document(statement: Statement) -> PolicyDocument {
    PolicyDocument {
        version: POLICY_DOCUMENT_VERSION,
        statement: vec![statement],
    }
}

/// Trust document letting exactly one service principal assume the role.
///
/// `service` must be a non-empty service identifier.
pub fn assume_role_policy_document(service: &str) -> PolicyDocument {
    debug_assert!(!service.is_empty(), "service principal must not be empty");
    policy_document(
        Statement::allow(&[ASSUME_ROLE_ACTION])
            .with_principal(Principal::Service(vec![service.to_string()])),
    )
}
