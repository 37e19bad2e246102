//! Template values: literals and intrinsic-function references.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Pseudo parameter holding the stack name.
pub const STACK_NAME: &str = "${AWS::StackName}";

/// A value placed in a resource property or output.
///
/// Only [`Value::Literal`] is known at composition time; every other variant
/// is resolved by the provider when the stack is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A plain string.
    Literal(String),

    /// `{"Ref": name}` to a registered resource.
    Ref(String),

    /// `{"Fn::GetAtt": [resource, attribute]}`.
    GetAtt { resource: String, attribute: String },

    /// `{"Fn::Sub": template}` with `${...}` substitutions.
    Sub(String),
}

impl Value {
    pub fn literal(s: impl Into<String>) -> Self {
        Value::Literal(s.into())
    }

    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Value::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// A name prefixed with the stack name, e.g. `${AWS::StackName}-PolicyNLB`.
    pub fn stack_scoped(name: &str) -> Self {
        Value::Sub(format!("{}-{}", STACK_NAME, name))
    }

    /// Returns true if the value is known without applying the stack.
    pub fn is_literal(&self) -> bool {
        matches!(self, Value::Literal(_))
    }

    /// Returns the literal string, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the logical name of the resource this value points at, if any.
    pub fn referenced_resource(&self) -> Option<&str> {
        match self {
            Value::Ref(name) => Some(name),
            Value::GetAtt { resource, .. } => Some(resource),
            Value::Literal(_) | Value::Sub(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Literal(s)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Literal(s) => f.write_str(s),
            Value::Ref(name) => write!(f, "!Ref {}", name),
            Value::GetAtt {
                resource,
                attribute,
            } => write!(f, "!GetAtt {}.{}", resource, attribute),
            Value::Sub(s) => write!(f, "!Sub {}", s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Literal(s) => serializer.serialize_str(s),
            Value::Ref(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", name)?;
                map.end()
            }
            Value::GetAtt {
                resource,
                attribute,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[resource, attribute])?;
                map.end()
            }
            Value::Sub(s) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", s)?;
                map.end()
            }
        }
    }
}
