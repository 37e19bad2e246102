//! The template under construction.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::fingerprint::TemplateFingerprint;
use crate::value::{Value, STACK_NAME};
use crate::TemplateError;

/// Format version stamped on every template.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Maximum length of a logical resource or output name.
const MAX_LOGICAL_NAME_LEN: usize = 255;

/// A typed resource definition.
///
/// Implementors serialize to the resource's `Properties` block.
pub trait Resource: Serialize {
    /// The resource type, e.g. `AWS::IAM::Role`.
    const TYPE: &'static str;
}

/// A registered resource: its type plus serialized properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: serde_json::Value,
}

/// A named stack output.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub value: Value,
    pub export: bool,
}

impl Output {
    /// Returns true if the value is known before the stack is applied.
    pub fn is_known(&self) -> bool {
        self.value.is_literal()
    }
}

/// An infrastructure template being assembled.
///
/// Resources and outputs are kept in name order so the serialized form is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Template {
    description: Option<String>,
    resources: BTreeMap<String, TemplateResource>,
    outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register a resource under a logical name.
    ///
    /// Returns a `Ref` to the new resource.
    pub fn new_resource<R: Resource>(
        &mut self,
        name: &str,
        resource: &R,
    ) -> Result<Value, TemplateError> {
        validate_logical_name(name)?;
        if self.resources.contains_key(name) {
            return Err(TemplateError::DuplicateResource(name.to_string()));
        }

        let properties = serde_json::to_value(resource)?;
        self.resources.insert(
            name.to_string(),
            TemplateResource {
                resource_type: R::TYPE.to_string(),
                properties,
            },
        );

        debug!(resource = %name, resource_type = R::TYPE, "registered resource");
        Ok(Value::Ref(name.to_string()))
    }

    /// Define a named output.
    ///
    /// References must point at resources already in the template.
    pub fn define_output(
        &mut self,
        name: &str,
        value: Value,
        export: bool,
    ) -> Result<(), TemplateError> {
        validate_logical_name(name)?;
        if self.outputs.contains_key(name) {
            return Err(TemplateError::DuplicateOutput(name.to_string()));
        }
        if let Some(resource) = value.referenced_resource() {
            if !self.resources.contains_key(resource) {
                return Err(TemplateError::UnknownResource(resource.to_string()));
            }
        }

        debug!(output = %name, known = value.is_literal(), export, "defined output");
        self.outputs.insert(name.to_string(), Output { value, export });
        Ok(())
    }

    /// Define an output from an attribute reference written as `Resource.Attribute`.
    pub fn define_output_from_att(
        &mut self,
        name: &str,
        att: &str,
        export: bool,
    ) -> Result<(), TemplateError> {
        let Some((resource, attribute)) = att.split_once('.') else {
            return Err(TemplateError::InvalidAttribute(att.to_string()));
        };
        if resource.is_empty() || attribute.is_empty() {
            return Err(TemplateError::InvalidAttribute(att.to_string()));
        }

        self.define_output(name, Value::get_att(resource, attribute), export)
    }

    pub fn resource(&self, name: &str) -> Option<&TemplateResource> {
        self.resources.get(name)
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Logical names of all resources, in name order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Resources of one type, in name order.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a TemplateResource)> {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
            .map(|(name, r)| (name.as_str(), r))
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Output)> {
        self.outputs.iter().map(|(name, o)| (name.as_str(), o))
    }

    /// Outputs whose values are already known, by name.
    pub fn known_outputs(&self) -> BTreeMap<String, String> {
        self.outputs
            .iter()
            .filter_map(|(name, o)| o.value.as_literal().map(|v| (name.clone(), v.to_string())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.outputs.is_empty()
    }

    /// Serialize the template to its JSON document form.
    pub fn to_json(&self) -> Result<serde_json::Value, TemplateError> {
        let mut doc = serde_json::Map::new();
        doc.insert(
            "AWSTemplateFormatVersion".to_string(),
            serde_json::json!(TEMPLATE_FORMAT_VERSION),
        );
        if let Some(description) = &self.description {
            doc.insert("Description".to_string(), serde_json::json!(description));
        }
        doc.insert(
            "Resources".to_string(),
            serde_json::to_value(&self.resources)?,
        );

        if !self.outputs.is_empty() {
            let mut outputs = serde_json::Map::new();
            for (name, output) in &self.outputs {
                let mut entry = serde_json::Map::new();
                entry.insert("Value".to_string(), serde_json::to_value(&output.value)?);
                if output.export {
                    let export_name = Value::Sub(format!("{}::{}", STACK_NAME, name));
                    entry.insert(
                        "Export".to_string(),
                        serde_json::json!({ "Name": export_name }),
                    );
                }
                outputs.insert(name.clone(), serde_json::Value::Object(entry));
            }
            doc.insert("Outputs".to_string(), serde_json::Value::Object(outputs));
        }

        Ok(serde_json::Value::Object(doc))
    }

    /// Fingerprint of the serialized template.
    pub fn fingerprint(&self) -> Result<TemplateFingerprint, TemplateError> {
        Ok(TemplateFingerprint::from_json(&self.to_json()?))
    }
}

/// Logical names must be ASCII alphanumeric and at most 255 characters.
fn validate_logical_name(name: &str) -> Result<(), TemplateError> {
    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name.len() > MAX_LOGICAL_NAME_LEN {
        "name exceeds 255 characters"
    } else if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
        "name must be ASCII alphanumeric"
    } else {
        return Ok(());
    };

    Err(TemplateError::InvalidLogicalName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}
