//! Infrastructure template builder.
//!
//! This library assembles a CloudFormation-style template from typed resource
//! definitions. Key concepts:
//!
//! - **Resources**: registered under a unique logical name; registration
//!   returns a [`Value`] reference usable by later resources.
//! - **Outputs**: named values published by the stack. Literal outputs are
//!   known as soon as they are defined; references resolve only after apply.
//! - **Collectors**: write-back functions bound to output names, run in a
//!   single resolution pass once the stack outputs are known.
//!
//! # Invariants
//!
//! - Logical names are unique within a template
//! - Outputs may only reference resources already registered
//! - A collection pass either runs every collector or none of them

mod error;
mod fingerprint;
mod outputs;
mod template;
mod value;

pub use error::{CollectorError, TemplateError};
pub use fingerprint::TemplateFingerprint;
pub use outputs::{Collector, OutputCollectors, StackOutputs};
pub use template::{Output, Resource, Template, TemplateResource, TEMPLATE_FORMAT_VERSION};
pub use value::Value;
