//! Output collection: the second phase of output resolution.
//!
//! Composition registers a collector per output it wants written back. After
//! the stack is applied the caller reads the stack outputs and runs a single
//! collection pass, which writes each resolved value into the target.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{CollectorError, TemplateError};

/// Resolved stack outputs, by output name.
pub type StackOutputs = BTreeMap<String, String>;

/// A write-back invoked with the resolved output value.
pub type Collector<T> = fn(&mut T, &str) -> Result<(), CollectorError>;

/// Collectors registered against output names.
pub struct OutputCollectors<T> {
    collectors: BTreeMap<String, Collector<T>>,
}

impl<T> Default for OutputCollectors<T> {
    fn default() -> Self {
        Self {
            collectors: BTreeMap::new(),
        }
    }
}

impl<T> std::fmt::Debug for OutputCollectors<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.collectors.keys()).finish()
    }
}

impl<T> OutputCollectors<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector for an output. Each output has at most one.
    pub fn register(
        &mut self,
        output: impl Into<String>,
        collector: Collector<T>,
    ) -> Result<(), TemplateError> {
        let output = output.into();
        if self.collectors.contains_key(&output) {
            return Err(TemplateError::DuplicateOutput(output));
        }
        self.collectors.insert(output, collector);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Names of the outputs that will be collected.
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.collectors.keys().map(String::as_str)
    }

    /// Run every collector against the resolved stack outputs.
    ///
    /// All outputs are checked before any collector runs, so a missing value
    /// leaves the target untouched. Consumes the registry: each collector
    /// runs at most once.
    pub fn collect(self, target: &mut T, outputs: &StackOutputs) -> Result<usize, TemplateError> {
        if let Some(missing) = self.outputs().find(|name| !outputs.contains_key(*name)) {
            return Err(TemplateError::UnresolvedOutput(missing.to_string()));
        }

        let count = self.collectors.len();
        for (output, collector) in self.collectors {
            let value = &outputs[&output];
            collector(target, value).map_err(|source| TemplateError::Collector {
                output: output.clone(),
                source,
            })?;
            debug!(output = %output, "collected output");
        }

        Ok(count)
    }
}
