//! In-memory model of the CloudFormation fragment being shaped.
//!
//! The fragment is held as raw YAML mappings rather than typed resource
//! structs: shaping edits a handful of known paths and passes everything
//! else through untouched. Accessors fail fast with
//! [`AppError::MissingStructure`] when a node a rule must read or write is
//! absent; a fragment that fails mid-shaping is not usable output.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::domain::AppError;

/// A resource/output fragment, keyed by logical name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "Resources")]
    pub resources: Mapping,
    #[serde(rename = "Outputs")]
    pub outputs: Mapping,
}

impl Template {
    /// Mutable access to `Resources.<name>.Properties`.
    pub fn resource_properties_mut(&mut self, name: &str) -> Result<&mut Mapping, AppError> {
        let resource = self
            .resources
            .get_mut(name)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| AppError::missing(format!("Resources.{name}")))?;
        get_mapping_mut(resource, "Properties", &format!("Resources.{name}"))
    }

    /// Mutable access to `Outputs.<name>`.
    pub fn output_mut(&mut self, name: &str) -> Result<&mut Mapping, AppError> {
        self.outputs
            .get_mut(name)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| AppError::missing(format!("Outputs.{name}")))
    }

    /// Drop a resource. Removing an already-absent resource is not an error.
    pub fn remove_resource(&mut self, name: &str) {
        self.resources.remove(name);
    }

    /// Drop an output. Removing an already-absent output is not an error.
    pub fn remove_output(&mut self, name: &str) {
        self.outputs.remove(name);
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    /// The whole fragment as a plain YAML value, for merging or emission.
    pub fn to_value(&self) -> Result<Value, AppError> {
        Ok(serde_yaml::to_value(self)?)
    }
}

/// Mutable access to a nested mapping, failing fast when the key is absent
/// or not a mapping. `path` names the parent for the error message.
pub(crate) fn get_mapping_mut<'a>(
    parent: &'a mut Mapping,
    key: &str,
    path: &str,
) -> Result<&'a mut Mapping, AppError> {
    parent
        .get_mut(key)
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| AppError::missing(format!("{path}.{key}")))
}

/// Mutable access to a nested sequence, failing fast when absent.
pub(crate) fn get_sequence_mut<'a>(
    parent: &'a mut Mapping,
    key: &str,
    path: &str,
) -> Result<&'a mut Vec<Value>, AppError> {
    parent
        .get_mut(key)
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| AppError::missing(format!("{path}.{key}")))
}

/// Mutable access to the mapping at `items[index]`, failing fast when the
/// sequence is shorter or the element is not a mapping.
pub(crate) fn item_mapping_mut<'a>(
    items: &'a mut [Value],
    index: usize,
    path: &str,
) -> Result<&'a mut Mapping, AppError> {
    items
        .get_mut(index)
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| AppError::missing(format!("{path}[{index}]")))
}

pub(crate) fn set_value(map: &mut Mapping, key: &str, value: Value) {
    map.insert(Value::String(key.to_string()), value);
}

pub(crate) fn set_string<S: Into<String>>(map: &mut Mapping, key: &str, value: S) {
    set_value(map, key, Value::String(value.into()));
}

pub(crate) fn remove_key(map: &mut Mapping, key: &str) {
    map.remove(key);
}
