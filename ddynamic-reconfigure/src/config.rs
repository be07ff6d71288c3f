//! Snapshot and descriptor documents exchanged with the transport layer.
//!
//! Both documents are plain serde types: the transport maps them onto its
//! own wire format. `Config` doubles as the set-configuration request shape,
//! where each section carries only the assignments to apply.

use serde::{Deserialize, Serialize};

use crate::types::{ConfigType, ParamType};

/// One name/value assignment in a [`Config`] document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamEntry<T> {
    pub name: String,
    pub value: T,
}

impl<T> ParamEntry<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Current values of all registered parameters, one section per type.
///
/// Sections preserve registration order. `PartialEq` compares field by
/// field, which is what the transport's change detection relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ints: Vec<ParamEntry<i64>>,
    pub doubles: Vec<ParamEntry<f64>>,
    pub bools: Vec<ParamEntry<bool>>,
}

impl Config {
    pub fn len(&self) -> usize {
        self.ints.len() + self.doubles.len() + self.bools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an assignment, for building requests.
    pub fn with<T: ConfigType>(mut self, name: impl Into<String>, value: T) -> Self {
        T::entries_mut(&mut self).push(ParamEntry::new(name, value));
        self
    }

    /// Look up a value by name within its type section.
    pub fn get<T: ConfigType>(&self, name: &str) -> Option<T> {
        T::entries(self)
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.clone())
    }
}

/// Static metadata for one registered parameter.
///
/// `min`/`max` are absent for booleans. `edit_method` holds the
/// string-encoded enum dict and is empty for non-enumerated parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor<T> {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub edit_method: String,
}

/// Descriptors for every registered parameter, one section per type, in
/// registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDescription {
    pub ints: Vec<ParamDescriptor<i64>>,
    pub doubles: Vec<ParamDescriptor<f64>>,
    pub bools: Vec<ParamDescriptor<bool>>,
}

impl ConfigDescription {
    pub fn len(&self) -> usize {
        self.ints.len() + self.doubles.len() + self.bools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
