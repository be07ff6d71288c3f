//! Parameter type tags, bounds, and the per-type group routing trait.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigDescription, ParamDescriptor, ParamEntry};
use crate::registry::{ParamTable, RegisteredParam};

/// The type of a registered parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "bool")]
    Bool,
}

/// Inclusive value range attached to a numeric parameter descriptor.
///
/// Bounds are presentational metadata for the consuming UI; they are never
/// enforced on writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// An enumerated label→value mapping recorded for descriptor presentation.
///
/// The mapping is ordered so descriptor generation is deterministic. Like
/// bounds, it is never enforced: out-of-dict values are accepted on set.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDict<T> {
    pub choices: BTreeMap<String, T>,
    pub description: String,
}

impl<T: Serialize> EnumDict<T> {
    /// String-encode the mapping for the descriptor's `edit_method` field.
    pub(crate) fn to_edit_method(&self) -> String {
        let choices: Vec<_> = self
            .choices
            .iter()
            .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
            .collect();
        serde_json::json!({
            "enum_description": self.description,
            "enum": choices,
        })
        .to_string()
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
}

/// A value type the registry can hold: `i64`, `f64`, or `bool`.
///
/// Routes each value type to its registration-ordered group in the table and
/// to its section of the [`Config`]/[`ConfigDescription`] documents.
pub trait ConfigType:
    sealed::Sealed
    + Clone
    + PartialEq
    + std::fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    const TYPE: ParamType;

    /// Bounds applied when registration does not specify any.
    fn default_bounds() -> Option<Bounds<Self>>;

    #[doc(hidden)]
    fn group(table: &ParamTable) -> &[RegisteredParam<Self>];
    #[doc(hidden)]
    fn group_mut(table: &mut ParamTable) -> &mut Vec<RegisteredParam<Self>>;
    #[doc(hidden)]
    fn entries(config: &Config) -> &[ParamEntry<Self>];
    #[doc(hidden)]
    fn entries_mut(config: &mut Config) -> &mut Vec<ParamEntry<Self>>;
    #[doc(hidden)]
    fn descriptors_mut(description: &mut ConfigDescription) -> &mut Vec<ParamDescriptor<Self>>;
}

/// Numeric subset of [`ConfigType`]: parameters that carry bounds and may be
/// enumerated.
pub trait NumericConfigType: ConfigType + PartialOrd {}

impl NumericConfigType for i64 {}
impl NumericConfigType for f64 {}

macro_rules! impl_config_type {
    ($ty:ty, $tag:expr, $field:ident, $bounds:expr) => {
        impl ConfigType for $ty {
            const TYPE: ParamType = $tag;

            fn default_bounds() -> Option<Bounds<Self>> {
                $bounds
            }

            fn group(table: &ParamTable) -> &[RegisteredParam<Self>] {
                &table.$field
            }

            fn group_mut(table: &mut ParamTable) -> &mut Vec<RegisteredParam<Self>> {
                &mut table.$field
            }

            fn entries(config: &Config) -> &[ParamEntry<Self>] {
                &config.$field
            }

            fn entries_mut(config: &mut Config) -> &mut Vec<ParamEntry<Self>> {
                &mut config.$field
            }

            fn descriptors_mut(
                description: &mut ConfigDescription,
            ) -> &mut Vec<ParamDescriptor<Self>> {
                &mut description.$field
            }
        }
    };
}

impl_config_type!(i64, ParamType::Int, ints, Some(Bounds::new(-100, 100)));
impl_config_type!(f64, ParamType::Double, doubles, Some(Bounds::new(-100.0, 100.0)));
impl_config_type!(bool, ParamType::Bool, bools, None);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_display() {
        assert_eq!(ParamType::Int.to_string(), "int");
        assert_eq!(ParamType::Double.to_string(), "double");
        assert_eq!(ParamType::Bool.to_string(), "bool");
    }

    #[test]
    fn test_default_bounds() {
        assert_eq!(i64::default_bounds(), Some(Bounds::new(-100, 100)));
        assert_eq!(f64::default_bounds(), Some(Bounds::new(-100.0, 100.0)));
        assert_eq!(bool::default_bounds(), None);
    }

    #[test]
    fn test_edit_method_is_deterministic() {
        let dict = EnumDict {
            choices: BTreeMap::from([("slow".to_string(), 0i64), ("fast".to_string(), 1)]),
            description: "speed modes".to_string(),
        };
        let encoded = dict.to_edit_method();
        // BTreeMap iterates sorted by label
        assert!(encoded.find("fast").unwrap() < encoded.find("slow").unwrap());
        assert!(encoded.contains("speed modes"));
        assert_eq!(encoded, dict.to_edit_method());
    }
}
