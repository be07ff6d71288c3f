//! The dynamic parameter registry.
//!
//! Holds every registered variable in registration-ordered, per-type groups
//! behind a single lock, synthesizes the descriptor and snapshot documents,
//! and applies incoming set-configuration requests. All callbacks run after
//! the lock is released, so they may re-enter the registry freely.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::binding::Binding;
use crate::config::{Config, ConfigDescription, ParamDescriptor, ParamEntry};
use crate::error::{Error, Result};
use crate::types::{Bounds, ConfigType, EnumDict, NumericConfigType};

/// Global change callback, invoked once per applied request.
pub type UserCallback = Arc<dyn Fn() + Send + Sync>;

/// A single registered variable: descriptor metadata plus its binding.
///
/// Immutable after registration except for the live value the binding
/// reflects.
pub struct RegisteredParam<T> {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) bounds: Option<Bounds<T>>,
    pub(crate) enum_dict: Option<EnumDict<T>>,
    pub(crate) binding: Binding<T>,
}

/// Registration-ordered parameter groups, one per value type.
#[derive(Default)]
pub struct ParamTable {
    pub(crate) ints: Vec<RegisteredParam<i64>>,
    pub(crate) doubles: Vec<RegisteredParam<f64>>,
    pub(crate) bools: Vec<RegisteredParam<bool>>,
}

impl ParamTable {
    fn len(&self) -> usize {
        self.ints.len() + self.doubles.len() + self.bools.len()
    }

    /// Names are unique across all groups, not just within one, because the
    /// documents flatten the groups into a single namespace for the UI.
    fn contains_name(&self, name: &str) -> bool {
        self.ints.iter().any(|p| p.name == name)
            || self.doubles.iter().any(|p| p.name == name)
            || self.bools.iter().any(|p| p.name == name)
    }
}

struct Inner {
    table: ParamTable,
    user_callback: Option<UserCallback>,
    /// Baseline snapshot for change detection.
    last_config: Option<Config>,
}

/// Registry of dynamically reconfigurable variables.
///
/// Variables are registered and exposed at run time; changes arrive either
/// through [`apply_changes`](Self::apply_changes) directly or through the
/// queue in [`crate::server`]. Modification is done through a [`SharedVar`]
/// slot or through a callback function.
///
/// [`SharedVar`]: crate::binding::SharedVar
pub struct DDynamicReconfigure {
    inner: Mutex<Inner>,
}

impl DDynamicReconfigure {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                table: ParamTable::default(),
                user_callback: None,
                last_config: None,
            }),
        }
    }

    /// Register a variable with the type's default bounds
    /// (`[-100, 100]` for numerics, none for booleans).
    pub fn register_variable<T: ConfigType>(
        &self,
        name: &str,
        binding: impl Into<Binding<T>>,
        description: &str,
    ) -> Result<()> {
        self.register_param(name, binding.into(), description, T::default_bounds(), None)
    }

    /// Register a numeric variable with explicit bounds.
    pub fn register_variable_with_bounds<T: NumericConfigType>(
        &self,
        name: &str,
        binding: impl Into<Binding<T>>,
        description: &str,
        min: T,
        max: T,
    ) -> Result<()> {
        self.register_param(name, binding.into(), description, Some(Bounds::new(min, max)), None)
    }

    /// Register a numeric variable presented as an enumeration.
    ///
    /// The dict is descriptor metadata only; values outside it are still
    /// accepted on set. Bounds become the dict's value range when the dict
    /// is non-empty.
    pub fn register_enum_variable<T: NumericConfigType>(
        &self,
        name: &str,
        binding: impl Into<Binding<T>>,
        description: &str,
        enum_dict: BTreeMap<String, T>,
        enum_description: &str,
    ) -> Result<()> {
        let bounds = enum_bounds(&enum_dict).or_else(T::default_bounds);
        let dict = EnumDict {
            choices: enum_dict,
            description: enum_description.to_string(),
        };
        self.register_param(name, binding.into(), description, bounds, Some(dict))
    }

    fn register_param<T: ConfigType>(
        &self,
        name: &str,
        binding: Binding<T>,
        description: &str,
        bounds: Option<Bounds<T>>,
        enum_dict: Option<EnumDict<T>>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let mut inner = self.inner.lock();
        if inner.table.contains_name(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        debug!("Registered {} parameter '{}'", T::TYPE, name);
        T::group_mut(&mut inner.table).push(RegisteredParam {
            name: name.to_string(),
            description: description.to_string(),
            bounds,
            enum_dict,
            binding,
        });
        Ok(())
    }

    /// Remove a variable from its group. Returns whether it was registered.
    pub fn unregister_variable(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let table = &mut inner.table;
        let before = table.len();
        table.ints.retain(|p| p.name != name);
        table.doubles.retain(|p| p.name != name);
        table.bools.retain(|p| p.name != name);
        let removed = table.len() != before;
        if removed {
            debug!("Unregistered parameter '{name}'");
        }
        removed
    }

    /// Build the static descriptor document, in registration order, one
    /// group per type. Pure read.
    pub fn generate_description(&self) -> ConfigDescription {
        let inner = self.inner.lock();
        let mut description = ConfigDescription::default();
        describe_group::<i64>(&inner.table, &mut description);
        describe_group::<f64>(&inner.table, &mut description);
        describe_group::<bool>(&inner.table, &mut description);
        description
    }

    /// Build the current-value snapshot and make it the new baseline for
    /// change detection.
    ///
    /// Slot-bound parameters are read from their live storage;
    /// callback-bound parameters report the last applied value.
    pub fn generate_snapshot(&self) -> Config {
        let mut inner = self.inner.lock();
        let config = current_config(&inner.table);
        inner.last_config = Some(config.clone());
        config
    }

    /// Return the current snapshot only if it differs from the baseline,
    /// updating the baseline when it does.
    ///
    /// Intended for the transport's periodic publisher: a `None` means the
    /// last published document is still accurate.
    pub fn poll_update(&self) -> Option<Config> {
        let mut inner = self.inner.lock();
        let config = current_config(&inner.table);
        if inner.last_config.as_ref() == Some(&config) {
            return None;
        }
        inner.last_config = Some(config.clone());
        Some(config)
    }

    /// Apply a partial set-configuration request and return the resulting
    /// snapshot (which becomes the new baseline).
    ///
    /// Assignments for unknown names are skipped with a warning. Bounds and
    /// enum membership are not validated. Change callbacks and the global
    /// user callback run synchronously on the calling thread, after the
    /// registry lock is released.
    pub fn apply_changes(&self, request: &Config) -> Config {
        let mut pending: Vec<Box<dyn FnOnce()>> = Vec::new();
        let user_callback = {
            let mut inner = self.inner.lock();
            apply_group::<i64>(&mut inner.table, request, &mut pending);
            apply_group::<f64>(&mut inner.table, request, &mut pending);
            apply_group::<bool>(&mut inner.table, request, &mut pending);
            inner.user_callback.clone()
        };
        for callback in pending {
            callback();
        }
        if let Some(callback) = user_callback {
            callback();
        }
        self.generate_snapshot()
    }

    /// Set the global callback invoked once after every applied request.
    /// At most one is active; setting replaces the previous one.
    pub fn set_user_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.inner.lock().user_callback = Some(Arc::new(callback));
    }

    pub fn clear_user_callback(&self) {
        self.inner.lock().user_callback = None;
    }
}

impl Default for DDynamicReconfigure {
    fn default() -> Self {
        Self::new()
    }
}

fn current_config(table: &ParamTable) -> Config {
    let mut config = Config::default();
    snapshot_group::<i64>(table, &mut config);
    snapshot_group::<f64>(table, &mut config);
    snapshot_group::<bool>(table, &mut config);
    config
}

fn snapshot_group<T: ConfigType>(table: &ParamTable, config: &mut Config) {
    let entries = T::entries_mut(config);
    for param in T::group(table) {
        entries.push(ParamEntry::new(param.name.clone(), param.binding.current()));
    }
}

fn describe_group<T: ConfigType>(table: &ParamTable, description: &mut ConfigDescription) {
    let descriptors = T::descriptors_mut(description);
    for param in T::group(table) {
        descriptors.push(ParamDescriptor {
            name: param.name.clone(),
            param_type: T::TYPE,
            description: param.description.clone(),
            min: param.bounds.as_ref().map(|b| b.min.clone()),
            max: param.bounds.as_ref().map(|b| b.max.clone()),
            edit_method: param
                .enum_dict
                .as_ref()
                .map(|d| d.to_edit_method())
                .unwrap_or_default(),
        });
    }
}

fn apply_group<T: ConfigType>(
    table: &mut ParamTable,
    request: &Config,
    pending: &mut Vec<Box<dyn FnOnce()>>,
) {
    for entry in T::entries(request) {
        let Some(param) = T::group_mut(table).iter_mut().find(|p| p.name == entry.name) else {
            warn!(
                "Ignoring change for unknown {} parameter '{}'",
                T::TYPE,
                entry.name
            );
            continue;
        };
        debug!("Applying {} = {:?}", entry.name, entry.value);
        match &mut param.binding {
            Binding::Var(var) => var.set(entry.value.clone()),
            Binding::Callback { current, on_change } => {
                *current = entry.value.clone();
                let callback = on_change.clone();
                let value = entry.value.clone();
                pending.push(Box::new(move || callback(value)));
            }
        }
    }
}

fn enum_bounds<T: NumericConfigType>(dict: &BTreeMap<String, T>) -> Option<Bounds<T>> {
    let mut values = dict.values();
    let first = values.next()?.clone();
    let (mut min, mut max) = (first.clone(), first);
    for value in values {
        if *value < min {
            min = value.clone();
        }
        if *value > max {
            max = value.clone();
        }
    }
    Some(Bounds::new(min, max))
}
