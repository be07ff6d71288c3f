//! Variable bindings: shared storage handles and change callbacks.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Callback invoked with the new value when a parameter changes.
pub type ChangeFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Clonable shared storage for a reconfigurable variable.
///
/// The caller and the registry each hold a handle onto the same slot, so
/// there is no borrowed-pointer lifetime to manage: dropping either side is
/// always safe. Reads and writes go through [`get`](Self::get) and
/// [`set`](Self::set).
pub struct SharedVar<T> {
    slot: Arc<Mutex<T>>,
}

impl<T: Clone> SharedVar<T> {
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn get(&self) -> T {
        self.slot.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.slot.lock() = value;
    }
}

impl<T> Clone for SharedVar<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedVar").field(&*self.slot.lock()).finish()
    }
}

impl<T: Default + Clone> Default for SharedVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// How a change is applied to a registered parameter.
///
/// Exactly one mode per parameter: either the registry writes into a
/// [`SharedVar`] slot, or it invokes a callback with the new value. For the
/// callback mode, `current` records the last applied value (initially the
/// value supplied at registration) so snapshots can report it.
pub enum Binding<T> {
    Var(SharedVar<T>),
    Callback { current: T, on_change: ChangeFn<T> },
}

impl<T: Clone> Binding<T> {
    /// Bind to a shared storage slot.
    pub fn var(var: &SharedVar<T>) -> Self {
        Self::Var(var.clone())
    }

    /// Bind to a change callback, reporting `initial` until the first change.
    pub fn callback(initial: T, on_change: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::Callback {
            current: initial,
            on_change: Arc::new(on_change),
        }
    }

    /// The value the binding currently reflects.
    pub(crate) fn current(&self) -> T {
        match self {
            Self::Var(var) => var.get(),
            Self::Callback { current, .. } => current.clone(),
        }
    }
}

impl<T: Clone> From<&SharedVar<T>> for Binding<T> {
    fn from(var: &SharedVar<T>) -> Self {
        Self::Var(var.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(var) => f.debug_tuple("Var").field(var).finish(),
            Self::Callback { current, .. } => {
                f.debug_struct("Callback").field("current", current).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_var_is_shared() {
        let a = SharedVar::new(1i64);
        let b = a.clone();
        b.set(5);
        assert_eq!(a.get(), 5);
    }

    #[test]
    fn test_callback_binding_tracks_current() {
        let binding = Binding::callback(3i64, |_| {});
        assert_eq!(binding.current(), 3);
    }

    #[test]
    fn test_var_binding_reads_live_storage() {
        let var = SharedVar::new(false);
        let binding = Binding::var(&var);
        var.set(true);
        assert!(binding.current());
    }
}
