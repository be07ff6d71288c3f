//! Dynamically reconfigurable parameters for robotics middleware nodes.
//!
//! Variables are registered at run time — no generated configuration files —
//! and exposed through descriptor and snapshot documents that a transport
//! layer can publish over its own channels. Incoming reconfiguration
//! requests are routed back into either shared storage or user callbacks.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  DDynamicReconfigure                                       │
//! │  ├── ints / doubles / bools: Vec<RegisteredParam<T>>       │
//! │  ├── user_callback: optional global change callback        │
//! │  └── last_config: baseline snapshot for change detection   │
//! ├────────────────────────────────────────────────────────────┤
//! │  ReconfigureServer ── flume queue ── ReconfigureHandle     │
//! │  (owner thread)                      (transport thread)    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transport collaborator owns the actual network surface: it publishes
//! [`generate_description`](DDynamicReconfigure::generate_description) once,
//! polls [`poll_update`](DDynamicReconfigure::poll_update) on its own timer,
//! and forwards set-configuration requests through a [`ReconfigureHandle`].
//!
//! # Example
//!
//! ```
//! use ddynamic_reconfigure::{Binding, Config, DDynamicReconfigure, SharedVar};
//!
//! let registry = DDynamicReconfigure::new();
//!
//! let speed = SharedVar::new(0i64);
//! registry.register_variable_with_bounds("speed", Binding::var(&speed), "cruise speed", 0, 10)?;
//!
//! let snapshot = registry.apply_changes(&Config::default().with("speed", 7i64));
//! assert_eq!(speed.get(), 7);
//! assert_eq!(snapshot.get::<i64>("speed"), Some(7));
//! # Ok::<(), ddynamic_reconfigure::Error>(())
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod registry;
pub mod server;
pub mod types;

pub use binding::{Binding, ChangeFn, SharedVar};
pub use config::{Config, ConfigDescription, ParamDescriptor, ParamEntry};
pub use error::{Error, Result};
pub use registry::DDynamicReconfigure;
pub use server::{ReconfigureHandle, ReconfigureRequest, ReconfigureServer};
pub use types::{Bounds, ConfigType, EnumDict, NumericConfigType, ParamType};
