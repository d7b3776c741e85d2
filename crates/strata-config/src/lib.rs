//! Hierarchical configuration with override stacks and multi-source merging.
//!
//! A [`Configuration`] is a tree of named nodes. Any node can be given a
//! value, have values pushed on top of it as overrides, or load a source
//! (mapping, INI file, YAML file, environment variable); reading any node
//! composes the current state of the whole tree, so every handle already
//! obtained sees later changes.
//!
//! # Key Features
//!
//! - **Identity-stable navigation**: `config.child("a")` returns the same node every time
//! - **Override stacks**: `push_override` / `reset_override` per node, later pushes win
//! - **Deep merge**: loaders merge into what is already there instead of replacing it
//! - **Cross-tree links**: a node can be overridden by a node of another tree
//!   and follows it from then on
//! - **Associativity**: `(a <> b) <> c == a <> (b <> c)` for the merge engine
//!
//! # Example
//!
//! ```rust
//! use strata_config::{ConfigValue, Configuration};
//!
//! let config = Configuration::new("config");
//! let timeout = config.at_path("server.timeout").unwrap();
//!
//! config.from_dict(ConfigValue::from(serde_json::json!({
//!     "server": {"host": "localhost", "timeout": 30}
//! })));
//! assert_eq!(timeout.resolve().unwrap(), ConfigValue::Integer(30));
//!
//! let handle = config.push_override(ConfigValue::from(serde_json::json!({
//!     "server": {"timeout": 5}
//! })));
//! assert_eq!(timeout.resolve().unwrap(), ConfigValue::Integer(5));
//!
//! handle.release();
//! assert_eq!(timeout.resolve().unwrap(), ConfigValue::Integer(30));
//! ```

mod convert;
mod copy;
pub mod ini;
mod interpolate;
mod loaders;
mod materialize;
mod merge;
mod node;
mod provider;
mod types;

pub use types::{ConfigError, ConfigMap, ConfigValue};

pub use node::{Configuration, DEFAULT_NAME, OverrideHandle};

pub use copy::CopyMemo;

pub use merge::{deep_merge, merge_layers, merge_onto, merge_optional};

pub use materialize::MaterializeOptions;

pub use interpolate::{interpolate, interpolate_value};

pub use provider::Provider;

#[cfg(feature = "yaml")]
pub use convert::config_value_from_yaml;

// Re-export for convenience
pub use strata_system_runtime::{InMemoryRuntime, NativeRuntime, SystemRuntime};
