//! Core type definitions for configuration values.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use strata_system_runtime::RuntimeError;
use thiserror::Error;

use crate::node::Configuration;

/// Mapping type used for every nested configuration map.
///
/// Insertion order is preserved; equality ignores order.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// A configuration value.
///
/// Anything stored as a node's own value or pushed onto its override stack is
/// a `ConfigValue`. The `Provider` variant links to another configuration node
/// and is replaced by that node's resolved value during resolution, so a
/// resolved value never contains it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigValue {
    /// Absent value. Unset paths resolve to this.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),

    /// Sequences are replaced wholesale when merged, never combined element-wise.
    Array(Vec<ConfigValue>),

    /// Maps merge key by key.
    Map(ConfigMap),

    /// Link to another configuration node (cross-tree linking).
    Provider(Configuration),
}

impl ConfigValue {
    /// An empty map.
    pub fn empty_map() -> Self {
        ConfigValue::Map(ConfigMap::new())
    }

    /// A map holding exactly one entry.
    pub fn singleton(key: impl Into<String>, value: ConfigValue) -> Self {
        let mut map = ConfigMap::with_capacity(1);
        map.insert(key.into(), value);
        ConfigValue::Map(map)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, ConfigValue::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ConfigValue::Array(_))
    }

    /// Check if this value is a link to another configuration node.
    pub fn is_provider(&self) -> bool {
        matches!(self, ConfigValue::Provider(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_provider(&self) -> Option<&Configuration> {
        match self {
            ConfigValue::Provider(provider) => Some(provider),
            _ => None,
        }
    }

    /// Look up a key if this is a map.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Move the value at `key` out of this map.
    ///
    /// Returns `None` when this is not a map or the key is missing.
    pub(crate) fn take_key(self, key: &str) -> Option<ConfigValue> {
        match self {
            ConfigValue::Map(mut map) => map.swap_remove(key),
            _ => None,
        }
    }

    /// Number of keys in the outermost map (0 for non-maps).
    pub fn key_count(&self) -> usize {
        self.as_map().map_or(0, |map| map.len())
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Integer(value.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        ConfigValue::Map(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(value)
    }
}

impl From<Configuration> for ConfigValue {
    fn from(value: Configuration) -> Self {
        ConfigValue::Provider(value)
    }
}

impl From<&Configuration> for ConfigValue {
    fn from(value: &Configuration) -> Self {
        ConfigValue::Provider(value.clone())
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigValue::Null, Into::into)
    }
}

// Providers serialize as their resolved value.
impl Serialize for ConfigValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(f) => serializer.serialize_f64(*f),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ConfigValue::Provider(provider) => provider
                .resolve()
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Navigation into a name reserved for the node's own interface.
    #[error("'{path}' has no attribute '{name}': names starting with '__' are reserved")]
    ReservedName {
        /// The rejected segment
        name: String,
        /// Dotted name of the node navigation started from
        path: String,
    },

    /// A configuration source cannot be used in this build.
    #[error("{message}")]
    Source { message: String },

    /// The source file could not be read.
    #[error("Unable to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Malformed INI file.
    #[error("Invalid INI file {} at line {line}: {message}", path.display())]
    Ini {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Malformed YAML file.
    #[cfg(feature = "yaml")]
    #[error("Invalid YAML file {}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: strata_yaml::Error,
    },

    /// Well-formed source whose top level is not a mapping.
    #[error("Invalid configuration document {}: {message}", path.display())]
    InvalidDocument { path: PathBuf, message: String },

    /// Configuration nesting exceeds maximum depth.
    ///
    /// Also reported when provider links form a cycle.
    #[error("Config nesting too deep (max depth: {max_depth}) at path: {}", path.join("."))]
    NestingTooDeep {
        /// Maximum allowed depth
        max_depth: usize,
        /// Path where the limit was exceeded
        path: Vec<String>,
    },
}
