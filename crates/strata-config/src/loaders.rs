//! Loading configuration sources into a node.
//!
//! Every loader builds the complete incoming value before touching the node,
//! then merges it into the node's own value in one step. A loader that fails
//! leaves the node unchanged.
//!
//! The plain loaders read through [`NativeRuntime`]; the `*_with` variants take
//! any [`SystemRuntime`], which is how tests supply files and variables
//! without touching the process environment.

use std::path::Path;

use strata_system_runtime::{NativeRuntime, SystemRuntime};
use tracing::debug;

use crate::ini::parse_ini;
use crate::interpolate::interpolate_value;
use crate::node::Configuration;
use crate::types::{ConfigError, ConfigValue};

#[cfg(not(feature = "yaml"))]
const YAML_MISSING: &str = "Unable to load yaml configuration - yaml support is not compiled in. \
     Rebuild strata-config with the \"yaml\" feature enabled";

impl Configuration {
    /// Deep-merge `value` into this node's own value.
    pub fn from_dict(&self, value: ConfigValue) {
        let keys = value.key_count();
        self.merge_value(value);
        debug!(name = %self.name(), keys, "loaded mapping");
    }

    /// Load an INI file. See [`crate::ini`] for the accepted syntax.
    pub fn from_ini(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.from_ini_with(path, &NativeRuntime::new())
    }

    pub fn from_ini_with(&self, path: impl AsRef<Path>, runtime: &dyn SystemRuntime) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = read_source(path, runtime)?;
        let sections = parse_ini(&text).map_err(|err| ConfigError::Ini {
            path: path.to_path_buf(),
            line: err.line,
            message: err.message,
        })?;
        let value = interpolate_value(ConfigValue::Map(sections), runtime);
        self.commit(value, path, "ini");
        Ok(())
    }

    /// Load a YAML file whose top level is a mapping.
    ///
    /// Placeholders are expanded in the file text before parsing, so a
    /// substituted `8080` loads as an integer.
    pub fn from_yaml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.from_yaml_with(path, &NativeRuntime::new())
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_with(&self, path: impl AsRef<Path>, runtime: &dyn SystemRuntime) -> Result<(), ConfigError> {
        use crate::convert::config_value_from_yaml;
        use crate::interpolate::interpolate;

        let path = path.as_ref();
        let text = interpolate(&read_source(path, runtime)?, runtime);
        let yaml = strata_yaml::parse_file(&text, &path.display().to_string()).map_err(|source| {
            ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let value = match config_value_from_yaml(yaml) {
            ConfigValue::Null => ConfigValue::empty_map(),
            map @ ConfigValue::Map(_) => map,
            _ => {
                return Err(ConfigError::InvalidDocument {
                    path: path.to_path_buf(),
                    message: "top level must be a mapping".to_string(),
                });
            }
        };
        self.commit(value, path, "yaml");
        Ok(())
    }

    #[cfg(not(feature = "yaml"))]
    pub fn from_yaml_with(&self, path: impl AsRef<Path>, runtime: &dyn SystemRuntime) -> Result<(), ConfigError> {
        let _ = (path, runtime);
        Err(ConfigError::Source {
            message: YAML_MISSING.to_string(),
        })
    }

    /// Set this node's value from the environment variable `name`.
    ///
    /// Falls back to `default` when the variable is unset, and to
    /// `ConfigValue::Null` when there is no default either. The value replaces
    /// the node's own value.
    pub fn from_env(&self, name: &str, default: Option<ConfigValue>) {
        self.from_env_with(name, default, &NativeRuntime::new())
    }

    pub fn from_env_with(&self, name: &str, default: Option<ConfigValue>, runtime: &dyn SystemRuntime) {
        let value = match runtime.env_lookup(name) {
            Some(value) => ConfigValue::String(value),
            None => {
                debug!(variable = name, has_default = default.is_some(), "environment variable not set");
                default.unwrap_or_default()
            }
        };
        self.update(value);
        debug!(name = %self.name(), variable = name, "loaded environment variable");
    }

    fn commit(&self, value: ConfigValue, path: &Path, format: &str) {
        let keys = value.key_count();
        self.merge_value(value);
        debug!(name = %self.name(), path = %path.display(), format, keys, "loaded configuration file");
    }
}

fn read_source(path: &Path, runtime: &dyn SystemRuntime) -> Result<String, ConfigError> {
    runtime
        .file_read_string(path)
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
}
