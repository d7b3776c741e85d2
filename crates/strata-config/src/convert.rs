//! Conversion from parsed documents to ConfigValue.

use crate::types::{ConfigMap, ConfigValue};

#[cfg(feature = "yaml")]
use yaml_rust2::Yaml;

/// Convert a YAML node to a `ConfigValue`.
///
/// Scalars keep their YAML type. Mapping keys that are not strings (numbers,
/// booleans) are stringified; keys that cannot be (nested collections) are
/// skipped.
#[cfg(feature = "yaml")]
pub fn config_value_from_yaml(yaml: Yaml) -> ConfigValue {
    match yaml {
        Yaml::Null | Yaml::BadValue => ConfigValue::Null,
        Yaml::Boolean(b) => ConfigValue::Bool(b),
        Yaml::Integer(i) => ConfigValue::Integer(i),
        Yaml::Real(text) => match text.parse::<f64>() {
            Ok(f) => ConfigValue::Float(f),
            Err(_) => ConfigValue::String(text),
        },
        Yaml::String(s) => ConfigValue::String(s),
        Yaml::Array(items) => ConfigValue::Array(items.into_iter().map(config_value_from_yaml).collect()),
        Yaml::Hash(entries) => {
            let mut map = ConfigMap::with_capacity(entries.len());
            for (key, value) in entries {
                if let Some(key) = yaml_key(key) {
                    map.insert(key, config_value_from_yaml(value));
                }
            }
            ConfigValue::Map(map)
        }
        // Aliases are resolved by the reader.
        Yaml::Alias(_) => ConfigValue::Null,
    }
}

#[cfg(feature = "yaml")]
fn yaml_key(key: Yaml) -> Option<String> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Some(s),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        Yaml::Null => Some("null".to_string()),
        _ => None,
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => n.as_f64().map_or(ConfigValue::Null, ConfigValue::Float),
            },
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(entries) => ConfigValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, ConfigValue::from(value)))
                    .collect(),
            ),
        }
    }
}
