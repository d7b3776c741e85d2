//! Environment variable interpolation in loaded strings.
//!
//! Recognized placeholders:
//!
//! - `${NAME}`: the value of `NAME`; left in place when unset
//! - `${NAME:fallback}`: the value of `NAME`, or `fallback` when unset

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use strata_system_runtime::SystemRuntime;
use tracing::debug;

use crate::types::ConfigValue;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").expect("valid placeholder pattern")
});

/// Replace every placeholder in `text` using `runtime`'s environment.
pub fn interpolate(text: &str, runtime: &dyn SystemRuntime) -> String {
    if !text.contains("${") {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match runtime.env_lookup(name) {
                Some(value) => value,
                None => match caps.get(2) {
                    Some(fallback) => fallback.as_str().to_string(),
                    None => {
                        debug!(variable = name, "unset variable in placeholder, left as is");
                        caps[0].to_string()
                    }
                },
            }
        })
        .into_owned()
}

/// Interpolate every string scalar inside `value`. Keys are left as they are.
pub fn interpolate_value(value: ConfigValue, runtime: &dyn SystemRuntime) -> ConfigValue {
    match value {
        ConfigValue::String(text) => ConfigValue::String(interpolate(&text, runtime)),
        ConfigValue::Map(entries) => ConfigValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, interpolate_value(value, runtime)))
                .collect(),
        ),
        ConfigValue::Array(items) => ConfigValue::Array(
            items
                .into_iter()
                .map(|item| interpolate_value(item, runtime))
                .collect(),
        ),
        other => other,
    }
}
