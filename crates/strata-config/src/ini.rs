//! INI reader.
//!
//! Parsing is done by `rust-ini`; this module shapes the result into a
//! two-level map `section -> key -> string`:
//!
//! ```ini
//! ; comment
//! [DEFAULT]
//! timeout = 30
//!
//! [server]
//! host: example.org
//! ```
//!
//! Keys of the `DEFAULT` section are copied into every other section unless
//! the section sets them itself; `DEFAULT` is not emitted. Keys outside any
//! section are rejected. Values are raw strings (no escape processing);
//! interpolation happens in the loader.

use ::ini::{Ini, ParseOption};

use crate::types::{ConfigMap, ConfigValue};

const DEFAULT_SECTION: &str = "DEFAULT";

/// A syntax error, with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniError {
    pub line: usize,
    pub message: String,
}

impl From<::ini::ParseError> for IniError {
    fn from(err: ::ini::ParseError) -> Self {
        Self {
            line: err.line,
            message: err.msg.to_string(),
        }
    }
}

/// Parse INI `text` into a map of sections.
pub fn parse_ini(text: &str) -> Result<ConfigMap, IniError> {
    let options = ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    };
    let document = Ini::load_from_str_opt(text, options)?;

    let mut sections: Vec<(String, ConfigMap)> = Vec::new();
    let mut defaults = ConfigMap::new();
    for (name, properties) in document.iter() {
        let entries = properties
            .iter()
            .map(|(key, value)| (key.to_string(), ConfigValue::from(value)));
        match name {
            None if properties.is_empty() => {}
            None => {
                return Err(IniError {
                    line: first_key_line(text),
                    message: "key outside of any section".to_string(),
                });
            }
            Some(DEFAULT_SECTION) => defaults.extend(entries),
            Some(name) => match sections.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, section)) => section.extend(entries),
                None => sections.push((name.to_string(), entries.collect())),
            },
        }
    }

    Ok(sections
        .into_iter()
        .map(|(name, entries)| {
            let mut section = defaults.clone();
            section.extend(entries);
            (name, ConfigValue::Map(section))
        })
        .collect())
}

/// Line of the first assignment before any section header.
fn first_key_line(text: &str) -> usize {
    text.lines()
        .position(|line| {
            let line = line.trim();
            !(line.is_empty() || line.starts_with(['#', ';']))
        })
        .map_or(1, |index| index + 1)
}
