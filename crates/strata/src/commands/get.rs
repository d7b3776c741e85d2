//! Get command implementation

use anyhow::Result;
use strata_config::ConfigValue;
use strata_system_runtime::NativeRuntime;

use super::sources::{SourceArgs, load};

/// Print the value at `path`: strings bare, anything else as compact JSON.
pub fn execute(sources: &SourceArgs, path: &str) -> Result<()> {
    let runtime = NativeRuntime::new();
    let config = load(sources, &runtime)?;
    let value = config.at_path(path)?.resolve()?;
    println!("{}", render(&value)?);
    Ok(())
}

pub fn render(value: &ConfigValue) -> Result<String> {
    match value {
        ConfigValue::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}
