//! Show command implementation

use anyhow::Result;
use strata_config::ConfigValue;
use strata_system_runtime::NativeRuntime;

use super::sources::{SourceArgs, load};

/// Print the resolved value at `path` (or the whole tree) as pretty JSON.
pub fn execute(sources: &SourceArgs, path: Option<&str>) -> Result<()> {
    let runtime = NativeRuntime::new();
    let config = load(sources, &runtime)?;
    let node = config.at_path(path.unwrap_or_default())?;
    println!("{}", render(&node.resolve()?)?);
    Ok(())
}

pub fn render(value: &ConfigValue) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
