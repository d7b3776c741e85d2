//! Source flags shared by every command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use strata_config::{ConfigValue, Configuration, DEFAULT_NAME};
use strata_system_runtime::SystemRuntime;
use tracing::info;

/// Configuration sources, applied in the order INI, YAML, env, set.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Name of the configuration root
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// INI file to merge in (repeatable)
    #[arg(long, value_name = "FILE")]
    pub ini: Vec<PathBuf>,

    /// YAML file to merge in (repeatable)
    #[arg(long, value_name = "FILE")]
    pub yaml: Vec<PathBuf>,

    /// Set PATH from environment variable VAR (repeatable)
    #[arg(long, value_name = "PATH=VAR")]
    pub env: Vec<String>,

    /// Merge a JSON value in at PATH (repeatable); non-JSON text is taken as a string
    #[arg(long, value_name = "PATH=JSON")]
    pub set: Vec<String>,
}

/// Build a configuration tree from `args`.
pub fn load(args: &SourceArgs, runtime: &dyn SystemRuntime) -> Result<Configuration> {
    let config = Configuration::new(args.name.as_str());

    for path in &args.ini {
        config
            .from_ini_with(path, runtime)
            .with_context(|| format!("Failed to load INI file {}", path.display()))?;
    }

    for path in &args.yaml {
        config
            .from_yaml_with(path, runtime)
            .with_context(|| format!("Failed to load YAML file {}", path.display()))?;
    }

    for assignment in &args.env {
        let (path, variable) = split_assignment(assignment, "--env")?;
        config.at_path(path)?.from_env_with(variable, None, runtime);
    }

    for assignment in &args.set {
        let (path, raw) = split_assignment(assignment, "--set")?;
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .map(ConfigValue::from)
            .unwrap_or_else(|_| ConfigValue::from(raw));
        config.at_path(path)?.from_dict(value);
    }

    info!(
        name = %config.name(),
        files = args.ini.len() + args.yaml.len(),
        "loaded configuration"
    );
    Ok(config)
}

fn split_assignment<'a>(assignment: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    assignment
        .split_once('=')
        .with_context(|| format!("{} expects PATH=VALUE, got '{}'", flag, assignment))
}
