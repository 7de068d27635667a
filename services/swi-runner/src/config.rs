//! Runner configuration.

use anyhow::{Context, Result};
use hazard_processor::ProcessorConfig;
use std::path::Path;

/// Load the processor configuration.
///
/// Starts from the YAML file when one is given, otherwise from the defaults,
/// then applies `SWI_*` environment overrides.
pub fn load_processor_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    let base = match path {
        Some(path) => ProcessorConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };
    let config = base.with_env_overrides();

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}
