//! Engine configuration loading for the CLI
//!
//! Resolution order:
//! - `--config <path>` (or `REWARDS_CONFIG`): must exist
//! - `~/.rewards/rewards.toml`: used when present, otherwise built-in defaults

use crate::error::{CliError, CliResult};
use crate::logic::normalize_path;
use lib_rewards::{EngineConfig, RateTable};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config filename under ~/.rewards/
pub const DEFAULT_CONFIG_FILENAME: &str = "rewards.toml";

pub fn default_config_path() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(".rewards").join(DEFAULT_CONFIG_FILENAME)
    } else {
        PathBuf::from("./rewards.toml")
    }
}

/// Load the engine configuration
pub fn load_config(path: Option<&str>) -> CliResult<EngineConfig> {
    let config_path = match path {
        Some(raw) => normalize_path(raw)?,
        None => default_config_path(),
    };

    if !config_path.exists() {
        if path.is_some() {
            return Err(CliError::ConfigError(format!(
                "Configuration file not found: {}",
                config_path.display()
            )));
        }
        debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(EngineConfig::default());
    }

    load_config_strict(&config_path)
}

/// Load a configuration file that must exist
pub fn load_config_strict(path: &Path) -> CliResult<EngineConfig> {
    if !path.exists() {
        return Err(CliError::ConfigError(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    EngineConfig::from_file(path).map_err(|e| CliError::ConfigError(e.to_string()))
}

/// Build the rate table, reporting catalog mistakes as configuration errors
pub fn rate_table(config: &EngineConfig) -> CliResult<RateTable> {
    config
        .rate_table()
        .map_err(|e| CliError::ConfigError(format!("Invalid rate catalog: {}", e)))
}
