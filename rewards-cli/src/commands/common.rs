//! Helpers shared across commands

use crate::argument_parsing::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::logic::normalize_path;
use crate::output::Output;
use lib_rewards::Timestamp;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Read a required input file
pub async fn read_input(path: &str) -> CliResult<(PathBuf, String)> {
    let resolved = normalize_path(path)?;
    if !tokio::fs::try_exists(&resolved).await? {
        return Err(CliError::InputFileNotFound(resolved.display().to_string()));
    }
    let raw = tokio::fs::read_to_string(&resolved).await?;
    Ok((resolved, raw))
}

/// Print a result as JSON or as a titled table
pub fn emit<T: Serialize>(
    format: OutputFormat,
    output: &dyn Output,
    title: &str,
    value: &T,
    table: Vec<String>,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => output.print_json(&serde_json::to_value(value)?),
        OutputFormat::Table => {
            output.header(title)?;
            output.lines(&table)
        }
    }
}

/// Current unix time in seconds
pub fn now_unix() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
