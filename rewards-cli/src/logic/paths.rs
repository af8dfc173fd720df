//! Path resolution for input and config files

use crate::error::{CliError, CliResult};
use std::path::PathBuf;

/// Expand a leading `~` to the home directory
pub fn expand_home_directory(path: &str) -> CliResult<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(CliError::HomeDirectoryNotFound)?;
        Ok(home.join(rest))
    } else if path == "~" {
        dirs::home_dir().ok_or(CliError::HomeDirectoryNotFound)
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Resolve a user-supplied file argument
pub fn normalize_path(path: &str) -> CliResult<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(CliError::InvalidArgument("path cannot be empty".to_string()));
    }
    expand_home_directory(trimmed)
}
