//! Structured error types for the rewards CLI
//!
//! Engine failures keep their `RewardError` so callers can match on them;
//! everything else is file handling, input parsing or configuration.

use lib_rewards::RewardError;
use thiserror::Error;

/// Rewards CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    // Engine
    #[error(transparent)]
    Reward(#[from] RewardError),

    // Configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Inputs
    #[error("Input file not found: {0}")]
    InputFileNotFound(String),

    #[error("Invalid input file {path}: {reason}")]
    InvalidInputFile { path: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Path operations
    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    // I/O operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Serialization
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
