//! Rewards CLI Library
//!
//! Command-line access to the referral reward engine: earnings projections,
//! realized downline earnings, leadership pool qualification and palliative
//! account replay.
//!
//! ## Architecture
//!
//! This crate follows the **Functional Core, Imperative Shell** (FCIS) architecture pattern:
//!
//! - **Functional Core** (`logic/` module): input parsing, event replay, table rendering
//! - **Imperative Shell** (`commands/` module): file I/O and command orchestration
//! - **Error Handling** (`error` module): `CliError`, wrapping engine errors
//! - **Output Abstraction** (`output` module): testable printing interface

pub mod argument_parsing;
pub mod cli_config;
pub mod commands;
pub mod error;
pub mod logic;
pub mod output;

pub use argument_parsing::{execute, run_cli, OutputFormat, RewardsCli, RewardsCommand};
pub use error::{CliError, CliResult};
pub use output::{ConsoleOutput, Output};

/// Rewards CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
