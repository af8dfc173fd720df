//! Rewards Command-Line Interface
//!
//! Entry point for the `rewards` binary. Parses command-line arguments
//! and delegates to the appropriate command handler.

use rewards_cli::run_cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_cli().await
}
