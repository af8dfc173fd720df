//! Rewards CLI
//!
//! Command-line front end for the referral reward engine: projections,
//! realized earnings, leadership pool qualification and palliative replay.

use crate::commands;
use crate::error::CliResult;
use crate::output::{ConsoleOutput, Output};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lib_rewards::{MemberId, PackageTier, Timestamp};
use std::fmt;
use tracing_subscriber::EnvFilter;

/// Referral reward engine CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "rewards")]
pub struct RewardsCli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "REWARDS_VERBOSE")]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table, env = "REWARDS_FORMAT")]
    pub format: OutputFormat,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true, env = "REWARDS_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: RewardsCommand,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Rewards commands
#[derive(Subcommand, Debug, Clone)]
pub enum RewardsCommand {
    /// Forecast four levels of earnings for a package and invite count
    Project(ProjectArgs),

    /// Realized earnings from a member's current downline
    Earnings(EarningsArgs),

    /// Evaluate leadership pool qualification
    Qualify(QualifyArgs),

    /// Replay pool credits and target selection for a member
    Palliative(PalliativeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Package tier (e.g. regular_plus, gold)
    #[arg(short, long)]
    pub package: PackageTier,

    /// Members you personally sponsor
    #[arg(short, long)]
    pub invites: u64,
}

#[derive(Args, Debug, Clone)]
pub struct EarningsArgs {
    /// Referral graph snapshot (JSON)
    #[arg(short, long)]
    pub graph: String,

    /// Member to report on (42 or M42)
    #[arg(short, long)]
    pub member: MemberId,

    /// Stop above this level (1-4)
    #[arg(long)]
    pub depth: Option<u8>,
}

#[derive(Args, Debug, Clone)]
pub struct QualifyArgs {
    /// Referral graph snapshot (JSON)
    #[arg(short, long)]
    pub graph: String,

    /// Member to evaluate
    #[arg(short, long)]
    pub member: MemberId,

    /// Qualification status file; read if present and rewritten after the run
    #[arg(short, long)]
    pub status: Option<String>,

    /// Evaluation time (unix seconds); defaults to now
    #[arg(long)]
    pub at: Option<Timestamp>,
}

#[derive(Args, Debug, Clone)]
pub struct PalliativeArgs {
    /// Palliative event log (JSON)
    #[arg(short, long)]
    pub events: String,

    /// Member whose account to replay
    #[arg(short, long)]
    pub member: MemberId,

    /// Maturity check time (unix seconds); defaults to now
    #[arg(long)]
    pub at: Option<Timestamp>,
}

pub async fn run_cli() -> Result<()> {
    let cli = RewardsCli::parse();
    init_tracing(cli.verbose);

    execute(&cli, &ConsoleOutput).await.map_err(anyhow::Error::from)
}

/// Run a parsed command against the given output
pub async fn execute(cli: &RewardsCli, output: &dyn Output) -> CliResult<()> {
    let config = crate::cli_config::load_config(cli.config.as_deref())?;

    match &cli.command {
        RewardsCommand::Project(args) => {
            commands::project::handle_project_command(args.clone(), cli, &config, output).await
        }
        RewardsCommand::Earnings(args) => {
            commands::earnings::handle_earnings_command(args.clone(), cli, &config, output).await
        }
        RewardsCommand::Qualify(args) => {
            commands::qualify::handle_qualify_command(args.clone(), cli, &config, output).await
        }
        RewardsCommand::Palliative(args) => {
            commands::palliative::handle_palliative_command(args.clone(), cli, &config, output)
                .await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
