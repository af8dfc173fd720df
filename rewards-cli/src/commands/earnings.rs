//! `rewards earnings`: realized earnings from a graph snapshot

use super::common::{emit, read_input};
use crate::argument_parsing::{EarningsArgs, RewardsCli};
use crate::cli_config::rate_table;
use crate::error::CliResult;
use crate::logic::{parse_graph_snapshot, render_earnings};
use crate::output::Output;
use lib_rewards::{EarningsAggregator, EngineConfig, InMemoryReferralGraph};

pub async fn handle_earnings_command(
    args: EarningsArgs,
    cli: &RewardsCli,
    config: &EngineConfig,
    output: &dyn Output,
) -> CliResult<()> {
    let (path, raw) = read_input(&args.graph).await?;
    let snapshot = parse_graph_snapshot(&raw, &path.display().to_string())?;
    let graph = InMemoryReferralGraph::from_snapshot(&snapshot)?;

    let rates = rate_table(config)?;
    let depth = args.depth.unwrap_or(config.traversal.max_depth);
    let report = EarningsAggregator::new(&rates)
        .with_max_depth(depth)
        .with_limits(config.traversal.limits())
        .aggregate(&graph, args.member)?;

    if report.truncated {
        output.warning("Traversal limit reached; totals cover only the visited part of the downline")?;
    }

    emit(
        cli.format,
        output,
        "Realized Earnings",
        &report,
        render_earnings(&report),
    )
}
