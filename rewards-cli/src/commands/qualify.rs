//! `rewards qualify`: leadership pool qualification
//!
//! With `--status`, the qualification flag persists between runs: the file
//! is loaded (or started empty), the run is recorded, and the file rewritten.

use super::common::{emit, now_unix, read_input};
use crate::argument_parsing::{QualifyArgs, RewardsCli};
use crate::error::CliResult;
use crate::logic::{normalize_path, parse_graph_snapshot, parse_status_snapshot, render_qualification};
use crate::output::Output;
use lib_rewards::{EngineConfig, InMemoryReferralGraph, QualificationEvaluator, QualificationRegistry};
use std::path::Path;
use tracing::debug;

/// Registry from a status file; a file that does not exist yet starts empty
async fn load_registry(path: &Path) -> CliResult<QualificationRegistry> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(QualificationRegistry::new());
    }
    let raw = tokio::fs::read_to_string(path).await?;
    let snapshot = parse_status_snapshot(&raw, &path.display().to_string())?;
    Ok(QualificationRegistry::from_snapshot(snapshot))
}

pub async fn handle_qualify_command(
    args: QualifyArgs,
    cli: &RewardsCli,
    config: &EngineConfig,
    output: &dyn Output,
) -> CliResult<()> {
    let (path, raw) = read_input(&args.graph).await?;
    let snapshot = parse_graph_snapshot(&raw, &path.display().to_string())?;
    let graph = InMemoryReferralGraph::from_snapshot(&snapshot)?;

    let status_path = args.status.as_deref().map(normalize_path).transpose()?;
    let registry = match &status_path {
        Some(path) => load_registry(path).await?,
        None => QualificationRegistry::new(),
    };

    let evaluator = QualificationEvaluator::new(config.qualification);
    let now = args.at.unwrap_or_else(now_unix);
    let outcome = registry.evaluate_and_record(&evaluator, &graph, args.member, now)?;

    if let Some(path) = &status_path {
        let json = serde_json::to_string_pretty(&registry.snapshot())?;
        tokio::fs::write(path, json).await?;
        debug!(path = %path.display(), "qualification status saved");
    }

    emit(
        cli.format,
        output,
        "Leadership Pool Qualification",
        &outcome,
        render_qualification(&outcome),
    )
}
