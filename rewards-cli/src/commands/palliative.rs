//! `rewards palliative`: replay a member's palliative event log

use super::common::{emit, now_unix, read_input};
use crate::argument_parsing::{PalliativeArgs, RewardsCli};
use crate::cli_config::rate_table;
use crate::error::CliResult;
use crate::logic::{parse_events, render_palliative, replay_events};
use crate::output::Output;
use lib_rewards::{EngineConfig, InMemoryPoolLedger, PalliativeEngine};

pub async fn handle_palliative_command(
    args: PalliativeArgs,
    cli: &RewardsCli,
    config: &EngineConfig,
    output: &dyn Output,
) -> CliResult<()> {
    let (path, raw) = read_input(&args.events).await?;
    let events = parse_events(&raw, &path.display().to_string())?;

    let rates = rate_table(config)?;
    let engine = PalliativeEngine::new(config.palliative.clone(), InMemoryPoolLedger::new());
    let now = args.at.unwrap_or_else(now_unix);
    let summary = replay_events(&engine, &rates, &events, args.member, now)?;

    emit(
        cli.format,
        output,
        "Palliative Account",
        &summary,
        render_palliative(&summary),
    )
}
