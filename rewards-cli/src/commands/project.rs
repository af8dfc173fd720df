//! `rewards project`: four-level earnings forecast
//!
//! Architecture: Functional Core, Imperative Shell (FCIS)
//!
//! - **Pure Logic**: `project_earnings` in the engine, table rendering in `logic::render`
//! - **Imperative Shell**: rate table construction and printing

use super::common::emit;
use crate::argument_parsing::{ProjectArgs, RewardsCli};
use crate::cli_config::rate_table;
use crate::error::{CliError, CliResult};
use crate::logic::render_projection;
use crate::output::Output;
use lib_rewards::{project_earnings, EngineConfig};

pub async fn handle_project_command(
    args: ProjectArgs,
    cli: &RewardsCli,
    config: &EngineConfig,
    output: &dyn Output,
) -> CliResult<()> {
    if args.invites == 0 {
        return Err(CliError::InvalidArgument(
            "--invites must be at least 1".to_string(),
        ));
    }

    let rates = rate_table(config)?;
    if rates.level_rates(args.package, 1).is_zero() && rates.price(args.package).is_none() {
        output.warning(&format!(
            "No rates configured for {}; every amount will be zero",
            args.package
        ))?;
    }

    let projection = project_earnings(&rates, args.package, args.invites)?;
    emit(
        cli.format,
        output,
        "Earnings Projection",
        &projection,
        render_projection(&projection),
    )
}
