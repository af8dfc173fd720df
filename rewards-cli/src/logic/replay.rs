//! Palliative event replay
//!
//! Feeds a member's events through a fresh engine in file order, then runs
//! the maturity check once at the requested time.

use super::inputs::PalliativeEvent;
use crate::error::{CliError, CliResult};
use lib_rewards::{
    Bps, CreditOutcome, MaturityCheck, MemberId, PalliativeAccount, PalliativeEngine,
    PalliativeState, PoolLedger, RateTable, StateTransition, Timestamp,
};
use serde::Serialize;

/// Everything the palliative command reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalliativeSummary {
    pub member: MemberId,
    pub account: PalliativeAccount,
    pub progress_bps: Bps,
    pub credits: Vec<CreditOutcome>,
    pub transitions: Vec<StateTransition>,
    pub maturity: MaturityCheck,
}

pub fn replay_events<L: PoolLedger>(
    engine: &PalliativeEngine<L>,
    rates: &RateTable,
    events: &[PalliativeEvent],
    member: MemberId,
    now: Timestamp,
) -> CliResult<PalliativeSummary> {
    let mut credits = Vec::new();
    let mut transitions = Vec::new();

    for (index, event) in events.iter().enumerate() {
        if event.member() != member {
            continue;
        }
        let context = |e: CliError| {
            CliError::InvalidArgument(format!("event #{} for {}: {}", index + 1, member, e))
        };

        match event {
            PalliativeEvent::Credit { .. } => {
                let Some(credit) = event.to_credit(rates).map_err(context)? else {
                    continue;
                };
                let outcome = engine
                    .record_credit(&credit)
                    .map_err(|e| context(e.into()))?;
                transitions.extend(outcome.transition);
                credits.push(outcome);
            }
            PalliativeEvent::SelectTarget { target, .. } => {
                let taken = engine
                    .select_target(member, *target)
                    .map_err(|e| context(e.into()))?;
                transitions.extend(taken);
            }
        }
    }

    let before = engine.account(member)?.state;
    let maturity = engine.check_maturity(member, now)?;
    if maturity.matured && before != PalliativeState::Matured {
        transitions.push(StateTransition {
            from: before,
            to: PalliativeState::Matured,
        });
    }

    let account = engine.account(member)?;
    Ok(PalliativeSummary {
        member,
        progress_bps: account.progress_bps(),
        account,
        credits,
        transitions,
        maturity,
    })
}
