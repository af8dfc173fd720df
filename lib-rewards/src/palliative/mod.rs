//! Palliative Accumulation
//!
//! Long-horizon savings toward a member-selected target (vehicle, housing, ...)
//! funded by referral pool credits.
//!
//! # State Machine
//!
//! ```text
//! AccumulatingPool --(balance >= threshold)--> ThresholdReached
//! ThresholdReached --(select target)---------> TargetActive
//! TargetActive ----(balance >= target)-------> TargetReached
//! TargetActive | TargetReached --(maturity check passes)--> Matured
//! ```
//!
//! - The balance only grows here; debits happen downstream at fulfillment
//! - The threshold transition fires exactly once, on the credit that crosses it
//! - Selecting a target keeps the balance and swaps the progress denominator
//! - A maturity check below target is a normal `false`, never an error

mod engine;

pub use engine::{CreditOutcome, MaturityCheck, PalliativeEngine};

use crate::errors::{RewardError, RewardResult};
use lib_types::{completion_bps, Amount, Bps, MemberId, TargetType, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pool balance that unlocks target selection
pub const DEFAULT_PALLIATIVE_THRESHOLD: Amount = 200_000;

/// Accumulation state of one member's pool sub-account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PalliativeState {
    #[default]
    AccumulatingPool,
    ThresholdReached,
    TargetActive,
    TargetReached,
    Matured,
}

impl PalliativeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PalliativeState::AccumulatingPool => "ACCUMULATING_POOL",
            PalliativeState::ThresholdReached => "THRESHOLD_REACHED",
            PalliativeState::TargetActive => "TARGET_ACTIVE",
            PalliativeState::TargetReached => "TARGET_REACHED",
            PalliativeState::Matured => "MATURED",
        }
    }

    /// Whether a target has been selected
    pub fn has_target(&self) -> bool {
        matches!(
            self,
            PalliativeState::TargetActive | PalliativeState::TargetReached | PalliativeState::Matured
        )
    }
}

impl fmt::Display for PalliativeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change caused by one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: PalliativeState,
    pub to: PalliativeState,
}

/// Accumulation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalliativeConfig {
    pub threshold: Amount,
    /// Amount to accumulate per selectable target
    ///
    /// Configured entries replace the matching defaults; unlisted targets
    /// keep their default amount.
    #[serde(deserialize_with = "targets_over_defaults")]
    pub targets: BTreeMap<TargetType, Amount>,
}

fn targets_over_defaults<'de, D>(deserializer: D) -> Result<BTreeMap<TargetType, Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<TargetType, Amount>::deserialize(deserializer)?;
    let mut targets = PalliativeConfig::default().targets;
    targets.extend(overrides);
    Ok(targets)
}

impl Default for PalliativeConfig {
    fn default() -> Self {
        let targets = [
            (TargetType::Vehicle, 5_000_000),
            (TargetType::Housing, 20_000_000),
            (TargetType::Land, 10_000_000),
            (TargetType::BusinessCapital, 3_000_000),
            (TargetType::SolarEquipment, 1_500_000),
            (TargetType::Education, 2_000_000),
        ];
        Self {
            threshold: DEFAULT_PALLIATIVE_THRESHOLD,
            targets: targets.into_iter().collect(),
        }
    }
}

impl PalliativeConfig {
    pub fn target_amount(&self, target: TargetType) -> Option<Amount> {
        self.targets.get(&target).copied()
    }

    pub fn validate(&self) -> RewardResult<()> {
        if self.threshold == 0 {
            return Err(RewardError::Config(
                "palliative threshold must be positive".to_string(),
            ));
        }
        if let Some(missing) = TargetType::ALL.iter().find(|t| !self.targets.contains_key(t)) {
            return Err(RewardError::Config(format!(
                "no target amount configured for {}",
                missing
            )));
        }
        if let Some((target, _)) = self.targets.iter().find(|(_, amount)| **amount == 0) {
            return Err(RewardError::Config(format!(
                "target amount for {} must be positive",
                target
            )));
        }
        Ok(())
    }
}

/// Emitted once when an account matures; handed to manual fulfillment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityRecord {
    pub member: MemberId,
    pub target_type: TargetType,
    pub target_amount: Amount,
    pub balance_at_maturity: Amount,
    pub matured_at: Timestamp,
}

/// One member's accumulation account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalliativeAccount {
    pub member: MemberId,
    pub state: PalliativeState,
    pub threshold: Amount,
    pub current_balance: Amount,
    pub selected_target: Option<TargetType>,
    pub target_amount: Option<Amount>,
    pub maturity: Option<MaturityRecord>,
}

impl PalliativeAccount {
    pub fn new(member: MemberId, threshold: Amount) -> Self {
        Self {
            member,
            state: PalliativeState::AccumulatingPool,
            threshold,
            current_balance: 0,
            selected_target: None,
            target_amount: None,
            maturity: None,
        }
    }

    /// Amount the current phase is measured against
    pub fn denominator(&self) -> Amount {
        self.target_amount.unwrap_or(self.threshold)
    }

    /// Progress of the current phase, capped at 100%
    pub fn progress_bps(&self) -> Bps {
        completion_bps(self.current_balance, self.denominator())
    }

    /// Credits are accepted until the account matures
    pub fn accepts_credits(&self) -> bool {
        self.state != PalliativeState::Matured
    }

    /// Take the ledger's post-credit balance and advance the state
    ///
    /// At most one transition happens per call: a single credit can cross
    /// the threshold, or reach the target, never both, since a target only
    /// exists after an explicit selection.
    pub fn observe_balance(&mut self, balance: Amount) -> RewardResult<Option<StateTransition>> {
        if !self.accepts_credits() {
            return Err(RewardError::InvalidTransition {
                state: self.state,
                action: "credit",
            });
        }
        if balance < self.current_balance {
            return Err(RewardError::BalanceRegression {
                member: self.member,
                known: self.current_balance,
                reported: balance,
            });
        }
        self.current_balance = balance;

        let next = match self.state {
            PalliativeState::AccumulatingPool if balance >= self.threshold => {
                PalliativeState::ThresholdReached
            }
            PalliativeState::TargetActive if balance >= self.denominator() => {
                PalliativeState::TargetReached
            }
            _ => return Ok(None),
        };
        Ok(Some(self.move_to(next)))
    }

    /// Choose the accumulation target; only valid once, from `ThresholdReached`
    ///
    /// Returns every transition taken: `TargetActive`, plus `TargetReached`
    /// when the carried-over balance already covers the target.
    pub fn select_target(
        &mut self,
        target: TargetType,
        target_amount: Amount,
    ) -> RewardResult<Vec<StateTransition>> {
        if self.state != PalliativeState::ThresholdReached {
            return Err(RewardError::InvalidTransition {
                state: self.state,
                action: "select_target",
            });
        }
        if target_amount == 0 {
            return Err(RewardError::InvalidInput(
                "target amount must be positive".to_string(),
            ));
        }

        self.selected_target = Some(target);
        self.target_amount = Some(target_amount);

        let mut transitions = vec![self.move_to(PalliativeState::TargetActive)];
        if self.current_balance >= target_amount {
            transitions.push(self.move_to(PalliativeState::TargetReached));
        }
        Ok(transitions)
    }

    /// Run the maturity check
    ///
    /// `Ok(false)` while the target is not covered (or not yet chosen).
    /// On success the account moves to `Matured` and keeps the record;
    /// repeating the check afterwards returns `Ok(true)` without a new record.
    pub fn check_maturity(&mut self, now: Timestamp) -> RewardResult<bool> {
        match self.state {
            PalliativeState::Matured => return Ok(true),
            PalliativeState::TargetActive | PalliativeState::TargetReached => {}
            PalliativeState::AccumulatingPool | PalliativeState::ThresholdReached => {
                return Ok(false)
            }
        }

        let (Some(target_type), Some(target_amount)) = (self.selected_target, self.target_amount)
        else {
            return Err(RewardError::InvalidTransition {
                state: self.state,
                action: "check_maturity",
            });
        };
        if self.current_balance < target_amount {
            return Ok(false);
        }

        self.maturity = Some(MaturityRecord {
            member: self.member,
            target_type,
            target_amount,
            balance_at_maturity: self.current_balance,
            matured_at: now,
        });
        self.move_to(PalliativeState::Matured);
        Ok(true)
    }

    fn move_to(&mut self, to: PalliativeState) -> StateTransition {
        let transition = StateTransition {
            from: self.state,
            to,
        };
        self.state = to;
        transition
    }
}
