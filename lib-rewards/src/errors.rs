//! Reward Engine Errors

use lib_types::{Amount, MemberId, TargetType};
use thiserror::Error;

use crate::palliative::PalliativeState;

/// Error during reward, qualification or accumulation operations
///
/// Absent rates and truncated traversals are deliberately not represented
/// here: the first reads as zero, the second as a flagged partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    /// Cycle or multi-parenting detected in the sponsor relation.
    /// Fatal for the computation and never retried automatically.
    #[error("Referral graph integrity violated at {member}: {detail}")]
    GraphIntegrity { member: MemberId, detail: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Action '{action}' not allowed in state {state}")]
    InvalidTransition {
        state: PalliativeState,
        action: &'static str,
    },

    /// The ledger reported less than the balance already observed
    #[error("Pool balance for {member} went backwards: known {known}, reported {reported}")]
    BalanceRegression {
        member: MemberId,
        known: Amount,
        reported: Amount,
    },

    #[error("No target amount configured for {0}")]
    UnknownTarget(TargetType),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for reward engine operations
pub type RewardResult<T> = Result<T, RewardError>;
