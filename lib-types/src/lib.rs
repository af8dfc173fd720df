//! Referral reward network primitives.
//! Stable, engine-neutral, behavior-free.
//!
//! Rule: No floats in money paths. Ever.

pub mod primitives;
pub mod economy;

pub use primitives::{
    bps_to_percentage, completion_bps, Amount, Bps, MemberId, Timestamp, BPS_FULL,
};
pub use economy::{PackageTier, RewardBreakdown, RewardType, TargetType, MAX_REWARD_LEVEL};
