//! Economic primitives for the referral reward network.
//!
//! Pure data types for package tiers, reward types and palliative targets.
//! Behavior (rate lookups, aggregation, state transitions) lives in lib-rewards.

use crate::primitives::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Deepest referral level that earns rewards (level 1 = direct sponsees)
pub const MAX_REWARD_LEVEL: u8 = 4;

// =============================================================================
// PACKAGE TIERS
// =============================================================================

/// Purchased membership package, in ascending order
///
/// The derived `Ord` follows declaration order, so `tier >= PackageTier::RegularPlus`
/// is the tier-ordering check used by qualification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PackageTier {
    Associate = 1,
    Regular = 2,
    RegularPlus = 3,
    Platinum = 4,
    Gold = 5,
    Diamond = 6,
}

impl PackageTier {
    /// All tiers in ascending order
    pub const ALL: &'static [PackageTier] = &[
        PackageTier::Associate,
        PackageTier::Regular,
        PackageTier::RegularPlus,
        PackageTier::Platinum,
        PackageTier::Gold,
        PackageTier::Diamond,
    ];

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PackageTier::Associate => "Associate",
            PackageTier::Regular => "Regular",
            PackageTier::RegularPlus => "Regular Plus",
            PackageTier::Platinum => "Platinum",
            PackageTier::Gold => "Gold",
            PackageTier::Diamond => "Diamond",
        }
    }

    /// Check whether this tier sits at or above `floor` in the tier ordering
    pub fn is_at_least(&self, floor: PackageTier) -> bool {
        *self >= floor
    }
}

impl fmt::Display for PackageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PackageTier {
    type Err = String;

    /// Accepts `regular_plus`, `regular-plus`, `Regular Plus` and `RegularPlus`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "associate" => Ok(PackageTier::Associate),
            "regular" => Ok(PackageTier::Regular),
            "regularplus" => Ok(PackageTier::RegularPlus),
            "platinum" => Ok(PackageTier::Platinum),
            "gold" => Ok(PackageTier::Gold),
            "diamond" => Ok(PackageTier::Diamond),
            _ => Err(format!("unknown package tier '{}'", s)),
        }
    }
}

// =============================================================================
// REWARD TYPES
// =============================================================================

/// The four per-level reward streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// Cash bonus
    Cash,
    /// Pool reward
    PoolReward,
    /// Token reward
    Token,
    /// Cashback
    Cashback,
}

impl RewardType {
    /// All reward types in stable order
    pub const ALL: [RewardType; 4] = [
        RewardType::Cash,
        RewardType::PoolReward,
        RewardType::Token,
        RewardType::Cashback,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            RewardType::Cash => "Cash",
            RewardType::PoolReward => "Pool Reward",
            RewardType::Token => "Token",
            RewardType::Cashback => "Cashback",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Amount per reward type
///
/// Used both as a rate row (what one member at a level earns) and as an
/// accumulated total (what a whole level or subtree earns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RewardBreakdown {
    #[serde(default)]
    pub cash: Amount,
    #[serde(default)]
    pub pool_reward: Amount,
    #[serde(default)]
    pub token: Amount,
    #[serde(default)]
    pub cashback: Amount,
}

impl RewardBreakdown {
    /// All-zero breakdown
    pub const ZERO: RewardBreakdown = RewardBreakdown {
        cash: 0,
        pool_reward: 0,
        token: 0,
        cashback: 0,
    };

    pub fn new(cash: Amount, pool_reward: Amount, token: Amount, cashback: Amount) -> Self {
        Self {
            cash,
            pool_reward,
            token,
            cashback,
        }
    }

    /// Amount for a single reward type
    pub fn get(&self, reward_type: RewardType) -> Amount {
        match reward_type {
            RewardType::Cash => self.cash,
            RewardType::PoolReward => self.pool_reward,
            RewardType::Token => self.token,
            RewardType::Cashback => self.cashback,
        }
    }

    /// Mutable slot for a single reward type
    pub fn slot_mut(&mut self, reward_type: RewardType) -> &mut Amount {
        match reward_type {
            RewardType::Cash => &mut self.cash,
            RewardType::PoolReward => &mut self.pool_reward,
            RewardType::Token => &mut self.token,
            RewardType::Cashback => &mut self.cashback,
        }
    }

    /// Sum across all four reward types (None on overflow)
    pub fn checked_total(&self) -> Option<Amount> {
        self.cash
            .checked_add(self.pool_reward)?
            .checked_add(self.token)?
            .checked_add(self.cashback)
    }

    /// Component-wise addition (None on overflow)
    pub fn checked_add(&self, other: &RewardBreakdown) -> Option<RewardBreakdown> {
        Some(RewardBreakdown {
            cash: self.cash.checked_add(other.cash)?,
            pool_reward: self.pool_reward.checked_add(other.pool_reward)?,
            token: self.token.checked_add(other.token)?,
            cashback: self.cashback.checked_add(other.cashback)?,
        })
    }

    /// Component-wise scaling by a member count (None on overflow)
    pub fn checked_scale(&self, factor: u64) -> Option<RewardBreakdown> {
        Some(RewardBreakdown {
            cash: self.cash.checked_mul(factor)?,
            pool_reward: self.pool_reward.checked_mul(factor)?,
            token: self.token.checked_mul(factor)?,
            cashback: self.cashback.checked_mul(factor)?,
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

// =============================================================================
// PALLIATIVE TARGETS
// =============================================================================

/// Long-horizon accumulation target a member may select once the pool
/// threshold has been reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Vehicle,
    Housing,
    Land,
    BusinessCapital,
    SolarEquipment,
    Education,
}

impl TargetType {
    pub const ALL: &'static [TargetType] = &[
        TargetType::Vehicle,
        TargetType::Housing,
        TargetType::Land,
        TargetType::BusinessCapital,
        TargetType::SolarEquipment,
        TargetType::Education,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetType::Vehicle => "Vehicle",
            TargetType::Housing => "Housing",
            TargetType::Land => "Land",
            TargetType::BusinessCapital => "Business Capital",
            TargetType::SolarEquipment => "Solar Equipment",
            TargetType::Education => "Education",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "vehicle" => Ok(TargetType::Vehicle),
            "housing" => Ok(TargetType::Housing),
            "land" => Ok(TargetType::Land),
            "businesscapital" => Ok(TargetType::BusinessCapital),
            "solarequipment" => Ok(TargetType::SolarEquipment),
            "education" => Ok(TargetType::Education),
            _ => Err(format!("unknown target type '{}'", s)),
        }
    }
}
