//! Earnings Projection Calculator
//!
//! Answers "if I personally sponsor N members on package P, and each sponsee
//! in turn sponsors ten more, what do I earn over four levels?"
//!
//! # Design Principles
//!
//! This is a **pure function module**: hypothetical, not tied to the real graph.
//! - Input: personal invites and a package tier
//! - Output: [`EarningsProjection`] (per-level, per-type breakdown plus grand total)
//! - Side effects: None, no clock, no randomness
//!
//! Level counts follow a fixed fan-out:
//!
//! ```text
//! level1 = personal_invites
//! levelN = levelN-1 * 10        (N = 2, 3, 4)
//! ```
//!
//! All arithmetic is checked; an overflow is reported instead of wrapping.

use crate::errors::{RewardError, RewardResult};
use crate::rate_table::{RateTable, RateTableVersion};
use lib_types::{Amount, PackageTier, RewardBreakdown, MAX_REWARD_LEVEL};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assumed number of sponsees each projected member brings in
pub const PROJECTION_FAN_OUT: u64 = 10;

/// One projected level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedLevel {
    pub level: u8,
    pub member_count: u64,
    /// Per-member rates for this level
    pub rates: RewardBreakdown,
    /// `rates * member_count`
    pub totals: RewardBreakdown,
}

impl ProjectedLevel {
    pub fn total(&self) -> RewardResult<Amount> {
        self.totals.checked_total().ok_or(RewardError::Overflow)
    }
}

/// Four-level reward forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsProjection {
    pub package: PackageTier,
    pub personal_invites: u64,
    pub levels: Vec<ProjectedLevel>,
    /// Per-type totals across all levels
    pub totals_by_type: RewardBreakdown,
    /// Sum over every level and every reward type
    pub grand_total: Amount,
    pub rate_table_version: RateTableVersion,
}

impl EarningsProjection {
    /// Member count at a level (0 outside 1..=4)
    pub fn level_count(&self, level: u8) -> u64 {
        self.level(level).map_or(0, |l| l.member_count)
    }

    pub fn level(&self, level: u8) -> Option<&ProjectedLevel> {
        self.levels.iter().find(|l| l.level == level)
    }
}

/// Project four levels of earnings for `personal_invites` direct sponsees on `package`
///
/// # Errors
/// - `InvalidInput` when `personal_invites` is zero (rejected before computing)
/// - `Overflow` when counts or totals exceed the amount range
pub fn project_earnings(
    rates: &RateTable,
    package: PackageTier,
    personal_invites: u64,
) -> RewardResult<EarningsProjection> {
    if personal_invites < 1 {
        return Err(RewardError::InvalidInput(
            "personal invites must be at least 1".to_string(),
        ));
    }

    let mut levels = Vec::with_capacity(MAX_REWARD_LEVEL as usize);
    let mut totals_by_type = RewardBreakdown::ZERO;
    let mut member_count = personal_invites;

    for level in 1..=MAX_REWARD_LEVEL {
        if level > 1 {
            member_count = member_count
                .checked_mul(PROJECTION_FAN_OUT)
                .ok_or(RewardError::Overflow)?;
        }

        let level_rates = rates.level_rates(package, level);
        let totals = level_rates
            .checked_scale(member_count)
            .ok_or(RewardError::Overflow)?;
        totals_by_type = totals_by_type
            .checked_add(&totals)
            .ok_or(RewardError::Overflow)?;

        levels.push(ProjectedLevel {
            level,
            member_count,
            rates: level_rates,
            totals,
        });
    }

    let grand_total = totals_by_type.checked_total().ok_or(RewardError::Overflow)?;
    debug!(
        package = %package,
        personal_invites,
        grand_total,
        "earnings projected"
    );

    Ok(EarningsProjection {
        package,
        personal_invites,
        levels,
        totals_by_type,
        grand_total,
        rate_table_version: rates.version(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::RewardType;

    fn table() -> RateTable {
        RateTable::builder()
            .level(PackageTier::RegularPlus, 1, RewardBreakdown::new(500, 40, 10, 25))
            .level(PackageTier::RegularPlus, 2, RewardBreakdown::new(100, 20, 5, 0))
            .level(PackageTier::RegularPlus, 3, RewardBreakdown::new(50, 0, 2, 0))
            .level(PackageTier::RegularPlus, 4, RewardBreakdown::new(25, 0, 1, 0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_regular_plus_scenario() {
        let projection = project_earnings(&table(), PackageTier::RegularPlus, 10).unwrap();

        let level1 = projection.level(1).unwrap();
        assert_eq!(level1.member_count, 10);
        assert_eq!(level1.totals.get(RewardType::Cash), 5_000);

        let level2 = projection.level(2).unwrap();
        assert_eq!(level2.member_count, 100);
        assert_eq!(level2.totals.get(RewardType::Cash), 10_000);
    }

    #[test]
    fn test_fixed_fan_out_counts() {
        let projection = project_earnings(&table(), PackageTier::RegularPlus, 3).unwrap();
        assert_eq!(projection.level_count(1), 3);
        assert_eq!(projection.level_count(2), 30);
        assert_eq!(projection.level_count(3), 300);
        assert_eq!(projection.level_count(4), 3_000);
        assert_eq!(projection.level_count(5), 0);
    }

    #[test]
    fn test_grand_total_matches_breakdown() {
        let projection = project_earnings(&table(), PackageTier::RegularPlus, 7).unwrap();
        let summed: Amount = projection
            .levels
            .iter()
            .flat_map(|level| RewardType::ALL.map(|t| level.totals.get(t)))
            .sum();
        assert_eq!(projection.grand_total, summed);
        assert_eq!(projection.totals_by_type.checked_total(), Some(summed));
    }

    #[test]
    fn test_zero_invites_rejected() {
        let err = project_earnings(&table(), PackageTier::RegularPlus, 0).unwrap_err();
        assert!(matches!(err, RewardError::InvalidInput(_)));
    }

    #[test]
    fn test_unconfigured_package_projects_zero() {
        let projection = project_earnings(&table(), PackageTier::Diamond, 5).unwrap();
        assert_eq!(projection.grand_total, 0);
        assert_eq!(projection.level_count(4), 5_000);
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = project_earnings(&table(), PackageTier::RegularPlus, u64::MAX / 2).unwrap_err();
        assert_eq!(err, RewardError::Overflow);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let rates = table();
        let a = project_earnings(&rates, PackageTier::RegularPlus, 12).unwrap();
        let b = project_earnings(&rates, PackageTier::RegularPlus, 12).unwrap();
        assert_eq!(a, b);
    }
}
