//! Actual Earnings Aggregator
//!
//! Realized (current-state) rewards from a member's real downline: walk the
//! descendants breadth-first down to level 4 and add the rate of every
//! descendant's *currently active* package at its level.
//!
//! - Members without an active package contribute zero at every reward type
//! - Issued ledger entries are never revisited; this is reporting only
//! - A traversal stopped by the safety cap or deadline yields a partial report
//!   flagged `truncated`, never a silent undercount

use crate::errors::{RewardError, RewardResult};
use crate::graph::{traverse_descendants, ReferralGraph, TraversalLimits, TruncationReason};
use crate::rate_table::{RateTable, RateTableVersion};
use lib_types::{Amount, MemberId, RewardBreakdown, MAX_REWARD_LEVEL};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Realized rewards from one level of the downline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelEarnings {
    pub level: u8,
    /// Descendants found at this level
    pub member_count: u64,
    /// Descendants at this level with an active package
    pub active_count: u64,
    pub totals: RewardBreakdown,
}

/// Realized rewards across a bounded subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsReport {
    pub root: MemberId,
    pub max_depth: u8,
    pub levels: Vec<LevelEarnings>,
    pub totals_by_type: RewardBreakdown,
    pub grand_total: Amount,
    /// True when the traversal stopped early; totals cover only what was visited
    pub truncated: bool,
    pub truncation: Option<TruncationReason>,
    pub rate_table_version: RateTableVersion,
}

impl EarningsReport {
    pub fn level(&self, level: u8) -> Option<&LevelEarnings> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Number of descendants included in the totals
    pub fn descendant_count(&self) -> u64 {
        self.levels.iter().map(|l| l.member_count).sum()
    }
}

/// Stateless aggregator over an injected rate table
#[derive(Debug, Clone)]
pub struct EarningsAggregator<'a> {
    rates: &'a RateTable,
    max_depth: u8,
    limits: TraversalLimits,
}

impl<'a> EarningsAggregator<'a> {
    /// Aggregator with the default depth (4) and safety cap
    pub fn new(rates: &'a RateTable) -> Self {
        Self {
            rates,
            max_depth: MAX_REWARD_LEVEL,
            limits: TraversalLimits::default(),
        }
    }

    /// Limit the depth; anything deeper than level 4 earns nothing anyway
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth.min(MAX_REWARD_LEVEL);
        self
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Compute realized earnings for `root`
    ///
    /// # Errors
    /// - `UnknownMember` when `root` is not in the graph
    /// - `GraphIntegrity` when the subtree is not a tree
    /// - `Overflow` when a total exceeds the amount range
    pub fn aggregate<G>(&self, graph: &G, root: MemberId) -> RewardResult<EarningsReport>
    where
        G: ReferralGraph + ?Sized,
    {
        if !graph.contains(root) {
            return Err(RewardError::UnknownMember(root));
        }

        let traversal = traverse_descendants(graph, root, self.max_depth, &self.limits)?;

        let mut levels: Vec<LevelEarnings> = (1..=self.max_depth)
            .map(|level| LevelEarnings {
                level,
                ..LevelEarnings::default()
            })
            .collect();

        for node in &traversal.nodes {
            let slot = &mut levels[(node.depth - 1) as usize];
            slot.member_count += 1;

            let Some(tier) = graph.active_package(node.member) else {
                continue;
            };
            slot.active_count += 1;
            slot.totals = slot
                .totals
                .checked_add(&self.rates.level_rates(tier, node.depth))
                .ok_or(RewardError::Overflow)?;
        }

        let mut totals_by_type = RewardBreakdown::ZERO;
        for level in &levels {
            totals_by_type = totals_by_type
                .checked_add(&level.totals)
                .ok_or(RewardError::Overflow)?;
        }
        let grand_total = totals_by_type.checked_total().ok_or(RewardError::Overflow)?;

        if let Some(reason) = traversal.truncation {
            warn!(
                root = %root,
                ?reason,
                visited = traversal.len(),
                "earnings aggregation truncated; returning partial totals"
            );
        } else {
            debug!(root = %root, visited = traversal.len(), grand_total, "earnings aggregated");
        }

        Ok(EarningsReport {
            root,
            max_depth: self.max_depth,
            levels,
            totals_by_type,
            grand_total,
            truncated: traversal.is_truncated(),
            truncation: traversal.truncation,
            rate_table_version: self.rates.version(),
        })
    }
}
