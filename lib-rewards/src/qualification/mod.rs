//! Leadership Qualification Evaluator
//!
//! Decides whether a member unlocks the Leadership Pool reward tier through
//! one of two independent, alternative paths:
//!
//! | Path | Rule |
//! |------|------|
//! | Option 1 (breadth) | `>= 70` direct sponsees at or above Regular Plus |
//! | Option 2 (depth) | `>= 50` first-generation AND `>= 50` second-generation sponsees at or above Regular Plus |
//!
//! Both paths require the member's own package to be at or above Regular Plus.
//! Completion is reported in basis points. For Option 2 the weaker of the two
//! sub-counts binds (`min`, not an average).
//!
//! Evaluation is pure. Recording the outcome lives in [`status`], where the
//! qualified flag is one-way.

pub mod status;

pub use status::{QualificationOutcome, QualificationRegistry, QualificationStatus, StatusSnapshot};

use crate::errors::{RewardError, RewardResult};
use crate::graph::{traverse_descendants, ReferralGraph, TraversalLimits};
use lib_types::{bps_to_percentage, completion_bps, Bps, MemberId, PackageTier};
use serde::{Deserialize, Serialize};

/// Default Option 1 threshold: direct sponsees at or above the minimum tier
pub const OPTION_1_DIRECT_THRESHOLD: u64 = 70;
/// Default Option 2 threshold for first-generation sponsees
pub const OPTION_2_FIRST_GEN_THRESHOLD: u64 = 50;
/// Default Option 2 threshold for second-generation sponsees
pub const OPTION_2_SECOND_GEN_THRESHOLD: u64 = 50;

/// Which path satisfied qualification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualificationMethod {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "OPTION_1")]
    Option1,
    #[serde(rename = "OPTION_2")]
    Option2,
}

impl std::fmt::Display for QualificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Option1 => write!(f, "Option 1 (breadth)"),
            Self::Option2 => write!(f, "Option 2 (depth)"),
        }
    }
}

/// Thresholds and tier floor for qualification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationPolicy {
    /// Lowest tier that counts, both for the member and for sponsees
    pub min_tier: PackageTier,
    pub option1_direct: u64,
    pub option2_first_gen: u64,
    pub option2_second_gen: u64,
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        Self {
            min_tier: PackageTier::RegularPlus,
            option1_direct: OPTION_1_DIRECT_THRESHOLD,
            option2_first_gen: OPTION_2_FIRST_GEN_THRESHOLD,
            option2_second_gen: OPTION_2_SECOND_GEN_THRESHOLD,
        }
    }
}

impl QualificationPolicy {
    /// Reject zero thresholds, which would qualify everyone with the tier
    pub fn validate(&self) -> RewardResult<()> {
        if self.option1_direct == 0 || self.option2_first_gen == 0 || self.option2_second_gen == 0 {
            return Err(RewardError::Config(
                "qualification thresholds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Option 1 progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadthProgress {
    pub direct_qualified_count: u64,
    pub threshold: u64,
    pub completion_bps: Bps,
    pub satisfied: bool,
}

/// Option 2 progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthProgress {
    pub first_gen: u64,
    pub second_gen: u64,
    pub first_gen_threshold: u64,
    pub second_gen_threshold: u64,
    /// `min(first/threshold, second/threshold)`, capped at 100%
    pub completion_bps: Bps,
    pub satisfied: bool,
}

/// Result of one evaluator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationReport {
    pub member: MemberId,
    pub own_package: Option<PackageTier>,
    pub has_qualifying_tier: bool,
    pub option1: BreadthProgress,
    pub option2: DepthProgress,
    /// Path that satisfied qualification (None when not qualified)
    pub method: QualificationMethod,
    /// When neither path is satisfied: the one numerically closer to completion
    pub recommendation: Option<QualificationMethod>,
}

impl QualificationReport {
    /// Precondition AND (Option 1 OR Option 2)
    pub fn qualifies(&self) -> bool {
        self.method != QualificationMethod::None
    }

    pub fn option1_percentage(&self) -> f64 {
        bps_to_percentage(self.option1.completion_bps)
    }

    pub fn option2_percentage(&self) -> f64 {
        bps_to_percentage(self.option2.completion_bps)
    }
}

/// Stateless evaluator over an injected policy
#[derive(Debug, Clone, Copy, Default)]
pub struct QualificationEvaluator {
    policy: QualificationPolicy,
}

impl QualificationEvaluator {
    pub fn new(policy: QualificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &QualificationPolicy {
        &self.policy
    }

    /// Evaluate both paths for `member` against the current downline
    pub fn evaluate<G>(&self, graph: &G, member: MemberId) -> RewardResult<QualificationReport>
    where
        G: ReferralGraph + ?Sized,
    {
        if !graph.contains(member) {
            return Err(RewardError::UnknownMember(member));
        }

        let policy = &self.policy;
        let own_package = graph.active_package(member);
        let has_qualifying_tier = own_package.map_or(false, |tier| tier.is_at_least(policy.min_tier));

        // Two generations; the walk also enforces the forest property
        let downline = traverse_descendants(graph, member, 2, &TraversalLimits::unbounded())?;
        let counts_toward = |sponsee: MemberId| {
            graph
                .active_package(sponsee)
                .map_or(false, |tier| tier.is_at_least(policy.min_tier))
        };
        let first_gen = downline.at_depth(1).filter(|m| counts_toward(*m)).count() as u64;
        let second_gen = downline.at_depth(2).filter(|m| counts_toward(*m)).count() as u64;

        let option1 = BreadthProgress {
            direct_qualified_count: first_gen,
            threshold: policy.option1_direct,
            completion_bps: completion_bps(first_gen, policy.option1_direct),
            satisfied: first_gen >= policy.option1_direct,
        };

        let option2 = DepthProgress {
            first_gen,
            second_gen,
            first_gen_threshold: policy.option2_first_gen,
            second_gen_threshold: policy.option2_second_gen,
            completion_bps: completion_bps(first_gen, policy.option2_first_gen)
                .min(completion_bps(second_gen, policy.option2_second_gen)),
            satisfied: first_gen >= policy.option2_first_gen
                && second_gen >= policy.option2_second_gen,
        };

        let method = match (has_qualifying_tier, option1.satisfied, option2.satisfied) {
            (true, true, _) => QualificationMethod::Option1,
            (true, false, true) => QualificationMethod::Option2,
            _ => QualificationMethod::None,
        };

        let recommendation = if option1.satisfied || option2.satisfied {
            None
        } else if option2.completion_bps > option1.completion_bps {
            Some(QualificationMethod::Option2)
        } else {
            Some(QualificationMethod::Option1)
        };

        Ok(QualificationReport {
            member,
            own_package,
            has_qualifying_tier,
            option1,
            option2,
            method,
            recommendation,
        })
    }
}
