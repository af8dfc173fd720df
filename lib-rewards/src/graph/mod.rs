//! Referral Graph Accessor
//!
//! Read-only view over the sponsor relation. The relation must be a forest:
//! every member has at most one sponsor and following sponsors never loops.
//! Traversals check the root's sponsor chain first, then every member they
//! reach, and fail with [`RewardError::GraphIntegrity`] instead of looping.
//!
//! # Traversal bounds
//!
//! Descendant walks are breadth-first and bounded three ways:
//! - `max_depth` levels below the root
//! - `max_descendants` members in total (safety cap against pathological fan-out)
//! - an optional deadline
//!
//! Hitting the cap or the deadline is not an error. The walk stops and the
//! result carries a [`TruncationReason`].

pub mod memory;

pub use memory::{GraphSnapshot, InMemoryReferralGraph, SnapshotMember};

use crate::errors::{RewardError, RewardResult};
use lib_types::{MemberId, PackageTier};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// Default safety cap on the number of descendants a single traversal visits
pub const DEFAULT_MAX_DESCENDANTS: usize = 100_000;

/// Read interface over the referral graph and each member's active package
///
/// Implemented by whatever owns the graph (database, cache, snapshot).
/// The engine only reads through it.
pub trait ReferralGraph {
    /// Whether the member exists at all
    fn contains(&self, member: MemberId) -> bool;

    /// Direct sponsor of a member (None for roots and unknown members)
    fn sponsor(&self, member: MemberId) -> Option<MemberId>;

    /// Direct sponsees of a member
    fn children(&self, member: MemberId) -> Vec<MemberId>;

    /// Currently active package tier (None when the member has no active package)
    fn active_package(&self, member: MemberId) -> Option<PackageTier>;

    /// All descendants down to `max_depth`, each paired with its level
    ///
    /// Unbounded apart from depth; use [`traverse_descendants`] to apply a cap.
    fn descendants_up_to_depth(
        &self,
        member: MemberId,
        max_depth: u8,
    ) -> RewardResult<Vec<(MemberId, u8)>> {
        let traversal = traverse_descendants(self, member, max_depth, &TraversalLimits::unbounded())?;
        Ok(traversal
            .nodes
            .into_iter()
            .map(|node| (node.member, node.depth))
            .collect())
    }

    /// Sponsor chain from the direct sponsor up to the root
    fn ancestors(&self, member: MemberId) -> RewardResult<Vec<MemberId>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([member]);
        let mut current = member;

        while let Some(sponsor) = self.sponsor(current) {
            if !seen.insert(sponsor) {
                return Err(RewardError::GraphIntegrity {
                    member: sponsor,
                    detail: format!("sponsor chain of {} loops back", member),
                });
            }
            chain.push(sponsor);
            current = sponsor;
        }

        Ok(chain)
    }
}

/// Why a traversal stopped before covering the whole bounded subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// The descendant safety cap was reached
    DescendantCap,
    /// The caller's deadline passed
    Deadline,
}

/// Bounds applied to a descendant traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    pub max_descendants: usize,
    pub deadline: Option<Instant>,
}

impl TraversalLimits {
    pub fn new(max_descendants: usize) -> Self {
        Self {
            max_descendants,
            deadline: None,
        }
    }

    /// No cap and no deadline
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DESCENDANTS)
    }
}

/// One member reached by a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversedMember {
    pub member: MemberId,
    /// Level relative to the root (1 = direct sponsee)
    pub depth: u8,
}

/// Result of a bounded breadth-first descendant walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    pub root: MemberId,
    pub max_depth: u8,
    /// Descendants in breadth-first order, each at most once
    pub nodes: Vec<TraversedMember>,
    pub truncation: Option<TruncationReason>,
}

impl Traversal {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Members reached at exactly `depth`
    pub fn at_depth(&self, depth: u8) -> impl Iterator<Item = MemberId> + '_ {
        self.nodes
            .iter()
            .filter(move |node| node.depth == depth)
            .map(|node| node.member)
    }
}

/// Breadth-first walk of `root`'s descendants down to `max_depth`
///
/// Children are visited in ascending id order so the output is identical
/// across calls on an unchanged graph. A member reached twice means the
/// sponsor relation is not a forest and the walk fails.
///
/// A ring through the root longer than `max_depth` never revisits a member
/// inside the window, so the root's sponsor chain is walked up front.
pub fn traverse_descendants<G>(
    graph: &G,
    root: MemberId,
    max_depth: u8,
    limits: &TraversalLimits,
) -> RewardResult<Traversal>
where
    G: ReferralGraph + ?Sized,
{
    graph.ancestors(root)?;

    let mut traversal = Traversal {
        root,
        max_depth,
        nodes: Vec::new(),
        truncation: None,
    };
    let mut visited = HashSet::from([root]);
    let mut frontier = vec![root];

    'levels: for depth in 1..=max_depth {
        let mut next = Vec::new();

        for parent in &frontier {
            if limits.deadline_passed() {
                traversal.truncation = Some(TruncationReason::Deadline);
                break 'levels;
            }

            let mut children = graph.children(*parent);
            children.sort_unstable();

            for child in children {
                if !visited.insert(child) {
                    return Err(RewardError::GraphIntegrity {
                        member: child,
                        detail: format!("reached twice below {} (via {})", root, parent),
                    });
                }
                if traversal.nodes.len() >= limits.max_descendants {
                    traversal.truncation = Some(TruncationReason::DescendantCap);
                    break 'levels;
                }
                traversal.nodes.push(TraversedMember { member: child, depth });
                next.push(child);
            }
        }

        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    debug!(
        root = %root,
        max_depth,
        visited = traversal.nodes.len(),
        truncated = traversal.is_truncated(),
        "descendant traversal finished"
    );

    Ok(traversal)
}
