//! In-memory referral graph
//!
//! Reference [`ReferralGraph`] implementation backed by ordered maps, used by
//! the CLI (loaded from JSON snapshots) and by tests. Ordered maps keep every
//! iteration deterministic.

use super::ReferralGraph;
use crate::errors::{RewardError, RewardResult};
use lib_types::{MemberId, PackageTier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One member as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMember {
    pub id: MemberId,
    #[serde(default)]
    pub sponsor: Option<MemberId>,
    #[serde(default)]
    pub package: Option<PackageTier>,
}

impl SnapshotMember {
    pub fn new(id: u64, sponsor: Option<u64>, package: Option<PackageTier>) -> Self {
        Self {
            id: MemberId(id),
            sponsor: sponsor.map(MemberId),
            package,
        }
    }
}

/// Serializable export of a referral graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub members: Vec<SnapshotMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemberRecord {
    sponsor: Option<MemberId>,
    package: Option<PackageTier>,
}

/// Referral graph held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferralGraph {
    members: BTreeMap<MemberId, MemberRecord>,
    children: BTreeMap<MemberId, BTreeSet<MemberId>>,
}

impl InMemoryReferralGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot as-is
    ///
    /// Edges are taken verbatim so that damaged data stays observable: a
    /// snapshot containing a cycle loads fine and is reported by traversal or
    /// [`validate_forest`](Self::validate_forest). Duplicate member ids are
    /// rejected because they cannot be represented.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> RewardResult<Self> {
        let mut graph = Self::new();
        for entry in &snapshot.members {
            if graph.members.contains_key(&entry.id) {
                return Err(RewardError::InvalidInput(format!(
                    "member {} listed more than once",
                    entry.id
                )));
            }
            graph.members.insert(
                entry.id,
                MemberRecord {
                    sponsor: entry.sponsor,
                    package: entry.package,
                },
            );
            if let Some(sponsor) = entry.sponsor {
                graph.children.entry(sponsor).or_default().insert(entry.id);
            }
        }
        Ok(graph)
    }

    /// Export in ascending member order
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            members: self
                .members
                .iter()
                .map(|(id, record)| SnapshotMember {
                    id: *id,
                    sponsor: record.sponsor,
                    package: record.package,
                })
                .collect(),
        }
    }

    /// Register a member without a sponsor
    pub fn add_root(&mut self, member: MemberId, package: Option<PackageTier>) -> RewardResult<()> {
        if self.members.contains_key(&member) {
            return Err(RewardError::InvalidInput(format!("member {} already exists", member)));
        }
        self.members.insert(member, MemberRecord { sponsor: None, package });
        Ok(())
    }

    /// Record a package activation under a sponsor
    ///
    /// Creates the sponsor -> member edge on first activation. Re-activating
    /// an existing member under the same sponsor only changes the package;
    /// an existing edge is never moved or removed.
    pub fn activate(
        &mut self,
        member: MemberId,
        sponsor: MemberId,
        package: Option<PackageTier>,
    ) -> RewardResult<()> {
        if member == sponsor {
            return Err(RewardError::InvalidInput(format!("member {} cannot sponsor itself", member)));
        }
        if !self.members.contains_key(&sponsor) {
            return Err(RewardError::UnknownMember(sponsor));
        }

        if let Some(record) = self.members.get_mut(&member) {
            if record.sponsor != Some(sponsor) {
                return Err(RewardError::InvalidInput(format!(
                    "member {} is already placed under {:?}",
                    member, record.sponsor
                )));
            }
            record.package = package;
            return Ok(());
        }

        // Refuse edges that would close a loop through the new member's ancestry
        if self.ancestors(sponsor)?.contains(&member) {
            return Err(RewardError::GraphIntegrity {
                member,
                detail: format!("placing under {} would create a cycle", sponsor),
            });
        }

        self.members.insert(
            member,
            MemberRecord {
                sponsor: Some(sponsor),
                package,
            },
        );
        self.children.entry(sponsor).or_default().insert(member);
        Ok(())
    }

    /// Change (or clear) a member's active package
    pub fn set_package(&mut self, member: MemberId, package: Option<PackageTier>) -> RewardResult<()> {
        let record = self
            .members
            .get_mut(&member)
            .ok_or(RewardError::UnknownMember(member))?;
        record.package = package;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.keys().copied()
    }

    /// Check the whole sponsor relation is a forest over known members
    pub fn validate_forest(&self) -> RewardResult<()> {
        for (member, record) in &self.members {
            if let Some(sponsor) = record.sponsor {
                if !self.members.contains_key(&sponsor) {
                    return Err(RewardError::GraphIntegrity {
                        member: *member,
                        detail: format!("sponsor {} does not exist", sponsor),
                    });
                }
            }
            self.ancestors(*member)?;
        }
        Ok(())
    }
}

impl ReferralGraph for InMemoryReferralGraph {
    fn contains(&self, member: MemberId) -> bool {
        self.members.contains_key(&member)
    }

    fn sponsor(&self, member: MemberId) -> Option<MemberId> {
        self.members.get(&member).and_then(|record| record.sponsor)
    }

    fn children(&self, member: MemberId) -> Vec<MemberId> {
        self.children
            .get(&member)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn active_package(&self, member: MemberId) -> Option<PackageTier> {
        self.members.get(&member).and_then(|record| record.package)
    }
}
