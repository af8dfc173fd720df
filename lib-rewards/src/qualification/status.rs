//! Persisted qualification status
//!
//! `NOT_QUALIFIED -> QUALIFIED` is the only transition. It happens on the
//! first evaluator run where a path is satisfied, and records the method and
//! time. Later runs never clear the flag, even if the downline shrinks.

use super::{QualificationEvaluator, QualificationMethod, QualificationReport};
use crate::errors::RewardResult;
use crate::graph::ReferralGraph;
use lib_types::{MemberId, Timestamp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Per-member qualification record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualificationStatus {
    pub is_qualified: bool,
    pub method: QualificationMethod,
    pub qualified_at: Option<Timestamp>,
}

impl QualificationStatus {
    pub fn not_qualified() -> Self {
        Self::default()
    }

    /// Apply an evaluator run; returns true only on the one-way transition
    ///
    /// Already-qualified statuses are left untouched whatever the report says.
    pub fn record(&mut self, report: &QualificationReport, now: Timestamp) -> bool {
        if self.is_qualified || !report.qualifies() {
            return false;
        }
        self.is_qualified = true;
        self.method = report.method;
        self.qualified_at = Some(now);
        true
    }
}

/// Evaluator run plus the status after recording it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationOutcome {
    pub report: QualificationReport,
    pub status: QualificationStatus,
    /// True when this run performed the `NOT_QUALIFIED -> QUALIFIED` transition
    pub newly_qualified: bool,
}

/// Serializable export of every recorded status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub statuses: BTreeMap<MemberId, QualificationStatus>,
}

/// Store of qualification statuses
///
/// Evaluation runs without holding the lock; only the monotonic record step
/// takes the write lock, so concurrent runs for one member cannot clear or
/// double-stamp the flag.
#[derive(Debug, Default)]
pub struct QualificationRegistry {
    statuses: RwLock<BTreeMap<MemberId, QualificationStatus>>,
}

impl QualificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StatusSnapshot) -> Self {
        Self {
            statuses: RwLock::new(snapshot.statuses),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            statuses: self.statuses.read().clone(),
        }
    }

    /// Current status (not qualified when never recorded)
    pub fn status(&self, member: MemberId) -> QualificationStatus {
        self.statuses.read().get(&member).copied().unwrap_or_default()
    }

    /// Run the evaluator and record the result
    pub fn evaluate_and_record<G>(
        &self,
        evaluator: &QualificationEvaluator,
        graph: &G,
        member: MemberId,
        now: Timestamp,
    ) -> RewardResult<QualificationOutcome>
    where
        G: ReferralGraph + ?Sized,
    {
        let report = evaluator.evaluate(graph, member)?;

        let mut statuses = self.statuses.write();
        let status = statuses.entry(member).or_default();
        let newly_qualified = status.record(&report, now);

        if newly_qualified {
            info!(
                member = %member,
                method = %status.method,
                qualified_at = now,
                "member qualified for leadership pool"
            );
        }

        Ok(QualificationOutcome {
            report,
            status: *status,
            newly_qualified,
        })
    }
}
