//! Referral Reward Engine
//!
//! Computes rewards over a sponsor/sponsee network of members who buy tiered
//! membership packages. Every package pays four reward types (cash, pool
//! reward, token, cashback) to the upline, four levels deep.
//!
//! COMPONENTS
//!
//! - Projection: hypothetical four-level forecast with a fixed fan-out of 10
//! - Aggregation: realized totals from the real downline's active packages
//! - Qualification: Option 1 (breadth) / Option 2 (depth) leadership pool
//!   eligibility, recorded as a one-way flag
//! - Palliative: pool credits accumulate to a threshold, then toward a
//!   member-selected target until maturity
//!
//! DATA OWNERSHIP
//!
//! The referral graph, the rate catalog and the pool sub-accounts are owned
//! elsewhere and reached through [`ReferralGraph`], [`RateTable`] and
//! [`PoolLedger`]. Computation components are stateless over their inputs;
//! only the qualification registry and the palliative engine hold state.
//!
//! Rule: all money math is integer and checked. Overflow is an error.

pub mod aggregation;
pub mod config;
pub mod errors;
pub mod graph;
pub mod ledger;
pub mod palliative;
pub mod projection;
pub mod qualification;
pub mod rate_table;

pub use aggregation::{EarningsAggregator, EarningsReport, LevelEarnings};
pub use config::{EngineConfig, TraversalConfig};
pub use errors::{RewardError, RewardResult};
pub use graph::{
    traverse_descendants, GraphSnapshot, InMemoryReferralGraph, ReferralGraph, SnapshotMember,
    Traversal, TraversalLimits, TruncationReason,
};
pub use ledger::{
    pool_credit_for_price, CreditReceipt, InMemoryPoolLedger, PoolLedger, ReferralCredit,
    POOL_CREDIT_PERCENT,
};
pub use palliative::{
    CreditOutcome, MaturityCheck, MaturityRecord, PalliativeAccount, PalliativeConfig,
    PalliativeEngine, PalliativeState, StateTransition,
};
pub use projection::{project_earnings, EarningsProjection, ProjectedLevel, PROJECTION_FAN_OUT};
pub use qualification::{
    QualificationEvaluator, QualificationMethod, QualificationOutcome, QualificationPolicy,
    QualificationRegistry, QualificationReport, QualificationStatus, StatusSnapshot,
};
pub use rate_table::{RateTable, RateTableBuilder, RateTableConfig, RateTableVersion};

/// Re-export the shared primitives so downstream crates need one import
pub use lib_types::{
    Amount, Bps, MemberId, PackageTier, RewardBreakdown, RewardType, TargetType, Timestamp,
    MAX_REWARD_LEVEL,
};
