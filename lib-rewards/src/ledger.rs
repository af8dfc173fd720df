//! Pool sub-account ledger contract
//!
//! The wallet subsystem owns the pool balances; this engine only credits and
//! reads through [`PoolLedger`]. Credits must be idempotent per referral
//! event so that a retried delivery never double-credits.
//!
//! [`InMemoryPoolLedger`] is the reference implementation: an append-only
//! entry log with a separately maintained running balance per member.

use crate::errors::{RewardError, RewardResult};
use crate::rate_table::RateTable;
use lib_types::{Amount, MemberId, PackageTier};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Share of a referred package's price credited to the sponsor's pool (percent)
pub const POOL_CREDIT_PERCENT: u64 = 10;

/// Pool credit owed for a referred package of `price`
pub fn pool_credit_for_price(price: Amount) -> Amount {
    ((price as u128) * (POOL_CREDIT_PERCENT as u128) / 100) as Amount
}

/// One qualifying referral credit destined for a member's pool
///
/// The amount is fixed when the event is created, at the rate in effect
/// then; later package or rate changes never rewrite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralCredit {
    /// Idempotency key supplied by the referral event source
    pub event_id: String,
    pub member: MemberId,
    pub amount: Amount,
    #[serde(default)]
    pub referred_package: Option<PackageTier>,
}

impl ReferralCredit {
    pub fn new(event_id: impl Into<String>, member: MemberId, amount: Amount) -> Self {
        Self {
            event_id: event_id.into(),
            member,
            amount,
            referred_package: None,
        }
    }

    /// Credit sized by the pool credit policy from the referred package's catalog price
    pub fn for_package(
        event_id: impl Into<String>,
        member: MemberId,
        referred_package: PackageTier,
        rates: &RateTable,
    ) -> RewardResult<Self> {
        let price = rates.price(referred_package).ok_or_else(|| {
            RewardError::Config(format!("no catalog price for package {}", referred_package))
        })?;
        Ok(Self {
            event_id: event_id.into(),
            member,
            amount: pool_credit_for_price(price),
            referred_package: Some(referred_package),
        })
    }
}

/// Ledger answer to a credit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditReceipt {
    /// Balance after the request
    pub balance: Amount,
    /// False when the event had already been applied (replay)
    pub applied: bool,
}

/// Read/write interface over pool sub-accounts
///
/// Reported balances must never decrease. If a credit comes back with a
/// balance below what the engine last saw, the credit stays on the ledger
/// but the engine refuses it with `BalanceRegression` and logs the split.
pub trait PoolLedger: Send + Sync {
    /// Credit `amount` for `event_id`; replays of the same event are no-ops
    fn credit_pool(&self, member: MemberId, event_id: &str, amount: Amount) -> RewardResult<CreditReceipt>;

    fn current_balance(&self, member: MemberId) -> RewardResult<Amount>;
}

impl<L: PoolLedger + ?Sized> PoolLedger for Arc<L> {
    fn credit_pool(&self, member: MemberId, event_id: &str, amount: Amount) -> RewardResult<CreditReceipt> {
        (**self).credit_pool(member, event_id, amount)
    }

    fn current_balance(&self, member: MemberId) -> RewardResult<Amount> {
        (**self).current_balance(member)
    }
}

/// Append-only ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub member: MemberId,
    pub event_id: String,
    pub amount: Amount,
    pub balance_after: Amount,
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: Vec<LedgerEntry>,
    balances: HashMap<MemberId, Amount>,
    applied: HashSet<(MemberId, String)>,
}

/// In-memory pool ledger
#[derive(Debug, Default)]
pub struct InMemoryPoolLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryPoolLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for one member in application order
    pub fn entries(&self, member: MemberId) -> Vec<LedgerEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.member == member)
            .cloned()
            .collect()
    }
}

impl PoolLedger for InMemoryPoolLedger {
    fn credit_pool(&self, member: MemberId, event_id: &str, amount: Amount) -> RewardResult<CreditReceipt> {
        let mut state = self.state.lock();
        let current = state.balances.get(&member).copied().unwrap_or(0);

        let key = (member, event_id.to_string());
        if state.applied.contains(&key) {
            debug!(member = %member, event_id, "pool credit already applied");
            return Ok(CreditReceipt {
                balance: current,
                applied: false,
            });
        }

        let balance = current.checked_add(amount).ok_or(RewardError::Overflow)?;
        state.applied.insert(key);
        state.balances.insert(member, balance);
        state.entries.push(LedgerEntry {
            member,
            event_id: event_id.to_string(),
            amount,
            balance_after: balance,
        });

        Ok(CreditReceipt {
            balance,
            applied: true,
        })
    }

    fn current_balance(&self, member: MemberId) -> RewardResult<Amount> {
        Ok(self.state.lock().balances.get(&member).copied().unwrap_or(0))
    }
}
