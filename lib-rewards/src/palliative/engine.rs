//! Palliative engine: accounts over a pool ledger
//!
//! Every read-modify-write for a member (ledger credit, then state advance)
//! runs under that member's mutex. Different members proceed in parallel;
//! the outer map lock is only held to find or create an account slot.

use super::{MaturityRecord, PalliativeAccount, PalliativeConfig, PalliativeState, StateTransition};
use crate::errors::{RewardError, RewardResult};
use crate::ledger::{PoolLedger, ReferralCredit};
use lib_types::{Amount, MemberId, TargetType, Timestamp};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of applying one referral credit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditOutcome {
    pub member: MemberId,
    pub event_id: String,
    /// False when the ledger had already seen this event
    pub applied: bool,
    pub balance: Amount,
    pub state: PalliativeState,
    pub transition: Option<StateTransition>,
}

/// Result of a maturity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityCheck {
    pub matured: bool,
    pub state: PalliativeState,
    pub record: Option<MaturityRecord>,
}

type AccountSlot = Arc<Mutex<PalliativeAccount>>;

/// Accumulation engine
pub struct PalliativeEngine<L: PoolLedger> {
    config: PalliativeConfig,
    ledger: L,
    accounts: RwLock<HashMap<MemberId, AccountSlot>>,
}

impl<L: PoolLedger> PalliativeEngine<L> {
    pub fn new(config: PalliativeConfig, ledger: L) -> Self {
        Self {
            config,
            ledger,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PalliativeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Apply a referral credit to the member's pool
    ///
    /// Replayed events leave the balance and state unchanged.
    pub fn record_credit(&self, credit: &ReferralCredit) -> RewardResult<CreditOutcome> {
        if credit.amount == 0 {
            return Err(RewardError::InvalidInput(
                "credit amount must be positive".to_string(),
            ));
        }

        let slot = self.slot(credit.member)?;
        let mut account = slot.lock();

        if !account.accepts_credits() {
            return Err(RewardError::InvalidTransition {
                state: account.state,
                action: "credit",
            });
        }

        let receipt = self
            .ledger
            .credit_pool(credit.member, &credit.event_id, credit.amount)?;
        let transition = match account.observe_balance(receipt.balance) {
            Ok(transition) => transition,
            Err(err) => {
                // The ledger keeps the credit; the account stays at its last good state
                error!(
                    member = %credit.member,
                    event_id = %credit.event_id,
                    known = account.current_balance,
                    reported = receipt.balance,
                    error = %err,
                    "pool credited but palliative account not advanced"
                );
                return Err(err);
            }
        };

        if let Some(t) = transition {
            info!(
                member = %credit.member,
                from = %t.from,
                to = %t.to,
                balance = receipt.balance,
                "palliative state advanced"
            );
        } else {
            debug!(
                member = %credit.member,
                event_id = %credit.event_id,
                applied = receipt.applied,
                balance = receipt.balance,
                "pool credit recorded"
            );
        }

        Ok(CreditOutcome {
            member: credit.member,
            event_id: credit.event_id.clone(),
            applied: receipt.applied,
            balance: receipt.balance,
            state: account.state,
            transition,
        })
    }

    /// Select the accumulation target using the configured amount
    pub fn select_target(
        &self,
        member: MemberId,
        target: TargetType,
    ) -> RewardResult<Vec<StateTransition>> {
        let amount = self
            .config
            .target_amount(target)
            .ok_or(RewardError::UnknownTarget(target))?;

        let slot = self.slot(member)?;
        let mut account = slot.lock();
        let transitions = account.select_target(target, amount)?;

        info!(
            member = %member,
            target = %target,
            target_amount = amount,
            balance = account.current_balance,
            state = %account.state,
            "palliative target selected"
        );
        Ok(transitions)
    }

    /// Explicit maturity check; a negative answer is not an error
    pub fn check_maturity(&self, member: MemberId, now: Timestamp) -> RewardResult<MaturityCheck> {
        let slot = self.slot(member)?;
        let mut account = slot.lock();
        let was_matured = account.state == PalliativeState::Matured;
        let matured = account.check_maturity(now)?;

        if matured && !was_matured {
            info!(
                member = %member,
                balance = account.current_balance,
                matured_at = now,
                "palliative account matured"
            );
        }

        Ok(MaturityCheck {
            matured,
            state: account.state,
            record: account.maturity.clone(),
        })
    }

    /// Copy of the member's account
    pub fn account(&self, member: MemberId) -> RewardResult<PalliativeAccount> {
        let slot = self.slot(member)?;
        let account = slot.lock().clone();
        Ok(account)
    }

    /// Every maturity record emitted so far, ordered by member
    pub fn maturity_records(&self) -> Vec<MaturityRecord> {
        let slots: Vec<AccountSlot> = self.accounts.read().values().cloned().collect();
        let mut records: Vec<MaturityRecord> = slots
            .iter()
            .filter_map(|slot| slot.lock().maturity.clone())
            .collect();
        records.sort_by_key(|r| r.member);
        records
    }

    fn slot(&self, member: MemberId) -> RewardResult<AccountSlot> {
        if let Some(slot) = self.accounts.read().get(&member) {
            return Ok(Arc::clone(slot));
        }

        // Seed from whatever the ledger already holds, read outside the map lock
        let opening = self.ledger.current_balance(member)?;

        let mut accounts = self.accounts.write();
        if let Some(slot) = accounts.get(&member) {
            return Ok(Arc::clone(slot));
        }

        let mut account = PalliativeAccount::new(member, self.config.threshold);
        if opening > 0 {
            account.observe_balance(opening)?;
        }

        let slot = Arc::new(Mutex::new(account));
        accounts.insert(member, Arc::clone(&slot));
        Ok(slot)
    }
}
