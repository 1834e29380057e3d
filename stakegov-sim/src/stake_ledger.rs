//! Per-staker, per-epoch stake and delegation state with lazy carry-forward.
//!
//! A snapshot is only written for an epoch in which the staker (or someone
//! delegating to it) acted. Reads of an epoch without a snapshot fall back to
//! the most recent earlier one, or to the genesis record. Writes only ever
//! target the current epoch or the one after it.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use stakegov_shared_types::{Address, Amount, Epoch, RejectReason, StakerData};

/// What a withdrawal took away from the epoch it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalEffect {
    /// Representative of the staker in the current epoch; the address whose
    /// cast votes carried the withdrawn stake.
    pub representative: Address,
    /// Amount removed from the current epoch's stake. Zero when the withdrawal
    /// was covered by stake that only counts from the next epoch.
    pub reduced: Amount,
}

#[derive(Debug, Clone, Default)]
struct StakerRecord {
    snapshots: BTreeMap<Epoch, StakerData>,
}

#[derive(Debug, Clone, Default)]
pub struct StakeLedger {
    records: HashMap<Address, StakerRecord>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the staker's stake from `at_epoch` on, and to the
    /// delegated stake of its representative at `at_epoch` if that is someone
    /// else.
    pub fn deposit(&mut self, staker: Address, amount: Amount, at_epoch: Epoch) -> Result<(), RejectReason> {
        if amount.is_zero() {
            return Err(RejectReason::InvalidAmount);
        }
        let current = at_epoch.saturating_sub(1);
        self.touch(staker, current);

        let entry = self.snapshot_mut(staker, at_epoch);
        entry.stake += amount;
        let representative = entry.representative;

        if representative != staker {
            self.touch(representative, current);
            self.snapshot_mut(representative, at_epoch).delegated_stake += amount;
        }
        debug!("ledger: deposit {} by {} effective epoch {}", amount, staker, at_epoch);
        Ok(())
    }

    /// Withdraws `amount` during `at_epoch`, the current epoch.
    ///
    /// The next epoch loses the full amount. The current epoch keeps
    /// `min(current stake, remaining stake)`; whatever that takes away is
    /// reported so cast votes can be corrected.
    pub fn withdraw(&mut self, staker: Address, amount: Amount, at_epoch: Epoch) -> Result<WithdrawalEffect, RejectReason> {
        if amount.is_zero() {
            return Err(RejectReason::InvalidAmount);
        }
        if self.latest(staker).stake < amount {
            return Err(RejectReason::InsufficientStake);
        }
        let next = at_epoch + 1;
        self.touch(staker, at_epoch);

        let entry = self.snapshot_mut(staker, next);
        entry.stake = entry.stake.saturating_sub(amount);
        let (remaining, next_representative) = (entry.stake, entry.representative);

        if next_representative != staker {
            self.touch(next_representative, at_epoch);
            let rep = self.snapshot_mut(next_representative, next);
            rep.delegated_stake = rep.delegated_stake.saturating_sub(amount);
        }

        let current = self.resolved(staker, at_epoch);
        let kept = current.stake.min(remaining);
        let reduced = current.stake - kept;
        if !reduced.is_zero() {
            if current.representative != staker {
                self.touch(current.representative, at_epoch);
                let rep = self.snapshot_mut(current.representative, at_epoch);
                rep.delegated_stake = rep.delegated_stake.saturating_sub(reduced);
            }
            self.snapshot_mut(staker, at_epoch).stake = kept;
        }
        debug!(
            "ledger: withdraw {} by {} in epoch {}, current epoch reduced by {}",
            amount, staker, at_epoch, reduced
        );
        Ok(WithdrawalEffect {
            representative: current.representative,
            reduced,
        })
    }

    /// Points the staker's voting power at `new_representative` from
    /// `at_epoch` on. Re-delegating to the current representative is a no-op.
    pub fn delegate(&mut self, staker: Address, new_representative: Address, at_epoch: Epoch) -> Result<(), RejectReason> {
        if new_representative.is_zero() {
            return Err(RejectReason::ZeroAddress);
        }
        let current = at_epoch.saturating_sub(1);
        self.touch(staker, current);

        let data = self.resolved(staker, at_epoch);
        if data.representative == new_representative {
            return Ok(());
        }

        if data.representative != staker {
            self.touch(data.representative, current);
            let old = self.snapshot_mut(data.representative, at_epoch);
            old.delegated_stake = old.delegated_stake.saturating_sub(data.stake);
        }

        self.snapshot_mut(staker, at_epoch).representative = new_representative;

        if new_representative != staker {
            self.touch(new_representative, current);
            self.snapshot_mut(new_representative, at_epoch).delegated_stake += data.stake;
        }
        debug!(
            "ledger: {} delegates to {} from epoch {} (was {})",
            staker, new_representative, at_epoch, data.representative
        );
        Ok(())
    }

    /// Record in force for `staker` at `epoch`.
    pub fn resolved(&self, staker: Address, epoch: Epoch) -> StakerData {
        if epoch == 0 {
            return StakerData::genesis(staker);
        }
        self.records
            .get(&staker)
            .and_then(|record| record.snapshots.range(..=epoch).next_back())
            .map(|(_, data)| *data)
            .unwrap_or_else(|| StakerData::genesis(staker))
    }

    pub fn resolved_stake(&self, staker: Address, epoch: Epoch) -> Amount {
        self.resolved(staker, epoch).stake
    }

    pub fn resolved_delegated_received(&self, staker: Address, epoch: Epoch) -> Amount {
        self.resolved(staker, epoch).delegated_stake
    }

    pub fn resolved_representative(&self, staker: Address, epoch: Epoch) -> Address {
        self.resolved(staker, epoch).representative
    }

    pub fn total_voting_power(&self, staker: Address, epoch: Epoch) -> Amount {
        self.resolved(staker, epoch).voting_power(staker)
    }

    /// The newest record written for `staker`.
    pub fn latest(&self, staker: Address) -> StakerData {
        self.records
            .get(&staker)
            .and_then(|record| record.snapshots.values().next_back())
            .copied()
            .unwrap_or_else(|| StakerData::genesis(staker))
    }

    pub fn has_snapshot(&self, staker: Address, epoch: Epoch) -> bool {
        self.records
            .get(&staker)
            .map_or(false, |record| record.snapshots.contains_key(&epoch))
    }

    /// Every address the ledger holds a record for, in no particular order.
    pub fn stakers(&self) -> impl Iterator<Item = &Address> {
        self.records.keys()
    }

    /// Materializes `epoch` and `epoch + 1` from their carried-forward values,
    /// so later writes to one of them cannot leak into the other.
    pub fn touch(&mut self, staker: Address, epoch: Epoch) {
        self.snapshot_mut(staker, epoch);
        self.snapshot_mut(staker, epoch + 1);
    }

    fn snapshot_mut(&mut self, staker: Address, epoch: Epoch) -> &mut StakerData {
        let carried = self.resolved(staker, epoch);
        self.records
            .entry(staker)
            .or_default()
            .snapshots
            .entry(epoch)
            .or_insert(carried)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(v: u64) -> Amount {
        Amount::from(v)
    }

    #[test]
    fn test_deposit_without_delegation() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        ledger.deposit(staker, amount(100), 1).unwrap();

        assert_eq!(ledger.resolved_stake(staker, 1), amount(100));
        assert_eq!(ledger.total_voting_power(staker, 1), amount(100));
        assert_eq!(ledger.resolved_representative(staker, 1), staker);
    }

    #[test]
    fn test_deposit_after_delegation_credits_representative() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        let rep = Address::derive("r");
        ledger.delegate(staker, rep, 1).unwrap();
        let before = ledger.resolved_delegated_received(rep, 1);
        ledger.deposit(staker, amount(50), 1).unwrap();

        assert_eq!(ledger.resolved_delegated_received(rep, 1), before + amount(50));
        assert_eq!(ledger.total_voting_power(staker, 1), Amount::zero());
        assert_eq!(ledger.total_voting_power(rep, 1), amount(50));
    }

    #[test]
    fn test_deposit_zero_is_rejected() {
        let mut ledger = StakeLedger::new();
        assert_eq!(
            ledger.deposit(Address::derive("s"), Amount::zero(), 1),
            Err(RejectReason::InvalidAmount)
        );
    }

    #[test]
    fn test_carry_forward_reads_last_written_epoch() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        ledger.deposit(staker, amount(70), 3).unwrap();

        assert_eq!(ledger.resolved_stake(staker, 2), Amount::zero());
        for epoch in 3..10 {
            assert_eq!(ledger.resolved_stake(staker, epoch), amount(70));
        }
        assert!(!ledger.has_snapshot(staker, 7));
        assert_eq!(ledger.resolved_stake(staker, 0), Amount::zero());
    }

    #[test]
    fn test_withdraw_only_hits_current_epoch_beyond_new_deposits() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        ledger.deposit(staker, amount(100), 1).unwrap();
        // in epoch 1, deposit 40 more that only counts from epoch 2
        ledger.deposit(staker, amount(40), 2).unwrap();

        let effect = ledger.withdraw(staker, amount(30), 1).unwrap();
        assert_eq!(effect.reduced, Amount::zero());
        assert_eq!(ledger.resolved_stake(staker, 1), amount(100));
        assert_eq!(ledger.resolved_stake(staker, 2), amount(110));

        let effect = ledger.withdraw(staker, amount(60), 1).unwrap();
        assert_eq!(effect.reduced, amount(50));
        assert_eq!(effect.representative, staker);
        assert_eq!(ledger.resolved_stake(staker, 1), amount(50));
        assert_eq!(ledger.latest(staker).stake, amount(50));
    }

    #[test]
    fn test_withdraw_more_than_latest_stake_is_rejected() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        ledger.deposit(staker, amount(10), 1).unwrap();
        assert_eq!(ledger.withdraw(staker, amount(11), 1), Err(RejectReason::InsufficientStake));
        assert_eq!(ledger.withdraw(staker, Amount::zero(), 1), Err(RejectReason::InvalidAmount));
    }

    #[test]
    fn test_withdraw_reduces_current_representative() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        let rep = Address::derive("r");
        ledger.deposit(staker, amount(100), 1).unwrap();
        ledger.delegate(staker, rep, 1).unwrap();

        let effect = ledger.withdraw(staker, amount(25), 1).unwrap();
        assert_eq!(effect.representative, rep);
        assert_eq!(effect.reduced, amount(25));
        assert_eq!(ledger.resolved_delegated_received(rep, 1), amount(75));
        assert_eq!(ledger.resolved_delegated_received(rep, 2), amount(75));
    }

    #[test]
    fn test_delegation_moves_between_representatives_next_epoch_only() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        let first = Address::derive("r1");
        let second = Address::derive("r2");
        ledger.deposit(staker, amount(100), 1).unwrap();
        ledger.delegate(staker, first, 1).unwrap();
        // epoch 1 is now the current epoch; re-delegation lands on epoch 2
        ledger.delegate(staker, second, 2).unwrap();

        assert_eq!(ledger.resolved_delegated_received(first, 1), amount(100));
        assert_eq!(ledger.resolved_delegated_received(first, 2), Amount::zero());
        assert_eq!(ledger.resolved_delegated_received(second, 1), Amount::zero());
        assert_eq!(ledger.resolved_delegated_received(second, 2), amount(100));
        assert_eq!(ledger.resolved_representative(staker, 1), first);
        assert_eq!(ledger.resolved_representative(staker, 2), second);
    }

    #[test]
    fn test_delegate_back_to_self_and_noop() {
        let mut ledger = StakeLedger::new();
        let staker = Address::derive("s");
        let rep = Address::derive("r");
        ledger.deposit(staker, amount(10), 1).unwrap();
        ledger.delegate(staker, staker, 1).unwrap();
        assert_eq!(ledger.total_voting_power(staker, 1), amount(10));

        ledger.delegate(staker, rep, 1).unwrap();
        ledger.delegate(staker, staker, 1).unwrap();
        assert_eq!(ledger.resolved_delegated_received(rep, 1), Amount::zero());
        assert_eq!(ledger.total_voting_power(staker, 1), amount(10));
        assert_eq!(ledger.delegate(staker, Address::ZERO, 1), Err(RejectReason::ZeroAddress));
    }
}
