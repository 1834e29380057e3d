//! Staking contract: per-epoch stake and delegation records, written lazily.
//!
//! Storage mirrors the deployed contract: a `has_inited` flag per
//! `(epoch, staker)`, the per-epoch records themselves, and a `latest` record
//! per staker that always reflects every queued change. An action in epoch `n`
//! initializes epochs `n` and `n + 1` from `latest` the first time it touches a
//! staker, then edits the `n + 1` record (or `n` for withdrawals).

use std::collections::{HashMap, HashSet};

use log::trace;
use stakegov_shared_types::{Address, Amount, Epoch, StakerData};

use crate::error::{require, ContractResult};
use crate::fault::Fault;

/// Stake taken away from the current epoch by a withdrawal. The DAO uses it
/// to correct the votes the representative already cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalReduction {
    pub representative: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, Copy, Default)]
struct Record {
    stake: Amount,
    delegated_stake: Amount,
    /// `Address::ZERO` until the staker first delegates; reads map it to the
    /// staker itself.
    representative: Address,
}

impl Record {
    fn representative_of(&self, staker: Address) -> Address {
        if self.representative.is_zero() {
            staker
        } else {
            self.representative
        }
    }

    fn to_data(self, staker: Address) -> StakerData {
        StakerData {
            stake: self.stake,
            delegated_stake: self.delegated_stake,
            representative: self.representative_of(staker),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StakingContract {
    has_inited: HashSet<(Epoch, Address)>,
    staker_per_epoch_data: HashMap<(Epoch, Address), Record>,
    latest_staker_data: HashMap<Address, Record>,
    fault: Option<Fault>,
}

impl StakingContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
    }

    /// Books a deposit made during `cur_epoch`. The token transfer has already
    /// succeeded.
    pub fn deposit(&mut self, staker: Address, amount: Amount, cur_epoch: Epoch) -> ContractResult<()> {
        self.init_data_if_needed(staker, cur_epoch);
        let next = self.record_mut(cur_epoch + 1, staker);
        next.stake += amount;
        let representative = next.representative_of(staker);
        self.latest_mut(staker).stake += amount;

        if representative != staker && self.fault != Some(Fault::IgnoreDelegatedDeposit) {
            self.init_data_if_needed(representative, cur_epoch);
            self.record_mut(cur_epoch + 1, representative).delegated_stake += amount;
            self.latest_mut(representative).delegated_stake += amount;
        }
        trace!("staking: deposit {} by {} at epoch {}", amount, staker, cur_epoch);
        Ok(())
    }

    /// Books a withdrawal made during `cur_epoch` and returns what it removed
    /// from the current epoch, if anything.
    pub fn withdraw(
        &mut self,
        staker: Address,
        amount: Amount,
        cur_epoch: Epoch,
    ) -> ContractResult<Option<WithdrawalReduction>> {
        require(!amount.is_zero(), "withdraw: amount is 0")?;
        let latest = self.latest_record(staker);
        require(latest.stake >= amount, "withdraw: latest amount staked < withdrawal amount")?;

        self.init_data_if_needed(staker, cur_epoch);
        let remaining = latest.stake - amount;
        self.record_mut(cur_epoch + 1, staker).stake = remaining;

        let latest_representative = latest.representative_of(staker);
        if latest_representative != staker {
            self.init_data_if_needed(latest_representative, cur_epoch);
            let delegated = self
                .latest_record(latest_representative)
                .delegated_stake
                .saturating_sub(amount);
            self.record_mut(cur_epoch + 1, latest_representative).delegated_stake = delegated;
            self.latest_mut(latest_representative).delegated_stake = delegated;
        }

        let current = self.record(cur_epoch, staker);
        let representative = current.representative_of(staker);
        let new_stake = current.stake.min(remaining);
        let reduce_amount = current.stake - new_stake;
        let mut reduction = None;
        if !reduce_amount.is_zero() {
            if representative != staker {
                self.init_data_if_needed(representative, cur_epoch);
                let rep = self.record_mut(cur_epoch, representative);
                rep.delegated_stake = rep.delegated_stake.saturating_sub(reduce_amount);
            }
            self.record_mut(cur_epoch, staker).stake = new_stake;
            reduction = Some(WithdrawalReduction {
                representative,
                amount: reduce_amount,
            });
        }
        self.latest_mut(staker).stake = remaining;
        trace!("staking: withdraw {} by {} at epoch {}", amount, staker, cur_epoch);
        Ok(reduction)
    }

    pub fn delegate(&mut self, staker: Address, new_representative: Address, cur_epoch: Epoch) -> ContractResult<()> {
        require(!new_representative.is_zero(), "delegate: representative 0")?;
        self.init_data_if_needed(staker, cur_epoch);

        let next = self.record(cur_epoch + 1, staker);
        let old_representative = next.representative_of(staker);
        if old_representative == new_representative {
            return Ok(());
        }
        let stake = next.stake;

        if old_representative != staker {
            self.init_data_if_needed(old_representative, cur_epoch);
            let old = self.record_mut(cur_epoch + 1, old_representative);
            old.delegated_stake = old.delegated_stake.saturating_sub(stake);
            let latest = self.latest_mut(old_representative);
            latest.delegated_stake = latest.delegated_stake.saturating_sub(stake);
        }

        self.record_mut(cur_epoch + 1, staker).representative = new_representative;
        self.latest_mut(staker).representative = new_representative;

        if new_representative != staker {
            self.init_data_if_needed(new_representative, cur_epoch);
            self.record_mut(cur_epoch + 1, new_representative).delegated_stake += stake;
            self.latest_mut(new_representative).delegated_stake += stake;
        }
        trace!("staking: {} delegates to {} at epoch {}", staker, new_representative, cur_epoch);
        Ok(())
    }

    /// Initializes the staker for `cur_epoch` and returns its record, the way
    /// the DAO reads voting power when a vote is cast.
    pub fn init_and_return_staker_data_for_current_epoch(&mut self, staker: Address, cur_epoch: Epoch) -> StakerData {
        self.init_data_if_needed(staker, cur_epoch);
        self.record(cur_epoch, staker).to_data(staker)
    }

    /// Record of `staker` at `epoch`, walking back to the last initialized
    /// epoch. Epochs beyond `cur_epoch + 1` read as all zeroes.
    pub fn get_staker_data(&self, staker: Address, epoch: Epoch, cur_epoch: Epoch) -> StakerData {
        if epoch > cur_epoch + 1 {
            return StakerData {
                stake: Amount::zero(),
                delegated_stake: Amount::zero(),
                representative: Address::ZERO,
            };
        }
        (0..=epoch)
            .rev()
            .find(|e| self.has_inited(staker, *e))
            .map(|e| self.record(e, staker).to_data(staker))
            .unwrap_or_else(|| StakerData::genesis(staker))
    }

    /// Record stored for exactly `epoch`, without walking back.
    pub fn get_staker_raw_data(&self, staker: Address, epoch: Epoch) -> StakerData {
        self.record(epoch, staker).to_data(staker)
    }

    pub fn get_latest_staker_data(&self, staker: Address) -> StakerData {
        self.latest_record(staker).to_data(staker)
    }

    pub fn has_inited(&self, staker: Address, epoch: Epoch) -> bool {
        self.has_inited.contains(&(epoch, staker))
    }

    fn init_data_if_needed(&mut self, staker: Address, epoch: Epoch) {
        let latest = self.latest_record(staker);
        for e in [epoch, epoch + 1] {
            if self.has_inited.insert((e, staker)) {
                self.staker_per_epoch_data.insert((e, staker), latest);
            }
        }
    }

    fn record(&self, epoch: Epoch, staker: Address) -> Record {
        self.staker_per_epoch_data
            .get(&(epoch, staker))
            .copied()
            .unwrap_or_default()
    }

    fn record_mut(&mut self, epoch: Epoch, staker: Address) -> &mut Record {
        self.staker_per_epoch_data.entry((epoch, staker)).or_default()
    }

    fn latest_record(&self, staker: Address) -> Record {
        self.latest_staker_data.get(&staker).copied().unwrap_or_default()
    }

    fn latest_mut(&mut self, staker: Address) -> &mut Record {
        self.latest_staker_data.entry(staker).or_default()
    }
}
