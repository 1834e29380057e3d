//! Per-epoch vote counts and the point-weighted reward share derived from them.
//!
//! Points are never stored: `total_points` is recomputed from the ledger's
//! voting power every time, so withdrawals made after a vote are reflected
//! without any bookkeeping here.

use std::collections::BTreeMap;

use log::debug;
use stakegov_shared_types::{precision, Address, Amount, Epoch};

use crate::fixed_point::mul_div;
use crate::stake_ledger::StakeLedger;

#[derive(Debug, Clone, Default)]
pub struct RewardAccounting {
    vote_counts: BTreeMap<Epoch, BTreeMap<Address, u64>>,
}

impl RewardAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more distinct campaign voted on by `staker` in `epoch`.
    /// Callers only invoke this on a staker's first vote for a campaign.
    pub fn on_vote_cast(&mut self, staker: Address, epoch: Epoch) {
        let count = self.vote_counts.entry(epoch).or_default().entry(staker).or_insert(0);
        *count += 1;
        debug!("rewards: {} has {} vote(s) in epoch {}", staker, count, epoch);
    }

    pub fn vote_count(&self, staker: Address, epoch: Epoch) -> u64 {
        self.vote_counts
            .get(&epoch)
            .and_then(|counts| counts.get(&staker))
            .copied()
            .unwrap_or(0)
    }

    /// Stakers with at least one vote in `epoch`, in address order.
    pub fn voters(&self, epoch: Epoch) -> impl Iterator<Item = (&Address, &u64)> {
        self.vote_counts.get(&epoch).into_iter().flatten()
    }

    fn points(&self, ledger: &StakeLedger, staker: Address, epoch: Epoch) -> Amount {
        Amount::from(self.vote_count(staker, epoch)) * ledger.total_voting_power(staker, epoch)
    }

    /// `Σ vote_count * voting_power` over every voter of `epoch`.
    pub fn total_points(&self, ledger: &StakeLedger, epoch: Epoch) -> Amount {
        self.voters(epoch)
            .fold(Amount::zero(), |total, (staker, _)| total + self.points(ledger, *staker, epoch))
    }

    /// Share of `epoch`'s points earned by `staker`, in precision. Zero when
    /// the staker did not vote or nobody holds any points.
    pub fn reward_percentage(&self, ledger: &StakeLedger, staker: Address, epoch: Epoch) -> Amount {
        let points = self.points(ledger, staker, epoch);
        if points.is_zero() {
            return Amount::zero();
        }
        share_in_precision(points, self.total_points(ledger, epoch))
    }

    pub fn current_reward_percentage(&self, ledger: &StakeLedger, staker: Address, current: Epoch) -> Amount {
        self.reward_percentage(ledger, staker, current)
    }

    /// Reward share of a closed epoch. Epochs that are not yet over give 0.
    pub fn past_reward_percentage(
        &self,
        ledger: &StakeLedger,
        staker: Address,
        epoch: Epoch,
        current: Epoch,
    ) -> Amount {
        if epoch >= current {
            return Amount::zero();
        }
        self.reward_percentage(ledger, staker, epoch)
    }
}

/// `points / total` in precision. Points above the total are inconsistent
/// accounting and earn nothing.
fn share_in_precision(points: Amount, total: Amount) -> Amount {
    if total.is_zero() || points > total {
        return Amount::zero();
    }
    mul_div(points, precision(), total).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staked(stakes: &[(&str, u64)]) -> (StakeLedger, Vec<Address>) {
        let mut ledger = StakeLedger::new();
        let mut addresses = Vec::new();
        for (label, amount) in stakes {
            let staker = Address::derive(label);
            ledger.deposit(staker, Amount::from(*amount), 1).unwrap();
            addresses.push(staker);
        }
        (ledger, addresses)
    }

    #[test]
    fn test_no_votes_no_points() {
        let (ledger, stakers) = staked(&[("a", 100)]);
        let rewards = RewardAccounting::new();
        assert_eq!(rewards.total_points(&ledger, 1), Amount::zero());
        assert_eq!(rewards.reward_percentage(&ledger, stakers[0], 1), Amount::zero());
    }

    #[test]
    fn test_points_weight_vote_count_by_power() {
        let (ledger, stakers) = staked(&[("a", 100), ("b", 300)]);
        let mut rewards = RewardAccounting::new();
        rewards.on_vote_cast(stakers[0], 1);
        rewards.on_vote_cast(stakers[0], 1);
        rewards.on_vote_cast(stakers[1], 1);

        assert_eq!(rewards.vote_count(stakers[0], 1), 2);
        assert_eq!(rewards.total_points(&ledger, 1), Amount::from(500u64));
        let a = rewards.reward_percentage(&ledger, stakers[0], 1);
        let b = rewards.reward_percentage(&ledger, stakers[1], 1);
        assert_eq!(a, precision() * Amount::from(2u64) / Amount::from(5u64));
        assert_eq!(b, precision() * Amount::from(3u64) / Amount::from(5u64));
        assert_eq!(a + b, precision());
    }

    #[test]
    fn test_voter_without_power_earns_nothing() {
        let (mut ledger, stakers) = staked(&[("a", 100), ("b", 100)]);
        let rep = stakers[1];
        ledger.delegate(stakers[0], rep, 1).unwrap();
        let mut rewards = RewardAccounting::new();
        rewards.on_vote_cast(stakers[0], 1);
        rewards.on_vote_cast(rep, 1);
        assert_eq!(rewards.reward_percentage(&ledger, stakers[0], 1), Amount::zero());
        assert_eq!(rewards.reward_percentage(&ledger, rep, 1), precision());
    }

    #[test]
    fn test_share_is_zero_when_points_exceed_total() {
        let total = Amount::from(400u64);
        assert_eq!(share_in_precision(Amount::from(100u64), total), precision() / 4);
        assert_eq!(share_in_precision(total, total), precision());
        assert_eq!(share_in_precision(Amount::from(401u64), total), Amount::zero());
        assert_eq!(share_in_precision(Amount::one(), Amount::zero()), Amount::zero());
    }

    #[test]
    fn test_past_variant_ignores_open_epochs() {
        let (ledger, stakers) = staked(&[("a", 100)]);
        let mut rewards = RewardAccounting::new();
        rewards.on_vote_cast(stakers[0], 1);
        assert_eq!(rewards.current_reward_percentage(&ledger, stakers[0], 1), precision());
        assert_eq!(rewards.past_reward_percentage(&ledger, stakers[0], 1, 1), Amount::zero());
        assert_eq!(rewards.past_reward_percentage(&ledger, stakers[0], 1, 2), precision());
    }
}
