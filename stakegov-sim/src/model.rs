//! The reference model: ledger, registry and reward accounting wired together
//! the way the protocol wires its staking, DAO and token contracts.

use std::collections::BTreeMap;

use stakegov_shared_types::{
    Address, Amount, BrrData, CampaignId, CampaignParams, Epoch, EpochClock, NetworkFeeData,
    RejectReason, StakerData, Timestamp, WinningOption,
};

use crate::campaign_registry::{CampaignRegistry, CampaignRules, InitialParameters, VoteOutcome};
use crate::reward_accounting::RewardAccounting;
use crate::stake_ledger::{StakeLedger, WithdrawalEffect};

#[derive(Debug, Clone)]
pub struct ReferenceModel {
    clock: EpochClock,
    ledger: StakeLedger,
    registry: CampaignRegistry,
    rewards: RewardAccounting,
    wallets: BTreeMap<Address, Amount>,
    total_supply: Amount,
}

impl ReferenceModel {
    pub fn new(clock: EpochClock, rules: CampaignRules, initial: InitialParameters) -> Self {
        Self {
            clock,
            ledger: StakeLedger::new(),
            registry: CampaignRegistry::new(clock, rules, initial),
            rewards: RewardAccounting::new(),
            wallets: BTreeMap::new(),
            total_supply: Amount::zero(),
        }
    }

    /// Mints `amount` tokens to `holder`. Every minted token counts towards
    /// the supply that campaigns snapshot as total voting power.
    pub fn fund(&mut self, holder: Address, amount: Amount) {
        *self.wallets.entry(holder).or_default() += amount;
        self.total_supply += amount;
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    pub fn epoch_at(&self, now: Timestamp) -> Epoch {
        self.clock.epoch_at(now)
    }

    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &CampaignRegistry {
        &self.registry
    }

    pub fn rewards(&self) -> &RewardAccounting {
        &self.rewards
    }

    pub fn balance_of(&self, holder: Address) -> Amount {
        self.wallets.get(&holder).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn check_deposit(&self, staker: Address, amount: Amount) -> Result<(), RejectReason> {
        if amount.is_zero() {
            return Err(RejectReason::InvalidAmount);
        }
        if amount > self.balance_of(staker) {
            return Err(RejectReason::InsufficientBalance);
        }
        Ok(())
    }

    pub fn check_withdraw(&self, staker: Address, amount: Amount) -> Result<(), RejectReason> {
        if amount.is_zero() {
            return Err(RejectReason::InvalidAmount);
        }
        if amount > self.ledger.latest(staker).stake {
            return Err(RejectReason::InsufficientStake);
        }
        Ok(())
    }

    pub fn check_delegate(&self, representative: Address) -> Result<(), RejectReason> {
        if representative.is_zero() {
            return Err(RejectReason::ZeroAddress);
        }
        Ok(())
    }

    /// Moves `amount` from the staker's wallet into stake that counts from
    /// the next epoch.
    pub fn deposit(&mut self, staker: Address, amount: Amount, now: Timestamp) -> Result<(), RejectReason> {
        self.check_deposit(staker, amount)?;
        self.ledger.deposit(staker, amount, self.epoch_at(now) + 1)?;
        if let Some(balance) = self.wallets.get_mut(&staker) {
            *balance -= amount;
        }
        Ok(())
    }

    /// Returns stake to the wallet and corrects votes cast this epoch with the
    /// withdrawn stake.
    pub fn withdraw(&mut self, staker: Address, amount: Amount, now: Timestamp) -> Result<WithdrawalEffect, RejectReason> {
        self.check_withdraw(staker, amount)?;
        let epoch = self.epoch_at(now);
        let effect = self.ledger.withdraw(staker, amount, epoch)?;
        *self.wallets.entry(staker).or_default() += amount;
        if !effect.reduced.is_zero() {
            self.registry
                .handle_withdrawal(effect.representative, effect.reduced, epoch, now);
        }
        Ok(effect)
    }

    pub fn delegate(&mut self, staker: Address, representative: Address, now: Timestamp) -> Result<(), RejectReason> {
        self.check_delegate(representative)?;
        self.ledger.delegate(staker, representative, self.epoch_at(now) + 1)
    }

    pub fn submit_campaign(&mut self, params: CampaignParams, now: Timestamp) -> Result<CampaignId, RejectReason> {
        self.registry.submit(params, self.total_supply, now)
    }

    pub fn cancel_campaign(&mut self, campaign_id: CampaignId, now: Timestamp) -> Result<(), RejectReason> {
        self.registry.cancel(campaign_id, now)
    }

    /// Casts `staker`'s current voting power on `option`.
    pub fn vote(
        &mut self,
        staker: Address,
        campaign_id: CampaignId,
        option: u64,
        now: Timestamp,
    ) -> Result<VoteOutcome, RejectReason> {
        let epoch = self.epoch_at(now);
        self.registry.validate_vote(campaign_id, option, now)?;
        self.ledger.touch(staker, epoch);
        let weight = self.ledger.total_voting_power(staker, epoch);
        let outcome = self.registry.vote(campaign_id, option, staker, weight, epoch, now)?;
        if outcome.first_vote {
            self.rewards.on_vote_cast(staker, epoch);
        }
        Ok(outcome)
    }

    /// Staker record for `epoch`. Epochs more than one past `current` are not
    /// written yet and read as empty, like the staking contract does.
    pub fn staker_data(&self, staker: Address, epoch: Epoch, current: Epoch) -> StakerData {
        if epoch > current + 1 {
            return StakerData {
                stake: Amount::zero(),
                delegated_stake: Amount::zero(),
                representative: Address::ZERO,
            };
        }
        self.ledger.resolved(staker, epoch)
    }

    pub fn latest_staker_data(&self, staker: Address) -> StakerData {
        self.ledger.latest(staker)
    }

    pub fn winning_option(&self, campaign_id: CampaignId, now: Timestamp) -> WinningOption {
        self.registry.winning_option(campaign_id, now)
    }

    pub fn total_points(&self, epoch: Epoch) -> Amount {
        self.rewards.total_points(&self.ledger, epoch)
    }

    pub fn vote_count(&self, staker: Address, epoch: Epoch) -> u64 {
        self.rewards.vote_count(staker, epoch)
    }

    pub fn current_reward_percentage(&self, staker: Address, now: Timestamp) -> Amount {
        self.rewards
            .current_reward_percentage(&self.ledger, staker, self.epoch_at(now))
    }

    pub fn past_reward_percentage(&self, staker: Address, epoch: Epoch, now: Timestamp) -> Amount {
        self.rewards
            .past_reward_percentage(&self.ledger, staker, epoch, self.epoch_at(now))
    }

    pub fn network_fee(&self, now: Timestamp) -> NetworkFeeData {
        self.registry.network_fee(self.epoch_at(now))
    }

    pub fn refresh_network_fee(&mut self, now: Timestamp) -> NetworkFeeData {
        let epoch = self.epoch_at(now);
        self.registry.refresh_network_fee(epoch)
    }

    pub fn brr_data(&self, now: Timestamp) -> BrrData {
        self.registry.brr_data(self.epoch_at(now))
    }

    pub fn refresh_brr_data(&mut self, now: Timestamp) -> BrrData {
        let epoch = self.epoch_at(now);
        self.registry.refresh_brr_data(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_shared_types::{precision, CampaignType};

    const START: Timestamp = 1_000;
    const PERIOD: u64 = 500;

    fn model_with(stakers: &[Address], balance: u64) -> ReferenceModel {
        let mut model = ReferenceModel::new(
            EpochClock::new(START, PERIOD),
            CampaignRules::default(),
            InitialParameters::default(),
        );
        for staker in stakers {
            model.fund(*staker, Amount::from(balance));
        }
        model
    }

    #[test]
    fn test_deposit_moves_wallet_into_next_epoch_stake() {
        let staker = Address::derive("s");
        let mut model = model_with(&[staker], 1_000);
        model.deposit(staker, Amount::from(400u64), 1_100).unwrap();

        assert_eq!(model.balance_of(staker), Amount::from(600u64));
        assert_eq!(model.staker_data(staker, 1, 1).stake, Amount::zero());
        assert_eq!(model.staker_data(staker, 2, 1).stake, Amount::from(400u64));
        assert_eq!(model.staker_data(staker, 3, 1).representative, Address::ZERO);
        assert_eq!(
            model.deposit(staker, Amount::from(601u64), 1_100),
            Err(RejectReason::InsufficientBalance)
        );
    }

    #[test]
    fn test_withdraw_corrects_open_votes() {
        let staker = Address::derive("s");
        let mut model = model_with(&[staker], 1_000);
        model.deposit(staker, Amount::from(500u64), 900).unwrap();

        let params = CampaignParams {
            campaign_type: CampaignType::General,
            start_time: 1_100,
            end_time: 1_300,
            min_percentage: Amount::zero(),
            c_param: Amount::zero(),
            t_param: precision(),
            options: vec![Amount::from(1u64), Amount::from(2u64)],
        };
        let id = model.submit_campaign(params, 1_050).unwrap();
        assert_eq!(model.registry().campaign(id).unwrap().details.total_voting_power_snapshot, Amount::from(1_000u64));

        assert!(model.vote(staker, id, 2, 1_150).unwrap().first_vote);
        assert_eq!(model.total_points(1), Amount::from(500u64));

        model.withdraw(staker, Amount::from(200u64), 1_200).unwrap();
        let tally = model.registry().vote_data(id).unwrap();
        assert_eq!(tally.vote_per_option[1], Amount::from(300u64));
        assert_eq!(model.total_points(1), Amount::from(300u64));
        assert_eq!(model.balance_of(staker), Amount::from(700u64));
        assert_eq!(model.current_reward_percentage(staker, 1_200), precision());
        assert_eq!(model.past_reward_percentage(staker, 1, 1_600), precision());
    }
}
