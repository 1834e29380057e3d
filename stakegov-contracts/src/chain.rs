//! A single-node chain hosting the token, staking and DAO contracts, driven
//! through [`DaoEndpoint`] and [`ChainClock`].
//!
//! Every command is mined in its own block. The block takes the timestamp
//! pinned with [`ChainClock::set_next_block_timestamp`], or one second after
//! the previous block. A reverted command still mines its block but leaves no
//! other trace. Queries run against the latest mined block.

use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use stakegov_shared_types::{
    Address, Amount, BrrData, CampaignDetails, CampaignId, CampaignParams, CampaignVoteData, ChainClock,
    DaoEndpoint, EndpointError, EndpointResult, Epoch, EpochClock, NetworkFeeData, StakerData, Timestamp,
    WinningOption,
};

use crate::dao::{DaoContract, DaoDefaults};
use crate::error::{require, ContractResult};
use crate::fault::Fault;
use crate::staking::StakingContract;
use crate::token::Token;

/// Deployment parameters of a [`LocalChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChainConfig {
    /// Timestamp of the genesis block.
    pub genesis_time: Timestamp,
    /// First second of epoch 1.
    pub start_time: Timestamp,
    pub epoch_period: u64,
    pub min_campaign_duration: u64,
    pub network_fee_bps: u64,
    pub reward_bps: u64,
    pub rebate_bps: u64,
}

#[derive(Debug, Clone)]
pub struct LocalChain {
    clock: EpochClock,
    block_time: Timestamp,
    next_timestamp: Option<Timestamp>,
    /// Holder of every staked token.
    staking_address: Address,
    token: Token,
    staking: StakingContract,
    dao: DaoContract,
    fault: Option<Fault>,
}

impl LocalChain {
    pub fn new(config: LocalChainConfig) -> Self {
        let clock = EpochClock::new(config.start_time, config.epoch_period);
        let dao = DaoContract::new(
            clock,
            DaoDefaults {
                min_campaign_duration: config.min_campaign_duration,
                network_fee_bps: config.network_fee_bps,
                reward_bps: config.reward_bps,
                rebate_bps: config.rebate_bps,
            },
        );
        debug!(
            "local chain: genesis at {}, epoch 1 starts at {}, period {}s",
            config.genesis_time, config.start_time, config.epoch_period
        );
        Self {
            clock,
            block_time: config.genesis_time,
            next_timestamp: None,
            staking_address: Address::derive("staking-contract"),
            token: Token::new(),
            staking: StakingContract::new(),
            dao,
            fault: None,
        }
    }

    /// Switches a deliberate deviation on or off.
    pub fn inject_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
        self.staking.set_fault(fault);
        self.dao.set_fault(fault);
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.inject_fault(Some(fault));
        self
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Credits `amount` fresh tokens to `holder`, outside of any block.
    pub fn mint(&mut self, holder: Address, amount: Amount) {
        self.token.mint(holder, amount);
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    fn current_epoch_at(&self, now: Timestamp) -> Epoch {
        self.clock.epoch_at(now)
    }

    fn check_timestamp(&self, timestamp: Timestamp) -> EndpointResult<()> {
        if timestamp <= self.block_time {
            return Err(EndpointError::Transport(format!(
                "timestamp {} is not after the latest block at {}",
                timestamp, self.block_time
            )));
        }
        Ok(())
    }

    /// Mines the block for one command and runs it at that block's time.
    fn execute<T>(&mut self, command: impl FnOnce(&mut Self, Timestamp) -> ContractResult<T>) -> EndpointResult<T> {
        let now = self.next_timestamp.take().unwrap_or(self.block_time + 1);
        self.block_time = now;
        let snapshot = self.clone();
        match command(self, now) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                trace!("local chain: block at {} reverted: {}", now, err);
                Err(err.into())
            }
        }
    }

    fn withdraw_at(&mut self, staker: Address, amount: Amount, now: Timestamp) -> ContractResult<()> {
        let cur_epoch = self.current_epoch_at(now);
        if let Some(reduction) = self.staking.withdraw(staker, amount, cur_epoch)? {
            self.dao
                .handle_withdrawal(reduction.representative, reduction.amount, now);
        }
        self.token.transfer(self.staking_address, staker, amount)
    }

    fn vote_at(&mut self, staker: Address, campaign_id: CampaignId, option: u64, now: Timestamp) -> ContractResult<()> {
        self.dao.validate_vote_option(campaign_id, option, now)?;
        let cur_epoch = self.current_epoch_at(now);
        let data = self
            .staking
            .init_and_return_staker_data_for_current_epoch(staker, cur_epoch);
        self.dao.vote(staker, campaign_id, option, data, cur_epoch)
    }
}

#[async_trait]
impl DaoEndpoint for LocalChain {
    async fn deposit(&mut self, staker: Address, amount: Amount) -> EndpointResult<()> {
        self.execute(|chain, now| {
            require(!amount.is_zero(), "deposit: amount is 0")?;
            let cur_epoch = chain.current_epoch_at(now);
            chain.token.transfer(staker, chain.staking_address, amount)?;
            chain.staking.deposit(staker, amount, cur_epoch)
        })
    }

    async fn withdraw(&mut self, staker: Address, amount: Amount) -> EndpointResult<()> {
        self.execute(|chain, now| chain.withdraw_at(staker, amount, now))
    }

    async fn delegate(&mut self, staker: Address, representative: Address) -> EndpointResult<()> {
        self.execute(|chain, now| {
            let cur_epoch = chain.current_epoch_at(now);
            chain.staking.delegate(staker, representative, cur_epoch)
        })
    }

    async fn submit_campaign(&mut self, _creator: Address, params: &CampaignParams) -> EndpointResult<CampaignId> {
        self.execute(|chain, now| {
            let total_supply = chain.token.total_supply();
            chain.dao.submit_new_campaign(params, total_supply, now)
        })
    }

    async fn cancel_campaign(&mut self, _creator: Address, campaign_id: CampaignId) -> EndpointResult<()> {
        self.execute(|chain, now| chain.dao.cancel_campaign(campaign_id, now))
    }

    async fn vote(&mut self, staker: Address, campaign_id: CampaignId, option: u64) -> EndpointResult<()> {
        self.execute(|chain, now| chain.vote_at(staker, campaign_id, option, now))
    }

    async fn current_epoch(&self) -> EndpointResult<Epoch> {
        Ok(self.current_epoch_at(self.block_time))
    }

    async fn campaign_ids(&self, epoch: Epoch) -> EndpointResult<Vec<CampaignId>> {
        Ok(self.dao.get_list_camp_ids_for_epoch(epoch))
    }

    async fn campaign_details(&self, campaign_id: CampaignId) -> EndpointResult<Option<CampaignDetails>> {
        Ok(self.dao.get_campaign_details(campaign_id))
    }

    async fn campaign_vote_data(&self, campaign_id: CampaignId) -> EndpointResult<CampaignVoteData> {
        Ok(self.dao.get_campaign_vote_count_data(campaign_id))
    }

    async fn staker_data(&self, staker: Address, epoch: Epoch) -> EndpointResult<StakerData> {
        let cur_epoch = self.current_epoch_at(self.block_time);
        Ok(self.staking.get_staker_data(staker, epoch, cur_epoch))
    }

    async fn latest_staker_data(&self, staker: Address) -> EndpointResult<StakerData> {
        Ok(self.staking.get_latest_staker_data(staker))
    }

    async fn has_inited(&self, staker: Address, epoch: Epoch) -> EndpointResult<bool> {
        Ok(self.staking.has_inited(staker, epoch))
    }

    async fn winning_option(&self, campaign_id: CampaignId) -> EndpointResult<WinningOption> {
        Ok(self
            .dao
            .get_campaign_winning_option_and_value(campaign_id, self.block_time))
    }

    async fn total_epoch_points(&self, epoch: Epoch) -> EndpointResult<Amount> {
        Ok(self.dao.total_epoch_points(epoch))
    }

    async fn current_reward_percentage(&self, staker: Address) -> EndpointResult<Amount> {
        let cur_epoch = self.current_epoch_at(self.block_time);
        let raw = self.staking.get_staker_raw_data(staker, cur_epoch);
        Ok(self.dao.get_reward_percentage_in_precision(staker, cur_epoch, raw))
    }

    async fn past_reward_percentage(&self, staker: Address, epoch: Epoch) -> EndpointResult<Amount> {
        let cur_epoch = self.current_epoch_at(self.block_time);
        if epoch >= cur_epoch {
            return Ok(Amount::zero());
        }
        let raw = self.staking.get_staker_raw_data(staker, epoch);
        Ok(self.dao.get_reward_percentage_in_precision(staker, epoch, raw))
    }

    async fn network_fee(&self) -> EndpointResult<NetworkFeeData> {
        Ok(self.dao.get_latest_network_fee_data(self.block_time))
    }

    async fn refresh_network_fee(&mut self) -> EndpointResult<NetworkFeeData> {
        let now = self.block_time;
        Ok(self.dao.get_latest_network_fee_data_with_cache(now))
    }

    async fn brr_data(&self) -> EndpointResult<BrrData> {
        Ok(self.dao.get_latest_brr_data(self.block_time))
    }

    async fn refresh_brr_data(&mut self) -> EndpointResult<BrrData> {
        let now = self.block_time;
        Ok(self.dao.get_latest_brr_data_with_cache(now))
    }

    async fn token_balance(&self, holder: Address) -> EndpointResult<Amount> {
        Ok(self.token.balance_of(holder))
    }

    async fn token_total_supply(&self) -> EndpointResult<Amount> {
        Ok(self.token.total_supply())
    }
}

#[async_trait]
impl ChainClock for LocalChain {
    async fn block_time(&self) -> EndpointResult<Timestamp> {
        Ok(self.block_time)
    }

    async fn set_next_block_timestamp(&mut self, timestamp: Timestamp) -> EndpointResult<()> {
        self.check_timestamp(timestamp)?;
        self.next_timestamp = Some(timestamp);
        Ok(())
    }

    async fn mine_block_at(&mut self, timestamp: Timestamp) -> EndpointResult<()> {
        self.check_timestamp(timestamp)?;
        self.next_timestamp = None;
        self.block_time = timestamp;
        trace!("local chain: mined empty block at {}", timestamp);
        Ok(())
    }
}
