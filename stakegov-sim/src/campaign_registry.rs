//! Campaign lifecycle, vote tallies, vote receipts and winning-option
//! resolution, plus the protocol parameters (network fee, reward/rebate split)
//! that winning NetworkFee and FeeBRR campaigns feed into.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use stakegov_shared_types::campaign::decode_brr_option;
use stakegov_shared_types::{
    power_128, precision, Address, Amount, BrrData, CampaignDetails, CampaignId, CampaignParams,
    CampaignType, CampaignVoteData, Epoch, EpochClock, NetworkFeeData, RejectReason, Timestamp,
    WinningOption, BPS, MAX_CAMPAIGN_OPTIONS, MAX_EPOCH_CAMPAIGNS, MAX_NETWORK_FEE_BPS,
};

use crate::fixed_point::{in_precision, mul_div, product_lt};

/// Limits applied when a campaign is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignRules {
    /// Shortest allowed `end_time - start_time`, in seconds.
    pub min_campaign_duration: u64,
    pub max_campaign_options: usize,
    pub max_epoch_campaigns: usize,
}

impl Default for CampaignRules {
    fn default() -> Self {
        Self {
            min_campaign_duration: 0,
            max_campaign_options: MAX_CAMPAIGN_OPTIONS,
            max_epoch_campaigns: MAX_EPOCH_CAMPAIGNS,
        }
    }
}

/// Parameter values in force before any campaign decides otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialParameters {
    pub network_fee_bps: u64,
    pub reward_bps: u64,
    pub rebate_bps: u64,
}

impl Default for InitialParameters {
    fn default() -> Self {
        Self {
            network_fee_bps: 25,
            reward_bps: 3_000,
            rebate_bps: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Campaign {
    pub details: CampaignDetails,
    pub vote_data: CampaignVoteData,
    pub cancelled: bool,
}

/// One staker's vote on one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub staker: Address,
    pub campaign_id: CampaignId,
    pub option: u64,
    pub weight: Amount,
    pub epoch: Epoch,
}

/// Result of a successful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// `true` the first time this staker votes on this campaign.
    pub first_vote: bool,
}

#[derive(Debug, Clone)]
pub struct CampaignRegistry {
    clock: EpochClock,
    rules: CampaignRules,
    campaigns: BTreeMap<CampaignId, Campaign>,
    epoch_campaigns: HashMap<Epoch, Vec<CampaignId>>,
    network_fee_campaigns: HashMap<Epoch, CampaignId>,
    brr_campaigns: HashMap<Epoch, CampaignId>,
    receipts: HashMap<(Address, CampaignId), VoteReceipt>,
    number_campaigns: CampaignId,
    cached: InitialParameters,
}

impl CampaignRegistry {
    pub fn new(clock: EpochClock, rules: CampaignRules, initial: InitialParameters) -> Self {
        Self {
            clock,
            rules,
            campaigns: BTreeMap::new(),
            epoch_campaigns: HashMap::new(),
            network_fee_campaigns: HashMap::new(),
            brr_campaigns: HashMap::new(),
            receipts: HashMap::new(),
            number_campaigns: 0,
            cached: initial,
        }
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    pub fn rules(&self) -> &CampaignRules {
        &self.rules
    }

    /// Checks a submission at time `now` and returns the campaign's epoch.
    /// Reports the first failing rule, in the protocol's order.
    pub fn validate_submission(&self, params: &CampaignParams, now: Timestamp) -> Result<Epoch, RejectReason> {
        if params.start_time < now {
            return Err(RejectReason::StartInPast);
        }
        if params.end_time <= params.start_time
            || params.end_time - params.start_time < self.rules.min_campaign_duration
        {
            return Err(RejectReason::InvalidWindow);
        }
        let start_epoch = self.clock.epoch_at(params.start_time);
        if self.campaign_ids(start_epoch).len() >= self.rules.max_epoch_campaigns {
            return Err(RejectReason::EpochCampaignsFull);
        }
        if self.clock.epoch_at(params.end_time) != start_epoch {
            return Err(RejectReason::WindowSpansEpochs);
        }
        if start_epoch > self.clock.epoch_at(now) + 1 {
            return Err(RejectReason::EpochOutOfRange);
        }
        let option_count = params.options.len();
        if option_count < 2 || option_count > self.rules.max_campaign_options {
            return Err(RejectReason::TooManyOptions);
        }
        match params.campaign_type {
            CampaignType::General => {
                if params.options.iter().any(|option| option.is_zero()) {
                    return Err(RejectReason::InvalidOptionValue);
                }
            }
            CampaignType::NetworkFee => {
                if self.network_fee_campaigns.contains_key(&start_epoch) {
                    return Err(RejectReason::DuplicateTypeForEpoch(CampaignType::NetworkFee));
                }
                let limit = Amount::from(MAX_NETWORK_FEE_BPS);
                if params.options.iter().any(|option| *option >= limit) {
                    return Err(RejectReason::InvalidOptionValue);
                }
            }
            CampaignType::FeeBrr => {
                if self.brr_campaigns.contains_key(&start_epoch) {
                    return Err(RejectReason::DuplicateTypeForEpoch(CampaignType::FeeBrr));
                }
                let bps = Amount::from(BPS);
                let over_bps = params.options.iter().any(|option| {
                    let (rebate, reward) = decode_brr_option(*option);
                    rebate > bps || reward > bps || rebate + reward > bps
                });
                if over_bps {
                    return Err(RejectReason::InvalidOptionValue);
                }
            }
        }
        if params.min_percentage > precision() {
            return Err(RejectReason::MinPercentageTooHigh);
        }
        if params.c_param > power_128() || params.t_param > power_128() {
            return Err(RejectReason::FormulaParamTooHigh);
        }
        Ok(start_epoch)
    }

    /// Registers a new campaign whose turnout is measured against
    /// `total_voting_power_snapshot`.
    pub fn submit(
        &mut self,
        params: CampaignParams,
        total_voting_power_snapshot: Amount,
        now: Timestamp,
    ) -> Result<CampaignId, RejectReason> {
        let epoch = self.validate_submission(&params, now)?;
        self.number_campaigns += 1;
        let id = self.number_campaigns;

        self.epoch_campaigns.entry(epoch).or_default().push(id);
        match params.campaign_type {
            CampaignType::NetworkFee => {
                self.network_fee_campaigns.insert(epoch, id);
            }
            CampaignType::FeeBrr => {
                self.brr_campaigns.insert(epoch, id);
            }
            CampaignType::General => {}
        }
        let vote_data = CampaignVoteData::with_options(params.options.len());
        info!("registry: {} campaign {} submitted for epoch {}", params.campaign_type, id, epoch);
        self.campaigns.insert(
            id,
            Campaign {
                details: CampaignDetails {
                    id,
                    params,
                    total_voting_power_snapshot,
                },
                vote_data,
                cancelled: false,
            },
        );
        Ok(id)
    }

    /// Cancels a campaign that has not started yet. It disappears from its
    /// epoch's list (the last id takes its slot) and frees its type slot.
    pub fn cancel(&mut self, campaign_id: CampaignId, now: Timestamp) -> Result<(), RejectReason> {
        self.validate_cancel(campaign_id, now)?;
        let campaign = self
            .campaigns
            .get_mut(&campaign_id)
            .ok_or(RejectReason::UnknownCampaign)?;
        campaign.cancelled = true;
        let epoch = self.clock.epoch_at(campaign.details.params.start_time);
        match campaign.details.params.campaign_type {
            CampaignType::NetworkFee => {
                self.network_fee_campaigns.remove(&epoch);
            }
            CampaignType::FeeBrr => {
                self.brr_campaigns.remove(&epoch);
            }
            CampaignType::General => {}
        }
        if let Some(ids) = self.epoch_campaigns.get_mut(&epoch) {
            if let Some(position) = ids.iter().position(|id| *id == campaign_id) {
                ids.swap_remove(position);
            }
        }
        info!("registry: campaign {} cancelled", campaign_id);
        Ok(())
    }

    pub fn validate_cancel(&self, campaign_id: CampaignId, now: Timestamp) -> Result<(), RejectReason> {
        let campaign = self.live_campaign(campaign_id).ok_or(RejectReason::UnknownCampaign)?;
        if now >= campaign.details.params.start_time {
            return Err(RejectReason::AlreadyStarted);
        }
        Ok(())
    }

    pub fn validate_vote(&self, campaign_id: CampaignId, option: u64, now: Timestamp) -> Result<(), RejectReason> {
        let campaign = self.live_campaign(campaign_id).ok_or(RejectReason::UnknownCampaign)?;
        let params = &campaign.details.params;
        if now < params.start_time {
            return Err(RejectReason::NotStarted);
        }
        if now > params.end_time {
            return Err(RejectReason::AlreadyEnded);
        }
        if option == 0 || option > params.options.len() as u64 {
            return Err(RejectReason::OptionOutOfRange);
        }
        Ok(())
    }

    /// Records `staker`'s vote with voting power `weight`. Voting again moves
    /// the previous contribution to the new option instead of adding to it.
    pub fn vote(
        &mut self,
        campaign_id: CampaignId,
        option: u64,
        staker: Address,
        weight: Amount,
        epoch: Epoch,
        now: Timestamp,
    ) -> Result<VoteOutcome, RejectReason> {
        self.validate_vote(campaign_id, option, now)?;
        let campaign = self
            .campaigns
            .get_mut(&campaign_id)
            .ok_or(RejectReason::UnknownCampaign)?;
        let tally = &mut campaign.vote_data;
        let new_slot = (option - 1) as usize;

        match self.receipts.get_mut(&(staker, campaign_id)) {
            None => {
                tally.vote_per_option[new_slot] += weight;
                tally.total_votes += weight;
                self.receipts.insert(
                    (staker, campaign_id),
                    VoteReceipt {
                        staker,
                        campaign_id,
                        option,
                        weight,
                        epoch,
                    },
                );
                debug!("registry: {} votes {} on campaign {} with {}", staker, option, campaign_id, weight);
                Ok(VoteOutcome { first_vote: true })
            }
            Some(receipt) => {
                if receipt.option != option {
                    let old_slot = (receipt.option - 1) as usize;
                    tally.vote_per_option[old_slot] = tally.vote_per_option[old_slot].saturating_sub(receipt.weight);
                    tally.vote_per_option[new_slot] += weight;
                    tally.total_votes = tally.total_votes.saturating_sub(receipt.weight) + weight;
                    debug!(
                        "registry: {} moves vote on campaign {} from {} to {}",
                        staker, campaign_id, receipt.option, option
                    );
                    receipt.option = option;
                    receipt.weight = weight;
                }
                Ok(VoteOutcome { first_vote: false })
            }
        }
    }

    /// Removes `delta` from `staker`'s recorded vote on an open campaign.
    /// Returns whether anything changed.
    pub fn adjust_weight_on_withdrawal(
        &mut self,
        staker: Address,
        campaign_id: CampaignId,
        delta: Amount,
        now: Timestamp,
    ) -> bool {
        let Some(campaign) = self.campaigns.get_mut(&campaign_id).filter(|c| !c.cancelled) else {
            return false;
        };
        if campaign.details.params.end_time < now {
            return false;
        }
        let Some(receipt) = self.receipts.get_mut(&(staker, campaign_id)) else {
            return false;
        };
        let slot = (receipt.option - 1) as usize;
        receipt.weight = receipt.weight.saturating_sub(delta);
        let tally = &mut campaign.vote_data;
        tally.vote_per_option[slot] = tally.vote_per_option[slot].saturating_sub(delta);
        tally.total_votes = tally.total_votes.saturating_sub(delta);
        debug!("registry: vote of {} on campaign {} reduced by {}", staker, campaign_id, delta);
        true
    }

    /// Applies a withdrawal's reduction to every open campaign of `epoch`
    /// that `representative` voted in. Campaigns of other epochs are left alone.
    pub fn handle_withdrawal(
        &mut self,
        representative: Address,
        delta: Amount,
        epoch: Epoch,
        now: Timestamp,
    ) -> Vec<CampaignId> {
        self.campaign_ids(epoch)
            .to_vec()
            .into_iter()
            .filter(|id| self.adjust_weight_on_withdrawal(representative, *id, delta, now))
            .collect()
    }

    /// Winning option as queried at `now`: none until the campaign has ended.
    pub fn winning_option(&self, campaign_id: CampaignId, now: Timestamp) -> WinningOption {
        match self.live_campaign(campaign_id) {
            Some(campaign) if campaign.details.params.end_time <= now => self.resolve_winner(campaign_id),
            _ => WinningOption::none(),
        }
    }

    /// Winning option of a campaign from its tallies alone.
    ///
    /// The option must hold a strict plurality, turnout must reach
    /// `min_percentage`, and the winner's share must clear the threshold
    /// `c - t * turnout` whenever that threshold is positive.
    pub fn resolve_winner(&self, campaign_id: CampaignId) -> WinningOption {
        let Some(campaign) = self.live_campaign(campaign_id) else {
            return WinningOption::none();
        };
        let params = &campaign.details.params;
        let snapshot = campaign.details.total_voting_power_snapshot;
        let tally = &campaign.vote_data;
        if snapshot.is_zero() {
            return WinningOption::none();
        }

        let mut winning_option = 0usize;
        let mut max_votes = Amount::zero();
        for (index, votes) in tally.vote_per_option.iter().enumerate() {
            if *votes > max_votes {
                winning_option = index + 1;
                max_votes = *votes;
            } else if *votes == max_votes {
                winning_option = 0;
            }
        }
        if winning_option == 0 {
            return WinningOption::none();
        }

        let Some(turnout) = in_precision(tally.total_votes, snapshot) else {
            return WinningOption::none();
        };
        if params.min_percentage > turnout {
            return WinningOption::none();
        }
        let Some(x) = mul_div(params.t_param, turnout, precision()) else {
            return WinningOption::none();
        };
        if x <= params.c_param {
            let threshold = params.c_param - x;
            if product_lt(max_votes, precision(), threshold, tally.total_votes) {
                return WinningOption::none();
            }
        }
        WinningOption {
            option_id: winning_option as u64,
            value: params.options[winning_option - 1],
        }
    }

    /// Network fee in force during `epoch`: the winner of the previous epoch's
    /// NetworkFee campaign if there is one, the cached value otherwise.
    pub fn network_fee(&self, epoch: Epoch) -> NetworkFeeData {
        let expiry_time = self.clock.epoch_end(epoch);
        let mut fee_bps = self.cached.network_fee_bps;
        if epoch > 0 {
            if let Some(id) = self.network_fee_campaigns.get(&(epoch - 1)) {
                let winner = self.resolve_winner(*id);
                if winner.has_winner() {
                    fee_bps = winner.value.low_u64();
                }
            }
        }
        NetworkFeeData { fee_bps, expiry_time }
    }

    /// Like [`CampaignRegistry::network_fee`], and keeps the result as the
    /// fallback for later epochs.
    pub fn refresh_network_fee(&mut self, epoch: Epoch) -> NetworkFeeData {
        let data = self.network_fee(epoch);
        self.cached.network_fee_bps = data.fee_bps;
        data
    }

    /// Reward / rebate / burn split in force during `epoch`.
    pub fn brr_data(&self, epoch: Epoch) -> BrrData {
        let expiry_time = self.clock.epoch_end(epoch);
        let (mut reward, mut rebate) = (self.cached.reward_bps, self.cached.rebate_bps);
        if epoch > 0 {
            if let Some(id) = self.brr_campaigns.get(&(epoch - 1)) {
                let winner = self.resolve_winner(*id);
                if winner.has_winner() {
                    let (packed_rebate, packed_reward) = decode_brr_option(winner.value);
                    rebate = packed_rebate.low_u64();
                    reward = packed_reward.low_u64();
                }
            }
        }
        BrrData::new(reward, rebate, epoch, expiry_time)
    }

    pub fn refresh_brr_data(&mut self, epoch: Epoch) -> BrrData {
        let data = self.brr_data(epoch);
        self.cached.reward_bps = data.reward_bps;
        self.cached.rebate_bps = data.rebate_bps;
        data
    }

    /// Live campaign ids of `epoch`, in protocol order.
    pub fn campaign_ids(&self, epoch: Epoch) -> &[CampaignId] {
        self.epoch_campaigns.get(&epoch).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn campaign(&self, campaign_id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(&campaign_id)
    }

    /// A campaign that exists and was not cancelled.
    pub fn live_campaign(&self, campaign_id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(&campaign_id).filter(|campaign| !campaign.cancelled)
    }

    pub fn vote_data(&self, campaign_id: CampaignId) -> Option<&CampaignVoteData> {
        self.live_campaign(campaign_id).map(|campaign| &campaign.vote_data)
    }

    pub fn receipt(&self, staker: Address, campaign_id: CampaignId) -> Option<&VoteReceipt> {
        self.receipts.get(&(staker, campaign_id))
    }

    pub fn number_campaigns(&self) -> CampaignId {
        self.number_campaigns
    }

    pub fn network_fee_campaign(&self, epoch: Epoch) -> Option<CampaignId> {
        self.network_fee_campaigns.get(&epoch).copied()
    }

    pub fn brr_campaign(&self, epoch: Epoch) -> Option<CampaignId> {
        self.brr_campaigns.get(&epoch).copied()
    }
}
