//! DAO contract: campaign storage, voting, winner resolution, reward shares and
//! the network fee / BRR values fed back into the protocol.

use std::collections::HashMap;

use log::{debug, info};
use primitive_types::U512;
use stakegov_shared_types::{
    decode_brr_option, power_128, precision, Address, Amount, BrrData, CampaignDetails, CampaignId,
    CampaignParams, CampaignType, CampaignVoteData, Epoch, EpochClock, NetworkFeeData, StakerData,
    Timestamp, WinningOption, BPS, MAX_CAMPAIGN_OPTIONS, MAX_EPOCH_CAMPAIGNS, MAX_NETWORK_FEE_BPS,
};

use crate::error::{require, ContractError, ContractResult};
use crate::fault::Fault;

#[derive(Debug, Clone)]
struct Campaign {
    details: CampaignDetails,
    vote_data: CampaignVoteData,
}

/// Values the DAO falls back to when the previous epoch produced no winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaoDefaults {
    pub min_campaign_duration: u64,
    pub network_fee_bps: u64,
    pub reward_bps: u64,
    pub rebate_bps: u64,
}

#[derive(Debug, Clone)]
pub struct DaoContract {
    clock: EpochClock,
    min_campaign_duration: u64,
    number_campaigns: CampaignId,
    campaign_data: HashMap<CampaignId, Campaign>,
    epoch_campaigns: HashMap<Epoch, Vec<CampaignId>>,
    network_fee_campaigns: HashMap<Epoch, CampaignId>,
    brr_campaigns: HashMap<Epoch, CampaignId>,
    staker_voted_option: HashMap<(Address, CampaignId), u64>,
    number_votes: HashMap<(Address, Epoch), u64>,
    total_epoch_points: HashMap<Epoch, Amount>,
    latest_network_fee_result: u64,
    latest_brr_result: (u64, u64),
    fault: Option<Fault>,
}

impl DaoContract {
    pub fn new(clock: EpochClock, defaults: DaoDefaults) -> Self {
        Self {
            clock,
            min_campaign_duration: defaults.min_campaign_duration,
            number_campaigns: 0,
            campaign_data: HashMap::new(),
            epoch_campaigns: HashMap::new(),
            network_fee_campaigns: HashMap::new(),
            brr_campaigns: HashMap::new(),
            staker_voted_option: HashMap::new(),
            number_votes: HashMap::new(),
            total_epoch_points: HashMap::new(),
            latest_network_fee_result: defaults.network_fee_bps,
            latest_brr_result: (defaults.reward_bps, defaults.rebate_bps),
            fault: None,
        }
    }

    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
    }

    pub fn submit_new_campaign(
        &mut self,
        params: &CampaignParams,
        total_supply: Amount,
        now: Timestamp,
    ) -> ContractResult<CampaignId> {
        let campaign_epoch = self.validate_campaign_params(params, now)?;

        self.number_campaigns += 1;
        let campaign_id = self.number_campaigns;
        self.epoch_campaigns.entry(campaign_epoch).or_default().push(campaign_id);
        match params.campaign_type {
            CampaignType::NetworkFee => {
                self.network_fee_campaigns.insert(campaign_epoch, campaign_id);
            }
            CampaignType::FeeBrr => {
                self.brr_campaigns.insert(campaign_epoch, campaign_id);
            }
            CampaignType::General => {}
        }
        self.campaign_data.insert(
            campaign_id,
            Campaign {
                details: CampaignDetails {
                    id: campaign_id,
                    params: params.clone(),
                    total_voting_power_snapshot: total_supply,
                },
                vote_data: CampaignVoteData::with_options(params.options.len()),
            },
        );
        info!(
            "dao: new {} campaign {} for epoch {}",
            params.campaign_type, campaign_id, campaign_epoch
        );
        Ok(campaign_id)
    }

    fn validate_campaign_params(&self, params: &CampaignParams, now: Timestamp) -> ContractResult<Epoch> {
        require(params.start_time >= now, "validateParams: start in the past")?;
        require(
            params.end_time > params.start_time
                && params.end_time - params.start_time >= self.min_campaign_duration,
            "validateParams: campaign duration is low",
        )?;

        let start_epoch = self.clock.epoch_at(params.start_time);
        let end_epoch = self.clock.epoch_at(params.end_time);
        let live = self.epoch_campaigns.get(&start_epoch).map_or(0, Vec::len);
        require(live < MAX_EPOCH_CAMPAIGNS, "validateParams: too many campaigns")?;
        require(start_epoch == end_epoch, "validateParams: start & end not same epoch")?;
        let cur_epoch = self.clock.epoch_at(now);
        require(start_epoch <= cur_epoch + 1, "validateParams: only for current or next epochs")?;

        let options = params.options.len();
        require(
            options > 1 && options <= MAX_CAMPAIGN_OPTIONS,
            "validateParams: invalid number of options",
        )?;
        match params.campaign_type {
            CampaignType::General => {
                for option in &params.options {
                    require(!option.is_zero(), "validateParams: general campaign option is 0")?;
                }
            }
            CampaignType::NetworkFee => {
                require(
                    !self.network_fee_campaigns.contains_key(&start_epoch),
                    "validateParams: already had network fee campaign for this epoch",
                )?;
                for option in &params.options {
                    require(
                        *option < Amount::from(MAX_NETWORK_FEE_BPS),
                        "validateParams: network fee must be smaller then BPS / 2",
                    )?;
                }
            }
            CampaignType::FeeBrr => {
                require(
                    !self.brr_campaigns.contains_key(&start_epoch),
                    "validateParams: already had brr campaign for this epoch",
                )?;
                for option in &params.options {
                    let (rebate, reward) = decode_brr_option(*option);
                    require(
                        U512::from(rebate) + U512::from(reward) <= U512::from(BPS),
                        "validateParams: rebate + reward can't be bigger than BPS",
                    )?;
                }
            }
        }

        require(params.min_percentage <= precision(), "validateParams: min percentage is high")?;
        require(params.c_param <= power_128(), "validateParams: c is high")?;
        require(params.t_param <= power_128(), "validateParams: t is high")?;
        Ok(start_epoch)
    }

    pub fn cancel_campaign(&mut self, campaign_id: CampaignId, now: Timestamp) -> ContractResult<()> {
        let campaign = self
            .campaign_data
            .get(&campaign_id)
            .ok_or(ContractError::Revert("cancelCampaign: campaignID doesn't exist"))?;
        let params = &campaign.details.params;
        require(params.start_time > now, "cancelCampaign: campaign already started")?;

        let epoch = self.clock.epoch_at(params.start_time);
        match params.campaign_type {
            CampaignType::NetworkFee => {
                self.network_fee_campaigns.remove(&epoch);
            }
            CampaignType::FeeBrr => {
                self.brr_campaigns.remove(&epoch);
            }
            CampaignType::General => {}
        }
        self.campaign_data.remove(&campaign_id);

        if let Some(ids) = self.epoch_campaigns.get_mut(&epoch) {
            for i in 0..ids.len() {
                if ids[i] == campaign_id {
                    let last = ids.len() - 1;
                    ids[i] = ids[last];
                    ids.pop();
                    break;
                }
            }
        }
        info!("dao: campaign {} cancelled", campaign_id);
        Ok(())
    }

    /// Checks a vote before the voter's staking data is initialized.
    pub fn validate_vote_option(&self, campaign_id: CampaignId, option: u64, now: Timestamp) -> ContractResult<()> {
        let campaign = self
            .campaign_data
            .get(&campaign_id)
            .ok_or(ContractError::Revert("vote: campaign doesn't exist"))?;
        let params = &campaign.details.params;
        require(params.start_time <= now, "vote: campaign not started")?;
        require(params.end_time >= now, "vote: campaign already ended")?;
        require(option > 0, "vote: option is 0")?;
        require(option <= params.options.len() as u64, "vote: option is not in range")?;
        Ok(())
    }

    /// Casts a vote already checked by [`DaoContract::validate_vote_option`],
    /// with `staker_data` read from the staking contract for `cur_epoch`.
    pub fn vote(
        &mut self,
        staker: Address,
        campaign_id: CampaignId,
        option: u64,
        staker_data: StakerData,
        cur_epoch: Epoch,
    ) -> ContractResult<()> {
        let total_stake = staker_data.voting_power(staker);
        let last_voted_option = self
            .staker_voted_option
            .get(&(staker, campaign_id))
            .copied()
            .unwrap_or(0);
        let fault = self.fault;
        let campaign = self
            .campaign_data
            .get_mut(&campaign_id)
            .ok_or(ContractError::Revert("vote: campaign doesn't exist"))?;
        let vote_data = &mut campaign.vote_data;
        let slot = (option - 1) as usize;

        if last_voted_option == 0 {
            *self.number_votes.entry((staker, cur_epoch)).or_default() += 1;
            *self.total_epoch_points.entry(cur_epoch).or_default() += total_stake;
            vote_data.vote_per_option[slot] += total_stake;
            vote_data.total_votes += total_stake;
        } else if last_voted_option != option {
            let old_slot = (last_voted_option - 1) as usize;
            if fault != Some(Fault::DoubleCountRevote) {
                vote_data.vote_per_option[old_slot] = vote_data.vote_per_option[old_slot].saturating_sub(total_stake);
            } else {
                vote_data.total_votes += total_stake;
            }
            vote_data.vote_per_option[slot] += total_stake;
        }
        self.staker_voted_option.insert((staker, campaign_id), option);
        debug!("dao: {} voted {} on campaign {} with {}", staker, option, campaign_id, total_stake);
        Ok(())
    }

    /// Removes `reduce_amount` of `staker`'s voting power from the current
    /// epoch's points and from every still-running campaign it voted on.
    pub fn handle_withdrawal(&mut self, staker: Address, reduce_amount: Amount, now: Timestamp) {
        if reduce_amount.is_zero() {
            return;
        }
        let cur_epoch = self.clock.epoch_at(now);
        let num_votes = self.number_votes.get(&(staker, cur_epoch)).copied().unwrap_or(0);
        if num_votes == 0 {
            return;
        }
        let points = self.total_epoch_points.entry(cur_epoch).or_default();
        *points = points.saturating_sub(Amount::from(num_votes) * reduce_amount);

        if self.fault == Some(Fault::SkipVoteAdjustment) {
            return;
        }
        let campaign_ids = self.epoch_campaigns.get(&cur_epoch).cloned().unwrap_or_default();
        for campaign_id in campaign_ids {
            let voted_option = self
                .staker_voted_option
                .get(&(staker, campaign_id))
                .copied()
                .unwrap_or(0);
            if voted_option == 0 {
                continue;
            }
            let Some(campaign) = self.campaign_data.get_mut(&campaign_id) else {
                continue;
            };
            if campaign.details.params.end_time >= now {
                let vote_data = &mut campaign.vote_data;
                let slot = (voted_option - 1) as usize;
                vote_data.total_votes = vote_data.total_votes.saturating_sub(reduce_amount);
                vote_data.vote_per_option[slot] = vote_data.vote_per_option[slot].saturating_sub(reduce_amount);
            }
        }
        debug!("dao: withdrawal of {} adjusted votes of {}", reduce_amount, staker);
    }

    /// Winner of an ended campaign. Running, cancelled and unknown campaigns
    /// have none.
    pub fn get_campaign_winning_option_and_value(&self, campaign_id: CampaignId, now: Timestamp) -> WinningOption {
        let Some(campaign) = self.campaign_data.get(&campaign_id) else {
            return WinningOption::none();
        };
        let params = &campaign.details.params;
        if params.end_time == 0 || params.end_time > now {
            return WinningOption::none();
        }
        let total_supply = campaign.details.total_voting_power_snapshot;
        if total_supply.is_zero() {
            return WinningOption::none();
        }

        let vote_data = &campaign.vote_data;
        let total_votes = vote_data.total_votes;
        let mut winning_option = 0usize;
        let mut max_voted_count = Amount::zero();
        for (i, count) in vote_data.vote_per_option.iter().enumerate() {
            if *count > max_voted_count {
                winning_option = i + 1;
                max_voted_count = *count;
            } else if *count == max_voted_count && self.fault != Some(Fault::TieGoesToFirst) {
                winning_option = 0;
            }
        }
        if winning_option == 0 {
            return WinningOption::none();
        }

        let voted_percentage = wide_mul_div(total_votes, precision(), total_supply);
        if U512::from(params.min_percentage) > voted_percentage {
            return WinningOption::none();
        }
        let x = wide_mul_div_512(U512::from(params.t_param), voted_percentage, U512::from(precision()));
        let c = U512::from(params.c_param);
        if x <= c {
            let y = c - x;
            if U512::from(max_voted_count) * U512::from(precision()) < y * U512::from(total_votes) {
                return WinningOption::none();
            }
        }
        WinningOption {
            option_id: winning_option as u64,
            value: params.options[winning_option - 1],
        }
    }

    pub fn get_campaign_details(&self, campaign_id: CampaignId) -> Option<CampaignDetails> {
        self.campaign_data.get(&campaign_id).map(|c| c.details.clone())
    }

    pub fn get_campaign_vote_count_data(&self, campaign_id: CampaignId) -> CampaignVoteData {
        self.campaign_data
            .get(&campaign_id)
            .map(|c| c.vote_data.clone())
            .unwrap_or_default()
    }

    pub fn get_list_camp_ids_for_epoch(&self, epoch: Epoch) -> Vec<CampaignId> {
        self.epoch_campaigns.get(&epoch).cloned().unwrap_or_default()
    }

    pub fn total_epoch_points(&self, epoch: Epoch) -> Amount {
        self.total_epoch_points.get(&epoch).copied().unwrap_or_default()
    }

    pub fn number_votes(&self, staker: Address, epoch: Epoch) -> u64 {
        self.number_votes.get(&(staker, epoch)).copied().unwrap_or(0)
    }

    /// Reward share of `staker` in `epoch`, in precision, given its raw
    /// staking record for that epoch.
    pub fn get_reward_percentage_in_precision(&self, staker: Address, epoch: Epoch, raw: StakerData) -> Amount {
        let num_votes = self.number_votes(staker, epoch);
        if num_votes == 0 {
            return Amount::zero();
        }
        let total_stake = raw.voting_power(staker);
        if total_stake.is_zero() {
            return Amount::zero();
        }
        let points = Amount::from(num_votes) * total_stake;
        let total_points = self.total_epoch_points(epoch);
        if total_points.is_zero() {
            return Amount::zero();
        }
        if points > total_points {
            return Amount::zero();
        }
        let share = wide_mul_div(points, precision(), total_points);
        Amount::try_from(share).unwrap_or_default()
    }

    pub fn get_latest_network_fee_data(&self, now: Timestamp) -> NetworkFeeData {
        let cur_epoch = self.clock.epoch_at(now);
        let expiry_time = self.clock.epoch_end(cur_epoch);
        let mut fee_bps = self.latest_network_fee_result;
        if cur_epoch > 0 {
            if let Some(campaign_id) = self.network_fee_campaigns.get(&(cur_epoch - 1)) {
                let winner = self.get_campaign_winning_option_and_value(*campaign_id, now);
                if winner.has_winner() {
                    fee_bps = winner.value.low_u64();
                }
            }
        }
        NetworkFeeData { fee_bps, expiry_time }
    }

    pub fn get_latest_network_fee_data_with_cache(&mut self, now: Timestamp) -> NetworkFeeData {
        let data = self.get_latest_network_fee_data(now);
        self.latest_network_fee_result = data.fee_bps;
        data
    }

    pub fn get_latest_brr_data(&self, now: Timestamp) -> BrrData {
        let cur_epoch = self.clock.epoch_at(now);
        let expiry_time = self.clock.epoch_end(cur_epoch);
        let (mut reward, mut rebate) = self.latest_brr_result;
        if cur_epoch > 0 {
            if let Some(campaign_id) = self.brr_campaigns.get(&(cur_epoch - 1)) {
                let winner = self.get_campaign_winning_option_and_value(*campaign_id, now);
                if winner.has_winner() {
                    let (packed_rebate, packed_reward) = decode_brr_option(winner.value);
                    rebate = packed_rebate.low_u64();
                    reward = packed_reward.low_u64();
                }
            }
        }
        BrrData::new(reward, rebate, cur_epoch, expiry_time)
    }

    pub fn get_latest_brr_data_with_cache(&mut self, now: Timestamp) -> BrrData {
        let data = self.get_latest_brr_data(now);
        self.latest_brr_result = (data.reward_bps, data.rebate_bps);
        data
    }
}

fn wide_mul_div(a: Amount, b: Amount, denominator: Amount) -> U512 {
    wide_mul_div_512(U512::from(a), U512::from(b), U512::from(denominator))
}

fn wide_mul_div_512(a: U512, b: U512, denominator: U512) -> U512 {
    if denominator.is_zero() {
        return U512::zero();
    }
    a * b / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractError;
    use stakegov_shared_types::encode_brr_option;

    const START: Timestamp = 1_000;
    const PERIOD: u64 = 500;

    fn dao() -> DaoContract {
        DaoContract::new(
            EpochClock::new(START, PERIOD),
            DaoDefaults {
                min_campaign_duration: 0,
                network_fee_bps: 25,
                reward_bps: 3_000,
                rebate_bps: 2_000,
            },
        )
    }

    fn params(campaign_type: CampaignType, start: Timestamp, end: Timestamp, options: &[u64]) -> CampaignParams {
        CampaignParams {
            campaign_type,
            start_time: start,
            end_time: end,
            min_percentage: Amount::zero(),
            c_param: Amount::zero(),
            t_param: Amount::zero(),
            options: options.iter().map(|o| Amount::from(*o)).collect(),
        }
    }

    fn supply() -> Amount {
        Amount::from(1_000u64)
    }

    fn power(staker: Address, stake: u64) -> StakerData {
        let mut data = StakerData::genesis(staker);
        data.stake = Amount::from(stake);
        data
    }

    #[test]
    fn test_submit_validation_messages() {
        let mut dao = dao();
        let now = 1_100;
        let cases = [
            (params(CampaignType::General, 1_099, 1_200, &[1, 2]), "validateParams: start in the past"),
            (params(CampaignType::General, 1_200, 1_200, &[1, 2]), "validateParams: campaign duration is low"),
            (params(CampaignType::General, 1_200, 1_600, &[1, 2]), "validateParams: start & end not same epoch"),
            (params(CampaignType::General, 2_000, 2_100, &[1, 2]), "validateParams: only for current or next epochs"),
            (params(CampaignType::General, 1_200, 1_300, &[1]), "validateParams: invalid number of options"),
            (params(CampaignType::General, 1_200, 1_300, &[1, 0]), "validateParams: general campaign option is 0"),
            (
                params(CampaignType::NetworkFee, 1_200, 1_300, &[10, 5_000]),
                "validateParams: network fee must be smaller then BPS / 2",
            ),
        ];
        for (p, message) in cases {
            assert_eq!(dao.submit_new_campaign(&p, supply(), now), Err(ContractError::Revert(message)));
        }
        let mut bad_brr = params(CampaignType::FeeBrr, 1_200, 1_300, &[]);
        bad_brr.options = vec![encode_brr_option(6_000, 5_000), encode_brr_option(0, 0)];
        assert_eq!(
            dao.submit_new_campaign(&bad_brr, supply(), now),
            Err(ContractError::Revert("validateParams: rebate + reward can't be bigger than BPS"))
        );
        let mut high_c = params(CampaignType::General, 1_200, 1_300, &[1, 2]);
        high_c.c_param = power_128() + Amount::one();
        assert_eq!(
            dao.submit_new_campaign(&high_c, supply(), now),
            Err(ContractError::Revert("validateParams: c is high"))
        );
        assert_eq!(dao.get_list_camp_ids_for_epoch(1), Vec::<CampaignId>::new());
    }

    #[test]
    fn test_one_network_fee_campaign_per_epoch() {
        let mut dao = dao();
        let p = params(CampaignType::NetworkFee, 1_200, 1_300, &[10, 20]);
        assert_eq!(dao.submit_new_campaign(&p, supply(), 1_100), Ok(1));
        assert_eq!(
            dao.submit_new_campaign(&p, supply(), 1_100),
            Err(ContractError::Revert("validateParams: already had network fee campaign for this epoch"))
        );
        dao.cancel_campaign(1, 1_150).unwrap();
        assert_eq!(dao.submit_new_campaign(&p, supply(), 1_160), Ok(2));
    }

    #[test]
    fn test_cancel_swaps_last_id_into_place() {
        let mut dao = dao();
        for _ in 0..3 {
            dao.submit_new_campaign(&params(CampaignType::General, 1_200, 1_300, &[1, 2]), supply(), 1_100)
                .unwrap();
        }
        dao.cancel_campaign(1, 1_100).unwrap();
        assert_eq!(dao.get_list_camp_ids_for_epoch(1), vec![3, 2]);
        assert_eq!(dao.get_campaign_details(1), None);
        assert_eq!(
            dao.cancel_campaign(1, 1_100),
            Err(ContractError::Revert("cancelCampaign: campaignID doesn't exist"))
        );
        assert_eq!(
            dao.cancel_campaign(2, 1_200),
            Err(ContractError::Revert("cancelCampaign: campaign already started"))
        );
    }

    #[test]
    fn test_vote_revote_and_withdrawal_adjustment() {
        let mut dao = dao();
        let staker = Address::derive("s");
        dao.submit_new_campaign(&params(CampaignType::General, 1_100, 1_300, &[1, 2]), supply(), 1_050)
            .unwrap();
        dao.validate_vote_option(1, 1, 1_150).unwrap();
        dao.vote(staker, 1, 1, power(staker, 100), 1).unwrap();
        dao.vote(staker, 1, 2, power(staker, 100), 1).unwrap();
        let data = dao.get_campaign_vote_count_data(1);
        assert_eq!(data.vote_per_option, vec![Amount::zero(), Amount::from(100u64)]);
        assert_eq!(data.total_votes, Amount::from(100u64));
        assert_eq!(dao.number_votes(staker, 1), 1);
        assert_eq!(dao.total_epoch_points(1), Amount::from(100u64));

        dao.handle_withdrawal(staker, Amount::from(40u64), 1_200);
        let data = dao.get_campaign_vote_count_data(1);
        assert_eq!(data.vote_per_option[1], Amount::from(60u64));
        assert_eq!(data.total_votes, Amount::from(60u64));
        assert_eq!(dao.total_epoch_points(1), Amount::from(60u64));
    }

    #[test]
    fn test_vote_checks() {
        let mut dao = dao();
        dao.submit_new_campaign(&params(CampaignType::General, 1_100, 1_300, &[1, 2]), supply(), 1_050)
            .unwrap();
        let revert = |message| Err(ContractError::Revert(message));
        assert_eq!(dao.validate_vote_option(2, 1, 1_150), revert("vote: campaign doesn't exist"));
        assert_eq!(dao.validate_vote_option(1, 1, 1_099), revert("vote: campaign not started"));
        assert_eq!(dao.validate_vote_option(1, 1, 1_301), revert("vote: campaign already ended"));
        assert_eq!(dao.validate_vote_option(1, 0, 1_150), revert("vote: option is 0"));
        assert_eq!(dao.validate_vote_option(1, 3, 1_150), revert("vote: option is not in range"));
    }

    #[test]
    fn test_winner_and_network_fee_follow_previous_epoch() {
        let mut dao = dao();
        let staker = Address::derive("s");
        dao.submit_new_campaign(&params(CampaignType::NetworkFee, 1_100, 1_300, &[40, 60]), supply(), 1_050)
            .unwrap();
        dao.vote(staker, 1, 2, power(staker, 500), 1).unwrap();
        assert_eq!(dao.get_campaign_winning_option_and_value(1, 1_200), WinningOption::none());
        let winner = dao.get_campaign_winning_option_and_value(1, 1_301);
        assert_eq!(winner.option_id, 2);

        assert_eq!(dao.get_latest_network_fee_data(1_400).fee_bps, 25);
        let fee = dao.get_latest_network_fee_data(1_600);
        assert_eq!(fee, NetworkFeeData { fee_bps: 60, expiry_time: 1_999 });
        // epoch 3 has no campaign for epoch 2 and falls back to the cache
        assert_eq!(dao.get_latest_network_fee_data(2_100).fee_bps, 25);
        dao.get_latest_network_fee_data_with_cache(1_600);
        assert_eq!(dao.get_latest_network_fee_data(2_100).fee_bps, 60);
    }

    #[test]
    fn test_tie_has_no_winner() {
        let mut dao = dao();
        let (a, b) = (Address::derive("a"), Address::derive("b"));
        dao.submit_new_campaign(&params(CampaignType::General, 1_100, 1_300, &[1, 2]), supply(), 1_050)
            .unwrap();
        dao.vote(a, 1, 1, power(a, 100), 1).unwrap();
        dao.vote(b, 1, 2, power(b, 100), 1).unwrap();
        assert_eq!(dao.get_campaign_winning_option_and_value(1, 1_400), WinningOption::none());

        dao.set_fault(Some(Fault::TieGoesToFirst));
        assert_eq!(dao.get_campaign_winning_option_and_value(1, 1_400).option_id, 1);
    }

    #[test]
    fn test_reward_percentage() {
        let mut dao = dao();
        let (a, b) = (Address::derive("a"), Address::derive("b"));
        dao.submit_new_campaign(&params(CampaignType::General, 1_100, 1_300, &[1, 2]), supply(), 1_050)
            .unwrap();
        dao.vote(a, 1, 1, power(a, 300), 1).unwrap();
        dao.vote(b, 1, 2, power(b, 100), 1).unwrap();
        let share_a = dao.get_reward_percentage_in_precision(a, 1, power(a, 300));
        let share_b = dao.get_reward_percentage_in_precision(b, 1, power(b, 100));
        assert_eq!(share_a, precision() * 3 / 4);
        assert_eq!(share_b, precision() / 4);
        let nobody = Address::derive("c");
        assert_eq!(dao.get_reward_percentage_in_precision(nobody, 1, power(nobody, 10)), Amount::zero());
        // stake larger than what the epoch points were accumulated from
        assert_eq!(dao.get_reward_percentage_in_precision(a, 1, power(a, 5_000)), Amount::zero());
    }
}
