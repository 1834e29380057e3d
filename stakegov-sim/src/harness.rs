//! Runs generated actions against the authoritative system and the reference
//! model in lockstep and stops at the first disagreement.

use std::fmt::Debug;

use log::{debug, error, info, warn};
use stakegov_shared_types::{
    Address, CampaignType, ChainClock, DaoEndpoint, EndpointError, EndpointResult, Epoch, Timestamp,
};

use crate::action::{
    Action, ActionKind, CancelCampaignAction, DelegateAction, DepositAction, GeneratedAction, Outcome,
    SubmitCampaignAction, VoteAction, WithdrawAction,
};
use crate::action_generator::ActionGenerator;
use crate::config::FuzzRunConfig;
use crate::error::{ConfigError, HarnessError};
use crate::model::ReferenceModel;
use crate::score::ScoreBoard;
use crate::snapshot::{ParticipantView, StateDump};

type Participants = Vec<(String, Address)>;

fn endpoint_failure(context: impl Into<String>) -> impl FnOnce(EndpointError) -> HarnessError {
    let context = context.into();
    move |source| HarnessError::Endpoint { context, source }
}

fn participants(staker: Address, old_representative: Address, new_representative: Address) -> Participants {
    vec![
        ("staker".to_string(), staker),
        ("old representative".to_string(), old_representative),
        ("new representative".to_string(), new_representative),
    ]
}

#[derive(Debug, Clone, Default)]
struct StepContext {
    loop_index: u64,
    timestamp: Timestamp,
    epoch: Epoch,
    action: Option<Action>,
    expected: Option<Outcome>,
}

pub struct DifferentialHarness<C> {
    config: FuzzRunConfig,
    chain: C,
    model: ReferenceModel,
    generator: ActionGenerator,
    stakers: Vec<Address>,
    score: ScoreBoard,
    current_epoch: Epoch,
    seed: u64,
    context: StepContext,
}

impl<C> DifferentialHarness<C>
where
    C: DaoEndpoint + ChainClock,
{
    /// Sets up a run against `chain`, which must already hold the stakers'
    /// initial balances described by `config`.
    pub fn new(config: FuzzRunConfig, chain: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let stakers = config.stakers();
        let mut model = ReferenceModel::new(config.clock(), config.rules, config.initial_parameters);
        for staker in &stakers {
            model.fund(*staker, config.initial_balance);
        }
        let generator = ActionGenerator::new(&config, seed);
        Ok(Self {
            config,
            chain,
            model,
            generator,
            stakers,
            score: ScoreBoard::new(),
            current_epoch: 0,
            seed,
            context: StepContext::default(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn model(&self) -> &ReferenceModel {
        &self.model
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    pub async fn run(&mut self) -> Result<ScoreBoard, HarnessError> {
        info!(
            "starting fuzz run: {} iterations, {} stakers, epoch period {}s, seed {}",
            self.config.num_runs,
            self.stakers.len(),
            self.config.epoch_period,
            self.seed
        );
        self.verify_setup().await?;
        for loop_index in 0..self.config.num_runs {
            self.step(loop_index).await?;
        }
        info!("fuzz run finished\n{}", self.score);
        Ok(self.score.clone())
    }

    /// One iteration: either roll over into a new epoch or execute one
    /// generated action.
    pub async fn step(&mut self, loop_index: u64) -> Result<(), HarnessError> {
        let Some(t) = self.begin_step(loop_index).await? else {
            return Ok(());
        };
        let Some(generated) = self.generator.next_action(loop_index, &self.model, t) else {
            return Ok(());
        };
        self.execute_at(generated, t).await
    }

    /// Like [`DifferentialHarness::step`] with a caller-chosen action. Returns
    /// `false` when the iteration was spent on an epoch rollover and `generated`
    /// was not executed.
    pub async fn step_with(&mut self, loop_index: u64, generated: GeneratedAction) -> Result<bool, HarnessError> {
        let Some(t) = self.begin_step(loop_index).await? else {
            return Ok(false);
        };
        self.execute_at(generated, t).await?;
        Ok(true)
    }

    /// Timestamp of the next block, after handling an epoch rollover. `None`
    /// when the iteration was spent on the rollover.
    async fn begin_step(&mut self, loop_index: u64) -> Result<Option<Timestamp>, HarnessError> {
        let now = self.chain.block_time().await.map_err(endpoint_failure("reading block time"))?;
        let t = now + self.config.step_seconds;
        let epoch = self.model.epoch_at(t);
        self.score.iterations = loop_index + 1;
        self.context = StepContext {
            loop_index,
            timestamp: t,
            epoch,
            ..StepContext::default()
        };

        if epoch != self.current_epoch {
            self.chain.mine_block_at(t).await.map_err(endpoint_failure("mining epoch block"))?;
            self.check_closed_epoch(self.current_epoch, t).await?;
            info!("epoch {} -> {} at {}", self.current_epoch, epoch, t);
            self.current_epoch = epoch;
            if epoch % 5 == 0 {
                info!("progress after {} iterations\n{}", loop_index + 1, self.score);
            }
            return Ok(None);
        }
        Ok(Some(t))
    }

    async fn execute_at(&mut self, generated: GeneratedAction, t: Timestamp) -> Result<(), HarnessError> {
        self.context.action = Some(generated.action.clone());
        self.context.expected = Some(generated.expected);
        self.execute(generated, t).await
    }

    async fn execute(&mut self, generated: GeneratedAction, t: Timestamp) -> Result<(), HarnessError> {
        debug!("[{}] {}: {}", self.context.loop_index, generated.kind(), generated.description);
        let expected = generated.expected;
        match generated.action {
            Action::Deposit(action) => self.deposit(action, expected, t).await,
            Action::Withdraw(action) => self.withdraw(action, expected, t).await,
            Action::Delegate(action) => self.delegate(action, expected, t).await,
            Action::SubmitCampaign(action) => self.submit_campaign(action, expected, t).await,
            Action::CancelCampaign(action) => self.cancel_campaign(action, expected, t).await,
            Action::Vote(action) => self.vote(action, expected, t).await,
            Action::ClaimReward => {
                self.check_rewards(self.current_epoch, false, t).await?;
                self.score.record(ActionKind::ClaimReward, true);
                Ok(())
            }
            Action::NoAction => {
                self.chain.mine_block_at(t).await.map_err(endpoint_failure("mining empty block"))?;
                self.score.record(ActionKind::NoAction, true);
                Ok(())
            }
        }
    }

    async fn deposit(&mut self, action: DepositAction, expected: Outcome, t: Timestamp) -> Result<(), HarnessError> {
        let representative = self.latest_representative(action.staker).await?;
        let participants = participants(action.staker, representative, representative);
        let before = self.read_chain_views(&participants).await?;

        self.schedule(t).await?;
        let result = self.chain.deposit(action.staker, action.amount).await;
        if self.reconcile(ActionKind::Deposit, expected, result, &before).await?.is_none() {
            return Ok(());
        }
        if let Err(reason) = self.model.deposit(action.staker, action.amount, t) {
            let detail = format!("model refused an accepted deposit: {}", reason);
            return Err(self.violation(detail, &before).await);
        }
        self.verify_staking(&participants, action.staker, &before).await
    }

    async fn withdraw(&mut self, action: WithdrawAction, expected: Outcome, t: Timestamp) -> Result<(), HarnessError> {
        let current = self
            .chain
            .staker_data(action.staker, self.current_epoch)
            .await
            .map_err(endpoint_failure("reading current representative"))?;
        let latest_representative = self.latest_representative(action.staker).await?;
        let participants = participants(action.staker, current.representative, latest_representative);
        let before = self.read_chain_views(&participants).await?;

        self.schedule(t).await?;
        let result = self.chain.withdraw(action.staker, action.amount).await;
        if self.reconcile(ActionKind::Withdraw, expected, result, &before).await?.is_none() {
            return Ok(());
        }
        match self.model.withdraw(action.staker, action.amount, t) {
            Ok(effect) if !effect.reduced.is_zero() => debug!(
                "withdrawal reduced current epoch stake by {}, votes of {} adjusted",
                effect.reduced, effect.representative
            ),
            Ok(_) => {}
            Err(reason) => {
                let detail = format!("model refused an accepted withdrawal: {}", reason);
                return Err(self.violation(detail, &before).await);
            }
        }
        self.verify_staking(&participants, action.staker, &before).await
    }

    async fn delegate(&mut self, action: DelegateAction, expected: Outcome, t: Timestamp) -> Result<(), HarnessError> {
        let old_representative = self.latest_representative(action.staker).await?;
        let participants = participants(action.staker, old_representative, action.representative);
        let before = self.read_chain_views(&participants).await?;

        self.schedule(t).await?;
        let result = self.chain.delegate(action.staker, action.representative).await;
        if self.reconcile(ActionKind::Delegate, expected, result, &before).await?.is_none() {
            return Ok(());
        }
        if let Err(reason) = self.model.delegate(action.staker, action.representative, t) {
            let detail = format!("model refused an accepted delegation: {}", reason);
            return Err(self.violation(detail, &before).await);
        }
        self.verify_staking(&participants, action.staker, &before).await
    }

    async fn submit_campaign(
        &mut self,
        action: SubmitCampaignAction,
        expected: Outcome,
        t: Timestamp,
    ) -> Result<(), HarnessError> {
        let before: Vec<ParticipantView> = Vec::new();
        self.schedule(t).await?;
        let result = self.chain.submit_campaign(action.creator, &action.params).await;
        let Some(actual_id) = self.reconcile(ActionKind::SubmitCampaign, expected, result, &before).await? else {
            return Ok(());
        };
        let epoch = self.model.epoch_at(action.params.start_time);
        let expected_id = match self.model.submit_campaign(action.params, t) {
            Ok(id) => id,
            Err(reason) => {
                let detail = format!("model refused an accepted campaign: {}", reason);
                return Err(self.violation(detail, &before).await);
            }
        };
        self.expect_eq("campaign id", actual_id, expected_id, &before).await?;

        let details = self
            .chain
            .campaign_details(actual_id)
            .await
            .map_err(endpoint_failure("reading campaign details"))?;
        let model_details = self.model.registry().campaign(expected_id).map(|c| c.details.clone());
        self.expect_eq("campaign details", details, model_details, &before).await?;
        self.verify_campaign_list(epoch, &before).await
    }

    async fn cancel_campaign(
        &mut self,
        action: CancelCampaignAction,
        expected: Outcome,
        t: Timestamp,
    ) -> Result<(), HarnessError> {
        let before: Vec<ParticipantView> = Vec::new();
        self.schedule(t).await?;
        let result = self.chain.cancel_campaign(action.creator, action.campaign_id).await;
        if self.reconcile(ActionKind::CancelCampaign, expected, result, &before).await?.is_none() {
            return Ok(());
        }
        if let Err(reason) = self.model.cancel_campaign(action.campaign_id, t) {
            let detail = format!("model refused an accepted cancellation: {}", reason);
            return Err(self.violation(detail, &before).await);
        }
        let details = self
            .chain
            .campaign_details(action.campaign_id)
            .await
            .map_err(endpoint_failure("reading cancelled campaign"))?;
        self.expect_eq("cancelled campaign details", details, None, &before).await?;

        let epoch = self
            .model
            .registry()
            .campaign(action.campaign_id)
            .map(|campaign| self.model.epoch_at(campaign.details.params.start_time))
            .unwrap_or(self.current_epoch);
        self.verify_campaign_list(epoch, &before).await
    }

    async fn vote(&mut self, action: VoteAction, expected: Outcome, t: Timestamp) -> Result<(), HarnessError> {
        let participants = vec![("voter".to_string(), action.staker)];
        let before = self.read_chain_views(&participants).await?;

        self.schedule(t).await?;
        let result = self.chain.vote(action.staker, action.campaign_id, action.option).await;
        if self.reconcile(ActionKind::Vote, expected, result, &before).await?.is_none() {
            return Ok(());
        }
        match self.model.vote(action.staker, action.campaign_id, action.option, t) {
            Ok(outcome) => debug!(
                "{} voted {} on campaign {} (first vote: {})",
                action.staker, action.option, action.campaign_id, outcome.first_vote
            ),
            Err(reason) => {
                let detail = format!("model refused an accepted vote: {}", reason);
                return Err(self.violation(detail, &before).await);
            }
        }
        self.verify_views(&participants, &before).await?;
        self.verify_vote_data(action.campaign_id, &before).await?;
        self.verify_total_points(self.current_epoch, &before).await
    }

    /// Matches the authoritative answer against the predicted outcome.
    /// `Some` carries the result of an accepted action; `None` means an
    /// expected rejection happened.
    async fn reconcile<T>(
        &mut self,
        kind: ActionKind,
        expected: Outcome,
        result: EndpointResult<T>,
        before: &[ParticipantView],
    ) -> Result<Option<T>, HarnessError> {
        match (result, expected.reason) {
            (Ok(value), None) => {
                self.score.record(kind, true);
                Ok(Some(value))
            }
            (Ok(_), Some(reason)) => {
                error!("{} was accepted but should have been rejected: {}", kind, reason);
                let dump = self.state_dump(before, vec![format!("expected rejection: {}", reason)]).await;
                Err(HarnessError::UnexpectedAcceptance {
                    kind,
                    expected: reason,
                    dump: Box::new(dump),
                })
            }
            (Err(source @ EndpointError::Transport(_)), _) => Err(HarnessError::Endpoint {
                context: kind.to_string(),
                source,
            }),
            (Err(err), Some(reason)) if err.reject_reason() == Some(reason) => {
                debug!("{} rejected as expected: {}", kind, reason);
                self.score.record(kind, false);
                Ok(None)
            }
            (Err(err), _) => {
                error!("{} expected to be {} but got: {}", kind, expected, err);
                let dump = self.state_dump(before, vec![err.to_string()]).await;
                Err(HarnessError::UnexpectedRejection {
                    kind,
                    expected,
                    actual: err.to_string(),
                    dump: Box::new(dump),
                })
            }
        }
    }

    async fn check_closed_epoch(&mut self, closed: Epoch, t: Timestamp) -> Result<(), HarnessError> {
        let before: Vec<ParticipantView> = Vec::new();
        let campaign_ids = self
            .chain
            .campaign_ids(closed)
            .await
            .map_err(endpoint_failure("listing closed epoch campaigns"))?;
        let model_ids = self.model.registry().campaign_ids(closed).to_vec();
        self.expect_eq(&format!("campaigns of epoch {}", closed), campaign_ids.clone(), model_ids, &before)
            .await?;
        if campaign_ids.is_empty() {
            debug!("no campaign to check in epoch {}", closed);
        }

        for campaign_id in campaign_ids {
            let actual = self
                .chain
                .winning_option(campaign_id)
                .await
                .map_err(endpoint_failure("reading winning option"))?;
            let expected = self.model.winning_option(campaign_id, t);
            self.expect_eq(&format!("winning option of campaign {}", campaign_id), actual, expected, &before)
                .await?;
            info!(
                "campaign {} closed: option {} value {}",
                campaign_id, expected.option_id, expected.value
            );

            let campaign_type = self
                .model
                .registry()
                .campaign(campaign_id)
                .map(|campaign| campaign.details.params.campaign_type);
            match campaign_type {
                Some(CampaignType::NetworkFee) => {
                    let actual = self.chain.network_fee().await.map_err(endpoint_failure("reading network fee"))?;
                    let model = self.model.network_fee(t);
                    self.expect_eq("network fee", actual, model, &before).await?;
                    if expected.has_winner() {
                        let actual = self
                            .chain
                            .refresh_network_fee()
                            .await
                            .map_err(endpoint_failure("caching network fee"))?;
                        let model = self.model.refresh_network_fee(t);
                        self.expect_eq("cached network fee", actual, model, &before).await?;
                        info!("network fee changed to {} bps", model.fee_bps);
                    }
                }
                Some(CampaignType::FeeBrr) => {
                    let actual = self.chain.brr_data().await.map_err(endpoint_failure("reading brr data"))?;
                    let model = self.model.brr_data(t);
                    self.expect_eq("brr data", actual, model, &before).await?;
                    if expected.has_winner() {
                        let actual = self
                            .chain
                            .refresh_brr_data()
                            .await
                            .map_err(endpoint_failure("caching brr data"))?;
                        let model = self.model.refresh_brr_data(t);
                        self.expect_eq("cached brr data", actual, model, &before).await?;
                        info!(
                            "brr changed to reward {} bps, rebate {} bps",
                            model.reward_bps, model.rebate_bps
                        );
                    }
                }
                Some(CampaignType::General) | None => {}
            }
            self.score.record_campaign(expected.has_winner());
        }

        self.check_rewards(closed, true, t).await
    }

    /// Compares total points and every staker's reward percentage of `epoch`,
    /// through the past-epoch query when `past` is set.
    async fn check_rewards(&mut self, epoch: Epoch, past: bool, t: Timestamp) -> Result<(), HarnessError> {
        let before: Vec<ParticipantView> = Vec::new();
        self.verify_total_points(epoch, &before).await?;
        for staker in self.stakers.clone() {
            let (actual, expected) = if past {
                let actual = self
                    .chain
                    .past_reward_percentage(staker, epoch)
                    .await
                    .map_err(endpoint_failure("reading past reward percentage"))?;
                (actual, self.model.past_reward_percentage(staker, epoch, t))
            } else {
                let actual = self
                    .chain
                    .current_reward_percentage(staker)
                    .await
                    .map_err(endpoint_failure("reading reward percentage"))?;
                (actual, self.model.current_reward_percentage(staker, t))
            };
            let what = format!("reward percentage of {} in epoch {}", staker, epoch);
            self.expect_eq(&what, actual, expected, &before).await?;
        }
        Ok(())
    }

    async fn verify_setup(&mut self) -> Result<(), HarnessError> {
        let before: Vec<ParticipantView> = Vec::new();
        let supply = self
            .chain
            .token_total_supply()
            .await
            .map_err(endpoint_failure("reading token supply"))?;
        self.expect_eq("token total supply", supply, self.model.total_supply(), &before)
            .await?;
        for staker in self.stakers.clone() {
            let balance = self
                .chain
                .token_balance(staker)
                .await
                .map_err(endpoint_failure("reading token balance"))?;
            let what = format!("initial balance of {}", staker);
            self.expect_eq(&what, balance, self.model.balance_of(staker), &before).await?;
        }
        let now = self.chain.block_time().await.map_err(endpoint_failure("reading block time"))?;
        let epoch = self
            .chain
            .current_epoch()
            .await
            .map_err(endpoint_failure("reading current epoch"))?;
        self.expect_eq("current epoch", epoch, self.model.epoch_at(now), &before).await?;
        self.current_epoch = epoch;
        Ok(())
    }

    /// Staker records of every participant, the staker's wallet, and the vote
    /// data of the current epoch.
    async fn verify_staking(
        &self,
        participants: &Participants,
        staker: Address,
        before: &[ParticipantView],
    ) -> Result<(), HarnessError> {
        self.verify_views(participants, before).await?;
        let balance = self
            .chain
            .token_balance(staker)
            .await
            .map_err(endpoint_failure("reading token balance"))?;
        self.expect_eq("token balance", balance, self.model.balance_of(staker), before)
            .await?;

        let campaign_ids = self
            .chain
            .campaign_ids(self.current_epoch)
            .await
            .map_err(endpoint_failure("listing campaigns"))?;
        for campaign_id in campaign_ids {
            self.verify_vote_data(campaign_id, before).await?;
        }
        self.verify_total_points(self.current_epoch, before).await
    }

    async fn verify_views(&self, participants: &Participants, before: &[ParticipantView]) -> Result<(), HarnessError> {
        let after = self.read_chain_views(participants).await?;
        for (actual, model) in after.iter().zip(self.model_views(participants)) {
            if !actual.same_state(&model) {
                let detail = format!("{} {} diverged", actual.role, actual.address);
                return Err(self.violation(detail, before).await);
            }
        }
        Ok(())
    }

    async fn verify_vote_data(&self, campaign_id: u64, before: &[ParticipantView]) -> Result<(), HarnessError> {
        let actual = self
            .chain
            .campaign_vote_data(campaign_id)
            .await
            .map_err(endpoint_failure("reading vote data"))?;
        let model = self.model.registry().vote_data(campaign_id).cloned().unwrap_or_default();
        self.expect_eq(&format!("vote data of campaign {}", campaign_id), actual, model, before)
            .await
    }

    async fn verify_total_points(&self, epoch: Epoch, before: &[ParticipantView]) -> Result<(), HarnessError> {
        let actual = self
            .chain
            .total_epoch_points(epoch)
            .await
            .map_err(endpoint_failure("reading total points"))?;
        self.expect_eq(&format!("total points of epoch {}", epoch), actual, self.model.total_points(epoch), before)
            .await
    }

    async fn verify_campaign_list(&self, epoch: Epoch, before: &[ParticipantView]) -> Result<(), HarnessError> {
        let actual = self
            .chain
            .campaign_ids(epoch)
            .await
            .map_err(endpoint_failure("listing campaigns"))?;
        let model = self.model.registry().campaign_ids(epoch).to_vec();
        self.expect_eq(&format!("campaigns of epoch {}", epoch), actual, model, before)
            .await
    }

    async fn latest_representative(&self, staker: Address) -> Result<Address, HarnessError> {
        let latest = self
            .chain
            .latest_staker_data(staker)
            .await
            .map_err(endpoint_failure("reading latest representative"))?;
        Ok(latest.representative)
    }

    async fn schedule(&mut self, t: Timestamp) -> Result<(), HarnessError> {
        self.chain
            .set_next_block_timestamp(t)
            .await
            .map_err(endpoint_failure("scheduling next block"))
    }

    async fn expect_eq<T>(&self, what: &str, actual: T, expected: T, before: &[ParticipantView]) -> Result<(), HarnessError>
    where
        T: PartialEq + Debug,
    {
        if actual == expected {
            return Ok(());
        }
        let detail = format!("{}: authoritative {:?}, model {:?}", what, actual, expected);
        Err(self.violation(detail, before).await)
    }

    async fn violation(&self, detail: String, before: &[ParticipantView]) -> HarnessError {
        error!("divergence at iteration {}: {}", self.context.loop_index, detail);
        let dump = self.state_dump(before, vec![detail.clone()]).await;
        let context = match &self.context.action {
            Some(action) => action.kind().to_string(),
            None => format!("epoch {} rollover", self.context.epoch),
        };
        HarnessError::InvariantViolation {
            context,
            detail,
            dump: Box::new(dump),
        }
    }

    async fn state_dump(&self, before: &[ParticipantView], mut notes: Vec<String>) -> StateDump {
        let participants: Participants = before
            .iter()
            .map(|view| (view.role.clone(), view.address))
            .collect();
        let after = match self.chain_views(&participants).await {
            Ok(views) => views,
            Err(err) => {
                warn!("could not read authoritative state for the dump: {}", err);
                notes.push(format!("authoritative state unavailable: {}", err));
                Vec::new()
            }
        };
        StateDump {
            loop_index: self.context.loop_index,
            timestamp: self.context.timestamp,
            epoch: self.current_epoch,
            action: self.context.action.clone(),
            expected: self.context.expected,
            before: before.to_vec(),
            after,
            model: self.model_views(&participants),
            notes,
        }
    }

    async fn read_chain_views(&self, participants: &Participants) -> Result<Vec<ParticipantView>, HarnessError> {
        self.chain_views(participants)
            .await
            .map_err(endpoint_failure("reading staker data"))
    }

    async fn chain_views(&self, participants: &Participants) -> EndpointResult<Vec<ParticipantView>> {
        let epoch = self.current_epoch;
        let mut views = Vec::with_capacity(participants.len());
        for (role, address) in participants {
            views.push(ParticipantView {
                role: role.clone(),
                address: *address,
                current: self.chain.staker_data(*address, epoch).await?,
                next: self.chain.staker_data(*address, epoch + 1).await?,
                latest: self.chain.latest_staker_data(*address).await?,
                inited_current: self.chain.has_inited(*address, epoch).await?,
                inited_next: self.chain.has_inited(*address, epoch + 1).await?,
            });
        }
        Ok(views)
    }

    fn model_views(&self, participants: &Participants) -> Vec<ParticipantView> {
        let epoch = self.current_epoch;
        let ledger = self.model.ledger();
        participants
            .iter()
            .map(|(role, address)| ParticipantView {
                role: role.clone(),
                address: *address,
                current: self.model.staker_data(*address, epoch, epoch),
                next: self.model.staker_data(*address, epoch + 1, epoch),
                latest: self.model.latest_staker_data(*address),
                inited_current: ledger.has_snapshot(*address, epoch),
                inited_next: ledger.has_snapshot(*address, epoch + 1),
            })
            .collect()
    }
}
