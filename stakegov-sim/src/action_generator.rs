//! Weighted random actions with a predicted outcome.
//!
//! Every parameterized action has a small chance of being made invalid on
//! purpose. The expected outcome always comes from the reference model's own
//! checks, so a deliberately "valid" draw that happens to break a rule is
//! still predicted correctly.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stakegov_shared_types::campaign::encode_brr_option;
use stakegov_shared_types::{
    precision, Address, Amount, CampaignId, CampaignParams, CampaignType, Timestamp, MAX_CAMPAIGN_OPTIONS,
};

use crate::action::{
    Action, ActionKind, CancelCampaignAction, DelegateAction, DepositAction, GeneratedAction, Outcome,
    SubmitCampaignAction, VoteAction, WithdrawAction,
};
use crate::config::{ActionWeights, FuzzRunConfig};
use crate::fixed_point::scale_between;
use crate::model::ReferenceModel;

/// Resolution of uniform draws over amounts wider than 64 bits.
const AMOUNT_SCALE: u64 = 1_000_000_000;

pub struct ActionGenerator {
    rng: ChaCha8Rng,
    stakers: Vec<Address>,
    creator: Address,
    num_runs: u64,
    early_phase_ratio: f64,
    early: ActionWeights,
    late: ActionWeights,
}

impl ActionGenerator {
    pub fn new(config: &FuzzRunConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            stakers: config.stakers(),
            creator: config.creator(),
            num_runs: config.num_runs,
            early_phase_ratio: config.early_phase_ratio,
            early: config.early_weights,
            late: config.late_weights,
        }
    }

    /// Draws the kind of the next action. The early table applies while
    /// `loop_index / num_runs` is below the early phase ratio.
    pub fn next_kind(&mut self, loop_index: u64) -> ActionKind {
        let progress = loop_index as f64 / self.num_runs.max(1) as f64;
        let weights = if progress < self.early_phase_ratio {
            &self.early
        } else {
            &self.late
        };
        let roll = self.rng.gen_range(0..100);
        weights.pick(roll)
    }

    /// Draws the next action. `None` when the drawn kind has nothing to act
    /// on (a cancel with no pending campaigns).
    pub fn next_action(&mut self, loop_index: u64, model: &ReferenceModel, now: Timestamp) -> Option<GeneratedAction> {
        let kind = self.next_kind(loop_index);
        self.generate(kind, model, now)
    }

    pub fn generate(&mut self, kind: ActionKind, model: &ReferenceModel, now: Timestamp) -> Option<GeneratedAction> {
        let generated = match kind {
            ActionKind::Deposit => self.deposit(model),
            ActionKind::Withdraw => self.withdraw(model),
            ActionKind::Delegate => self.delegate(model),
            ActionKind::SubmitCampaign => self.submit_campaign(model, now),
            ActionKind::CancelCampaign => self.cancel_campaign(model, now)?,
            ActionKind::Vote => self.vote(model, now),
            ActionKind::ClaimReward => GeneratedAction {
                action: Action::ClaimReward,
                expected: Outcome::accepted(),
                description: "check current reward percentages".to_string(),
            },
            ActionKind::NoAction => GeneratedAction {
                action: Action::NoAction,
                expected: Outcome::accepted(),
                description: "advance time".to_string(),
            },
        };
        debug!("generated {}: {} ({})", kind, generated.description, generated.expected);
        Some(generated)
    }

    fn random_staker(&mut self) -> Address {
        let index = self.rng.gen_range(0..self.stakers.len());
        self.stakers[index]
    }

    fn percent(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }

    /// Uniform in `[1, max]`; 1 when `max` is zero.
    fn amount_up_to(&mut self, max: Amount) -> Amount {
        if max.is_zero() {
            return Amount::one();
        }
        let seed = self.rng.gen_range(0..=AMOUNT_SCALE);
        scale_between(Amount::one(), max, seed, AMOUNT_SCALE)
    }

    fn deposit(&mut self, model: &ReferenceModel) -> GeneratedAction {
        let staker = self.random_staker();
        let balance = model.balance_of(staker);
        let roll = self.percent();
        let (amount, description) = if roll < 5 {
            (Amount::zero(), "deposit zero")
        } else if roll < 10 {
            (balance + Amount::one(), "deposit more than balance")
        } else {
            (self.amount_up_to(balance), "deposit")
        };
        GeneratedAction {
            expected: Outcome::from_check(model.check_deposit(staker, amount)),
            action: Action::Deposit(DepositAction { staker, amount }),
            description: format!("{} {} by {}", description, amount, staker),
        }
    }

    fn withdraw(&mut self, model: &ReferenceModel) -> GeneratedAction {
        let staker = self.random_staker();
        let stake = model.latest_staker_data(staker).stake;
        let roll = self.percent();
        let (amount, description) = if roll < 5 {
            (Amount::zero(), "withdraw zero")
        } else if roll < 10 {
            (stake + Amount::one(), "withdraw more than stake")
        } else {
            (self.amount_up_to(stake), "withdraw")
        };
        GeneratedAction {
            expected: Outcome::from_check(model.check_withdraw(staker, amount)),
            action: Action::Withdraw(WithdrawAction { staker, amount }),
            description: format!("{} {} by {}", description, amount, staker),
        }
    }

    fn delegate(&mut self, model: &ReferenceModel) -> GeneratedAction {
        let staker = self.random_staker();
        let representative = if self.percent() < 5 {
            Address::ZERO
        } else {
            self.random_staker()
        };
        GeneratedAction {
            expected: Outcome::from_check(model.check_delegate(representative)),
            action: Action::Delegate(DelegateAction { staker, representative }),
            description: format!("{} delegates to {}", staker, representative),
        }
    }

    fn submit_campaign(&mut self, model: &ReferenceModel, now: Timestamp) -> GeneratedAction {
        let clock = *model.clock();
        let current = clock.epoch_at(now);
        let roll = self.percent();
        let base = CampaignParams {
            campaign_type: CampaignType::General,
            start_time: now,
            end_time: now + 1,
            min_percentage: precision(),
            c_param: precision(),
            t_param: precision(),
            options: vec![Amount::from(1u64), Amount::from(2u64)],
        };

        let (params, description) = if roll >= 97 {
            let params = CampaignParams {
                end_time: now.saturating_sub(1),
                ..base
            };
            (params, "campaign ending before it starts".to_string())
        } else if roll >= 94 {
            let start_time = clock.epoch_start(current + 2);
            let params = CampaignParams {
                start_time,
                end_time: start_time + 1,
                ..base
            };
            (params, "campaign two epochs ahead".to_string())
        } else if roll >= 90 {
            let params = CampaignParams {
                options: (1..=MAX_CAMPAIGN_OPTIONS as u64 + 1).map(Amount::from).collect(),
                ..base
            };
            (params, "campaign with too many options".to_string())
        } else {
            let period = clock.epoch_period;
            let earliest = now.saturating_sub(20);
            let latest = (clock.epoch_start(current + 2) + period / 2).max(earliest + 1);
            let start_time = self.rng.gen_range(earliest..latest);
            let max_min_pct = (precision() / Amount::from(5u64)).low_u64();
            let min_percentage = self.rng.gen_range(0..=max_min_pct);
            let max_c = (precision() / Amount::from(2u64)).low_u64();
            let c_param = self.rng.gen_range(min_percentage..=max_c);
            let (campaign_type, options) = match self.rng.gen_range(0..3) {
                0 => (
                    CampaignType::NetworkFee,
                    vec![Amount::from(0u64), Amount::from(200u64), Amount::from(4_999u64)],
                ),
                1 => (
                    CampaignType::FeeBrr,
                    vec![
                        encode_brr_option(0, 2_000),
                        encode_brr_option(3_000, 0),
                        encode_brr_option(3_000, 2_000),
                    ],
                ),
                _ => {
                    let count = self.rng.gen_range(2..=4);
                    let options = (0..count)
                        .map(|_| Amount::from(self.rng.gen_range(1..=1_000u64)))
                        .collect();
                    (CampaignType::General, options)
                }
            };
            let params = CampaignParams {
                campaign_type,
                start_time,
                end_time: start_time + period / 2,
                min_percentage: Amount::from(min_percentage),
                c_param: Amount::from(c_param),
                t_param: precision(),
                options,
            };
            let description = format!(
                "{} campaign at epoch {}",
                campaign_type,
                clock.epoch_at(start_time)
            );
            (params, description)
        };

        GeneratedAction {
            expected: Outcome::from_check(model.registry().validate_submission(&params, now)),
            action: Action::SubmitCampaign(SubmitCampaignAction {
                creator: self.creator,
                params,
            }),
            description,
        }
    }

    fn cancel_campaign(&mut self, model: &ReferenceModel, now: Timestamp) -> Option<GeneratedAction> {
        let current = model.epoch_at(now);
        let registry = model.registry();
        let candidates: Vec<CampaignId> = registry
            .campaign_ids(current)
            .iter()
            .chain(registry.campaign_ids(current + 1))
            .copied()
            .collect();

        let campaign_id = if self.percent() < 5 {
            registry.number_campaigns() + self.rng.gen_range(1..=3)
        } else if candidates.is_empty() {
            debug!("no campaign in epoch {} or {} to cancel", current, current + 1);
            return None;
        } else {
            candidates[self.rng.gen_range(0..candidates.len())]
        };
        Some(GeneratedAction {
            expected: Outcome::from_check(registry.validate_cancel(campaign_id, now)),
            action: Action::CancelCampaign(CancelCampaignAction {
                creator: self.creator,
                campaign_id,
            }),
            description: format!("cancel campaign {}", campaign_id),
        })
    }

    fn vote(&mut self, model: &ReferenceModel, now: Timestamp) -> GeneratedAction {
        let staker = self.random_staker();
        let registry = model.registry();
        let campaigns = registry.campaign_ids(model.epoch_at(now));
        let (campaign_id, option) = if campaigns.is_empty() {
            (registry.number_campaigns() + 2, 1)
        } else {
            let campaign_id = campaigns[self.rng.gen_range(0..campaigns.len())];
            let count = registry
                .live_campaign(campaign_id)
                .map_or(0, |campaign| campaign.details.params.options.len() as u64);
            (campaign_id, self.rng.gen_range(0..=count + 1))
        };
        GeneratedAction {
            expected: Outcome::from_check(registry.validate_vote(campaign_id, option, now)),
            action: Action::Vote(VoteAction {
                staker,
                campaign_id,
                option,
            }),
            description: format!("{} votes {} on campaign {}", staker, option, campaign_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_shared_types::RejectReason;

    fn setup() -> (FuzzRunConfig, ReferenceModel) {
        let config = FuzzRunConfig::default();
        let mut model = ReferenceModel::new(config.clock(), config.rules, config.initial_parameters);
        for staker in config.stakers() {
            model.fund(staker, config.initial_balance);
        }
        (config, model)
    }

    #[test]
    fn test_same_seed_same_actions() {
        let (config, model) = setup();
        let now = config.start_time() + 100;
        let mut a = ActionGenerator::new(&config, 11);
        let mut b = ActionGenerator::new(&config, 11);
        for loop_index in 0..50 {
            assert_eq!(
                a.next_action(loop_index, &model, now),
                b.next_action(loop_index, &model, now)
            );
        }
    }

    #[test]
    fn test_early_phase_only_builds_stake() {
        let (mut config, _) = setup();
        config.num_runs = 1_000_000;
        let mut generator = ActionGenerator::new(&config, 3);
        for _ in 0..200 {
            let kind = generator.next_kind(0);
            assert!(matches!(
                kind,
                ActionKind::Deposit | ActionKind::Withdraw | ActionKind::Delegate | ActionKind::SubmitCampaign
            ));
        }
    }

    #[test]
    fn test_expected_outcome_matches_model_checks() {
        let (config, model) = setup();
        let now = config.start_time() + 100;
        let mut generator = ActionGenerator::new(&config, 5);
        for _ in 0..300 {
            for kind in ActionKind::ALL {
                let Some(generated) = generator.generate(kind, &model, now) else {
                    continue;
                };
                let predicted = match &generated.action {
                    Action::Deposit(a) => Outcome::from_check(model.check_deposit(a.staker, a.amount)),
                    Action::Withdraw(a) => Outcome::from_check(model.check_withdraw(a.staker, a.amount)),
                    Action::Delegate(a) => Outcome::from_check(model.check_delegate(a.representative)),
                    Action::SubmitCampaign(a) => {
                        Outcome::from_check(model.registry().validate_submission(&a.params, now))
                    }
                    Action::CancelCampaign(a) => {
                        Outcome::from_check(model.registry().validate_cancel(a.campaign_id, now))
                    }
                    Action::Vote(a) => {
                        Outcome::from_check(model.registry().validate_vote(a.campaign_id, a.option, now))
                    }
                    Action::ClaimReward | Action::NoAction => Outcome::accepted(),
                };
                assert_eq!(generated.expected, predicted);
            }
        }
    }

    #[test]
    fn test_nothing_staked_means_withdrawals_fail() {
        let (config, model) = setup();
        let mut generator = ActionGenerator::new(&config, 9);
        for _ in 0..50 {
            let Some(generated) = generator.generate(ActionKind::Withdraw, &model, config.start_time()) else {
                continue;
            };
            assert!(!generated.expected.valid);
            assert!(matches!(
                generated.expected.reason,
                Some(RejectReason::InvalidAmount) | Some(RejectReason::InsufficientStake)
            ));
        }
    }

    #[test]
    fn test_vote_without_campaigns_targets_unknown_id() {
        let (config, model) = setup();
        let mut generator = ActionGenerator::new(&config, 1);
        let generated = generator
            .generate(ActionKind::Vote, &model, config.start_time())
            .unwrap();
        assert_eq!(generated.expected, Outcome::rejected(RejectReason::UnknownCampaign));
    }

    #[test]
    fn test_submitted_campaigns_often_valid() {
        let (config, model) = setup();
        let mut generator = ActionGenerator::new(&config, 21);
        let now = config.start_time() + 50;
        let valid = (0..200)
            .filter_map(|_| generator.generate(ActionKind::SubmitCampaign, &model, now))
            .filter(|generated| generated.expected.valid)
            .count();
        assert!(valid > 20, "only {} valid submissions", valid);
    }
}
