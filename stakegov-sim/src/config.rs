//! Run configuration for a differential fuzz campaign.

use serde::{Deserialize, Serialize};
use stakegov_shared_types::{precision, Address, Amount, EpochClock, Timestamp};

use crate::action::ActionKind;
use crate::campaign_registry::{CampaignRules, InitialParameters};
use crate::error::ConfigError;

/// Percentage weights of each action kind. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionWeights {
    pub deposit: u32,
    pub withdraw: u32,
    pub delegate: u32,
    pub submit_campaign: u32,
    pub cancel_campaign: u32,
    pub vote: u32,
    pub claim_reward: u32,
    pub no_action: u32,
}

impl ActionWeights {
    /// Deposit-heavy profile used while stake is being built up.
    pub fn early() -> Self {
        Self {
            deposit: 70,
            withdraw: 5,
            delegate: 15,
            submit_campaign: 10,
            cancel_campaign: 0,
            vote: 0,
            claim_reward: 0,
            no_action: 0,
        }
    }

    /// Governance-heavy profile for the rest of the run.
    pub fn late() -> Self {
        Self {
            deposit: 10,
            withdraw: 10,
            delegate: 10,
            submit_campaign: 10,
            cancel_campaign: 5,
            vote: 45,
            claim_reward: 5,
            no_action: 5,
        }
    }

    pub fn weight(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Deposit => self.deposit,
            ActionKind::Withdraw => self.withdraw,
            ActionKind::Delegate => self.delegate,
            ActionKind::SubmitCampaign => self.submit_campaign,
            ActionKind::CancelCampaign => self.cancel_campaign,
            ActionKind::Vote => self.vote,
            ActionKind::ClaimReward => self.claim_reward,
            ActionKind::NoAction => self.no_action,
        }
    }

    pub fn total(&self) -> u32 {
        ActionKind::ALL.iter().map(|kind| self.weight(*kind)).sum()
    }

    /// Cumulative-weight draw: `roll` in `[0, 100)` picks the first kind whose
    /// running total exceeds it.
    pub fn pick(&self, roll: u32) -> ActionKind {
        let mut cumulative = 0;
        for kind in ActionKind::ALL {
            cumulative += self.weight(kind);
            if roll < cumulative {
                return kind;
            }
        }
        ActionKind::NoAction
    }
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self::late()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzRunConfig {
    /// Loop iterations; epoch rollovers count as iterations.
    pub num_runs: u64,
    /// RNG seed. `None` draws one at start-up; it is logged either way.
    pub seed: Option<u64>,
    pub num_stakers: usize,
    /// Index into the stakers of the identity that submits and cancels campaigns.
    pub campaign_creator: usize,
    /// Block time of the chain before the first step.
    pub genesis_time: Timestamp,
    /// Seconds between genesis and the start of epoch 1.
    pub start_delay: u64,
    pub epoch_period: u64,
    /// Seconds added to the block time on every iteration.
    pub step_seconds: u64,
    /// Tokens each staker holds at the start. The token supply is the sum.
    pub initial_balance: Amount,
    /// Fraction of `num_runs` after which the late weights apply.
    pub early_phase_ratio: f64,
    pub early_weights: ActionWeights,
    pub late_weights: ActionWeights,
    pub rules: CampaignRules,
    pub initial_parameters: InitialParameters,
}

impl Default for FuzzRunConfig {
    fn default() -> Self {
        Self {
            num_runs: 250,
            seed: None,
            num_stakers: 9,
            campaign_creator: 2,
            genesis_time: 1_600_000_000,
            start_delay: 10,
            epoch_period: 500, // ~50 iterations per epoch
            step_seconds: 10,
            initial_balance: Amount::from(10_000u64) * precision(),
            early_phase_ratio: 0.003,
            early_weights: ActionWeights::early(),
            late_weights: ActionWeights::late(),
            rules: CampaignRules::default(),
            initial_parameters: InitialParameters::default(),
        }
    }
}

impl FuzzRunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_stakers < 2 {
            return Err(ConfigError::TooFewStakers(self.num_stakers));
        }
        if self.campaign_creator >= self.num_stakers {
            return Err(ConfigError::CreatorOutOfRange {
                index: self.campaign_creator,
                num_stakers: self.num_stakers,
            });
        }
        if self.epoch_period < 2 {
            return Err(ConfigError::EpochPeriodTooShort(self.epoch_period));
        }
        if self.step_seconds == 0 || self.step_seconds >= self.epoch_period {
            return Err(ConfigError::InvalidStep {
                step: self.step_seconds,
                epoch_period: self.epoch_period,
            });
        }
        if self.initial_balance.is_zero() {
            return Err(ConfigError::ZeroBalance);
        }
        // supply times precision must fit, so shares and points never overflow
        let supply = self.initial_balance.checked_mul(Amount::from(self.num_stakers));
        if supply.and_then(|supply| supply.checked_mul(precision())).is_none() {
            return Err(ConfigError::SupplyOverflow {
                balance: self.initial_balance,
                num_stakers: self.num_stakers,
            });
        }
        if !(0.0..=1.0).contains(&self.early_phase_ratio) {
            return Err(ConfigError::InvalidPhaseRatio(self.early_phase_ratio));
        }
        for (phase, weights) in [("early", &self.early_weights), ("late", &self.late_weights)] {
            let sum = weights.total();
            if sum != 100 {
                return Err(ConfigError::WeightsDoNotSum { phase, sum });
            }
        }
        let p = &self.initial_parameters;
        if p.network_fee_bps >= stakegov_shared_types::MAX_NETWORK_FEE_BPS
            || p.reward_bps.saturating_add(p.rebate_bps) > stakegov_shared_types::BPS
        {
            return Err(ConfigError::InvalidInitialParameters);
        }
        Ok(())
    }

    pub fn start_time(&self) -> Timestamp {
        self.genesis_time + self.start_delay
    }

    pub fn clock(&self) -> EpochClock {
        EpochClock::new(self.start_time(), self.epoch_period)
    }

    pub fn stakers(&self) -> Vec<Address> {
        (0..self.num_stakers)
            .map(|index| Address::derive(&format!("staker-{}", index)))
            .collect()
    }

    pub fn creator(&self) -> Address {
        Address::derive(&format!("staker-{}", self.campaign_creator))
    }

    pub fn total_supply(&self) -> Amount {
        self.initial_balance.saturating_mul(Amount::from(self.num_stakers))
    }
}
