//! Campaign records and the values a campaign outcome feeds back into the
//! protocol (network fee, reward/rebate/burn split).

use serde::{Deserialize, Serialize};

use crate::{power_128, Amount, CampaignId, Epoch, Timestamp, BPS};

/// What a campaign decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignType {
    /// Free-form poll; options are opaque non-zero codes.
    General,
    /// Options are candidate network fees in basis points.
    NetworkFee,
    /// Options are packed `(rebate, reward)` basis point pairs.
    FeeBrr,
}

impl std::fmt::Display for CampaignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignType::General => write!(f, "general"),
            CampaignType::NetworkFee => write!(f, "network fee"),
            CampaignType::FeeBrr => write!(f, "brr"),
        }
    }
}

/// Everything a campaign creator submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParams {
    pub campaign_type: CampaignType,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Minimum turnout, in precision.
    pub min_percentage: Amount,
    /// Threshold intercept, in precision.
    pub c_param: Amount,
    /// Threshold slope against turnout, in precision.
    pub t_param: Amount,
    pub options: Vec<Amount>,
}

/// A submitted campaign as reported by a campaign details query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDetails {
    pub id: CampaignId,
    pub params: CampaignParams,
    /// Total token supply when the campaign was submitted; the turnout base.
    pub total_voting_power_snapshot: Amount,
}

/// Per-option tallies of one campaign. `vote_per_option[i]` belongs to option
/// id `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CampaignVoteData {
    pub vote_per_option: Vec<Amount>,
    pub total_votes: Amount,
}

impl CampaignVoteData {
    pub fn with_options(count: usize) -> Self {
        Self {
            vote_per_option: vec![Amount::zero(); count],
            total_votes: Amount::zero(),
        }
    }
}

/// Resolved outcome of a campaign. Option id 0 with value 0 means no winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinningOption {
    pub option_id: u64,
    pub value: Amount,
}

impl WinningOption {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_winner(&self) -> bool {
        self.option_id != 0
    }
}

/// Network fee in force for the current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFeeData {
    pub fee_bps: u64,
    pub expiry_time: Timestamp,
}

/// Reward / rebate / burn split in force for the current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrrData {
    pub reward_bps: u64,
    pub rebate_bps: u64,
    pub burn_bps: u64,
    pub epoch: Epoch,
    pub expiry_time: Timestamp,
}

impl BrrData {
    /// Builds the split from its reward and rebate parts; burn takes the rest.
    pub fn new(reward_bps: u64, rebate_bps: u64, epoch: Epoch, expiry_time: Timestamp) -> Self {
        Self {
            reward_bps,
            rebate_bps,
            burn_bps: BPS.saturating_sub(reward_bps + rebate_bps),
            epoch,
            expiry_time,
        }
    }
}

/// Packs a FeeBRR option: `rebate * 2^128 + reward`.
pub fn encode_brr_option(rebate_bps: u64, reward_bps: u64) -> Amount {
    Amount::from(rebate_bps) * power_128() + Amount::from(reward_bps)
}

/// Unpacks a FeeBRR option into `(rebate, reward)`. The reward is the low 128
/// bits; no range check is applied, callers validate against `BPS`.
pub fn decode_brr_option(value: Amount) -> (Amount, Amount) {
    let rebate = value / power_128();
    let reward = value - rebate * power_128();
    (rebate, reward)
}
