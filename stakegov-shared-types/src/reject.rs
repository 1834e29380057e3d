//! Reasons an action is refused, and their mapping onto the revert messages of
//! the staking and DAO contracts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CampaignType;

/// Why the protocol refuses an action. Raised by the reference model before any
/// state changes and predicted for every deliberately invalid action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("amount is zero")]
    InvalidAmount,
    #[error("token balance too low")]
    InsufficientBalance,
    #[error("latest stake is below the withdrawal amount")]
    InsufficientStake,
    #[error("representative is the null address")]
    ZeroAddress,
    #[error("campaign starts in the past")]
    StartInPast,
    #[error("campaign window is empty or shorter than the minimum duration")]
    InvalidWindow,
    #[error("epoch already holds the maximum number of campaigns")]
    EpochCampaignsFull,
    #[error("campaign start and end are in different epochs")]
    WindowSpansEpochs,
    #[error("campaign epoch is neither the current nor the next one")]
    EpochOutOfRange,
    #[error("invalid number of options")]
    TooManyOptions,
    #[error("option value not allowed for this campaign type")]
    InvalidOptionValue,
    #[error("epoch already has a {0} campaign")]
    DuplicateTypeForEpoch(CampaignType),
    #[error("min percentage above 100%")]
    MinPercentageTooHigh,
    #[error("formula parameter above 2^128")]
    FormulaParamTooHigh,
    #[error("campaign does not exist")]
    UnknownCampaign,
    #[error("campaign already started")]
    AlreadyStarted,
    #[error("campaign not started")]
    NotStarted,
    #[error("campaign already ended")]
    AlreadyEnded,
    #[error("option is 0 or beyond the option count")]
    OptionOutOfRange,
}

const REVERT_MESSAGES: &[(&str, RejectReason)] = &[
    ("deposit: amount is 0", RejectReason::InvalidAmount),
    ("withdraw: amount is 0", RejectReason::InvalidAmount),
    ("ERC20: transfer amount exceeds balance", RejectReason::InsufficientBalance),
    ("withdraw: latest amount staked < withdrawal amount", RejectReason::InsufficientStake),
    ("delegate: representative 0", RejectReason::ZeroAddress),
    ("validateParams: start in the past", RejectReason::StartInPast),
    ("validateParams: campaign duration is low", RejectReason::InvalidWindow),
    ("validateParams: too many campaigns", RejectReason::EpochCampaignsFull),
    ("validateParams: start & end not same epoch", RejectReason::WindowSpansEpochs),
    ("validateParams: only for current or next epochs", RejectReason::EpochOutOfRange),
    ("validateParams: invalid number of options", RejectReason::TooManyOptions),
    ("validateParams: general campaign option is 0", RejectReason::InvalidOptionValue),
    ("validateParams: network fee must be smaller then BPS / 2", RejectReason::InvalidOptionValue),
    ("validateParams: rebate + reward can't be bigger than BPS", RejectReason::InvalidOptionValue),
    (
        "validateParams: already had network fee campaign for this epoch",
        RejectReason::DuplicateTypeForEpoch(CampaignType::NetworkFee),
    ),
    (
        "validateParams: already had brr campaign for this epoch",
        RejectReason::DuplicateTypeForEpoch(CampaignType::FeeBrr),
    ),
    ("validateParams: min percentage is high", RejectReason::MinPercentageTooHigh),
    ("validateParams: c is high", RejectReason::FormulaParamTooHigh),
    ("validateParams: t is high", RejectReason::FormulaParamTooHigh),
    ("cancelCampaign: campaignID doesn't exist", RejectReason::UnknownCampaign),
    ("cancelCampaign: campaign already started", RejectReason::AlreadyStarted),
    ("vote: campaign doesn't exist", RejectReason::UnknownCampaign),
    ("vote: campaign not started", RejectReason::NotStarted),
    ("vote: campaign already ended", RejectReason::AlreadyEnded),
    ("vote: option is 0", RejectReason::OptionOutOfRange),
    ("vote: option is not in range", RejectReason::OptionOutOfRange),
];

impl RejectReason {
    /// Classifies a revert message returned by the authoritative system.
    /// Unknown messages yield `None`.
    pub fn from_revert_message(message: &str) -> Option<Self> {
        let message = message.trim();
        REVERT_MESSAGES
            .iter()
            .find(|(known, _)| message == *known || message.ends_with(known))
            .map(|(_, reason)| *reason)
    }

    /// Every revert message that classifies as `self`.
    pub fn revert_messages(&self) -> impl Iterator<Item = &'static str> + '_ {
        REVERT_MESSAGES
            .iter()
            .filter(move |(_, reason)| reason == self)
            .map(|(message, _)| *message)
    }
}
